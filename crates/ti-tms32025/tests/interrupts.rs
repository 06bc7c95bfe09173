//! Interrupts, timer, IDLE, HOLD and the serial port, driven through
//! `Cpu::run` with clock budgets.

use emu_core::{AddressSpace, Cpu, CycleBudget, LineState, MemoryBus, Observable, Value};
use ti_tms32025::{CLK, Model, Tms32025, ifr, line, vector};

const NOP: u16 = 0x5500; // mar, direct

/// Place `words` at program word `address`.
fn place(bus: &mut MemoryBus, address: u16, words: &[u16]) {
    bus.load_words(AddressSpace::Program, u32::from(address) << 1, words);
}

fn setup(program: &[u16]) -> (Tms32025, MemoryBus) {
    let mut bus = MemoryBus::new();
    place(&mut bus, 0, program);
    let mut cpu = Tms32025::new(Model::Tms32025);
    cpu.reset(&mut bus);
    (cpu, bus)
}

fn run(cpu: &mut Tms32025, bus: &mut MemoryBus, clocks: i64) -> CycleBudget {
    let mut budget = CycleBudget::new(clocks);
    cpu.run(bus, &mut budget);
    budget
}

#[test]
fn lowest_request_is_serviced_first_and_only_its_bit_clears() {
    let (mut cpu, mut bus) = setup(&[0xFF80, 0x0020]); // b 0x20
    place(&mut bus, 0x20, &[0xCE00, NOP, NOP]); // eint
    place(&mut bus, vector::INT0, &[NOP]);
    cpu.poke("imr", Value::U16(0x003F)).unwrap();

    cpu.step(&mut bus);
    cpu.step(&mut bus);
    cpu.set_input_line(line::INT2, LineState::Asserted);
    cpu.set_input_line(line::INT0, LineState::Asserted);

    // Nothing is taken in the instruction after EINT.
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 0x22);
    assert_eq!(cpu.regs.ifr, ifr::INT0 | ifr::INT2);

    let clocks = cpu.step(&mut bus);
    assert_eq!(clocks, 3 * CLK + CLK);
    assert_eq!(cpu.regs.pc, vector::INT0 + 1);
    assert_eq!(cpu.regs.ifr, ifr::INT2);
    assert_eq!(cpu.regs.stack[7], 0x22);
    assert!(cpu.status().intm());
}

#[test]
fn releasing_a_line_does_not_clear_its_request() {
    let (mut cpu, _) = setup(&[]);
    cpu.set_input_line(line::INT1, LineState::Asserted);
    cpu.set_input_line(line::INT1, LineState::Cleared);
    assert_eq!(cpu.regs.ifr, ifr::INT1);
}

#[test]
fn timer_underflow_reloads_and_raises_tint() {
    let (mut cpu, mut bus) = setup(&[0xFF80, 0x0000]); // b 0
    place(&mut bus, vector::TINT, &[0xFF80, vector::TINT]);
    cpu.poke("imr", Value::U16(ifr::TINT)).unwrap();
    cpu.poke("flags.intm", Value::Bool(false)).unwrap();
    cpu.poke("tim", Value::U16(5)).unwrap();
    cpu.poke("prd", Value::U16(100)).unwrap();

    let budget = run(&mut cpu, &mut bus, 40);
    assert_eq!(cpu.regs.pc, vector::TINT);
    assert_eq!(cpu.regs.stack[7], 0);
    assert_eq!(cpu.regs.ifr, 0);
    assert_eq!(cpu.query("tim"), Some(Value::U16(95)));
    assert_eq!(budget.remaining(), -4);
    assert_eq!(cpu.total_cycles(), 44);
}

#[test]
fn idle_waits_for_an_interrupt() {
    let (mut cpu, mut bus) = setup(&[0xFF80, 0x0020]); // b 0x20
    place(&mut bus, 0x20, &[0xCE1F, 0xFF80, 0x0021]); // idle; b 0x21
    place(&mut bus, vector::TINT, &[0xFF80, vector::TINT]);
    cpu.poke("imr", Value::U16(ifr::TINT)).unwrap();
    cpu.poke("tim", Value::U16(9)).unwrap();
    cpu.poke("prd", Value::U16(50)).unwrap();

    let budget = run(&mut cpu, &mut bus, 100);
    assert!(!cpu.is_idle());
    assert_eq!(cpu.regs.pc, vector::TINT);
    assert_eq!(cpu.regs.stack[7], 0x21);
    assert_eq!(budget.remaining(), 0);
}

#[test]
fn idle_with_everything_masked_burns_the_whole_budget() {
    let (mut cpu, mut bus) = setup(&[0xCE1F]); // idle
    cpu.poke("tim", Value::U16(10)).unwrap();
    let budget = run(&mut cpu, &mut bus, 1000);

    assert!(cpu.is_idle());
    assert_eq!(cpu.regs.pc, 1);
    assert_ne!(cpu.regs.ifr & ifr::TINT, 0);
    assert_eq!(budget.remaining(), 0);
    assert_eq!(cpu.total_cycles(), 1000);
    assert_eq!(bus.read_count(AddressSpace::Program), 1);
}

#[test]
fn pending_request_wakes_an_idle_core_at_run_entry() {
    let (mut cpu, mut bus) = setup(&[0xCE1F]); // idle
    place(&mut bus, vector::INT1, &[0xFF80, vector::INT1]);
    cpu.poke("imr", Value::U16(ifr::INT1)).unwrap();
    run(&mut cpu, &mut bus, 12);
    assert!(cpu.is_idle());

    cpu.set_input_line(line::INT1, LineState::Asserted);
    run(&mut cpu, &mut bus, 20);
    assert!(!cpu.is_idle());
    assert_eq!(cpu.regs.pc, vector::INT1);
    assert_eq!(cpu.regs.stack[7], 1);
}

#[test]
fn hold_in_hold_mode_stops_execution() {
    let (mut cpu, mut bus) = setup(&[NOP, NOP, NOP]);
    cpu.set_hold(LineState::Asserted);
    let budget = run(&mut cpu, &mut bus, 100);

    assert!(cpu.hold_acknowledged());
    assert_eq!(cpu.regs.pc, 0);
    assert_eq!(bus.read_count(AddressSpace::Program), 0);
    assert_eq!(budget.remaining(), 0);
    // The timer ran through the hold.
    assert_eq!(cpu.query("tim"), Some(Value::U16(0xFFFF - 25)));

    cpu.set_hold(LineState::Cleared);
    run(&mut cpu, &mut bus, 8);
    assert!(!cpu.hold_acknowledged());
    assert_eq!(cpu.regs.pc, 2);
}

#[test]
fn hold_without_hold_mode_stops_at_an_off_chip_access() {
    let (mut cpu, mut bus) = setup(&[
        0xCE38, // rhm
        0xD000, 0x1000, // lrlk ar0, 0x1000
        0x2080, // lac *
        NOP,
    ]);
    run(&mut cpu, &mut bus, 4);
    assert!(!cpu.status().hm());

    cpu.set_hold(LineState::Asserted);
    let budget = run(&mut cpu, &mut bus, 100);
    assert!(cpu.hold_acknowledged());
    assert_eq!(cpu.regs.pc, 4);
    assert_eq!(budget.remaining(), 0);
}

#[test]
fn transmit_waits_for_frame_sync_in_frame_mode() {
    let (mut cpu, mut bus) = setup(&[
        0xCE21, // stxm
        0xCA55, // lack 0x55
        0x6001, // sacl dxr
        NOP,
    ]);
    for _ in 0..3 {
        cpu.step(&mut bus);
    }
    assert_eq!(cpu.regs.ifr, 0);

    cpu.set_input_line(line::FSX, LineState::Asserted);
    assert_eq!(cpu.regs.ifr, ifr::XINT);
    cpu.set_input_line(line::FSX, LineState::Asserted);
    assert_eq!(cpu.regs.ifr, ifr::XINT);

    cpu.poke("imr", Value::U16(ifr::XINT)).unwrap();
    cpu.poke("flags.intm", Value::Bool(false)).unwrap();
    cpu.step(&mut bus);
    assert_eq!(cpu.take_serial_output(), vec![0x55]);
    assert_eq!(cpu.regs.pc, vector::XINT + 1);
    assert!(cpu.take_serial_output().is_empty());
}

#[test]
fn transmit_without_frame_mode_requests_immediately() {
    let (mut cpu, mut bus) = setup(&[
        0xCE36, // rfsm
        0xCE21, // stxm
        0x6001, // sacl dxr
    ]);
    for _ in 0..3 {
        cpu.step(&mut bus);
    }
    assert_eq!(cpu.regs.ifr, ifr::XINT);
}

#[test]
fn receive_service_latches_the_serial_input() {
    let (mut cpu, mut bus) = setup(&[NOP]);
    place(&mut bus, vector::RINT, &[NOP]);
    cpu.poke("imr", Value::U16(ifr::RINT)).unwrap();
    cpu.poke("flags.intm", Value::Bool(false)).unwrap();
    cpu.set_serial_input(0xABCD);
    cpu.set_input_line(line::RINT, LineState::Asserted);

    cpu.step(&mut bus);
    assert_eq!(cpu.query("drr"), Some(Value::U16(0xABCD)));
    assert_eq!(cpu.regs.pc, vector::RINT + 1);
}

#[test]
fn trap_vectors_through_the_stack() {
    let (mut cpu, mut bus) = setup(&[NOP, 0xCE1E]); // trap
    cpu.step(&mut bus);
    let clocks = cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, vector::TRAP);
    assert_eq!(cpu.regs.stack[7], 2);
    assert_eq!(clocks, 2 * CLK);
}
