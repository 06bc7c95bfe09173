//! Exception and interrupt entry tests for the ROMP core.

use emu_core::{AddressSpace, Bus, Cpu, LineState, MemoryBus};
use ibm_romp::{Flow, Romp, mpcs, scr};

const START: u32 = 0x1000;

/// Address of the program status block for `level`.
const fn block(level: u32) -> u32 {
    0x100 + level * 16
}

fn setup(program: &[u16]) -> (Romp, MemoryBus) {
    let mut bus = MemoryBus::new();
    bus.write_u32(AddressSpace::Program, 0, START);
    bus.load_words(AddressSpace::Program, START, program);
    let mut cpu = Romp::new();
    cpu.reset(&mut bus);
    (cpu, bus)
}

/// Install a new program status for `level`.
fn install_handler(bus: &mut MemoryBus, level: u32, iar: u32, ics: u16, cs: u16) {
    let at = block(level);
    bus.write_u32(AddressSpace::Program, at + 8, iar);
    bus.write_u16(AddressSpace::Program, at + 12, ics);
    bus.write_u16(AddressSpace::Program, at + 14, cs);
}

#[test]
fn branch_in_delay_slot_is_a_program_check() {
    let (mut cpu, mut bus) = setup(&[
        0x8B00, 0x2000, // balax 0x2000
        0x8A00, 0x3000, // bala 0x3000 (in the delay slot)
    ]);
    install_handler(&mut bus, 8, 0x4000, 0x0000, 0);

    cpu.step(&mut bus);
    let link = cpu.regs.gpr[15];
    assert_eq!(cpu.flow(), Flow::BranchPending);
    assert_eq!(cpu.branch_target(), 0x2000);

    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), 0x4000);
    assert_eq!(cpu.flow(), Flow::Normal);
    assert_eq!(cpu.branch_target(), 0x2000, "latched target is untouched");
    assert_eq!(cpu.regs.gpr[15], link, "the conflicting branch did not link");
    assert_eq!(
        cpu.regs.scr[scr::MPCS],
        mpcs::KNOWN_ORIGIN | mpcs::ILLEGAL_OP
    );
    assert_eq!(bus.peek_u32(AddressSpace::Program, block(8)), START + 4);
}

#[test]
fn undefined_opcode_is_a_program_check() {
    let (mut cpu, mut bus) = setup(&[0xB600]); // divide step, unimplemented
    install_handler(&mut bus, 8, 0x4000, 0x0000, 0);
    cpu.regs.scr[scr::CS] = 0x21;
    cpu.regs.scr[scr::ICS] = 0x0007;

    let cycles = cpu.step(&mut bus);
    assert_eq!(cycles, 1);
    assert_eq!(cpu.pc(), 0x4000);
    assert_eq!(bus.peek_u32(AddressSpace::Program, block(8)), START);
    assert_eq!(bus.peek_u16(AddressSpace::Program, block(8) + 4), 0x0007);
    assert_eq!(bus.peek_u16(AddressSpace::Program, block(8) + 6), 0x21);
    assert_eq!(cpu.regs.scr[scr::CS], 0x21, "CS is kept for level 8");
    assert_eq!(cpu.regs.scr[scr::ICS], 0);
}

#[test]
fn program_check_keeps_machine_check_status() {
    let (mut cpu, mut bus) = setup(&[0xF0FF]); // wait, unimplemented
    install_handler(&mut bus, 8, 0x4000, 0, 0);
    cpu.regs.scr[scr::MPCS] = 0x0100 | mpcs::TRAP;
    cpu.step(&mut bus);
    assert_eq!(
        cpu.regs.scr[scr::MPCS],
        0x0100 | mpcs::KNOWN_ORIGIN | mpcs::ILLEGAL_OP
    );
}

#[test]
fn supervisor_call_stores_its_code() {
    let (mut cpu, mut bus) = setup(&[
        0xC001, 0x0040, // svc 0x40(r1)
    ]);
    install_handler(&mut bus, 9, 0x5000, 0x0003, 0);
    cpu.regs.gpr[1] = 2;

    let cycles = cpu.step(&mut bus);
    assert_eq!(cycles, 16);
    assert_eq!(cpu.pc(), 0x5000);
    assert_eq!(cpu.regs.scr[scr::ICS], 3);
    assert_eq!(bus.peek_u16(AddressSpace::Program, block(9) + 14), 0x42);
    assert_eq!(bus.peek_u32(AddressSpace::Program, block(9)), START);

    // the handler's first instruction runs at its own address
    bus.load_words(AddressSpace::Program, 0x5000, &[0xA471]); // lis r7, 1
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.gpr[7], 1);
    assert_eq!(cpu.pc(), 0x5002);
}

#[test]
fn trap_instructions_raise_program_trap() {
    let (mut cpu, mut bus) = setup(&[
        0xBD12, // tgte r1, r2
        0xBE12, // tlt r1, r2
    ]);
    install_handler(&mut bus, 8, 0x4000, 0, 0);
    cpu.regs.gpr[1] = 5;
    cpu.regs.gpr[2] = 3;

    assert_eq!(cpu.step(&mut bus), 16);
    assert_eq!(cpu.pc(), 0x4000);
    assert_eq!(cpu.regs.scr[scr::MPCS], mpcs::KNOWN_ORIGIN | mpcs::TRAP);
}

#[test]
fn trap_not_taken_costs_two_cycles() {
    let (mut cpu, mut bus) = setup(&[0xBE12]); // tlt r1, r2
    cpu.regs.gpr[1] = 5;
    cpu.regs.gpr[2] = 3;
    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.pc(), START + 2);
}

#[test]
fn io_address_outside_the_window_is_a_program_check() {
    let (mut cpu, mut bus) = setup(&[
        0xD820, 0x0100, // cau r2, 0x100(r0)
        0xCB12, 0x0000, // ior r1, 0(r2)
    ]);
    install_handler(&mut bus, 8, 0x4000, 0, 0);
    cpu.regs.gpr[1] = 0x55;
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.gpr[2], 0x0100_0000);
    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), 0x4000);
    assert_eq!(cpu.regs.gpr[1], 0x55);
    assert_eq!(bus.read_count(AddressSpace::Io), 0);
}

#[test]
fn lowest_pending_level_wins_and_requests_stay_latched() {
    let (mut cpu, mut bus) = setup(&[0xA411]);
    install_handler(&mut bus, 1, 0x6000, 0x1000, 0x0040);
    install_handler(&mut bus, 2, 0x7000, 0x1000, 0);
    cpu.regs.scr[scr::ICS] = 3;

    cpu.set_input_line(2, LineState::Asserted);
    cpu.set_input_line(1, LineState::Asserted);
    let cycles = cpu.step(&mut bus);

    assert_eq!(cycles, 1);
    assert_eq!(cpu.pc(), 0x6000);
    assert_eq!(cpu.regs.scr[scr::CS], 0x0040, "levels below 7 reload CS");
    assert_eq!(cpu.regs.scr[scr::IRB], 0x4000 | 0x2000);
    assert_eq!(bus.peek_u32(AddressSpace::Program, block(1)), START);
    assert_eq!(bus.peek_u16(AddressSpace::Program, block(1) + 4), 3);

    cpu.set_input_line(1, LineState::Cleared);
    assert_eq!(cpu.regs.scr[scr::IRB], 0x2000);
}

#[test]
fn masked_or_low_priority_requests_are_not_taken() {
    let (mut cpu, mut bus) = setup(&[0xA411, 0xA422]);
    install_handler(&mut bus, 2, 0x7000, 0, 0);

    cpu.regs.scr[scr::ICS] = 0x1007;
    cpu.set_input_line(2, LineState::Asserted);
    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), START + 2);

    cpu.regs.scr[scr::ICS] = 0x0002;
    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), START + 4);
}

#[test]
fn interrupts_wait_for_the_delay_slot_to_finish() {
    let (mut cpu, mut bus) = setup(&[
        0x8B00, 0x2000, // balax 0x2000
        0xA437,         // lis r3, 7
    ]);
    install_handler(&mut bus, 0, 0x6000, 0x1000, 0);
    cpu.regs.scr[scr::ICS] = 7;

    cpu.step(&mut bus);
    cpu.set_input_line(0, LineState::Asserted);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.gpr[3], 7);
    assert_eq!(cpu.pc(), 0x2000);

    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), 0x6000);
    assert_eq!(bus.peek_u32(AddressSpace::Program, block(0)), 0x2000);
}

#[test]
fn exception_entry_follows_the_new_translate_bit() {
    let (mut cpu, mut bus) = setup(&[0xB600]);
    install_handler(&mut bus, 8, 0x4000, 0x0100, 0);
    cpu.step(&mut bus);
    assert!(cpu.translate_mode());

    let (mut cpu, mut bus) = setup(&[0xB600]);
    install_handler(&mut bus, 8, 0x4000, 0x0000, 0);
    cpu.regs.scr[scr::ICS] = 0x0100;
    cpu.step(&mut bus);
    assert!(!cpu.translate_mode());
}

#[test]
fn load_program_status_branches_and_replaces_status() {
    let (mut cpu, mut bus) = setup(&[
        0xD000, 0x0300, // lps 0x300(r0)
    ]);
    bus.write_u32(AddressSpace::Program, 0x300, 0x8000);
    bus.write_u16(AddressSpace::Program, 0x304, 0x0105);
    bus.write_u16(AddressSpace::Program, 0x306, 0x0020);
    cpu.regs.scr[scr::MPCS] = 0x1234_5678;

    let cycles = cpu.step(&mut bus);
    assert_eq!(cycles, 16);
    assert_eq!(cpu.pc(), 0x8000);
    assert_eq!(cpu.regs.scr[scr::ICS], 0x0105);
    assert_eq!(cpu.regs.scr[scr::CS], 0x0020);
    assert_eq!(cpu.regs.scr[scr::MPCS], 0x1234_0000);
    assert!(cpu.translate_mode());
}

#[test]
fn host_machine_check_is_taken_at_the_next_boundary() {
    let (mut cpu, mut bus) = setup(&[0xA411]);
    install_handler(&mut bus, 7, 0x7700, 0, 0x0040);
    cpu.regs.scr[scr::CS] = 0x10;
    cpu.signal_machine_check(0x0200);

    cpu.step(&mut bus);
    assert_eq!(cpu.pc(), 0x7700);
    assert_eq!(cpu.regs.scr[scr::MPCS], 0x0200);
    assert_eq!(cpu.regs.scr[scr::CS], 0x10, "CS is kept for level 7");
    assert_eq!(cpu.regs.gpr[1], 0);
}
