//! Reset values, introspection paths and save states.

use emu_core::{
    AddressSpace, Cpu, CycleBudget, LineState, MemoryBus, Observable, StateError, Value,
};
use ti_tms32025::{CLK, Model, OnChipRam, Tms32025, Tms32025State};

fn setup(model: Model, program: &[u16]) -> (Tms32025, MemoryBus) {
    let mut bus = MemoryBus::new();
    bus.load_words(AddressSpace::Program, 0, program);
    let mut cpu = Tms32025::new(model);
    cpu.reset(&mut bus);
    (cpu, bus)
}

#[test]
fn reset_restores_documented_values() {
    let (mut cpu, mut bus) = setup(Model::Tms32025, &[0xCE05, 0xCE0C, 0xCB07]); // cnfp; rxf; rptk 7
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    cpu.regs.acc = 0x1234_5678;
    cpu.regs.ifr = 0x3F;
    cpu.poke("tim", Value::U16(3)).unwrap();

    cpu.reset(&mut bus);
    assert_eq!(cpu.pc(), 0);
    assert_eq!(cpu.status().st0(), 0x0600);
    assert_eq!(cpu.status().st1(), 0x07F0);
    assert_eq!(cpu.regs.acc, 0);
    assert_eq!(cpu.regs.ifr, 0);
    assert_eq!(cpu.regs.rptc, 0);
    assert!(!cpu.ram().is_program(0));
    assert!(cpu.xf());
    assert_eq!(cpu.query("tim"), Some(Value::U16(0xFFFF)));
    assert_eq!(cpu.query("prd"), Some(Value::U16(0xFFFF)));
    assert_eq!(cpu.query("imr"), Some(Value::U16(0xFFC0)));
    assert_eq!(cpu.query("greg"), Some(Value::U16(0)));
}

#[test]
fn flag_string_renders_both_status_words() {
    let (mut cpu, mut bus) = setup(Model::Tms32025, &[0x558B, 0xCE03]); // larp 3; sovm
    assert_eq!(cpu.flags_string(), "arp0...Idp000  arb0D.SC..HFX.ipm0");
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(cpu.flags_string(), "arp3.M.Idp000  arb0D.SC..HFX.ipm0");
}

#[test]
fn tms32026_leaves_cnf1_writable() {
    let (cpu, _) = setup(Model::Tms32026, &[]);
    assert_eq!(cpu.status().st1(), 0x0770);
    assert_eq!(cpu.query("flags.cnf1"), Some(Value::Bool(false)));
    assert_eq!(cpu.flags_string(), "arp0...Idp000  arb0D.SC.?HFX.ipm0");
}

#[test]
fn every_listed_path_answers() {
    let (cpu, _) = setup(Model::Tms32025, &[]);
    for path in cpu.query_paths() {
        assert!(cpu.query(path).is_some(), "{path}");
    }
    assert_eq!(cpu.query("ar8"), None);
    assert_eq!(cpu.query("nope"), None);
}

#[test]
fn pokes_are_checked() {
    let (mut cpu, _) = setup(Model::Tms32025, &[]);

    cpu.poke("ar5", Value::U16(0x4321)).unwrap();
    assert_eq!(cpu.regs.ar[5], 0x4321);
    cpu.poke("acc", Value::U32(0xDEAD_BEEF)).unwrap();
    assert_eq!(cpu.query("acc"), Some(Value::U32(0xDEAD_BEEF)));
    cpu.poke("flags.tc", Value::Bool(true)).unwrap();
    assert!(cpu.status().tc());
    cpu.poke("arp", Value::U8(6)).unwrap();
    assert_eq!(cpu.status().arp(), 6);

    assert!(matches!(
        cpu.poke("ar5", Value::U32(0x1_0000)),
        Err(StateError::TypeMismatch { .. })
    ));
    assert!(matches!(
        cpu.poke("arp", Value::U8(8)),
        Err(StateError::TypeMismatch { .. })
    ));
    assert_eq!(
        cpu.poke("cycles", Value::U64(0)),
        Err(StateError::ReadOnly("cycles".to_string()))
    );
    assert_eq!(
        cpu.poke("flags.cnf0", Value::Bool(true)),
        Err(StateError::ReadOnly("flags.cnf0".to_string()))
    );
    assert_eq!(
        cpu.poke("flags.zz", Value::Bool(true)),
        Err(StateError::UnknownPath("flags.zz".to_string()))
    );
    assert_eq!(
        cpu.poke("xyz", Value::U8(0)),
        Err(StateError::UnknownPath("xyz".to_string()))
    );
}

#[test]
fn status_pokes_keep_the_fixed_bits() {
    let (mut cpu, _) = setup(Model::Tms32025, &[]);
    cpu.poke("st0", Value::U16(0)).unwrap();
    cpu.poke("st1", Value::U16(0)).unwrap();
    assert_eq!(cpu.status().st0(), 0x0400);
    assert_eq!(cpu.status().st1(), 0x0180);
}

#[test]
fn repeating_is_observable_only_inside_a_step() {
    let (mut cpu, mut bus) = setup(Model::Tms32025, &[0xCB02, 0xCC01]);
    cpu.step(&mut bus);
    assert_eq!(cpu.query("repeating"), Some(Value::Bool(false)));
    assert_eq!(cpu.query("rptc"), Some(Value::U8(0)));
}

#[test]
fn snapshot_round_trips_through_json() {
    let (mut cpu, mut bus) = setup(
        Model::Tms32025,
        &[
            0xCA2A, // lack 42
            0x6070, // sacl 0x70
            0xCE05, // cnfp
            0xCE1F, // idle
        ],
    );
    cpu.ram_mut().poke_data(0x0210, 0x5555);
    for _ in 0..4 {
        cpu.step(&mut bus);
    }
    let state = cpu.snapshot();

    let json = serde_json::to_string(&state).unwrap();
    let back: Tms32025State = serde_json::from_str(&json).unwrap();
    assert_eq!(back, state);

    let mut other = Tms32025::new(Model::Tms32026);
    other.restore(&back).unwrap();
    assert_eq!(other.model(), Model::Tms32025);
    assert_eq!(other.regs, cpu.regs);
    assert!(other.is_idle());
    assert_eq!(other.ram().data(0x70), Some(42));
    assert_eq!(other.ram().program(0xFF10), Some(0x5555));
    assert_eq!(other.snapshot(), state);
}

#[test]
fn second_reset_matches_a_fresh_core() {
    for (model, program) in [
        (Model::Tms32025, [0xCE05, 0xCE0C, 0x558B, 0xC805]), // cnfp; rxf; larp 3; ldpk 5
        (Model::Tms32026, [0xCE3F, 0xCE0C, 0x558B, 0xC805]), // conf 3; rxf; larp 3; ldpk 5
    ] {
        let (mut cpu, mut bus) = setup(model, &program);
        for _ in 0..program.len() {
            cpu.step(&mut bus);
        }
        cpu.poke("rptc", Value::U8(5)).unwrap();
        cpu.poke("tim", Value::U16(7)).unwrap();
        assert!(!cpu.xf());

        cpu.reset(&mut bus);
        cpu.reset(&mut bus);

        let (fresh, _) = setup(model, &[]);
        assert_eq!(cpu.regs, fresh.regs, "{model}");
        assert_eq!(cpu.status(), fresh.status(), "{model}");
        assert_eq!(cpu.flow(), fresh.flow(), "{model}");
        assert_eq!(cpu.is_idle(), fresh.is_idle(), "{model}");
        assert_eq!(cpu.xf(), fresh.xf(), "{model}");
        for index in 0..model.capabilities().blocks.len() {
            assert_eq!(
                cpu.ram().is_program(index),
                fresh.ram().is_program(index),
                "{model} block {index}"
            );
        }
        for path in ["tim", "prd", "imr", "greg", "drr", "dxr"] {
            assert_eq!(cpu.query(path), fresh.query(path), "{model} {path}");
        }
    }
}

#[test]
fn restore_refuses_an_impossible_timer_phase() {
    let (mut cpu, mut bus) = setup(Model::Tms32025, &[0xCA2A]); // lack 42
    let mut state = cpu.snapshot();
    state.timer_phase = 9;
    let json = serde_json::to_string(&state).unwrap();
    let state: Tms32025State = serde_json::from_str(&json).unwrap();

    assert!(matches!(
        cpu.restore(&state),
        Err(StateError::TypeMismatch { .. })
    ));
    assert_eq!(cpu.snapshot().timer_phase, 0);

    let mut budget = CycleBudget::new(i64::from(CLK));
    cpu.run(&mut bus, &mut budget);
    assert_eq!(cpu.regs.acc, 42);
}

#[test]
fn restore_refuses_ram_shaped_for_another_model() {
    let (mut cpu, _) = setup(Model::Tms32025, &[]);
    let mut state = cpu.snapshot();
    state.ram = OnChipRam::new(Model::Tms32026);

    assert!(cpu.restore(&state).is_err());
    assert_eq!(cpu.model(), Model::Tms32025);
    assert_eq!(cpu.snapshot(), Tms32025::new(Model::Tms32025).snapshot());
}

#[test]
fn status_poke_leaves_the_ram_layout_bits_alone() {
    let (mut cpu, mut bus) = setup(Model::Tms32025, &[0xCE05, 0xCE04]); // cnfp; cnfd
    cpu.poke("st1", Value::U16(0xFFFF)).unwrap();
    assert!(!cpu.status().cnf0());
    assert!(cpu.status().tc());

    cpu.step(&mut bus);
    assert!(cpu.status().cnf0());
    assert!(cpu.ram().is_program(0));

    cpu.poke("st1", Value::U16(0)).unwrap();
    assert!(cpu.status().cnf0());
    cpu.step(&mut bus);
    assert!(!cpu.ram().is_program(0));
}

#[test]
fn restored_core_remembers_an_off_chip_access_for_hold() {
    let (mut cpu, mut bus) = setup(
        Model::Tms32025,
        &[
            0xCE38, // rhm
            0xD000, 0x1000, // lrlk ar0, 0x1000
            0x2080, // lac *
            0x5500, // nop
        ],
    );
    for _ in 0..3 {
        cpu.step(&mut bus);
    }
    let state = cpu.snapshot();
    assert!(state.external_access);

    let mut other = Tms32025::new(Model::Tms32025);
    other.restore(&state).unwrap();
    other.set_hold(LineState::Asserted);
    let mut budget = CycleBudget::new(100);
    other.run(&mut bus, &mut budget);

    assert!(other.hold_acknowledged());
    assert_eq!(other.regs.pc, 4);
}
