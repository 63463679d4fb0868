use vermilion_core::cpu::{StatusFlag, W65C02};

mod common;
use common::TestBus;

fn timed_step(cpu: &mut W65C02, bus: &mut TestBus) -> u64 {
    let before = cpu.clock_ticks;
    cpu.step(bus);
    cpu.clock_ticks - before
}

#[test]
fn test_branch_not_taken_two_ticks() {
    let mut cpu = W65C02::new();
    let mut bus = TestBus::new();
    cpu.status |= StatusFlag::Z as u8;
    bus.load(0, &[0xD0, 0x05]); // BNE +5, Z=1 so not taken
    assert_eq!(timed_step(&mut cpu, &mut bus), 2);
    assert_eq!(cpu.pc, 2);
}

#[test]
fn test_branch_taken_same_page_three_ticks() {
    let mut cpu = W65C02::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0xD0, 0x05]); // BNE +5, Z=0 so taken
    assert_eq!(timed_step(&mut cpu, &mut bus), 3);
    assert_eq!(cpu.pc, 7);
}

/// BEQ +0x10 at 0x00F0 with Z=1: target 0x0102, cost 5 (3 + 2 page cross).
#[test]
fn test_branch_taken_page_cross_five_ticks() {
    let mut cpu = W65C02::new();
    let mut bus = TestBus::new();
    cpu.status |= StatusFlag::Z as u8;
    bus.load(0x00F0, &[0xF0, 0x10]); // BEQ +$10
    cpu.pc = 0x00F0;
    assert_eq!(timed_step(&mut cpu, &mut bus), 5);
    assert_eq!(cpu.pc, 0x0102);
}

#[test]
fn test_branch_backward() {
    let mut cpu = W65C02::new();
    let mut bus = TestBus::new();
    bus.load(0x0210, &[0xD0, 0xFC]); // BNE -4
    cpu.pc = 0x0210;
    cpu.step(&mut bus);
    assert_eq!(cpu.pc, 0x020E);
}

#[test]
fn test_bra_always_taken() {
    let mut cpu = W65C02::new();
    let mut bus = TestBus::new();
    cpu.status |= StatusFlag::Z as u8; // no condition consulted
    bus.load(0, &[0x80, 0x10]); // BRA +$10
    assert_eq!(timed_step(&mut cpu, &mut bus), 3);
    assert_eq!(cpu.pc, 0x12);
}

#[test]
fn test_conditional_branch_matrix() {
    // (opcode, flag, branches_when_set)
    let cases: &[(u8, StatusFlag, bool)] = &[
        (0x10, StatusFlag::N, false), // BPL
        (0x30, StatusFlag::N, true),  // BMI
        (0x50, StatusFlag::V, false), // BVC
        (0x70, StatusFlag::V, true),  // BVS
        (0x90, StatusFlag::C, false), // BCC
        (0xB0, StatusFlag::C, true),  // BCS
        (0xD0, StatusFlag::Z, false), // BNE
        (0xF0, StatusFlag::Z, true),  // BEQ
    ];
    for &(opcode, flag, on_set) in cases {
        for set in [false, true] {
            let mut cpu = W65C02::new();
            let mut bus = TestBus::new();
            cpu.status = 0x20 | if set { flag as u8 } else { 0 };
            bus.load(0x0200, &[opcode, 0x08]);
            cpu.pc = 0x0200;
            cpu.step(&mut bus);
            let taken = set == on_set;
            let expected = if taken { 0x020A } else { 0x0202 };
            assert_eq!(cpu.pc, expected, "opcode {opcode:02X} set={set}");
        }
    }
}

// =============================================================================
// JMP / JSR / RTS
// =============================================================================

#[test]
fn test_jmp_absolute() {
    let mut cpu = W65C02::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0x4C, 0x34, 0x12]); // JMP $1234
    assert_eq!(timed_step(&mut cpu, &mut bus), 3);
    assert_eq!(cpu.pc, 0x1234);
}

#[test]
fn test_jsr_rts_round_trip() {
    let mut cpu = W65C02::new();
    let mut bus = TestBus::new();
    bus.load(0x0200, &[0x20, 0x00, 0x10]); // JSR $1000
    bus.load(0x1000, &[0x60]); // RTS
    cpu.pc = 0x0200;

    assert_eq!(timed_step(&mut cpu, &mut bus), 6);
    assert_eq!(cpu.pc, 0x1000);
    assert_eq!(cpu.sp, 0xFB);
    // Pushed return address is the last operand byte.
    assert_eq!(bus.memory[0x01FD], 0x02);
    assert_eq!(bus.memory[0x01FC], 0x02);

    assert_eq!(timed_step(&mut cpu, &mut bus), 6);
    assert_eq!(cpu.pc, 0x0203);
    assert_eq!(cpu.sp, 0xFD);
}
