//! W65C02 extension opcodes: STZ, TRB/TSB, BBR/BBS, RMB/SMB, INC/DEC A,
//! transfer flag behavior, and the unassigned-opcode NOP rule.

use vermilion_core::cpu::{StatusFlag, W65C02};

mod common;
use common::TestBus;

fn flag(cpu: &W65C02, f: StatusFlag) -> bool {
    cpu.status & f as u8 != 0
}

fn timed_step(cpu: &mut W65C02, bus: &mut TestBus) -> u64 {
    let before = cpu.clock_ticks;
    cpu.step(bus);
    cpu.clock_ticks - before
}

#[test]
fn test_stz_variants() {
    let mut cpu = W65C02::new();
    let mut bus = TestBus::new();
    cpu.x = 0x02;
    bus.memory[0x0040] = 0xFF;
    bus.memory[0x0042] = 0xFF;
    bus.memory[0x2000] = 0xFF;
    bus.memory[0x2002] = 0xFF;
    bus.load(
        0,
        &[
            0x64, 0x40, // STZ $40
            0x74, 0x40, // STZ $40,X
            0x9C, 0x00, 0x20, // STZ $2000
            0x9E, 0x00, 0x20, // STZ $2000,X
        ],
    );
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(bus.memory[0x0040], 0x00);
    assert_eq!(bus.memory[0x0042], 0x00);
    assert_eq!(bus.memory[0x2000], 0x00);
    assert_eq!(bus.memory[0x2002], 0x00);
}

#[test]
fn test_trb_tsb() {
    let mut cpu = W65C02::new();
    let mut bus = TestBus::new();
    cpu.a = 0x0F;
    bus.memory[0x0040] = 0x3C;
    bus.load(0, &[0x14, 0x40, 0x04, 0x40]); // TRB $40 / TSB $40
    cpu.step(&mut bus);
    assert_eq!(bus.memory[0x0040], 0x30); // A's bits cleared
    assert!(!flag(&cpu, StatusFlag::Z)); // 0x3C & 0x0F != 0
    cpu.step(&mut bus);
    assert_eq!(bus.memory[0x0040], 0x3F); // A's bits set
    assert!(flag(&cpu, StatusFlag::Z)); // 0x30 & 0x0F == 0
}

#[test]
fn test_inc_dec_accumulator() {
    let mut cpu = W65C02::new();
    let mut bus = TestBus::new();
    cpu.a = 0xFF;
    bus.load(0, &[0x1A, 0x3A, 0x3A]); // INC A / DEC A / DEC A
    cpu.step(&mut bus);
    assert_eq!(cpu.a, 0x00);
    assert!(flag(&cpu, StatusFlag::Z));
    cpu.step(&mut bus);
    assert_eq!(cpu.a, 0xFF);
    assert!(flag(&cpu, StatusFlag::N));
    cpu.step(&mut bus);
    assert_eq!(cpu.a, 0xFE);
}

// =============================================================================
// RMB / SMB
// =============================================================================

#[test]
fn test_rmb_smb_each_bit() {
    for bit in 0..8u8 {
        let mut cpu = W65C02::new();
        let mut bus = TestBus::new();
        bus.memory[0x0030] = 0xFF;
        let rmb = 0x07 | bit << 4;
        let smb = 0x87 | bit << 4;
        bus.load(0, &[rmb, 0x30, smb, 0x30]);
        assert_eq!(timed_step(&mut cpu, &mut bus), 5);
        assert_eq!(bus.memory[0x0030], 0xFF & !(1 << bit), "RMB{bit}");
        cpu.step(&mut bus);
        assert_eq!(bus.memory[0x0030], 0xFF, "SMB{bit}");
    }
}

// =============================================================================
// BBR / BBS
// =============================================================================

#[test]
fn test_bbr_taken_when_bit_clear() {
    let mut cpu = W65C02::new();
    let mut bus = TestBus::new();
    bus.memory[0x0030] = 0b1111_1011;
    bus.load(0x0200, &[0x2F, 0x30, 0x10]); // BBR2 $30,+$10
    cpu.pc = 0x0200;
    cpu.step(&mut bus);
    assert_eq!(cpu.pc, 0x0213); // 0x0203 + 0x10
}

#[test]
fn test_bbr_not_taken_when_bit_set() {
    let mut cpu = W65C02::new();
    let mut bus = TestBus::new();
    bus.memory[0x0030] = 0b0000_0100;
    bus.load(0x0200, &[0x2F, 0x30, 0x10]); // BBR2 $30,+$10
    cpu.pc = 0x0200;
    cpu.step(&mut bus);
    assert_eq!(cpu.pc, 0x0203);
}

#[test]
fn test_bbs_taken_when_bit_set() {
    let mut cpu = W65C02::new();
    let mut bus = TestBus::new();
    bus.memory[0x0030] = 0x80;
    bus.load(0x0200, &[0xFF, 0x30, 0xF0]); // BBS7 $30,-$10
    cpu.pc = 0x0200;
    cpu.step(&mut bus);
    assert_eq!(cpu.pc, 0x01F3); // 0x0203 - 0x10
}

#[test]
fn test_bbs_leaves_flags_alone() {
    let mut cpu = W65C02::new();
    let mut bus = TestBus::new();
    cpu.status = 0x24;
    bus.memory[0x0030] = 0x01;
    bus.load(0x0200, &[0x8F, 0x30, 0x04]); // BBS0 $30,+4
    cpu.pc = 0x0200;
    cpu.step(&mut bus);
    assert_eq!(cpu.status, 0x24);
}

// =============================================================================
// Transfers set flags from the destination register
// =============================================================================

#[test]
fn test_tay_flags_follow_y() {
    let mut cpu = W65C02::new();
    let mut bus = TestBus::new();
    cpu.a = 0x00;
    cpu.x = 0x80; // must not leak into TAY's flags
    bus.load(0, &[0xA8]); // TAY
    cpu.step(&mut bus);
    assert_eq!(cpu.y, 0x00);
    assert!(flag(&cpu, StatusFlag::Z));
    assert!(!flag(&cpu, StatusFlag::N));
}

#[test]
fn test_tax_flags_follow_x() {
    let mut cpu = W65C02::new();
    let mut bus = TestBus::new();
    cpu.a = 0x80;
    bus.load(0, &[0xAA]); // TAX
    cpu.step(&mut bus);
    assert_eq!(cpu.x, 0x80);
    assert!(flag(&cpu, StatusFlag::N));
}

// =============================================================================
// Unassigned opcodes
// =============================================================================

#[test]
fn test_unassigned_opcodes_are_two_tick_nops() {
    // A sample of holes in the W65C02 map.
    for opcode in [0x02u8, 0x22, 0x42, 0x62, 0x44, 0x54, 0xDB, 0xFC] {
        let mut cpu = W65C02::new();
        let mut bus = TestBus::new();
        bus.load(0x0200, &[opcode]);
        cpu.pc = 0x0200;
        let before = cpu.snapshot();
        assert_eq!(timed_step(&mut cpu, &mut bus), 2, "opcode {opcode:02X}");
        assert_eq!(cpu.pc, 0x0201);
        assert_eq!(cpu.a, before.a);
        assert_eq!(cpu.status, before.status);
    }
}
