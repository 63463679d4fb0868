use super::{StatusFlag, W65C02, page_crossed};
use crate::core::Bus;

const VECTOR_BRK: u16 = 0xFFFE;

impl W65C02 {
    /// Conditional branch. Timing: 2 ticks not taken; 3 taken; +2 more when
    /// the target is on a different page than the post-operand PC.
    pub(crate) fn op_branch<B: Bus + ?Sized>(&mut self, bus: &mut B, taken: bool) {
        let target = self.rel(bus);
        if taken {
            self.clock_ticks += 3 + if page_crossed(self.pc, target) { 2 } else { 0 };
            self.pc = target;
        } else {
            self.clock_ticks += 2;
        }
    }

    /// JSR: the pushed return address is the last byte of the operand
    /// (RTS adds one on the way back).
    pub(crate) fn op_jsr<B: Bus + ?Sized>(&mut self, bus: &mut B, addr: u16) {
        let ret = self.pc.wrapping_sub(1);
        self.push16(bus, ret);
        self.pc = addr;
    }

    pub(crate) fn op_rts<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.pc = self.pull16(bus).wrapping_add(1);
    }

    /// RTI: the B bit only exists on the stack image, never in P itself.
    pub(crate) fn op_rti<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.status = (self.pull8(bus) | StatusFlag::U as u8) & !(StatusFlag::B as u8);
        self.pc = self.pull16(bus);
    }

    /// BRK: pushes PC+1 (a one-byte padding slot follows the opcode),
    /// pushes status with B set, sets I, clears D (65C02 change), and jumps
    /// through the IRQ/BRK vector.
    pub(crate) fn op_brk<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let ret = self.pc.wrapping_add(1);
        self.push16(bus, ret);
        self.push8(bus, self.status | StatusFlag::B as u8);
        self.set_flag(StatusFlag::I, true);
        self.set_flag(StatusFlag::D, false);
        let lo = bus.read(VECTOR_BRK) as u16;
        let hi = bus.read(VECTOR_BRK + 1) as u16;
        self.pc = hi << 8 | lo;
    }
}
