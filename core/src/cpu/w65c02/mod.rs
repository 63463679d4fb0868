mod alu;
mod bits;
mod branch;
mod load_store;
mod shift;
mod stack;
mod unary;

use crate::core::{Bus, bus::InterruptState};
use crate::cpu::state::W65C02State;

#[repr(u8)]
#[derive(Copy, Clone, Debug)]
pub enum StatusFlag {
    C = 0x01, // Carry
    Z = 0x02, // Zero
    I = 0x04, // Interrupt Disable
    D = 0x08, // Decimal
    B = 0x10, // Break
    U = 0x20, // Unused (always 1)
    V = 0x40, // Overflow
    N = 0x80, // Negative
}

const STACK_BASE: u16 = 0x0100;

const VECTOR_NMI: u16 = 0xFFFA;
const VECTOR_RESET: u16 = 0xFFFC;
const VECTOR_IRQ: u16 = 0xFFFE;

/// W65C02 interpreter.
///
/// Whole-instruction execution with per-opcode tick costs from the W65C02
/// reference table. `exec` advances until a caller-supplied tick budget is
/// met; `step` executes exactly one instruction. The core never faults:
/// opcodes the W65C02 leaves unassigned execute as 2-tick NOPs.
pub struct W65C02 {
    // Registers
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub pc: u16,
    pub sp: u8,
    pub status: u8,

    /// Wait-for-interrupt latch (WAI). While set, `step`/`exec` consume
    /// ticks without fetching; cleared by any serviced interrupt.
    pub wai: bool,

    /// Effective-address scratch, written only by the zp-relative
    /// bit-branch modes (BBRx/BBSx).
    pub(crate) ea: u16,

    // Monotonic counters. Survive `reset`.
    pub clock_ticks: u64,
    pub instructions: u64,

    /// Target tick count for the current `exec` budget.
    clock_goal: u64,

    /// Previous NMI line state for edge detection.
    nmi_previous: bool,
}

impl Default for W65C02 {
    fn default() -> Self {
        Self::new()
    }
}

impl W65C02 {
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            sp: 0xFD,
            status: 0x24, // I=1, U=1
            wai: false,
            ea: 0,
            clock_ticks: 0,
            instructions: 0,
            clock_goal: 0,
            nmi_previous: false,
        }
    }

    #[inline]
    pub(crate) fn set_flag(&mut self, flag: StatusFlag, set: bool) {
        if set {
            self.status |= flag as u8;
        } else {
            self.status &= !(flag as u8);
        }
    }

    #[inline]
    pub(crate) fn flag(&self, flag: StatusFlag) -> bool {
        self.status & flag as u8 != 0
    }

    pub fn snapshot(&self) -> W65C02State {
        W65C02State {
            a: self.a,
            x: self.x,
            y: self.y,
            pc: self.pc,
            sp: self.sp,
            status: self.status,
        }
    }

    // ---- Fetch helpers ----

    #[inline]
    fn read8<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    #[inline]
    fn read16<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let lo = self.read8(bus) as u16;
        let hi = self.read8(bus) as u16;
        hi << 8 | lo
    }

    // ---- Addressing modes ----
    //
    // Modes that can incur a page-crossing penalty take a `penalty` flag
    // set per-opcode and bump the tick counter themselves.

    /// Immediate: operand is at PC.
    #[inline]
    fn imm(&mut self) -> u16 {
        let addr = self.pc;
        self.pc = self.pc.wrapping_add(1);
        addr
    }

    /// Zero page.
    #[inline]
    fn zp<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        self.read8(bus) as u16
    }

    /// Zero page,X (wraps within page 0).
    #[inline]
    fn zp_x<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        self.read8(bus).wrapping_add(self.x) as u16
    }

    /// Zero page,Y (wraps within page 0).
    #[inline]
    fn zp_y<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        self.read8(bus).wrapping_add(self.y) as u16
    }

    /// Absolute.
    #[inline]
    fn abs<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        self.read16(bus)
    }

    /// Absolute,X.
    #[inline]
    fn abs_x<B: Bus + ?Sized>(&mut self, bus: &mut B, penalty: bool) -> u16 {
        let base = self.read16(bus);
        let addr = base.wrapping_add(self.x as u16);
        if penalty && page_crossed(base, addr) {
            self.clock_ticks += 1;
        }
        addr
    }

    /// Absolute,Y.
    #[inline]
    fn abs_y<B: Bus + ?Sized>(&mut self, bus: &mut B, penalty: bool) -> u16 {
        let base = self.read16(bus);
        let addr = base.wrapping_add(self.y as u16);
        if penalty && page_crossed(base, addr) {
            self.clock_ticks += 1;
        }
        addr
    }

    /// (Absolute indirect), JMP only. The W65C02 fixes the NMOS bug where a
    /// pointer at $xxFF read its high byte from $xx00.
    #[inline]
    fn ind<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let ptr = self.read16(bus);
        let lo = bus.read(ptr) as u16;
        let hi = bus.read(ptr.wrapping_add(1)) as u16;
        hi << 8 | lo
    }

    /// (Zero page,X) indirect, pointer wraps within page 0.
    #[inline]
    fn ind_x<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let ptr = self.read8(bus).wrapping_add(self.x);
        let lo = bus.read(ptr as u16) as u16;
        let hi = bus.read(ptr.wrapping_add(1) as u16) as u16;
        hi << 8 | lo
    }

    /// (Zero page) indirect,Y.
    #[inline]
    fn ind_y<B: Bus + ?Sized>(&mut self, bus: &mut B, penalty: bool) -> u16 {
        let ptr = self.read8(bus);
        let lo = bus.read(ptr as u16) as u16;
        let hi = bus.read(ptr.wrapping_add(1) as u16) as u16;
        let base = hi << 8 | lo;
        let addr = base.wrapping_add(self.y as u16);
        if penalty && page_crossed(base, addr) {
            self.clock_ticks += 1;
        }
        addr
    }

    /// (Zero page) indirect, no index. W65C02 addition.
    #[inline]
    fn ind0<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let ptr = self.read8(bus);
        let lo = bus.read(ptr as u16) as u16;
        let hi = bus.read(ptr.wrapping_add(1) as u16) as u16;
        hi << 8 | lo
    }

    /// Relative: target of a branch, PC-relative after the operand fetch.
    #[inline]
    fn rel<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let offset = self.read8(bus) as i8;
        self.pc.wrapping_add(offset as u16)
    }

    /// (Absolute,X) indirect, JMP only. W65C02 addition.
    #[inline]
    fn ainx<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let ptr = self.read16(bus).wrapping_add(self.x as u16);
        let lo = bus.read(ptr) as u16;
        let hi = bus.read(ptr.wrapping_add(1)) as u16;
        hi << 8 | lo
    }

    /// Zero page + relative, for BBRx/BBSx. Returns the zero-page address
    /// of the tested byte and stores the branch target in `ea`.
    #[inline]
    fn zprel<B: Bus + ?Sized>(&mut self, bus: &mut B, penalty: bool) -> u16 {
        let value_addr = self.read8(bus) as u16;
        let offset = self.read8(bus) as i8;
        self.ea = self.pc.wrapping_add(offset as u16);
        if penalty && page_crossed(self.pc, self.ea) {
            self.clock_ticks += 1;
        }
        value_addr
    }

    // ---- Interrupt entry points ----

    pub fn reset<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let lo = bus.read(VECTOR_RESET) as u16;
        let hi = bus.read(VECTOR_RESET + 1) as u16;
        self.pc = hi << 8 | lo;
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = 0xFD;
        self.wai = false;
        self.status |= StatusFlag::U as u8;
        self.clock_goal = self.clock_ticks;
    }

    pub fn nmi<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.push16(bus, self.pc);
        self.push8(bus, self.status);
        self.set_flag(StatusFlag::I, true);
        let lo = bus.read(VECTOR_NMI) as u16;
        let hi = bus.read(VECTOR_NMI + 1) as u16;
        self.pc = hi << 8 | lo;
        self.wai = false;
    }

    pub fn irq<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        self.push16(bus, self.pc);
        self.push8(bus, self.status & !(StatusFlag::B as u8));
        self.set_flag(StatusFlag::I, true);
        let lo = bus.read(VECTOR_IRQ) as u16;
        let hi = bus.read(VECTOR_IRQ + 1) as u16;
        self.pc = hi << 8 | lo;
        self.wai = false;
    }

    /// Sample the bus interrupt lines and service what is pending. NMI is
    /// edge-triggered; IRQ is level-triggered and masked by the I flag.
    pub fn poll_interrupts<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let ints = bus.check_interrupts();
        let nmi_edge = ints.nmi && !self.nmi_previous;
        self.nmi_previous = ints.nmi;
        if nmi_edge {
            self.nmi(bus);
            return;
        }
        if ints.irq && !self.flag(StatusFlag::I) {
            self.irq(bus);
        }
    }

    /// Service an already-sampled interrupt state (for schedulers that
    /// latch the lines themselves).
    pub fn service_interrupts<B: Bus + ?Sized>(&mut self, bus: &mut B, ints: InterruptState) {
        let nmi_edge = ints.nmi && !self.nmi_previous;
        self.nmi_previous = ints.nmi;
        if nmi_edge {
            self.nmi(bus);
            return;
        }
        if ints.irq && !self.flag(StatusFlag::I) {
            self.irq(bus);
        }
    }

    // ---- Execution ----

    /// Execute a single instruction. While the WAI latch is set this
    /// consumes one tick without fetching.
    pub fn step<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        if self.wai {
            self.clock_ticks += 1;
            self.clock_goal = self.clock_ticks;
            return;
        }
        let opcode = self.read8(bus);
        self.dispatch(opcode, bus);
        self.clock_goal = self.clock_ticks;
        self.instructions += 1;
    }

    /// Execute instructions until `tickcount` more ticks have elapsed.
    /// The budget accumulates: an instruction that overshoots the goal
    /// shortens the next call's budget.
    pub fn exec<B: Bus + ?Sized>(&mut self, bus: &mut B, tickcount: u64) {
        if self.wai {
            self.clock_ticks += tickcount;
            self.clock_goal = self.clock_ticks;
            return;
        }

        self.clock_goal += tickcount;

        while self.clock_ticks < self.clock_goal {
            if self.wai {
                self.poll_interrupts(bus);
                if self.wai {
                    self.clock_ticks = self.clock_goal;
                    break;
                }
            }
            let opcode = self.read8(bus);
            self.dispatch(opcode, bus);
            self.instructions += 1;
            self.poll_interrupts(bus);
        }
    }

    fn dispatch<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) {
        match opcode {
            // --- ADC ---
            0x69 => { let addr = self.imm(); self.op_adc(bus, addr); self.clock_ticks += 2; }
            0x65 => { let addr = self.zp(bus); self.op_adc(bus, addr); self.clock_ticks += 3; }
            0x75 => { let addr = self.zp_x(bus); self.op_adc(bus, addr); self.clock_ticks += 4; }
            0x6D => { let addr = self.abs(bus); self.op_adc(bus, addr); self.clock_ticks += 4; }
            0x7D => { let addr = self.abs_x(bus, true); self.op_adc(bus, addr); self.clock_ticks += 4; }
            0x79 => { let addr = self.abs_y(bus, true); self.op_adc(bus, addr); self.clock_ticks += 4; }
            0x61 => { let addr = self.ind_x(bus); self.op_adc(bus, addr); self.clock_ticks += 6; }
            0x71 => { let addr = self.ind_y(bus, true); self.op_adc(bus, addr); self.clock_ticks += 5; }
            0x72 => { let addr = self.ind0(bus); self.op_adc(bus, addr); self.clock_ticks += 5; }

            // --- SBC ---
            0xE9 => { let addr = self.imm(); self.op_sbc(bus, addr); self.clock_ticks += 2; }
            0xE5 => { let addr = self.zp(bus); self.op_sbc(bus, addr); self.clock_ticks += 3; }
            0xF5 => { let addr = self.zp_x(bus); self.op_sbc(bus, addr); self.clock_ticks += 4; }
            0xED => { let addr = self.abs(bus); self.op_sbc(bus, addr); self.clock_ticks += 4; }
            0xFD => { let addr = self.abs_x(bus, true); self.op_sbc(bus, addr); self.clock_ticks += 4; }
            0xF9 => { let addr = self.abs_y(bus, true); self.op_sbc(bus, addr); self.clock_ticks += 4; }
            0xE1 => { let addr = self.ind_x(bus); self.op_sbc(bus, addr); self.clock_ticks += 6; }
            0xF1 => { let addr = self.ind_y(bus, true); self.op_sbc(bus, addr); self.clock_ticks += 5; }
            0xF2 => { let addr = self.ind0(bus); self.op_sbc(bus, addr); self.clock_ticks += 5; }

            // --- AND ---
            0x29 => { let addr = self.imm(); self.op_and(bus, addr); self.clock_ticks += 2; }
            0x25 => { let addr = self.zp(bus); self.op_and(bus, addr); self.clock_ticks += 3; }
            0x35 => { let addr = self.zp_x(bus); self.op_and(bus, addr); self.clock_ticks += 4; }
            0x2D => { let addr = self.abs(bus); self.op_and(bus, addr); self.clock_ticks += 4; }
            0x3D => { let addr = self.abs_x(bus, true); self.op_and(bus, addr); self.clock_ticks += 4; }
            0x39 => { let addr = self.abs_y(bus, true); self.op_and(bus, addr); self.clock_ticks += 4; }
            0x21 => { let addr = self.ind_x(bus); self.op_and(bus, addr); self.clock_ticks += 6; }
            0x31 => { let addr = self.ind_y(bus, true); self.op_and(bus, addr); self.clock_ticks += 5; }
            0x32 => { let addr = self.ind0(bus); self.op_and(bus, addr); self.clock_ticks += 5; }

            // --- ORA ---
            0x09 => { let addr = self.imm(); self.op_ora(bus, addr); self.clock_ticks += 2; }
            0x05 => { let addr = self.zp(bus); self.op_ora(bus, addr); self.clock_ticks += 3; }
            0x15 => { let addr = self.zp_x(bus); self.op_ora(bus, addr); self.clock_ticks += 4; }
            0x0D => { let addr = self.abs(bus); self.op_ora(bus, addr); self.clock_ticks += 4; }
            0x1D => { let addr = self.abs_x(bus, true); self.op_ora(bus, addr); self.clock_ticks += 4; }
            0x19 => { let addr = self.abs_y(bus, true); self.op_ora(bus, addr); self.clock_ticks += 4; }
            0x01 => { let addr = self.ind_x(bus); self.op_ora(bus, addr); self.clock_ticks += 6; }
            0x11 => { let addr = self.ind_y(bus, true); self.op_ora(bus, addr); self.clock_ticks += 5; }
            0x12 => { let addr = self.ind0(bus); self.op_ora(bus, addr); self.clock_ticks += 5; }

            // --- EOR ---
            0x49 => { let addr = self.imm(); self.op_eor(bus, addr); self.clock_ticks += 2; }
            0x45 => { let addr = self.zp(bus); self.op_eor(bus, addr); self.clock_ticks += 3; }
            0x55 => { let addr = self.zp_x(bus); self.op_eor(bus, addr); self.clock_ticks += 4; }
            0x4D => { let addr = self.abs(bus); self.op_eor(bus, addr); self.clock_ticks += 4; }
            0x5D => { let addr = self.abs_x(bus, true); self.op_eor(bus, addr); self.clock_ticks += 4; }
            0x59 => { let addr = self.abs_y(bus, true); self.op_eor(bus, addr); self.clock_ticks += 4; }
            0x41 => { let addr = self.ind_x(bus); self.op_eor(bus, addr); self.clock_ticks += 6; }
            0x51 => { let addr = self.ind_y(bus, true); self.op_eor(bus, addr); self.clock_ticks += 5; }
            0x52 => { let addr = self.ind0(bus); self.op_eor(bus, addr); self.clock_ticks += 5; }

            // --- CMP ---
            0xC9 => { let addr = self.imm(); self.op_cmp(bus, addr); self.clock_ticks += 2; }
            0xC5 => { let addr = self.zp(bus); self.op_cmp(bus, addr); self.clock_ticks += 3; }
            0xD5 => { let addr = self.zp_x(bus); self.op_cmp(bus, addr); self.clock_ticks += 4; }
            0xCD => { let addr = self.abs(bus); self.op_cmp(bus, addr); self.clock_ticks += 4; }
            0xDD => { let addr = self.abs_x(bus, true); self.op_cmp(bus, addr); self.clock_ticks += 4; }
            0xD9 => { let addr = self.abs_y(bus, true); self.op_cmp(bus, addr); self.clock_ticks += 4; }
            0xC1 => { let addr = self.ind_x(bus); self.op_cmp(bus, addr); self.clock_ticks += 6; }
            0xD1 => { let addr = self.ind_y(bus, true); self.op_cmp(bus, addr); self.clock_ticks += 5; }
            0xD2 => { let addr = self.ind0(bus); self.op_cmp(bus, addr); self.clock_ticks += 5; }

            // --- CPX / CPY ---
            0xE0 => { let addr = self.imm(); self.op_cpx(bus, addr); self.clock_ticks += 2; }
            0xE4 => { let addr = self.zp(bus); self.op_cpx(bus, addr); self.clock_ticks += 3; }
            0xEC => { let addr = self.abs(bus); self.op_cpx(bus, addr); self.clock_ticks += 4; }
            0xC0 => { let addr = self.imm(); self.op_cpy(bus, addr); self.clock_ticks += 2; }
            0xC4 => { let addr = self.zp(bus); self.op_cpy(bus, addr); self.clock_ticks += 3; }
            0xCC => { let addr = self.abs(bus); self.op_cpy(bus, addr); self.clock_ticks += 4; }

            // --- BIT ---
            0x89 => { let addr = self.imm(); self.op_bit_imm(bus, addr); self.clock_ticks += 2; }
            0x24 => { let addr = self.zp(bus); self.op_bit(bus, addr); self.clock_ticks += 3; }
            0x34 => { let addr = self.zp_x(bus); self.op_bit(bus, addr); self.clock_ticks += 4; }
            0x2C => { let addr = self.abs(bus); self.op_bit(bus, addr); self.clock_ticks += 4; }
            0x3C => { let addr = self.abs_x(bus, true); self.op_bit(bus, addr); self.clock_ticks += 4; }

            // --- ASL ---
            0x0A => { self.op_asl_a(); self.clock_ticks += 2; }
            0x06 => { let addr = self.zp(bus); self.op_asl_m(bus, addr); self.clock_ticks += 5; }
            0x16 => { let addr = self.zp_x(bus); self.op_asl_m(bus, addr); self.clock_ticks += 6; }
            0x0E => { let addr = self.abs(bus); self.op_asl_m(bus, addr); self.clock_ticks += 6; }
            0x1E => { let addr = self.abs_x(bus, false); self.op_asl_m(bus, addr); self.clock_ticks += 7; }

            // --- LSR ---
            0x4A => { self.op_lsr_a(); self.clock_ticks += 2; }
            0x46 => { let addr = self.zp(bus); self.op_lsr_m(bus, addr); self.clock_ticks += 5; }
            0x56 => { let addr = self.zp_x(bus); self.op_lsr_m(bus, addr); self.clock_ticks += 6; }
            0x4E => { let addr = self.abs(bus); self.op_lsr_m(bus, addr); self.clock_ticks += 6; }
            0x5E => { let addr = self.abs_x(bus, false); self.op_lsr_m(bus, addr); self.clock_ticks += 7; }

            // --- ROL ---
            0x2A => { self.op_rol_a(); self.clock_ticks += 2; }
            0x26 => { let addr = self.zp(bus); self.op_rol_m(bus, addr); self.clock_ticks += 5; }
            0x36 => { let addr = self.zp_x(bus); self.op_rol_m(bus, addr); self.clock_ticks += 6; }
            0x2E => { let addr = self.abs(bus); self.op_rol_m(bus, addr); self.clock_ticks += 6; }
            0x3E => { let addr = self.abs_x(bus, false); self.op_rol_m(bus, addr); self.clock_ticks += 7; }

            // --- ROR ---
            0x6A => { self.op_ror_a(); self.clock_ticks += 2; }
            0x66 => { let addr = self.zp(bus); self.op_ror_m(bus, addr); self.clock_ticks += 5; }
            0x76 => { let addr = self.zp_x(bus); self.op_ror_m(bus, addr); self.clock_ticks += 6; }
            0x6E => { let addr = self.abs(bus); self.op_ror_m(bus, addr); self.clock_ticks += 6; }
            0x7E => { let addr = self.abs_x(bus, false); self.op_ror_m(bus, addr); self.clock_ticks += 7; }

            // --- INC / DEC ---
            0x1A => { self.op_inc_a(); self.clock_ticks += 2; }
            0xE6 => { let addr = self.zp(bus); self.op_inc_m(bus, addr); self.clock_ticks += 5; }
            0xF6 => { let addr = self.zp_x(bus); self.op_inc_m(bus, addr); self.clock_ticks += 6; }
            0xEE => { let addr = self.abs(bus); self.op_inc_m(bus, addr); self.clock_ticks += 6; }
            0xFE => { let addr = self.abs_x(bus, false); self.op_inc_m(bus, addr); self.clock_ticks += 7; }
            0x3A => { self.op_dec_a(); self.clock_ticks += 2; }
            0xC6 => { let addr = self.zp(bus); self.op_dec_m(bus, addr); self.clock_ticks += 5; }
            0xD6 => { let addr = self.zp_x(bus); self.op_dec_m(bus, addr); self.clock_ticks += 6; }
            0xCE => { let addr = self.abs(bus); self.op_dec_m(bus, addr); self.clock_ticks += 6; }
            0xDE => { let addr = self.abs_x(bus, false); self.op_dec_m(bus, addr); self.clock_ticks += 7; }
            0xE8 => { self.x = self.x.wrapping_add(1); self.set_nz(self.x); self.clock_ticks += 2; }
            0xC8 => { self.y = self.y.wrapping_add(1); self.set_nz(self.y); self.clock_ticks += 2; }
            0xCA => { self.x = self.x.wrapping_sub(1); self.set_nz(self.x); self.clock_ticks += 2; }
            0x88 => { self.y = self.y.wrapping_sub(1); self.set_nz(self.y); self.clock_ticks += 2; }

            // --- LDA ---
            0xA9 => { let addr = self.imm(); self.op_lda(bus, addr); self.clock_ticks += 2; }
            0xA5 => { let addr = self.zp(bus); self.op_lda(bus, addr); self.clock_ticks += 3; }
            0xB5 => { let addr = self.zp_x(bus); self.op_lda(bus, addr); self.clock_ticks += 4; }
            0xAD => { let addr = self.abs(bus); self.op_lda(bus, addr); self.clock_ticks += 4; }
            0xBD => { let addr = self.abs_x(bus, true); self.op_lda(bus, addr); self.clock_ticks += 4; }
            0xB9 => { let addr = self.abs_y(bus, true); self.op_lda(bus, addr); self.clock_ticks += 4; }
            0xA1 => { let addr = self.ind_x(bus); self.op_lda(bus, addr); self.clock_ticks += 6; }
            0xB1 => { let addr = self.ind_y(bus, true); self.op_lda(bus, addr); self.clock_ticks += 5; }
            0xB2 => { let addr = self.ind0(bus); self.op_lda(bus, addr); self.clock_ticks += 5; }

            // --- LDX ---
            0xA2 => { let addr = self.imm(); self.op_ldx(bus, addr); self.clock_ticks += 2; }
            0xA6 => { let addr = self.zp(bus); self.op_ldx(bus, addr); self.clock_ticks += 3; }
            0xB6 => { let addr = self.zp_y(bus); self.op_ldx(bus, addr); self.clock_ticks += 4; }
            0xAE => { let addr = self.abs(bus); self.op_ldx(bus, addr); self.clock_ticks += 4; }
            0xBE => { let addr = self.abs_y(bus, true); self.op_ldx(bus, addr); self.clock_ticks += 4; }

            // --- LDY ---
            0xA0 => { let addr = self.imm(); self.op_ldy(bus, addr); self.clock_ticks += 2; }
            0xA4 => { let addr = self.zp(bus); self.op_ldy(bus, addr); self.clock_ticks += 3; }
            0xB4 => { let addr = self.zp_x(bus); self.op_ldy(bus, addr); self.clock_ticks += 4; }
            0xAC => { let addr = self.abs(bus); self.op_ldy(bus, addr); self.clock_ticks += 4; }
            0xBC => { let addr = self.abs_x(bus, true); self.op_ldy(bus, addr); self.clock_ticks += 4; }

            // --- STA ---
            0x85 => { let addr = self.zp(bus); bus.write(addr, self.a); self.clock_ticks += 3; }
            0x95 => { let addr = self.zp_x(bus); bus.write(addr, self.a); self.clock_ticks += 4; }
            0x8D => { let addr = self.abs(bus); bus.write(addr, self.a); self.clock_ticks += 4; }
            0x9D => { let addr = self.abs_x(bus, false); bus.write(addr, self.a); self.clock_ticks += 5; }
            0x99 => { let addr = self.abs_y(bus, false); bus.write(addr, self.a); self.clock_ticks += 5; }
            0x81 => { let addr = self.ind_x(bus); bus.write(addr, self.a); self.clock_ticks += 6; }
            0x91 => { let addr = self.ind_y(bus, false); bus.write(addr, self.a); self.clock_ticks += 6; }
            0x92 => { let addr = self.ind0(bus); bus.write(addr, self.a); self.clock_ticks += 5; }

            // --- STX / STY / STZ ---
            0x86 => { let addr = self.zp(bus); bus.write(addr, self.x); self.clock_ticks += 3; }
            0x96 => { let addr = self.zp_y(bus); bus.write(addr, self.x); self.clock_ticks += 4; }
            0x8E => { let addr = self.abs(bus); bus.write(addr, self.x); self.clock_ticks += 4; }
            0x84 => { let addr = self.zp(bus); bus.write(addr, self.y); self.clock_ticks += 3; }
            0x94 => { let addr = self.zp_x(bus); bus.write(addr, self.y); self.clock_ticks += 4; }
            0x8C => { let addr = self.abs(bus); bus.write(addr, self.y); self.clock_ticks += 4; }
            0x64 => { let addr = self.zp(bus); bus.write(addr, 0); self.clock_ticks += 3; }
            0x74 => { let addr = self.zp_x(bus); bus.write(addr, 0); self.clock_ticks += 4; }
            0x9C => { let addr = self.abs(bus); bus.write(addr, 0); self.clock_ticks += 4; }
            0x9E => { let addr = self.abs_x(bus, false); bus.write(addr, 0); self.clock_ticks += 5; }

            // --- Flag instructions ---
            0x18 => { self.set_flag(StatusFlag::C, false); self.clock_ticks += 2; }
            0x38 => { self.set_flag(StatusFlag::C, true); self.clock_ticks += 2; }
            0x58 => { self.set_flag(StatusFlag::I, false); self.clock_ticks += 2; }
            0x78 => { self.set_flag(StatusFlag::I, true); self.clock_ticks += 2; }
            0xB8 => { self.set_flag(StatusFlag::V, false); self.clock_ticks += 2; }
            0xD8 => { self.set_flag(StatusFlag::D, false); self.clock_ticks += 2; }
            0xF8 => { self.set_flag(StatusFlag::D, true); self.clock_ticks += 2; }

            // --- Transfers ---
            0xAA => { self.x = self.a; self.set_nz(self.x); self.clock_ticks += 2; }
            0xA8 => { self.y = self.a; self.set_nz(self.y); self.clock_ticks += 2; }
            0x8A => { self.a = self.x; self.set_nz(self.a); self.clock_ticks += 2; }
            0x98 => { self.a = self.y; self.set_nz(self.a); self.clock_ticks += 2; }
            0xBA => { self.x = self.sp; self.set_nz(self.x); self.clock_ticks += 2; }
            0x9A => { self.sp = self.x; self.clock_ticks += 2; }

            // --- NOP ---
            0xEA => { self.clock_ticks += 2; }

            // --- Branches ---
            0x10 => { let taken = !self.flag(StatusFlag::N); self.op_branch(bus, taken); }
            0x30 => { let taken = self.flag(StatusFlag::N); self.op_branch(bus, taken); }
            0x50 => { let taken = !self.flag(StatusFlag::V); self.op_branch(bus, taken); }
            0x70 => { let taken = self.flag(StatusFlag::V); self.op_branch(bus, taken); }
            0x90 => { let taken = !self.flag(StatusFlag::C); self.op_branch(bus, taken); }
            0xB0 => { let taken = self.flag(StatusFlag::C); self.op_branch(bus, taken); }
            0xD0 => { let taken = !self.flag(StatusFlag::Z); self.op_branch(bus, taken); }
            0xF0 => { let taken = self.flag(StatusFlag::Z); self.op_branch(bus, taken); }
            0x80 => { self.op_branch(bus, true); }

            // --- Jumps / subroutines ---
            0x4C => { let addr = self.abs(bus); self.pc = addr; self.clock_ticks += 3; }
            0x6C => { let addr = self.ind(bus); self.pc = addr; self.clock_ticks += 5; }
            0x7C => { let addr = self.ainx(bus); self.pc = addr; self.clock_ticks += 6; }
            0x20 => { let addr = self.abs(bus); self.op_jsr(bus, addr); self.clock_ticks += 6; }
            0x60 => { self.op_rts(bus); self.clock_ticks += 6; }
            0x40 => { self.op_rti(bus); self.clock_ticks += 6; }
            0x00 => { self.op_brk(bus); self.clock_ticks += 7; }

            // --- Stack ---
            0x48 => { self.push8(bus, self.a); self.clock_ticks += 3; }
            0x08 => { self.push8(bus, self.status | StatusFlag::B as u8); self.clock_ticks += 3; }
            0xDA => { self.push8(bus, self.x); self.clock_ticks += 3; }
            0x5A => { self.push8(bus, self.y); self.clock_ticks += 3; }
            0x68 => { self.a = self.pull8(bus); let a = self.a; self.set_nz(a); self.clock_ticks += 4; }
            0x28 => { self.status = (self.pull8(bus) | StatusFlag::U as u8) & !(StatusFlag::B as u8); self.clock_ticks += 4; }
            0xFA => { self.x = self.pull8(bus); let x = self.x; self.set_nz(x); self.clock_ticks += 4; }
            0x7A => { self.y = self.pull8(bus); let y = self.y; self.set_nz(y); self.clock_ticks += 4; }

            // --- TRB / TSB ---
            0x14 => { let addr = self.zp(bus); self.op_trb(bus, addr); self.clock_ticks += 5; }
            0x1C => { let addr = self.abs(bus); self.op_trb(bus, addr); self.clock_ticks += 6; }
            0x04 => { let addr = self.zp(bus); self.op_tsb(bus, addr); self.clock_ticks += 5; }
            0x0C => { let addr = self.abs(bus); self.op_tsb(bus, addr); self.clock_ticks += 6; }

            // --- BBR0-7 / BBS0-7 ---
            0x0F => { let addr = self.zprel(bus, true); self.op_bbr(bus, addr, 0x01); self.clock_ticks += 2; }
            0x1F => { let addr = self.zprel(bus, true); self.op_bbr(bus, addr, 0x02); self.clock_ticks += 2; }
            0x2F => { let addr = self.zprel(bus, true); self.op_bbr(bus, addr, 0x04); self.clock_ticks += 2; }
            0x3F => { let addr = self.zprel(bus, true); self.op_bbr(bus, addr, 0x08); self.clock_ticks += 2; }
            0x4F => { let addr = self.zprel(bus, true); self.op_bbr(bus, addr, 0x10); self.clock_ticks += 2; }
            0x5F => { let addr = self.zprel(bus, true); self.op_bbr(bus, addr, 0x20); self.clock_ticks += 2; }
            0x6F => { let addr = self.zprel(bus, true); self.op_bbr(bus, addr, 0x40); self.clock_ticks += 2; }
            0x7F => { let addr = self.zprel(bus, true); self.op_bbr(bus, addr, 0x80); self.clock_ticks += 2; }
            0x8F => { let addr = self.zprel(bus, true); self.op_bbs(bus, addr, 0x01); self.clock_ticks += 2; }
            0x9F => { let addr = self.zprel(bus, true); self.op_bbs(bus, addr, 0x02); self.clock_ticks += 2; }
            0xAF => { let addr = self.zprel(bus, true); self.op_bbs(bus, addr, 0x04); self.clock_ticks += 2; }
            0xBF => { let addr = self.zprel(bus, true); self.op_bbs(bus, addr, 0x08); self.clock_ticks += 2; }
            0xCF => { let addr = self.zprel(bus, true); self.op_bbs(bus, addr, 0x10); self.clock_ticks += 2; }
            0xDF => { let addr = self.zprel(bus, true); self.op_bbs(bus, addr, 0x20); self.clock_ticks += 2; }
            0xEF => { let addr = self.zprel(bus, true); self.op_bbs(bus, addr, 0x40); self.clock_ticks += 2; }
            0xFF => { let addr = self.zprel(bus, true); self.op_bbs(bus, addr, 0x80); self.clock_ticks += 2; }

            // --- RMB0-7 / SMB0-7 ---
            0x07 => { let addr = self.zp(bus); self.op_rmb(bus, addr, 0x01); self.clock_ticks += 5; }
            0x17 => { let addr = self.zp(bus); self.op_rmb(bus, addr, 0x02); self.clock_ticks += 5; }
            0x27 => { let addr = self.zp(bus); self.op_rmb(bus, addr, 0x04); self.clock_ticks += 5; }
            0x37 => { let addr = self.zp(bus); self.op_rmb(bus, addr, 0x08); self.clock_ticks += 5; }
            0x47 => { let addr = self.zp(bus); self.op_rmb(bus, addr, 0x10); self.clock_ticks += 5; }
            0x57 => { let addr = self.zp(bus); self.op_rmb(bus, addr, 0x20); self.clock_ticks += 5; }
            0x67 => { let addr = self.zp(bus); self.op_rmb(bus, addr, 0x40); self.clock_ticks += 5; }
            0x77 => { let addr = self.zp(bus); self.op_rmb(bus, addr, 0x80); self.clock_ticks += 5; }
            0x87 => { let addr = self.zp(bus); self.op_smb(bus, addr, 0x01); self.clock_ticks += 5; }
            0x97 => { let addr = self.zp(bus); self.op_smb(bus, addr, 0x02); self.clock_ticks += 5; }
            0xA7 => { let addr = self.zp(bus); self.op_smb(bus, addr, 0x04); self.clock_ticks += 5; }
            0xB7 => { let addr = self.zp(bus); self.op_smb(bus, addr, 0x08); self.clock_ticks += 5; }
            0xC7 => { let addr = self.zp(bus); self.op_smb(bus, addr, 0x10); self.clock_ticks += 5; }
            0xD7 => { let addr = self.zp(bus); self.op_smb(bus, addr, 0x20); self.clock_ticks += 5; }
            0xE7 => { let addr = self.zp(bus); self.op_smb(bus, addr, 0x40); self.clock_ticks += 5; }
            0xF7 => { let addr = self.zp(bus); self.op_smb(bus, addr, 0x80); self.clock_ticks += 5; }

            // --- WAI ---
            0xCB => { self.wai = true; self.clock_ticks += 3; }

            // Everything the W65C02 leaves unassigned acts as a NOP.
            _ => { self.clock_ticks += 2; }
        }
    }
}

#[inline]
pub(crate) fn page_crossed(a: u16, b: u16) -> bool {
    (a ^ b) & 0xFF00 != 0
}
