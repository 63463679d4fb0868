/// Generic 8-bit system bus as seen by the CPU.
///
/// The CPU core is written against this trait so that boards and test
/// fixtures can supply their own address decoding. All accesses are single
/// bytes; multi-byte fetches are composed by the CPU.
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, value: u8);

    /// Side-effect-free read for debugger/trace surfaces. `bank` overrides
    /// the banked-window selector where the implementation has one.
    /// Default maps to a zero read for buses without a debug path.
    fn debug_read(&self, addr: u16, bank: u8) -> u8 {
        let _ = (addr, bank);
        0
    }

    /// Sample the interrupt lines. Polled by the CPU once per instruction.
    fn check_interrupts(&self) -> InterruptState;
}

#[derive(Default, Clone, Copy, Debug)]
pub struct InterruptState {
    /// Edge-triggered, non-maskable.
    pub nmi: bool,
    /// Level-triggered, masked by the I flag.
    pub irq: bool,
}
