#![allow(dead_code)]

use vermilion_core::core::{Bus, bus::InterruptState};

/// Minimal bus for testing: flat 64KB read/write memory with scriptable
/// interrupt lines, no peripherals.
pub struct TestBus {
    pub memory: Vec<u8>,
    pub irq_line: bool,
    pub nmi_line: bool,
}

impl TestBus {
    pub fn new() -> Self {
        Self {
            memory: vec![0; 0x10000],
            irq_line: false,
            nmi_line: false,
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    /// Point a vector (e.g. 0xFFFC) at a handler address.
    pub fn set_vector(&mut self, vector: u16, target: u16) {
        self.memory[vector as usize] = target as u8;
        self.memory[vector as usize + 1] = (target >> 8) as u8;
    }
}

impl Bus for TestBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
    }

    fn debug_read(&self, addr: u16, _bank: u8) -> u8 {
        self.memory[addr as usize]
    }

    fn check_interrupts(&self) -> InterruptState {
        InterruptState {
            nmi: self.nmi_line,
            irq: self.irq_line,
        }
    }
}
