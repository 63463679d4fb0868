#![allow(dead_code)]

use vermilion_machines::rom_loader::RomImage;
use vermilion_machines::x16::ROM_BANK_SIZE;

/// Builder for small test ROM images. Addresses are CPU addresses within
/// the 0xC000..0xFFFF window of the named bank; vectors live in bank 0.
pub struct RomBuilder {
    banks: Vec<Vec<u8>>,
}

impl RomBuilder {
    pub fn new(num_banks: usize) -> Self {
        Self {
            banks: vec![vec![0xEA; ROM_BANK_SIZE]; num_banks.max(1)],
        }
    }

    pub fn write(&mut self, bank: usize, addr: u16, data: &[u8]) -> &mut Self {
        let offset = addr as usize - 0xC000;
        self.banks[bank][offset..offset + data.len()].copy_from_slice(data);
        self
    }

    pub fn vector(&mut self, vector: u16, target: u16) -> &mut Self {
        let offset = vector as usize - 0xC000;
        self.banks[0][offset] = target as u8;
        self.banks[0][offset + 1] = (target >> 8) as u8;
        self
    }

    pub fn build(&self) -> RomImage {
        let data: Vec<u8> = self.banks.concat();
        RomImage::from_bytes(data, "test-rom").unwrap()
    }
}

/// A one-bank ROM whose reset vector points at a spin loop.
pub fn idle_rom() -> RomImage {
    let mut rom = RomBuilder::new(1);
    rom.write(0, 0xC000, &[0x4C, 0x00, 0xC0]) // JMP $C000
        .vector(0xFFFC, 0xC000);
    rom.build()
}
