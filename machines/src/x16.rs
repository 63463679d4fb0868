//! X16 board: W65C02 @ 8 MHz, banked memory, video coprocessor, two VIAs
//! carrying the bank selectors and PS/2 channels, and the emulator control
//! page.

use std::io::{self, Write};

use tracing::warn;

use vermilion_core::core::{Bus, InterruptState, Machine};
use vermilion_core::cpu::{W65C02, W65C02State};
use vermilion_core::device::{Ps2Mouse, Ps2Port, Rtc, Via6522};
use vermilion_core::video::{SCREEN_HEIGHT, SCREEN_WIDTH, Vera};

use crate::registry::{MachineEntry, MachineOptions};
use crate::rom_loader::RomImage;

pub const ROM_BANK_SIZE: usize = 0x4000;
pub const NUM_ROM_BANKS: usize = 32;

pub const RAM_BANK_SIZE: usize = 0x2000;
pub const NUM_MAX_RAM_BANKS: usize = 256;
pub const DEFAULT_RAM_BANKS: usize = 64;

/// Fixed low RAM below the I/O window and bank windows.
const LOW_RAM_SIZE: usize = 0xA000;

const DEVICE_EMULATOR: u16 = 0x9FB0;

// ---------------------------------------------------------------------------
// Address decode tables
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Debug)]
enum MemMap {
    Direct,
    Io,
    RamBank,
    RomBank,
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum IoMap {
    Null,
    Sound,
    Video,
    Lcd,
    Via1,
    Via2,
    Rtc,
    Mouse,
    Emu,
}

/// High-byte decode of the CPU address space.
const MEMMAP_TABLE_HI: &[(u8, u8, MemMap)] = &[
    (0x00, 0x9E, MemMap::Direct),
    (0x9F, 0x9F, MemMap::Io),
    (0xA0, 0xBF, MemMap::RamBank),
    (0xC0, 0xFF, MemMap::RomBank),
];

/// Low-byte decode within the I/O page.
const MEMMAP_TABLE_IO: &[(u8, u8, IoMap)] = &[
    (0x00, 0x1F, IoMap::Sound),
    (0x20, 0x3F, IoMap::Video),
    (0x40, 0x5F, IoMap::Lcd),
    (0x60, 0x6F, IoMap::Via1),
    (0x70, 0x7F, IoMap::Via2),
    (0x80, 0x9F, IoMap::Rtc),
    (0xA0, 0xAF, IoMap::Mouse),
    (0xB0, 0xBF, IoMap::Emu),
    (0xC0, 0xDF, IoMap::Null),
    (0xE0, 0xFF, IoMap::Sound),
];

fn build_map<T: Copy>(entries: &[(u8, u8, T)], fill: T) -> [T; 256] {
    let mut map = [fill; 256];
    for &(start, end, kind) in entries {
        for slot in &mut map[start as usize..=end as usize] {
            *slot = kind;
        }
    }
    map
}

// ---------------------------------------------------------------------------
// Emulator control page (0x9FB0)
// ---------------------------------------------------------------------------

/// Runtime toggles guest code can poke, plus the identification magic.
#[derive(Default)]
struct EmuControl {
    debugger_enabled: bool,
    log_video: bool,
    log_keyboard: bool,
    echo_mode: u8,
    save_on_exit: bool,
    gif_state: u8,
    led_status: bool,
    keymap: u8,
    /// Mirror of the CPU tick counter for the 32-bit readback registers.
    clock_ticks: u64,
}

impl EmuControl {
    fn read(&self, reg: u8) -> u8 {
        match reg {
            0 => self.debugger_enabled as u8,
            1 => self.log_video as u8,
            2 => self.log_keyboard as u8,
            3 => self.echo_mode,
            4 => self.save_on_exit as u8,
            5 => self.gif_state,
            8 => self.clock_ticks as u8,
            9 => (self.clock_ticks >> 8) as u8,
            10 => (self.clock_ticks >> 16) as u8,
            11 => (self.clock_ticks >> 24) as u8,
            13 => self.keymap,
            14 => b'1', // emulator detection
            15 => b'6',
            _ => 0xFF,
        }
    }

    fn write(&mut self, reg: u8, value: u8) {
        let on = value != 0;
        match reg {
            0 => self.debugger_enabled = on,
            1 => self.log_video = on,
            2 => self.log_keyboard = on,
            3 => self.echo_mode = value,
            4 => self.save_on_exit = on,
            5 => self.gif_state = value,
            15 => self.led_status = on,
            _ => warn!(
                "invalid emulator control register write: {:04X}",
                DEVICE_EMULATOR + reg as u16
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// X16Bus
// ---------------------------------------------------------------------------

/// Everything on the far side of the CPU pins: memory, decode tables, and
/// the device slots of the I/O page.
pub struct X16Bus {
    ram: Vec<u8>,
    rom: Vec<u8>,
    num_ram_banks: usize,
    ram_bank: u8,
    rom_bank: u8,

    map_hi: [MemMap; 256],
    map_io: [IoMap; 256],

    pub vera: Vera,
    pub via1: Via6522,
    pub via2: Via6522,
    rtc: Rtc,

    /// PS/2 channel 0 = keyboard, 1 = mouse.
    ps2: [Ps2Port; 2],
    mouse: Ps2Mouse,

    /// Audio expansion address latch (the synth itself is external).
    ym_addr: u8,

    control: EmuControl,
}

impl X16Bus {
    pub fn new(rom: RomImage, num_ram_banks: usize) -> Self {
        let num_ram_banks = num_ram_banks.clamp(1, NUM_MAX_RAM_BANKS);
        Self {
            ram: vec![0; LOW_RAM_SIZE + num_ram_banks * RAM_BANK_SIZE],
            rom: rom.into_banked(),
            num_ram_banks,
            ram_bank: 0,
            rom_bank: 0,
            map_hi: build_map(MEMMAP_TABLE_HI, MemMap::Direct),
            map_io: build_map(MEMMAP_TABLE_IO, IoMap::Null),
            vera: Vera::new(),
            via1: Via6522::new(),
            via2: Via6522::new(),
            rtc: Rtc::new(),
            ps2: [Ps2Port::new(), Ps2Port::new()],
            mouse: Ps2Mouse::new(),
            ym_addr: 0,
            control: EmuControl::default(),
        }
    }

    pub fn num_ram_banks(&self) -> usize {
        self.num_ram_banks
    }

    pub fn ram_bank(&self) -> u8 {
        self.ram_bank
    }

    pub fn rom_bank(&self) -> u8 {
        self.rom_bank
    }

    /// Activity LED state from the emulator control page, for the host
    /// shell to display.
    pub fn led_status(&self) -> bool {
        self.control.led_status
    }

    fn effective_ram_bank(&self) -> usize {
        self.ram_bank as usize % self.num_ram_banks
    }

    fn banked_ram_index(&self, addr: u16, bank: usize) -> usize {
        LOW_RAM_SIZE + bank * RAM_BANK_SIZE + (addr as usize - 0xA000)
    }

    fn rom_index(&self, addr: u16, bank: usize) -> usize {
        bank * ROM_BANK_SIZE + (addr as usize - 0xC000)
    }

    /// Queue a key event as PS/2 set-2 scancodes on the keyboard channel.
    pub fn key_event(&mut self, scancode: u8, extended: bool, pressed: bool) {
        let needed = 1 + extended as usize + (!pressed) as usize;
        if !self.ps2[0].buffer_can_fit(needed) {
            return;
        }
        if extended {
            self.ps2[0].buffer_add(0xE0);
        }
        if !pressed {
            self.ps2[0].buffer_add(0xF0);
        }
        self.ps2[0].buffer_add(scancode);
    }

    pub fn mouse_motion(&mut self, dx: i32, dy: i32) {
        // PS/2 Y counts up the screen.
        let dx = dx.clamp(-4096, 4096) as i16;
        let dy = (-dy).clamp(-4096, 4096) as i16;
        self.mouse.moved(dx, dy, &mut self.ps2[1]);
    }

    pub fn mouse_button(&mut self, button: u8, pressed: bool) {
        if pressed {
            self.mouse.button_down(button, &mut self.ps2[1]);
        } else {
            self.mouse.button_up(button, &mut self.ps2[1]);
        }
    }

    /// Advance the PS/2 transports, with the VIA2 ports as the host side
    /// of both channels (CLK/DATA on port bits 1:0).
    fn step_ps2(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.ps2[0].input = self.via2.port_a_out() & 0x03;
            self.ps2[1].input = self.via2.port_b_out() & 0x03;
            self.ps2[0].step();
            self.ps2[1].step();
        }
        self.via2.set_port_a_in(self.ps2[0].out & 0x03 | 0xFC);
        self.via2.set_port_b_in(self.ps2[1].out & 0x03 | 0xFC);
    }

    fn io_read(&mut self, addr: u16) -> u8 {
        match self.map_io[(addr & 0xFF) as usize] {
            IoMap::Sound => 0,
            IoMap::Video => self.vera.read((addr & 0x1F) as u8, false),
            IoMap::Lcd => 0,
            IoMap::Via1 => self.via1.read((addr & 0xF) as usize),
            IoMap::Via2 => self.via2.read((addr & 0xF) as usize),
            IoMap::Rtc => self.rtc.read((addr & 0x1F) as usize),
            IoMap::Mouse => 0xFF,
            IoMap::Emu => self.control.read((addr & 0xF) as u8),
            IoMap::Null => 0,
        }
    }

    fn io_write(&mut self, addr: u16, value: u8) {
        match self.map_io[(addr & 0xFF) as usize] {
            IoMap::Sound => {
                // Expansion synth: address latch at offset 0, data at 1.
                // The synth itself lives outside this board model.
                if addr & 0x1F == 0 {
                    self.ym_addr = value;
                } else if addr & 0x1F == 1 {
                    tracing::trace!(
                        reg = self.ym_addr,
                        value,
                        "audio expansion register write ignored"
                    );
                }
            }
            IoMap::Video => self.vera.write((addr & 0x1F) as u8, value),
            IoMap::Lcd => {}
            IoMap::Via1 => {
                let reg = (addr & 0xF) as usize;
                self.via1.write(reg, value);
                // Port B drives the ROM bank, port A the RAM bank. The RAM
                // selector keeps all 8 bits and reduces mod the populated
                // bank count on access.
                match reg {
                    0x0 => self.rom_bank = value & (NUM_ROM_BANKS as u8 - 1),
                    0x1 => self.ram_bank = value,
                    _ => {}
                }
            }
            IoMap::Via2 => self.via2.write((addr & 0xF) as usize, value),
            IoMap::Rtc => self.rtc.write((addr & 0x1F) as usize, value),
            IoMap::Mouse => {}
            IoMap::Emu => self.control.write((addr & 0xF) as u8, value),
            IoMap::Null => {}
        }
    }

    fn debug_io_read(&self, addr: u16) -> u8 {
        match self.map_io[(addr & 0xFF) as usize] {
            IoMap::Sound => 0,
            IoMap::Video => self.vera.debug_read((addr & 0x1F) as u8),
            IoMap::Lcd => 0,
            IoMap::Via1 => self.via1.read((addr & 0xF) as usize),
            IoMap::Via2 => self.via2.read((addr & 0xF) as usize),
            IoMap::Rtc => self.rtc.read((addr & 0x1F) as usize),
            IoMap::Mouse => 0xFF,
            IoMap::Emu => self.control.read((addr & 0xF) as u8),
            IoMap::Null => 0,
        }
    }

    /// Dump fixed RAM then all banked RAM, raw.
    pub fn dump_ram(&self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(&self.ram[..LOW_RAM_SIZE])?;
        out.write_all(&self.ram[LOW_RAM_SIZE..])?;
        Ok(())
    }
}

impl Bus for X16Bus {
    fn read(&mut self, addr: u16) -> u8 {
        match self.map_hi[(addr >> 8) as usize] {
            MemMap::Direct => self.ram[addr as usize],
            MemMap::Io => self.io_read(addr),
            MemMap::RamBank => self.ram[self.banked_ram_index(addr, self.effective_ram_bank())],
            MemMap::RomBank => self.rom[self.rom_index(addr, self.rom_bank as usize)],
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match self.map_hi[(addr >> 8) as usize] {
            MemMap::Direct => self.ram[addr as usize] = value,
            MemMap::Io => self.io_write(addr, value),
            MemMap::RamBank => {
                let index = self.banked_ram_index(addr, self.effective_ram_bank());
                self.ram[index] = value;
            }
            // Writes to ROM silently no-op.
            MemMap::RomBank => {}
        }
    }

    /// No I/O side effects whatsoever; `bank` overrides both banked
    /// windows.
    fn debug_read(&self, addr: u16, bank: u8) -> u8 {
        match self.map_hi[(addr >> 8) as usize] {
            MemMap::Direct => self.ram[addr as usize],
            MemMap::Io => self.debug_io_read(addr),
            MemMap::RamBank => {
                let eff = bank as usize % self.num_ram_banks;
                self.ram[self.banked_ram_index(addr, eff)]
            }
            MemMap::RomBank => {
                let eff = bank as usize % NUM_ROM_BANKS;
                self.rom[self.rom_index(addr, eff)]
            }
        }
    }

    fn check_interrupts(&self) -> InterruptState {
        InterruptState {
            nmi: false,
            irq: self.vera.irq_out(),
        }
    }
}

// ---------------------------------------------------------------------------
// X16System
// ---------------------------------------------------------------------------

/// The complete machine: CPU plus bus, with the frame scheduler that keeps
/// the video clock a rational multiple of the CPU clock.
pub struct X16System {
    pub cpu: W65C02,
    pub bus: X16Bus,
}

impl X16System {
    pub fn new(rom: RomImage, options: &MachineOptions) -> Self {
        let mut system = Self {
            cpu: W65C02::new(),
            bus: X16Bus::new(rom, options.num_ram_banks),
        };
        system.bus.vera.set_warp(options.warp);
        system.cpu.reset(&mut system.bus);
        system
    }

    pub fn cpu_state(&self) -> W65C02State {
        self.cpu.snapshot()
    }

    /// Execute one instruction and bring the devices up to date.
    /// Returns true when the video raster wrapped into a new frame.
    pub fn step(&mut self) -> bool {
        let before = self.cpu.clock_ticks;
        self.cpu.step(&mut self.bus);
        self.bus.control.clock_ticks = self.cpu.clock_ticks;

        let elapsed = self.cpu.clock_ticks - before;
        let mut new_frame = false;
        for _ in 0..elapsed {
            if self.bus.vera.step() {
                new_frame = true;
            }
        }
        self.bus.step_ps2(elapsed);

        let ints = self.bus.check_interrupts();
        self.cpu.service_interrupts(&mut self.bus, ints);

        new_frame
    }

    pub fn save_video(&self, out: &mut dyn Write) -> io::Result<()> {
        self.bus.vera.save(out)
    }
}

impl Machine for X16System {
    fn display_size(&self) -> (u32, u32) {
        (SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32)
    }

    fn run_frame(&mut self) {
        while !self.step() {}
    }

    fn render_frame(&self, buffer: &mut [u8]) {
        for (dst, &px) in buffer.chunks_exact_mut(3).zip(self.bus.vera.framebuffer()) {
            dst[0] = (px >> 16) as u8;
            dst[1] = (px >> 8) as u8;
            dst[2] = px as u8;
        }
    }

    fn key_event(&mut self, scancode: u8, extended: bool, pressed: bool) {
        self.bus.key_event(scancode, extended, pressed);
    }

    fn mouse_motion(&mut self, dx: i32, dy: i32) {
        self.bus.mouse_motion(dx, dy);
    }

    fn mouse_button(&mut self, button: u8, pressed: bool) {
        self.bus.mouse_button(button, pressed);
    }

    fn reset(&mut self) {
        self.bus.vera.reset();
        self.bus.via1.reset();
        self.bus.via2.reset();
        self.bus.ram_bank = 0;
        self.bus.rom_bank = 0;
        self.cpu.reset(&mut self.bus);
    }

    fn wants_dump_on_exit(&self) -> bool {
        self.bus.control.save_on_exit
    }

    fn dump_ram(&self, out: &mut dyn Write) -> io::Result<()> {
        self.bus.dump_ram(out)
    }
}

fn create_x16(rom: RomImage, options: &MachineOptions) -> Box<dyn Machine> {
    Box::new(X16System::new(rom, options))
}

inventory::submit! {
    MachineEntry::new("x16", create_x16)
}
