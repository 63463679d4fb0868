//! Video coprocessor: 128 KiB VRAM, two tile/bitmap/text layers, 128
//! sprites, 256-entry palette, and an auto-incrementing dual-port register
//! interface.
//!
//! The raster advances in sub-pixel steps driven by the CPU clock
//! (`step_advance` pixels per tick). Whole scan lines are rendered
//! atomically when the beam wraps, compositing prerendered layer
//! backbuffers, the budgeted sprite pass, and the border into a 640x480
//! `0x00RRGGBB` framebuffer.

pub mod layer;
pub mod palette;
pub mod sprite;

use std::io::{self, Write};

use layer::{LayerCache, VramView};
use sprite::SpriteProps;

pub const VRAM_SIZE: usize = 0x20000;

const ADDR_PSG_START: u32 = 0x1F9C0;
const ADDR_PALETTE_START: u32 = 0x1FA00;
const ADDR_SPRDATA_START: u32 = 0x1FC00;

pub const NUM_SPRITES: usize = 128;

// Both VGA and NTSC scan the same 800x525 grid.
pub const SCAN_WIDTH: u32 = 800;
pub const SCAN_HEIGHT: u32 = 525;

const VGA_FRONT_PORCH_X: u16 = 16;
const VGA_FRONT_PORCH_Y: u16 = 10;
const VGA_PIXEL_FREQ: f32 = 25.175;

// NTSC: 262.5 lines per frame, lower field first.
const NTSC_FRONT_PORCH_X: u16 = 80;
const NTSC_FRONT_PORCH_Y: u16 = 22;
const NTSC_PIXEL_FREQ: f32 = 15.750 * 800.0 / 1000.0;
const TITLE_SAFE_X: f32 = 0.067;
const TITLE_SAFE_Y: f32 = 0.05;

// Visible area.
pub const SCREEN_WIDTH: usize = 640;
pub const SCREEN_HEIGHT: usize = 480;

/// CPU clock in MHz; the pixel clock is expressed relative to it.
const MHZ: f32 = 8.0;

/// Shared sprite render budget per scan line, in ticks.
const SPRITE_BUDGET: i32 = 800 + 1;

// ISR/IEN bits.
const INT_VSYNC: u8 = 0x01;
const INT_LINE: u8 = 0x02;
const INT_SPRCOL: u8 = 0x04;
const INT_AFLOW: u8 = 0x08;

/// Data-port address advance per access, indexed by the 5-bit increment
/// code (increment magnitude in bits 4:1, direction in bit 0).
const IO_INCREMENTS: [i32; 32] = [
    0, 0, 1, -1, 2, -2, 4, -4, 8, -8, 16, -16, 32, -32, 64, -64, 128, -128, 256, -256, 512, -512,
    40, -40, 80, -80, 160, -160, 320, -320, 640, -640,
];

pub struct Vera {
    vram: Vec<u8>,
    // Shadow expansions of VRAM, one byte per pixel index, kept consistent
    // on every write so the rasterizer never unpacks bits.
    vram_1bpp: Vec<u8>,
    vram_2bpp: Vec<u8>,
    vram_4bpp: Vec<u8>,

    palette: [u8; 512],
    palette_rgb: [u32; 256],
    sprite_data: [[u8; 8]; NUM_SPRITES],
    psg: [u8; 64],

    // I/O registers.
    io_addr: [u32; 2],
    io_rddata: [u8; 2],
    io_inc: [u8; 2],
    io_addrsel: u8,
    io_dcsel: u8,

    ien: u8,
    isr: u8,
    irq_line: u16,

    reg_layer: [[u8; 7]; 2],
    reg_composer: [u8; 8],

    layer_line: [[u8; SCREEN_WIDTH]; 2],
    sprite_line_col: [u8; SCREEN_WIDTH],
    sprite_line_z: [u8; SCREEN_WIDTH],
    sprite_line_mask: [u8; SCREEN_WIDTH],
    sprite_line_collisions: [u8; SCREEN_WIDTH],
    sprite_collisions: u8,
    layer_line_enable: [bool; 2],
    sprite_line_enable: bool,

    layer_cache: LayerCache,
    layer_props_idx: [usize; 2],
    layer_dirty: [bool; 2],

    sprite_props: Vec<SpriteProps>,
    sprite_dirty: [bool; NUM_SPRITES],

    scan_pos_x: f32,
    scan_pos_y: u16,
    step_advance: f32,
    frame_count: u32,
    warp: bool,

    audio_fifo_low: bool,

    framebuffer: Vec<u32>,
}

impl Default for Vera {
    fn default() -> Self {
        Self::new()
    }
}

impl Vera {
    pub fn new() -> Self {
        let mut vera = Self {
            vram: vec![0; VRAM_SIZE],
            vram_1bpp: vec![0; VRAM_SIZE * 8],
            vram_2bpp: vec![0; VRAM_SIZE * 4],
            vram_4bpp: vec![0; VRAM_SIZE * 2],
            palette: [0; 512],
            palette_rgb: [0; 256],
            sprite_data: [[0; 8]; NUM_SPRITES],
            psg: [0; 64],
            io_addr: [0; 2],
            io_rddata: [0; 2],
            io_inc: [0; 2],
            io_addrsel: 0,
            io_dcsel: 0,
            ien: 0,
            isr: 0,
            irq_line: 0,
            reg_layer: [[0; 7]; 2],
            reg_composer: [0; 8],
            layer_line: [[0; SCREEN_WIDTH]; 2],
            sprite_line_col: [0; SCREEN_WIDTH],
            sprite_line_z: [0; SCREEN_WIDTH],
            sprite_line_mask: [0; SCREEN_WIDTH],
            sprite_line_collisions: [0; SCREEN_WIDTH],
            sprite_collisions: 0,
            layer_line_enable: [false; 2],
            sprite_line_enable: false,
            layer_cache: LayerCache::new(),
            layer_props_idx: [0; 2],
            layer_dirty: [true; 2],
            sprite_props: (0..NUM_SPRITES).map(|_| SpriteProps::empty()).collect(),
            sprite_dirty: [true; NUM_SPRITES],
            scan_pos_x: 0.0,
            scan_pos_y: 0,
            step_advance: VGA_PIXEL_FREQ / MHZ,
            frame_count: 0,
            warp: false,
            audio_fifo_low: false,
            framebuffer: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT],
        };
        vera.reset();
        vera
    }

    /// Reset to power-on state: registers cleared, composer defaults,
    /// factory palette, VRAM scrambled as on real hardware.
    pub fn reset(&mut self) {
        self.io_addr = [0; 2];
        self.io_inc = [0; 2];
        self.io_rddata = [0; 2];
        self.io_addrsel = 0;
        self.io_dcsel = 0;

        self.ien = 0;
        self.isr = 0;
        self.irq_line = 0;

        self.reg_layer = [[0; 7]; 2];

        self.reg_composer = [0; 8];
        self.reg_composer[1] = 128; // hscale = 1.0
        self.reg_composer[2] = 128; // vscale = 1.0
        self.reg_composer[5] = (SCREEN_WIDTH >> 2) as u8;
        self.reg_composer[7] = (SCREEN_HEIGHT >> 1) as u8;
        self.layer_line_enable = [false; 2];
        self.sprite_line_enable = false;

        self.step_advance = VGA_PIXEL_FREQ / MHZ;

        self.sprite_data = [[0; 8]; NUM_SPRITES];
        self.sprite_dirty = [true; NUM_SPRITES];

        for (i, &entry) in palette::DEFAULT_PALETTE.iter().enumerate() {
            self.palette[i * 2] = entry as u8;
            self.palette[i * 2 + 1] = (entry >> 8) as u8;
            self.palette_rgb[i] = palette::expand_rgb(entry);
        }

        // Power-on VRAM holds junk; a cheap PRNG stands in for it.
        let mut seed = 0x1234_5678u32;
        for i in 0..VRAM_SIZE {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let value = (seed >> 16) as u8;
            self.vram[i] = value;
            self.update_shadows(i, value);
        }

        self.sprite_collisions = 0;
        self.scan_pos_x = 0.0;
        self.scan_pos_y = 0;

        self.layer_cache.clear();
        self.layer_dirty = [true; 2];
    }

    // ---- Public state accessors ----

    pub fn framebuffer(&self) -> &[u32] {
        &self.framebuffer
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn scan_line(&self) -> u16 {
        self.scan_pos_y
    }

    pub fn set_warp(&mut self, warp: bool) {
        self.warp = warp;
    }

    /// Audio FIFO level input from the (external) audio subsystem; feeds
    /// the AFLOW interrupt bit.
    pub fn set_audio_fifo_low(&mut self, low: bool) {
        self.audio_fifo_low = low;
    }

    /// Raw PSG voice registers, mirrored from the aliased VRAM window, for
    /// the (external) audio subsystem.
    pub fn psg_regs(&self) -> &[u8; 64] {
        &self.psg
    }

    /// Interrupt request output: any enabled status bit pending.
    pub fn irq_out(&self) -> bool {
        let isr = self.isr | if self.audio_fifo_low { INT_AFLOW } else { 0 };
        isr & self.ien != 0
    }

    // ---- Register port ----

    pub fn read(&mut self, reg: u8, debug: bool) -> u8 {
        match reg {
            0x00 => self.io_addr[self.io_addrsel as usize] as u8,
            0x01 => (self.io_addr[self.io_addrsel as usize] >> 8) as u8,
            0x02 => {
                let sel = self.io_addrsel as usize;
                self.io_inc[sel] << 3 | (self.io_addr[sel] >> 16) as u8 & 0x01
            }
            0x03 | 0x04 => self.data_port_read((reg - 0x03) as usize, debug),
            0x05 => self.io_dcsel << 1 | self.io_addrsel,
            0x06 => ((self.irq_line >> 8) as u8) << 7 | self.ien,
            0x07 => self.isr | if self.audio_fifo_low { INT_AFLOW } else { 0 },
            0x08 => self.scan_pos_y as u8,
            0x09..=0x0C => self.reg_composer[(reg - 0x09 + self.io_dcsel * 4) as usize],
            0x0D..=0x13 => self.reg_layer[0][(reg - 0x0D) as usize],
            0x14..=0x1A => self.reg_layer[1][(reg - 0x14) as usize],
            _ => 0,
        }
    }

    /// Register read with no side effects at all (data ports neither
    /// advance nor refetch). For debugger surfaces.
    pub fn debug_read(&self, reg: u8) -> u8 {
        match reg {
            0x00 => self.io_addr[self.io_addrsel as usize] as u8,
            0x01 => (self.io_addr[self.io_addrsel as usize] >> 8) as u8,
            0x02 => {
                let sel = self.io_addrsel as usize;
                self.io_inc[sel] << 3 | (self.io_addr[sel] >> 16) as u8 & 0x01
            }
            0x03 | 0x04 => self.io_rddata[(reg - 0x03) as usize],
            0x05 => self.io_dcsel << 1 | self.io_addrsel,
            0x06 => ((self.irq_line >> 8) as u8) << 7 | self.ien,
            0x07 => self.isr | if self.audio_fifo_low { INT_AFLOW } else { 0 },
            0x08 => self.scan_pos_y as u8,
            0x09..=0x0C => self.reg_composer[(reg - 0x09 + self.io_dcsel * 4) as usize],
            0x0D..=0x13 => self.reg_layer[0][(reg - 0x0D) as usize],
            0x14..=0x1A => self.reg_layer[1][(reg - 0x14) as usize],
            _ => 0,
        }
    }

    pub fn write(&mut self, reg: u8, value: u8) {
        match reg {
            0x00 => {
                let sel = self.io_addrsel as usize;
                self.io_addr[sel] = self.io_addr[sel] & 0x1_FF00 | value as u32;
                self.io_rddata[sel] = self.space_read(self.io_addr[sel]);
            }
            0x01 => {
                let sel = self.io_addrsel as usize;
                self.io_addr[sel] = self.io_addr[sel] & 0x1_00FF | (value as u32) << 8;
                self.io_rddata[sel] = self.space_read(self.io_addr[sel]);
            }
            0x02 => {
                let sel = self.io_addrsel as usize;
                self.io_addr[sel] = self.io_addr[sel] & 0xFFFF | (value as u32 & 0x01) << 16;
                self.io_inc[sel] = value >> 3;
                self.io_rddata[sel] = self.space_read(self.io_addr[sel]);
            }
            0x03 | 0x04 => self.data_port_write((reg - 0x03) as usize, value),
            0x05 => {
                if value & 0x80 != 0 {
                    self.reset();
                } else {
                    self.io_dcsel = value >> 1 & 0x01;
                    self.io_addrsel = value & 0x01;
                }
            }
            0x06 => {
                self.ien = value & 0x0F;
                self.irq_line = self.irq_line & 0xFF | (value as u16 & 0x80) << 1;
            }
            0x07 => {
                // Write-1-to-clear.
                self.isr &= !value;
            }
            0x08 => {
                self.irq_line = self.irq_line & 0x100 | value as u16;
            }
            0x09..=0x0C => {
                let idx = (reg - 0x09 + self.io_dcsel * 4) as usize;
                self.reg_composer[idx] = value;
                if idx == 0 {
                    self.update_output_mode();
                }
            }
            0x0D..=0x13 => self.layer_reg_write(0, (reg - 0x0D) as usize, value),
            0x14..=0x1A => self.layer_reg_write(1, (reg - 0x14) as usize, value),
            // Audio FIFO / SPI slots are external collaborators.
            _ => {}
        }
    }

    fn layer_reg_write(&mut self, layer: usize, idx: usize, value: u8) {
        self.reg_layer[layer][idx] = value;
        // CONFIG/MAPBASE/TILEBASE change the signature; scroll registers
        // take effect at the next line without touching the cache.
        if idx <= 2 {
            self.layer_dirty[layer] = true;
        }
    }

    fn update_output_mode(&mut self) {
        let dc_video = self.reg_composer[0];
        self.step_advance = match dc_video & 0x03 {
            2 => NTSC_PIXEL_FREQ / MHZ,
            _ => VGA_PIXEL_FREQ / MHZ,
        };
        self.layer_line_enable[0] = dc_video & 0x10 != 0;
        self.layer_line_enable[1] = dc_video & 0x20 != 0;
        self.sprite_line_enable = dc_video & 0x40 != 0;
    }

    fn front_porch(&self) -> (u16, u16) {
        if self.reg_composer[0] & 0x03 == 2 {
            (NTSC_FRONT_PORCH_X, NTSC_FRONT_PORCH_Y)
        } else {
            (VGA_FRONT_PORCH_X, VGA_FRONT_PORCH_Y)
        }
    }

    fn data_port_read(&mut self, port: usize, debug: bool) -> u8 {
        let value = self.io_rddata[port];
        if !debug {
            self.advance_io_addr(port);
            self.io_rddata[port] = self.space_read(self.io_addr[port]);
        }
        value
    }

    fn data_port_write(&mut self, port: usize, value: u8) {
        self.space_write(self.io_addr[port], value);
        self.advance_io_addr(port);
        self.io_rddata[port] = self.space_read(self.io_addr[port]);
    }

    fn advance_io_addr(&mut self, port: usize) {
        let inc = IO_INCREMENTS[self.io_inc[port] as usize];
        self.io_addr[port] =
            (self.io_addr[port] as i32 + inc) as u32 & (VRAM_SIZE as u32 - 1);
    }

    // ---- Video address space ----

    pub fn space_read(&self, address: u32) -> u8 {
        if address < VRAM_SIZE as u32 {
            self.vram[address as usize]
        } else {
            0
        }
    }

    pub fn space_write(&mut self, address: u32, value: u8) {
        if address >= VRAM_SIZE as u32 {
            return;
        }
        let addr = address as usize;
        self.vram[addr] = value;
        self.update_shadows(addr, value);

        match address {
            ADDR_PSG_START..ADDR_PALETTE_START => {
                self.psg[(address - ADDR_PSG_START) as usize] = value;
            }
            ADDR_PALETTE_START..ADDR_SPRDATA_START => {
                let offset = (address - ADDR_PALETTE_START) as usize;
                self.palette[offset] = value;
                let index = offset >> 1;
                let entry =
                    self.palette[index * 2] as u16 | (self.palette[index * 2 + 1] as u16) << 8;
                self.palette_rgb[index] = palette::expand_rgb(entry);
            }
            ADDR_SPRDATA_START.. => {
                let offset = (address - ADDR_SPRDATA_START) as usize;
                self.sprite_data[offset >> 3][offset & 0x07] = value;
                self.sprite_dirty[offset >> 3] = true;
            }
            _ => {}
        }

        // Keep prerendered images consistent.
        let view = VramView {
            vram: &self.vram,
            bpp1: &self.vram_1bpp,
            bpp2: &self.vram_2bpp,
            bpp4: &self.vram_4bpp,
        };
        self.layer_cache.note_vram_write(view, address);

        for i in 0..NUM_SPRITES {
            let p = &self.sprite_props[i];
            if address >= p.vram_base && address < p.vram_base + p.data_size() {
                self.sprite_props[i].invalidate();
            }
        }
    }

    #[inline]
    fn update_shadows(&mut self, addr: usize, value: u8) {
        let v = value as usize;
        let b4 = addr * 2;
        self.vram_4bpp[b4] = value >> 4;
        self.vram_4bpp[b4 + 1] = value & 0x0F;
        let b2 = addr * 4;
        self.vram_2bpp[b2] = value >> 6;
        self.vram_2bpp[b2 + 1] = value >> 4 & 0x03;
        self.vram_2bpp[b2 + 2] = value >> 2 & 0x03;
        self.vram_2bpp[b2 + 3] = value & 0x03;
        let b1 = addr * 8;
        for bit in 0..8 {
            self.vram_1bpp[b1 + bit] = (v >> (7 - bit) & 1) as u8;
        }
    }

    // ---- Raster ----

    /// Advance the beam by one CPU tick's worth of pixels. Returns true at
    /// the tick on which a new frame begins.
    pub fn step(&mut self) -> bool {
        self.scan_pos_x += self.step_advance;
        if self.scan_pos_x < SCAN_WIDTH as f32 {
            return false;
        }
        self.scan_pos_x -= SCAN_WIDTH as f32;

        let (_, porch_y) = self.front_porch();
        let y = self.scan_pos_y as i32 - porch_y as i32;
        if y >= 0 && (y as usize) < SCREEN_HEIGHT {
            self.render_line(y as u16);

            if self.ien & INT_LINE != 0 && y as u16 == self.irq_line {
                self.isr |= INT_LINE;
            }
            if y as usize == SCREEN_HEIGHT - 1 {
                if self.ien & INT_SPRCOL != 0 && self.sprite_collisions != 0 {
                    self.isr = self.isr & 0x0F | self.sprite_collisions << 4 | INT_SPRCOL;
                }
                self.sprite_collisions = 0;
            }
        }

        self.scan_pos_y += 1;
        if self.scan_pos_y as u32 == SCAN_HEIGHT {
            self.scan_pos_y = 0;
            self.frame_count += 1;
            if self.ien & INT_VSYNC != 0 {
                self.isr |= INT_VSYNC;
            }
            return true;
        }
        false
    }

    // ---- Scan-line composer ----

    fn render_line(&mut self, y: u16) {
        self.sprite_line_col.fill(0);
        self.sprite_line_z.fill(0);
        self.sprite_line_mask.fill(0);
        self.sprite_line_collisions.fill(0);

        // Sprites run even on warp skip frames so collision interrupts
        // keep frame-accurate timing.
        if self.sprite_line_enable {
            self.render_sprite_line(y);
        }

        let skip_frame = self.warp && self.frame_count & 63 != 0;
        if skip_frame || self.reg_composer[0] & 0x03 == 0 {
            return;
        }

        for layer in 0..2 {
            if self.layer_line_enable[layer] {
                self.render_layer_line(layer, y);
            }
        }

        self.composite_line(y);
    }

    fn render_layer_line(&mut self, layer: usize, y: u16) {
        if self.layer_dirty[layer] {
            let regs = &self.reg_layer[layer];
            let signature = regs[0] as u32 | (regs[1] as u32) << 8 | (regs[2] as u32) << 16;
            self.layer_props_idx[layer] = self.layer_cache.bind(layer, signature);
            self.layer_dirty[layer] = false;
        }

        let hscale = self.reg_composer[1] as u32;
        let vscale = self.reg_composer[2] as u32;
        let regs = self.reg_layer[layer];
        let view = VramView {
            vram: &self.vram,
            bpp1: &self.vram_1bpp,
            bpp2: &self.vram_2bpp,
            bpp4: &self.vram_4bpp,
        };
        let props = self.layer_cache.get_mut(self.layer_props_idx[layer]);

        if props.bitmap_mode {
            let pal = regs[4] & 0x0F;
            let depth = props.color_depth;
            let eff_y = ((y as u32 * vscale) >> 7).min(props.layerh - 1);
            let width = props.layerw;
            let row = props.backbuffer_row(view, eff_y);
            let mut xaccum = 0u32;
            for x in 0..SCREEN_WIDTH {
                let eff_x = xaccum >> 7;
                let raw = if eff_x < width { row[eff_x as usize] } else { 0 };
                self.layer_line[layer][x] = layer::bake_palette_offset(raw, pal, depth);
                xaccum += hscale;
            }
        } else {
            let hscroll = (regs[3] as u32 | (regs[4] as u32 & 0x0F) << 8) & (props.layerw - 1);
            let vscroll = regs[5] as u32 | (regs[6] as u32 & 0x0F) << 8;
            let wmask = props.layerw - 1;
            let hmask = props.layerh - 1;
            let eff_y = (((y as u32 * vscale) >> 7) + vscroll) & hmask;
            let row = props.backbuffer_row(view, eff_y);
            let mut xaccum = 0u32;
            for x in 0..SCREEN_WIDTH {
                let eff_x = ((xaccum >> 7) + hscroll) & wmask;
                self.layer_line[layer][x] = row[eff_x as usize];
                xaccum += hscale;
            }
        }
    }

    fn render_sprite_line(&mut self, y: u16) {
        for i in 0..NUM_SPRITES {
            if self.sprite_dirty[i] {
                self.sprite_props[i] = SpriteProps::decode(&self.sprite_data[i]);
                self.sprite_dirty[i] = false;
            }
        }

        let view = VramView {
            vram: &self.vram,
            bpp1: &self.vram_1bpp,
            bpp2: &self.vram_2bpp,
            bpp4: &self.vram_4bpp,
        };

        let y = y as i32;
        let mut budget = SPRITE_BUDGET;

        for i in 0..NUM_SPRITES {
            let (z, sx, sy, width, height, cmask, mode_8bpp, line_cost) = {
                let p = &self.sprite_props[i];
                (
                    p.z,
                    p.x,
                    p.y,
                    p.width as i32,
                    p.height as i32,
                    p.collision_mask,
                    p.mode_8bpp,
                    p.line_cost as i32,
                )
            };
            if z == 0 {
                continue;
            }
            if y < sy || y >= sy + height {
                continue;
            }

            // One tick for the line lookup, then pixel and word-fetch
            // ticks against the shared budget.
            budget -= 1;
            if budget <= 0 {
                break;
            }

            let row = self.sprite_props[i].row(view, (y - sy) as u32);

            if budget >= line_cost {
                budget -= line_cost;
                for c in 0..width {
                    let col = row[c as usize];
                    if col == 0 {
                        continue;
                    }
                    let sxx = sx + c;
                    if !(0..SCREEN_WIDTH as i32).contains(&sxx) {
                        continue;
                    }
                    let xi = sxx as usize;
                    let overlap = self.sprite_line_mask[xi] & cmask;
                    self.sprite_line_collisions[xi] |= overlap;
                    self.sprite_line_mask[xi] |= cmask;
                    if z > self.sprite_line_z[xi] {
                        self.sprite_line_col[xi] = col;
                        self.sprite_line_z[xi] = z;
                    }
                }
            } else {
                // Not enough budget for the whole row: pay per pixel and
                // abort mid-sprite when it runs dry.
                let word_pixels = if mode_8bpp { 8 } else { 4 };
                for c in 0..width {
                    if c % word_pixels == 0 {
                        budget -= 1;
                    }
                    budget -= 1;
                    if budget <= 0 {
                        break;
                    }
                    let col = row[c as usize];
                    if col == 0 {
                        continue;
                    }
                    let sxx = sx + c;
                    if !(0..SCREEN_WIDTH as i32).contains(&sxx) {
                        continue;
                    }
                    let xi = sxx as usize;
                    let overlap = self.sprite_line_mask[xi] & cmask;
                    self.sprite_line_collisions[xi] |= overlap;
                    self.sprite_line_mask[xi] |= cmask;
                    if z > self.sprite_line_z[xi] {
                        self.sprite_line_col[xi] = col;
                        self.sprite_line_z[xi] = z;
                    }
                }
                break;
            }
        }

        for x in 0..SCREEN_WIDTH {
            self.sprite_collisions |= self.sprite_line_collisions[x];
        }
    }

    fn composite_line(&mut self, y: u16) {
        let combo = self.reg_composer[0] >> 4 & 0x07;
        let border = self.reg_composer[3];
        let hstart = (self.reg_composer[4] as usize) << 2;
        let hstop = (self.reg_composer[5] as usize) << 2;
        let vstart = (self.reg_composer[6] as usize) << 1;
        let vstop = (self.reg_composer[7] as usize) << 1;
        let ntsc = self.reg_composer[0] & 0x03 == 2;

        let safe_x = (SCREEN_WIDTH as f32 * TITLE_SAFE_X) as usize;
        let safe_y = (SCREEN_HEIGHT as f32 * TITLE_SAFE_Y) as usize;

        let yy = y as usize;
        let row_offset = yy * SCREEN_WIDTH;

        for x in 0..SCREEN_WIDTH {
            let col = if x < hstart || x >= hstop || yy < vstart || yy >= vstop {
                border
            } else {
                let l0 = self.layer_line[0][x];
                let l1 = self.layer_line[1][x];
                let spr = self.sprite_line_col[x];
                let sz = self.sprite_line_z[x];
                match combo {
                    0 => border,
                    1 => l0,
                    2 => l1,
                    3 => {
                        if l1 != 0 { l1 } else { l0 }
                    }
                    4 => spr,
                    5 => match sz {
                        0 => l0,
                        1 => {
                            if l0 != 0 { l0 } else { spr }
                        }
                        _ => {
                            if spr != 0 { spr } else { l0 }
                        }
                    },
                    6 => match sz {
                        0 => l1,
                        1 => {
                            if l1 != 0 { l1 } else { spr }
                        }
                        _ => {
                            if spr != 0 { spr } else { l1 }
                        }
                    },
                    _ => match sz {
                        3 => {
                            if spr != 0 {
                                spr
                            } else if l1 != 0 {
                                l1
                            } else {
                                l0
                            }
                        }
                        2 => {
                            if l1 != 0 {
                                l1
                            } else if spr != 0 {
                                spr
                            } else {
                                l0
                            }
                        }
                        1 => {
                            if l1 != 0 {
                                l1
                            } else if l0 != 0 {
                                l0
                            } else {
                                spr
                            }
                        }
                        _ => {
                            if l1 != 0 { l1 } else { l0 }
                        }
                    },
                }
            };

            let mut rgb = self.palette_rgb[col as usize];
            if ntsc
                && (x < safe_x
                    || x >= SCREEN_WIDTH - safe_x
                    || yy < safe_y
                    || yy >= SCREEN_HEIGHT - safe_y)
            {
                rgb = rgb >> 2 & 0x003F_3F3F;
            }
            self.framebuffer[row_offset + x] = rgb;
        }
    }

    // ---- Serialization ----

    /// Serialize VRAM, composer, palette, layer registers, and sprite
    /// descriptors, in that order, raw little-endian.
    pub fn save(&self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(&self.vram)?;
        out.write_all(&self.reg_composer)?;
        out.write_all(&self.palette)?;
        out.write_all(&self.reg_layer[0])?;
        out.write_all(&self.reg_layer[1])?;
        for sprite in &self.sprite_data {
            out.write_all(sprite)?;
        }
        Ok(())
    }
}
