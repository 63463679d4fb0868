//! Layer properties cache and map backbuffer prerendering.
//!
//! A layer's first three registers (CONFIG, MAPBASE, TILEBASE) form its
//! signature. For each signature seen, a `LayerProps` record caches the
//! decoded geometry and a fully prerendered indexed-color image of the
//! whole map (or bitmap), so the per-scanline cost reduces to one indexed
//! fetch per output pixel. The records live in a bounded pool; a register
//! write that changes a signature re-binds the layer to a pooled record
//! instead of rebuilding the backbuffer.

use super::VRAM_SIZE;

const POOL_CAPACITY: usize = 16;

/// Read-only view over primary VRAM and its pre-expanded shadows.
#[derive(Clone, Copy)]
pub(crate) struct VramView<'a> {
    pub vram: &'a [u8],
    pub bpp1: &'a [u8],
    pub bpp2: &'a [u8],
    pub bpp4: &'a [u8],
}

impl<'a> VramView<'a> {
    /// Fetch the pixel at `pixel_index` counted from VRAM address 0 in the
    /// given depth, wrapping at the VRAM boundary.
    #[inline]
    pub(crate) fn pixel(&self, depth_log2: u8, pixel_index: usize) -> u8 {
        match depth_log2 {
            0 => self.bpp1[pixel_index & (VRAM_SIZE * 8 - 1)],
            1 => self.bpp2[pixel_index & (VRAM_SIZE * 4 - 1)],
            2 => self.bpp4[pixel_index & (VRAM_SIZE * 2 - 1)],
            _ => self.vram[pixel_index & (VRAM_SIZE - 1)],
        }
    }
}

/// Decoded geometry and prerendered backbuffer for one layer signature.
pub(crate) struct LayerProps {
    pub signature: u32,
    last_used: u64,

    pub color_depth: u8, // log2 bits per pixel
    pub map_base: u32,
    pub tile_base: u32,

    pub text_mode: bool,
    pub text_mode_256c: bool,
    pub tile_mode: bool,
    pub bitmap_mode: bool,

    pub mapw_log2: u8,
    pub maph_log2: u8,
    pub mapw: u32,
    pub maph: u32,
    pub tilew: u32,
    pub tileh: u32,
    pub tilew_log2: u8,
    pub tileh_log2: u8,

    /// Full layer size in pixels (map modes: mapw*tilew by maph*tileh,
    /// both powers of two; bitmap mode: tilew by SCREEN_HEIGHT).
    pub layerw: u32,
    pub layerh: u32,

    /// Bytes per tile (map modes).
    pub tile_size: u32,

    /// Whole-map indexed-color image, `layerw * layerh` bytes once built.
    backbuffer: Vec<u8>,
    backbuffer_valid: bool,
}

impl LayerProps {
    pub(crate) fn decode(signature: u32) -> Self {
        let config = (signature & 0xFF) as u8;
        let mapbase = (signature >> 8 & 0xFF) as u8;
        let tilebase = (signature >> 16 & 0xFF) as u8;

        let color_depth = config & 0x03;
        let bitmap_mode = config & 0x04 != 0;
        let text_mode = color_depth == 0 && !bitmap_mode;
        let tile_mode = !bitmap_mode && !text_mode;
        let text_mode_256c = config & 0x08 != 0;

        let map_base = (mapbase as u32) << 9;
        let tile_base = ((tilebase & 0xFC) as u32) << 9;

        let (mapw_log2, maph_log2, tilew_log2, tileh_log2);
        let (tilew, tileh);
        if bitmap_mode {
            mapw_log2 = 0;
            maph_log2 = 0;
            tilew_log2 = 0;
            tileh_log2 = 0;
            tilew = if tilebase & 1 != 0 { 640 } else { 320 };
            tileh = super::SCREEN_HEIGHT as u32;
        } else {
            mapw_log2 = 5 + (config >> 4 & 0x03);
            maph_log2 = 5 + (config >> 6 & 0x03);
            tilew_log2 = 3 + (tilebase & 0x01);
            tileh_log2 = 3 + (tilebase >> 1 & 0x01);
            tilew = 1 << tilew_log2;
            tileh = 1 << tileh_log2;
        }

        let mapw = 1u32 << mapw_log2;
        let maph = 1u32 << maph_log2;
        let (layerw, layerh) = if bitmap_mode {
            (tilew, tileh)
        } else {
            (mapw << tilew_log2, maph << tileh_log2)
        };

        let tile_size = (tilew * tileh) >> (3 - color_depth);

        Self {
            signature,
            last_used: 0,
            color_depth,
            map_base,
            tile_base,
            text_mode,
            text_mode_256c,
            tile_mode,
            bitmap_mode,
            mapw_log2,
            maph_log2,
            mapw,
            maph,
            tilew,
            tileh,
            tilew_log2,
            tileh_log2,
            layerw,
            layerh,
            tile_size,
            backbuffer: Vec::new(),
            backbuffer_valid: false,
        }
    }

    /// Size of the tile map in bytes (2 bytes per cell).
    #[inline]
    fn map_size(&self) -> u32 {
        2 << (self.mapw_log2 + self.maph_log2)
    }

    /// Extent of tile data the map can reference: 1024 tiles in tile mode,
    /// 256 glyphs in text mode, the whole bitmap in bitmap mode.
    #[inline]
    fn tile_data_size(&self) -> u32 {
        if self.bitmap_mode {
            (self.tilew * self.tileh) >> (3 - self.color_depth)
        } else if self.tile_mode {
            self.tile_size * 1024
        } else {
            self.tile_size * 256
        }
    }

    /// One row of the prerendered image. Build on first use.
    pub(crate) fn backbuffer_row(&mut self, view: VramView<'_>, y: u32) -> &[u8] {
        self.ensure_backbuffer(view);
        let w = self.layerw as usize;
        let start = y as usize * w;
        &self.backbuffer[start..start + w]
    }

    fn ensure_backbuffer(&mut self, view: VramView<'_>) {
        if self.backbuffer_valid {
            return;
        }
        let size = (self.layerw * self.layerh) as usize;
        if self.backbuffer.len() != size {
            self.backbuffer = vec![0; size];
        }
        if self.bitmap_mode {
            self.paint_bitmap(view);
        } else {
            for cy in 0..self.maph {
                for cx in 0..self.mapw {
                    self.paint_cell(view, cx, cy);
                }
            }
        }
        self.backbuffer_valid = true;
    }

    fn paint_bitmap(&mut self, view: VramView<'_>) {
        let base_pixel = (self.tile_base as usize) << (3 - self.color_depth);
        for y in 0..self.layerh as usize {
            let row = y * self.layerw as usize;
            for x in 0..self.layerw as usize {
                self.backbuffer[row + x] =
                    view.pixel(self.color_depth, base_pixel + row + x);
            }
        }
    }

    /// Re-materialize one map cell (tilew x tileh pixels) from VRAM.
    fn paint_cell(&mut self, view: VramView<'_>, cx: u32, cy: u32) {
        let entry_addr =
            (self.map_base + (((cy << self.mapw_log2) + cx) << 1)) as usize & (VRAM_SIZE - 1);
        let b0 = view.vram[entry_addr];
        let b1 = view.vram[(entry_addr + 1) & (VRAM_SIZE - 1)];

        let dest_x = cx << self.tilew_log2;
        let dest_y = cy << self.tileh_log2;

        if self.text_mode {
            let glyph = b0 as u32;
            let (fg, bg) = if self.text_mode_256c {
                (b1, 0)
            } else {
                (b1 & 0x0F, b1 >> 4)
            };
            let base_pixel = ((self.tile_base as usize) << 3)
                + (glyph * self.tilew * self.tileh) as usize;
            for r in 0..self.tileh {
                let src = base_pixel + (r * self.tilew) as usize;
                let dst = ((dest_y + r) * self.layerw + dest_x) as usize;
                for c in 0..self.tilew as usize {
                    let bit = view.pixel(0, src + c);
                    self.backbuffer[dst + c] = if bit != 0 { fg } else { bg };
                }
            }
        } else {
            let index = (b0 as u32 | (b1 as u32 & 0x03) << 8) & 0x3FF;
            let hflip = b1 & 0x04 != 0;
            let vflip = b1 & 0x08 != 0;
            let pal = b1 >> 4;
            let base_pixel = ((self.tile_base as usize) << (3 - self.color_depth))
                + (index * self.tilew * self.tileh) as usize;
            for r in 0..self.tileh {
                let src_r = if vflip { self.tileh - 1 - r } else { r };
                let src = base_pixel + (src_r * self.tilew) as usize;
                let dst = ((dest_y + r) * self.layerw + dest_x) as usize;
                for c in 0..self.tilew {
                    let src_c = if hflip { self.tilew - 1 - c } else { c } as usize;
                    let raw = view.pixel(self.color_depth, src + src_c);
                    self.backbuffer[dst + c as usize] = bake_palette_offset(raw, pal, self.color_depth);
                }
            }
        }
    }

    /// React to a VRAM write. Map pokes repaint the affected cell in place;
    /// tile-data pokes in map modes discard the image (rebuilt on the next
    /// line that needs it); bitmap pokes update the touched pixels.
    fn note_vram_write(&mut self, view: VramView<'_>, addr: u32) {
        if !self.backbuffer_valid {
            return;
        }

        if self.bitmap_mode {
            if addr >= self.tile_base && addr < self.tile_base + self.tile_data_size() {
                let rel = (addr - self.tile_base) as usize;
                let ppb = 8usize >> self.color_depth;
                let first = rel * ppb;
                let base_pixel = (self.tile_base as usize) << (3 - self.color_depth);
                for n in 0..ppb {
                    if first + n < self.backbuffer.len() {
                        self.backbuffer[first + n] =
                            view.pixel(self.color_depth, base_pixel + first + n);
                    }
                }
            }
            return;
        }

        if addr >= self.map_base && addr < self.map_base + self.map_size() {
            let cell = (addr - self.map_base) >> 1;
            let cx = cell & (self.mapw - 1);
            let cy = cell >> self.mapw_log2;
            self.paint_cell(view, cx, cy);
        }
        if addr >= self.tile_base && addr < self.tile_base + self.tile_data_size() {
            self.backbuffer_valid = false;
        }
    }
}

/// Per-depth palette-offset bake. Index 0 stays 0 so transparency survives
/// the offset; 8bpp uses the identity mapping.
#[inline]
pub(crate) fn bake_palette_offset(raw: u8, pal: u8, color_depth: u8) -> u8 {
    if color_depth == 3 || raw == 0 {
        raw
    } else {
        pal << 4 | raw
    }
}

/// Bounded pool of `LayerProps`, keyed by signature, with use-counter
/// eviction. The two entries currently bound to layers are never evicted.
pub(crate) struct LayerCache {
    pool: Vec<LayerProps>,
    tick: u64,
    current: [Option<usize>; 2],
}

impl LayerCache {
    pub(crate) fn new() -> Self {
        Self {
            pool: Vec::with_capacity(POOL_CAPACITY),
            tick: 0,
            current: [None; 2],
        }
    }

    pub(crate) fn clear(&mut self) {
        self.pool.clear();
        self.tick = 0;
        self.current = [None; 2];
    }

    /// Bind `layer` to the record for `signature`, reusing a pooled record
    /// when one matches, evicting the least-recently-used otherwise.
    pub(crate) fn bind(&mut self, layer: usize, signature: u32) -> usize {
        self.tick += 1;

        if let Some(idx) = self.pool.iter().position(|p| p.signature == signature) {
            self.pool[idx].last_used = self.tick;
            self.current[layer] = Some(idx);
            return idx;
        }

        let idx = if self.pool.len() < POOL_CAPACITY {
            self.pool.push(LayerProps::decode(signature));
            self.pool.len() - 1
        } else {
            let other = self.current[1 - layer];
            let victim = self
                .pool
                .iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != other)
                .min_by_key(|(_, p)| p.last_used)
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.pool[victim] = LayerProps::decode(signature);
            victim
        };
        self.pool[idx].last_used = self.tick;
        self.current[layer] = Some(idx);
        idx
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, idx: usize) -> &mut LayerProps {
        &mut self.pool[idx]
    }

    /// Propagate a VRAM write to every pooled record (cached records must
    /// stay consistent so a later re-bind can trust their backbuffers).
    pub(crate) fn note_vram_write(&mut self, view: VramView<'_>, addr: u32) {
        for props in &mut self.pool {
            props.note_vram_write(view, addr);
        }
    }
}
