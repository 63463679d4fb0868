//! Layer rendering: bitmap and text modes, palette lookup, backbuffer
//! invalidation on map/tile/bitmap pokes, and scroll/scale behavior.

use vermilion_core::video::{SCREEN_WIDTH, Vera};

fn run_frame(vera: &mut Vera) {
    while !vera.step() {}
}

fn pixel(vera: &Vera, x: usize, y: usize) -> u32 {
    vera.framebuffer()[y * SCREEN_WIDTH + x]
}

/// Layer 0 in 8bpp bitmap mode with the pixel data at VRAM 0.
fn setup_bitmap_layer(vera: &mut Vera) {
    vera.write(0x0D, 0x07); // CONFIG: bitmap, 8bpp
    vera.write(0x0E, 0x00); // MAPBASE (unused in bitmap mode)
    vera.write(0x0F, 0x00); // TILEBASE: data at 0, 320 wide
    vera.write(0x09, 0x11); // DC_VIDEO: VGA output, layer 0
}

/// A 12-bit palette write through the aliased palette window shows up in
/// the composed output, nibble-replicated: entry 0x234 -> 0x00223344.
#[test]
fn test_palette_lookup_nibble_replication() {
    let mut vera = Vera::new();
    setup_bitmap_layer(&mut vera);

    // Palette entry 1 = 0x234, little-endian at 0x1FA02/3.
    vera.space_write(0x1FA02, 0x34);
    vera.space_write(0x1FA03, 0x02);
    // Pixel (0,0) = color index 1.
    vera.space_write(0x0000, 0x01);

    run_frame(&mut vera);
    assert_eq!(pixel(&vera, 0, 0), 0x0022_3344);
}

#[test]
fn test_bitmap_pokes_update_in_place() {
    let mut vera = Vera::new();
    setup_bitmap_layer(&mut vera);
    vera.space_write(0x0000, 0x01); // white (default entry 1 = 0xFFF)
    run_frame(&mut vera);
    assert_eq!(pixel(&vera, 0, 0), 0x00FF_FFFF);

    // Poke a different color; the backbuffer byte is patched, not rebuilt.
    vera.space_write(0x0000, 0x02); // default entry 2 = 0x800
    run_frame(&mut vera);
    assert_eq!(pixel(&vera, 0, 0), 0x0088_0000);
}

/// 320-wide bitmaps double horizontally at the default 1x scale only when
/// hscale is set to half; at 128 the right half falls outside the bitmap.
#[test]
fn test_bitmap_hscale_half() {
    let mut vera = Vera::new();
    setup_bitmap_layer(&mut vera);
    vera.write(0x0A, 64); // hscale = 0.5x: 320 source pixels span 640
    vera.space_write(0x0000, 0x01);

    run_frame(&mut vera);
    // Source pixel 0 covers output x 0 and 1.
    assert_eq!(pixel(&vera, 0, 0), 0x00FF_FFFF);
    assert_eq!(pixel(&vera, 1, 0), 0x00FF_FFFF);
}

// ---------------------------------------------------------------------------
// Text mode
// ---------------------------------------------------------------------------

/// Layer 0 text mode, 32x32 map at 0, 8x8 glyphs at 0x2000.
fn setup_text_layer(vera: &mut Vera) {
    vera.write(0x0D, 0x00); // CONFIG: text, 1bpp, 32x32
    vera.write(0x0E, 0x00); // MAPBASE = 0
    vera.write(0x0F, 0x10); // TILEBASE = 0x2000, 8x8
    vera.write(0x09, 0x11); // DC_VIDEO: VGA output, layer 0

    // Glyph 1: top row = 0b1000_0000.
    for i in 0..8 {
        vera.space_write(0x2008 + i, 0);
    }
    vera.space_write(0x2008, 0x80);
    // Cell (0,0): glyph 1, fg = 1, bg = 2.
    vera.space_write(0x0000, 0x01);
    vera.space_write(0x0001, 0x21);
}

#[test]
fn test_text_mode_foreground_background() {
    let mut vera = Vera::new();
    setup_text_layer(&mut vera);
    run_frame(&mut vera);
    // Set bit -> fg color 1 (0xFFF), clear bit -> bg color 2 (0x800).
    assert_eq!(pixel(&vera, 0, 0), 0x00FF_FFFF);
    assert_eq!(pixel(&vera, 1, 0), 0x0088_0000);
}

#[test]
fn test_map_poke_repaints_cell() {
    let mut vera = Vera::new();
    setup_text_layer(&mut vera);
    run_frame(&mut vera);
    assert_eq!(pixel(&vera, 0, 0), 0x00FF_FFFF);

    // Swap fg/bg in the color byte; only this cell repaints.
    vera.space_write(0x0001, 0x12);
    run_frame(&mut vera);
    assert_eq!(pixel(&vera, 0, 0), 0x0088_0000);
    assert_eq!(pixel(&vera, 1, 0), 0x00FF_FFFF);
}

#[test]
fn test_tile_data_poke_rebuilds_backbuffer() {
    let mut vera = Vera::new();
    setup_text_layer(&mut vera);
    run_frame(&mut vera);
    assert_eq!(pixel(&vera, 1, 0), 0x0088_0000);

    // Widen the glyph's top row; the whole image re-materializes.
    vera.space_write(0x2008, 0xC0);
    run_frame(&mut vera);
    assert_eq!(pixel(&vera, 1, 0), 0x00FF_FFFF);
}

#[test]
fn test_text_mode_256c_uses_full_color_byte() {
    let mut vera = Vera::new();
    setup_text_layer(&mut vera);
    vera.write(0x0D, 0x08); // T256C on
    vera.space_write(0x0001, 0x10); // fg = gray 16, bg transparent
    run_frame(&mut vera);
    // Default entry 16 = 0x000; transparent bg resolves to entry 0 too.
    assert_eq!(pixel(&vera, 0, 0), 0x0000_0000);
    assert_eq!(pixel(&vera, 1, 0), 0x0000_0000);
}

#[test]
fn test_hscroll_shifts_layer() {
    let mut vera = Vera::new();
    setup_text_layer(&mut vera);
    run_frame(&mut vera);
    assert_eq!(pixel(&vera, 0, 0), 0x00FF_FFFF);

    // Scroll 1 pixel: the fg pixel moves off x=0, bg shows instead.
    vera.write(0x10, 0x01); // HSCROLL_L
    run_frame(&mut vera);
    assert_eq!(pixel(&vera, 0, 0), 0x0088_0000);
}

#[test]
fn test_vscroll_wraps_layer_height() {
    let mut vera = Vera::new();
    setup_text_layer(&mut vera);
    // Scroll a full layer height (32 tiles x 8 = 256): output unchanged.
    vera.write(0x12, 0x00); // VSCROLL_L
    vera.write(0x13, 0x01); // VSCROLL_H = 256
    run_frame(&mut vera);
    assert_eq!(pixel(&vera, 0, 0), 0x00FF_FFFF);
}

// ---------------------------------------------------------------------------
// Tile mode
// ---------------------------------------------------------------------------

/// 2bpp tiles unpack pixel pairs in bit order: one byte holds four pixels.
#[test]
fn test_tile_mode_2bpp_unpacking() {
    let mut vera = Vera::new();
    vera.write(0x0D, 0x01); // CONFIG: 2bpp tile, 32x32
    vera.write(0x0E, 0x00); // MAPBASE = 0
    vera.write(0x0F, 0x10); // TILEBASE = 0x2000, 8x8
    vera.write(0x09, 0x11); // DC_VIDEO: VGA output, layer 0

    // Tile 1 (16 bytes): first byte = pixels 1,2,3,0; rest clear.
    let tile1 = 0x2000 + 16;
    vera.space_write(tile1, 0b0110_1100);
    for i in 1..16u32 {
        vera.space_write(tile1 + i, 0);
    }
    // Cell (0,0): tile 1, no flips, offset 0.
    vera.space_write(0x0000, 0x01);
    vera.space_write(0x0001, 0x00);

    run_frame(&mut vera);
    assert_eq!(pixel(&vera, 0, 0), 0x00FF_FFFF); // entry 1 = 0xFFF
    assert_eq!(pixel(&vera, 1, 0), 0x0088_0000); // entry 2 = 0x800
    assert_eq!(pixel(&vera, 2, 0), 0x00AA_FFEE); // entry 3 = 0xAFE
    assert_eq!(pixel(&vera, 3, 0), 0x0000_0000); // transparent
}

/// Layer 1 in 4bpp tile mode: tile 1 has a distinct first row so flips are
/// observable; the map cell selects hflip and a palette offset.
#[test]
fn test_tile_mode_flip_and_palette_offset() {
    let mut vera = Vera::new();
    // CONFIG: 4bpp tile (depth 2), 32x32 map.
    vera.write(0x14, 0x02);
    vera.write(0x15, 0x00); // MAPBASE = 0
    vera.write(0x16, 0x10); // TILEBASE = 0x2000, 8x8
    vera.write(0x09, 0x21); // DC_VIDEO: VGA output, layer 1

    // Tile 1 at 0x2000 + 32: first row pixels 1,2,3,4,5,6,7,8 (4bpp).
    let tile1 = 0x2020;
    for i in 0..4u32 {
        let lo = (i * 2 + 1) as u8;
        let hi = (i * 2 + 2) as u8;
        vera.space_write(tile1 + i, lo << 4 | hi);
    }
    for i in 4..32u32 {
        vera.space_write(tile1 + i, 0);
    }
    // Make palette entries 0x11..0x18 distinct, offset 1 selects them.
    for i in 0..8u32 {
        vera.space_write(0x1FA00 + (0x11 + i) * 2, i as u8 + 1); // 12-bit 0x00N
        vera.space_write(0x1FA00 + (0x11 + i) * 2 + 1, 0);
    }
    // Cell (0,0): tile 1, hflip, palette offset 1.
    vera.space_write(0x0000, 0x01);
    vera.space_write(0x0001, 0x14);

    run_frame(&mut vera);
    // hflip: output x=0 shows the tile's last column (pixel value 8),
    // shifted into palette bank 1 -> entry 0x18 = 0x008.
    assert_eq!(pixel(&vera, 0, 0), 0x0000_0088);
    // x=7 shows the first column (pixel 1) -> entry 0x11 = 0x001.
    assert_eq!(pixel(&vera, 7, 0), 0x0000_0011);
}
