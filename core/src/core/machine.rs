use std::io;

/// Machine-agnostic interface for emulated systems.
///
/// Each board implements this trait to provide a uniform surface for the
/// frontend. The frontend is a pure presentation shell that does not know
/// about specific hardware (banked memory, video registers, PS/2 wiring).
pub trait Machine {
    /// Native display resolution as (width, height) in pixels.
    fn display_size(&self) -> (u32, u32);

    /// Run one frame of emulation (advance the clock until the video
    /// raster wraps to a new frame).
    fn run_frame(&mut self);

    /// Render the current video state into an RGB24 pixel buffer.
    ///
    /// The buffer must be at least `width * height * 3` bytes (from
    /// `display_size()`). Pixels are stored left-to-right, top-to-bottom,
    /// 3 bytes per pixel (R, G, B).
    fn render_frame(&self, buffer: &mut [u8]);

    /// Feed a keyboard event as a PS/2 set-2 scancode. `extended` selects
    /// the 0xE0-prefixed code page. Called per host key event; the machine
    /// queues the resulting serial traffic.
    fn key_event(&mut self, scancode: u8, extended: bool, pressed: bool);

    /// Feed relative mouse motion in host pixels.
    fn mouse_motion(&mut self, dx: i32, dy: i32);

    /// Feed a mouse button transition (0 = left, 1 = right, 2 = middle).
    fn mouse_button(&mut self, button: u8, pressed: bool);

    /// Reset the machine to its initial power-on state.
    fn reset(&mut self);

    /// Whether guest code requested a memory dump on exit (emulator
    /// control page). Boards without the feature return false.
    fn wants_dump_on_exit(&self) -> bool {
        false
    }

    /// Dump machine RAM to a writer (for the save-on-exit feature).
    fn dump_ram(&self, out: &mut dyn io::Write) -> io::Result<()> {
        let _ = out;
        Ok(())
    }
}
