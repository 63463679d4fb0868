use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, TextureCreator};
use sdl2::video::{Window, WindowContext};

use crate::config::Quality;

pub struct Video {
    canvas: Canvas<Window>,
    texture_creator: TextureCreator<WindowContext>,
    width: u32,
    height: u32,
    /// Set when texture upload fails; presentation shuts off but the
    /// emulation keeps running.
    disabled: bool,
}

impl Video {
    /// Create an SDL window and renderer for the given native resolution.
    /// Startup failures here are fatal.
    pub fn new(
        sdl_video: &sdl2::VideoSubsystem,
        title: &str,
        native_width: u32,
        native_height: u32,
        scale: u32,
        quality: Quality,
    ) -> Self {
        sdl2::hint::set("SDL_RENDER_SCALE_QUALITY", quality.hint());

        let window = sdl_video
            .window(title, native_width * scale, native_height * scale)
            .position_centered()
            .resizable()
            .build()
            .expect("Failed to create window");

        let mut canvas = window
            .into_canvas()
            .accelerated()
            .present_vsync()
            .build()
            .expect("Failed to create canvas");
        canvas
            .set_logical_size(native_width, native_height)
            .expect("Failed to set logical size");

        let texture_creator = canvas.texture_creator();

        Self {
            canvas,
            texture_creator,
            width: native_width,
            height: native_height,
            disabled: false,
        }
    }

    /// Upload an RGB24 framebuffer and present it.
    pub fn present(&mut self, framebuffer: &[u8]) {
        if self.disabled {
            return;
        }

        let texture = self.texture_creator.create_texture_streaming(
            PixelFormatEnum::RGB24,
            self.width,
            self.height,
        );
        let mut texture = match texture {
            Ok(t) => t,
            Err(e) => {
                tracing::error!("texture creation failed, disabling video output: {e}");
                self.disabled = true;
                return;
            }
        };

        if let Err(e) = texture.update(None, framebuffer, self.width as usize * 3) {
            tracing::error!("texture update failed, disabling video output: {e}");
            self.disabled = true;
            return;
        }

        self.canvas.clear();
        if self.canvas.copy(&texture, None, None).is_err() {
            self.disabled = true;
            return;
        }
        self.canvas.present();
    }
}
