use sdl2::event::Event;

use vermilion_core::core::machine::Machine;

use crate::config::Quality;
use crate::input;
use crate::video::Video;

pub fn run(machine: &mut dyn Machine, scale: u32, quality: Quality) {
    let sdl_context = sdl2::init().expect("Failed to initialize SDL2");
    let sdl_video = sdl_context.video().expect("Failed to init SDL video");

    let (width, height) = machine.display_size();
    let mut video = Video::new(&sdl_video, "Vermilion", width, height, scale, quality);
    let mut event_pump = sdl_context.event_pump().expect("Failed to get event pump");

    let mut framebuffer = vec![0u8; (width * height * 3) as usize];

    'main: loop {
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => break 'main,

                Event::KeyDown {
                    scancode: Some(sc),
                    repeat: false,
                    ..
                } => {
                    if let Some((code, extended)) = input::translate(sc) {
                        machine.key_event(code, extended, true);
                    }
                }

                Event::KeyUp {
                    scancode: Some(sc), ..
                } => {
                    if let Some((code, extended)) = input::translate(sc) {
                        machine.key_event(code, extended, false);
                    }
                }

                Event::MouseMotion { xrel, yrel, .. } => {
                    machine.mouse_motion(xrel, yrel);
                }

                Event::MouseButtonDown { mouse_btn, .. } => {
                    if let Some(button) = input::mouse_button(mouse_btn) {
                        machine.mouse_button(button, true);
                    }
                }

                Event::MouseButtonUp { mouse_btn, .. } => {
                    if let Some(button) = input::mouse_button(mouse_btn) {
                        machine.mouse_button(button, false);
                    }
                }

                _ => {}
            }
        }

        machine.run_frame();

        machine.render_frame(&mut framebuffer);
        video.present(&framebuffer);

        // Frame pacing comes from VSync on present.
    }
}
