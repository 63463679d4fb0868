pub mod core;
pub mod cpu;
pub mod device;
pub mod video;

pub mod prelude {
    pub use crate::core::machine::Machine;
    pub use crate::core::{Bus, bus::InterruptState};
    pub use crate::cpu::W65C02;
    pub use crate::video::Vera;
}
