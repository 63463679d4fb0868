pub mod bus;
pub mod machine;

pub use bus::{Bus, InterruptState};
pub use machine::Machine;
