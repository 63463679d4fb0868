pub mod state;
pub use state::W65C02State;

pub mod w65c02;
pub use w65c02::{StatusFlag, W65C02};
