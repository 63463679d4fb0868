pub mod ps2;
pub mod rtc;
pub mod via;

pub use ps2::{Ps2Mouse, Ps2Port};
pub use rtc::Rtc;
pub use via::Via6522;
