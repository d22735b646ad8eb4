//! Hardware abstraction traits
//!
//! Narrow seams the core logic talks through. Board crates implement these
//! against real registers; host tests implement them with recording doubles.

pub mod display;
pub mod platform;
pub mod rtc;

pub use display::{DisplaySink, Indicator};
pub use platform::{BackupRegisters, Peripheral, PlatformPower, SleepMode};
pub use rtc::Rtc;
