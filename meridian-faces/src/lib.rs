//! Watch face modules for the Meridian wristwatch firmware
//!
//! Each face implements [`meridian_core::runtime::Module`] and owns the
//! display while active. Faces are registered with the runtime in
//! navigation order; the board crate decides which faces a build carries.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod clock;
pub mod set_time;

pub use clock::ClockFace;
pub use set_time::SetTimeFace;
