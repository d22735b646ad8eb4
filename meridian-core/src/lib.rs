//! Board-agnostic runtime core for the Meridian wristwatch firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Bit-packed RTC timestamp and prefix comparison
//! - Minimal-redraw clock rendering
//! - Hourly chime window resolution (preset tables or sunrise/sunset)
//! - Power state control (active / low-energy / deep-sleep / backup)
//! - Module life-cycle runtime and event dispatch
//! - Hardware abstraction traits (display, RTC, platform power)

#![no_std]
#![deny(unsafe_code)]

#[cfg(any(test, feature = "testkit"))]
extern crate std;

pub mod chime;
pub mod power;
pub mod render;
pub mod runtime;
pub mod settings;
pub mod time;
pub mod traits;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
