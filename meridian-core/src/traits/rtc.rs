//! Real-time-clock seam

use crate::time::PackedTimestamp;

/// The calendar RTC. Keeps local time; zone math happens in core.
pub trait Rtc {
    fn now(&self) -> PackedTimestamp;
    fn set(&mut self, timestamp: PackedTimestamp);
}
