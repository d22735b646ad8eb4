//! Minimal-redraw clock rendering
//!
//! Every LCD segment write costs power, so the renderer compares the
//! current timestamp against the previously displayed one and writes only
//! the cells at the finest granularity that actually changed. The packed
//! timestamp's bit order makes the comparison a pair of shifts; see
//! [`crate::time::PackedTimestamp::same_prefix`].
//!
//! Display layout, ten character cells:
//!
//! ```text
//! offset  0 1 | 2 3 | 4 5 | 6 7 | 8 9
//! field   WD  | day | hr  | min | sec
//! ```

use core::fmt::Write;

use heapless::String;

use crate::time::{Granularity, PackedTimestamp};
use crate::traits::display::{DisplaySink, Indicator};

/// Character cell where the seconds glyphs start.
const SECONDS_OFFSET: u8 = 8;
/// Character cell where the minutes glyphs start.
const MINUTES_OFFSET: u8 = 6;

/// Which update path a render took. Exposed so callers (and tests) can
/// verify the minimal-write contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderPath {
    /// Only the two seconds glyphs were written.
    Seconds,
    /// The four minute and second glyphs were written.
    MinutesSeconds,
    /// Full reformat of all ten cells.
    Full,
}

/// Render `current`, writing only what differs from `previous`.
///
/// Pass [`PackedTimestamp::INVALID`] as `previous` to force the full path;
/// modules do this on activate so a freshly visible display is rebuilt
/// from scratch.
pub fn render_clock(
    display: &mut dyn DisplaySink,
    current: PackedTimestamp,
    previous: PackedTimestamp,
    mode_24h: bool,
) -> RenderPath {
    if current.same_prefix(previous, Granularity::Minute) {
        // Everything above seconds is unchanged; touch two cells only.
        let mut buf: String<2> = String::new();
        let _ = write!(buf, "{:02}", current.second());
        display.write_str(SECONDS_OFFSET, &buf);
        RenderPath::Seconds
    } else if current.same_prefix(previous, Granularity::Hour) {
        let mut buf: String<4> = String::new();
        let _ = write!(buf, "{:02}{:02}", current.minute(), current.second());
        display.write_str(MINUTES_OFFSET, &buf);
        RenderPath::MinutesSeconds
    } else {
        render_full(display, current, mode_24h);
        RenderPath::Full
    }
}

/// Full reformat of weekday, day, hour, minute, second.
fn render_full(display: &mut dyn DisplaySink, current: PackedTimestamp, mode_24h: bool) {
    let hour = display_hour(display, current, mode_24h);
    let mut buf: String<10> = String::new();
    let _ = write!(
        buf,
        "{}{:2}{:2}{:02}{:02}",
        current.weekday_code(),
        current.day(),
        hour,
        current.minute(),
        current.second()
    );
    display.write_str(0, &buf);
}

/// Reduced field set for low-energy ticking: seconds are blanked so the
/// 1 Hz seconds churn stops costing segment writes.
pub fn render_low_energy(display: &mut dyn DisplaySink, current: PackedTimestamp, mode_24h: bool) {
    let hour = display_hour(display, current, mode_24h);
    let mut buf: String<10> = String::new();
    let _ = write!(
        buf,
        "{}{:2}{:2}{:02}  ",
        current.weekday_code(),
        current.day(),
        hour,
        current.minute()
    );
    display.write_str(0, &buf);
}

/// Hour as displayed: modulo-12 with zero mapped to 12 in 12-hour mode,
/// toggling the meridiem indicator as a side effect.
fn display_hour(display: &mut dyn DisplaySink, current: PackedTimestamp, mode_24h: bool) -> u8 {
    let hour = current.hour();
    if mode_24h {
        return hour;
    }
    display.indicate(Indicator::Pm, hour >= 12);
    match hour % 12 {
        0 => 12,
        h => h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::RecordingDisplay;

    fn ts(hour: u8, minute: u8, second: u8) -> PackedTimestamp {
        PackedTimestamp::new(2025, 8, 23, hour, minute, second)
    }

    #[test]
    fn test_seconds_only_change_writes_two_glyphs() {
        let mut display = RecordingDisplay::new();
        let path = render_clock(&mut display, ts(12, 30, 46), ts(12, 30, 45), true);
        assert_eq!(path, RenderPath::Seconds);
        assert_eq!(display.writes, [(8, "46".into())]);
    }

    #[test]
    fn test_minute_change_writes_four_glyphs() {
        let mut display = RecordingDisplay::new();
        let path = render_clock(&mut display, ts(12, 31, 0), ts(12, 30, 59), true);
        assert_eq!(path, RenderPath::MinutesSeconds);
        assert_eq!(display.writes, [(6, "3100".into())]);
    }

    #[test]
    fn test_hour_rollover_takes_full_path() {
        let mut display = RecordingDisplay::new();
        let path = render_clock(&mut display, ts(13, 0, 0), ts(12, 59, 59), true);
        assert_eq!(path, RenderPath::Full);
        assert_eq!(display.writes.len(), 1);
        let (offset, text) = &display.writes[0];
        assert_eq!(*offset, 0);
        assert_eq!(text.as_str(), "SA23130000");
    }

    #[test]
    fn test_invalid_previous_forces_full_path() {
        let mut display = RecordingDisplay::new();
        let path = render_clock(&mut display, ts(12, 30, 45), PackedTimestamp::INVALID, true);
        assert_eq!(path, RenderPath::Full);
    }

    #[test]
    fn test_12h_mode_maps_midnight_to_12_without_pm() {
        let mut display = RecordingDisplay::new();
        render_clock(&mut display, ts(0, 5, 0), PackedTimestamp::INVALID, false);
        let (_, text) = &display.writes[0];
        assert_eq!(text.as_str(), "SA23120500");
        assert!(!display.indicator(Indicator::Pm));
    }

    #[test]
    fn test_12h_mode_afternoon_sets_pm() {
        let mut display = RecordingDisplay::new();
        render_clock(&mut display, ts(13, 5, 0), PackedTimestamp::INVALID, false);
        let (_, text) = &display.writes[0];
        assert_eq!(text.as_str(), "SA23 10500");
        assert!(display.indicator(Indicator::Pm));
    }

    #[test]
    fn test_low_energy_blanks_seconds() {
        let mut display = RecordingDisplay::new();
        render_low_energy(&mut display, ts(13, 5, 42), true);
        let (_, text) = &display.writes[0];
        assert_eq!(text.as_str(), "SA231305  ");
    }
}
