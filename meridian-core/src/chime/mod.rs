//! Hourly chime window resolution
//!
//! The hourly time signal is only allowed to sound inside a window of
//! hours. Each window edge is selected independently: either an index into
//! a small preset table, or "derive astronomically" - sunrise for the
//! start edge, sunset for the end edge, computed for the stored observer
//! location. Missing location data or an unsolvable date (polar day/night)
//! degrades the affected edge to "no constraint"; it is never an error.

pub mod solar;

use crate::settings::GeoLocation;
use crate::time::PackedTimestamp;

/// Preset start hours: all day, from 6:00, from 8:00.
pub const CHIME_START_HOURS: [u8; 3] = [0, 6, 8];

/// Preset end hours: end of day, until 22:00, until 18:00.
pub const CHIME_END_HOURS: [u8; 3] = [24, 22, 18];

/// Selector bit value meaning "derive astronomically".
const SOLAR_SENTINEL: u32 = 3;

/// How one window edge is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeSelector {
    /// Index into the preset table for this edge.
    Preset(u8),
    /// Sunrise (start edge) or sunset (end edge).
    Solar,
}

impl EdgeSelector {
    /// Decode the two-bit settings field.
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 0x3 {
            SOLAR_SENTINEL => EdgeSelector::Solar,
            preset => EdgeSelector::Preset(preset as u8),
        }
    }

    pub const fn to_bits(self) -> u32 {
        match self {
            EdgeSelector::Preset(index) => index as u32 & 0x3,
            EdgeSelector::Solar => SOLAR_SENTINEL,
        }
    }
}

/// End-of-day sentinel hour. On either edge it imposes no constraint: an
/// end of 24 keeps the window open through the last hour, and a start of
/// 24 only ever arises from remapping midnight, a vacuous lower bound.
pub const END_OF_DAY: u8 = 24;

/// A resolved hour range. `None` edges impose no constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChimeWindow {
    pub start: Option<u8>,
    pub end: Option<u8>,
}

impl ChimeWindow {
    /// Whether the signal may sound during `hour` (0-23).
    pub fn contains(self, hour: u8) -> bool {
        if let Some(start) = self.start {
            if start < END_OF_DAY && hour < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if hour >= end {
                return false;
            }
        }
        true
    }
}

/// Resolve the chime window for the current local date.
///
/// Preset edges always win over their astronomical counterparts. When both
/// edges are presets the solver is never invoked and the table values are
/// returned verbatim. On the solar path, a resulting hour of exactly 0 is
/// remapped to 24 so the range tests treat midnight as an upper bound.
pub fn resolve(
    local_now: PackedTimestamp,
    tz_offset_seconds: i32,
    start_selector: EdgeSelector,
    end_selector: EdgeSelector,
    location: Option<GeoLocation>,
) -> ChimeWindow {
    let mut start = match start_selector {
        EdgeSelector::Preset(index) => {
            Some(CHIME_START_HOURS[index as usize % CHIME_START_HOURS.len()])
        }
        EdgeSelector::Solar => None,
    };
    let mut end = match end_selector {
        EdgeSelector::Preset(index) => {
            Some(CHIME_END_HOURS[index as usize % CHIME_END_HOURS.len()])
        }
        EdgeSelector::Solar => None,
    };

    if start.is_some() && end.is_some() {
        return ChimeWindow { start, end };
    }

    let Some(location) = location else {
        // No stored observer position: the solar edge stays unresolved.
        return ChimeWindow { start, end };
    };

    let utc = local_now.to_zone(-tz_offset_seconds);
    let Some((rise, set)) = solar::sun_rise_set(
        utc.year(),
        utc.month(),
        utc.day(),
        location.longitude_degrees(),
        location.latitude_degrees(),
    ) else {
        // Polar day or night: no rise/set exists for this date.
        return ChimeWindow { start, end };
    };

    let tz_hours = tz_offset_seconds as f64 / 3_600.0;
    if start.is_none() {
        // Start edge truncates: a 6:20 sunrise opens the window at 6.
        start = Some(floor_hour(rise + tz_hours));
    }
    if end.is_none() {
        // End edge rounds on a 30-minute threshold: an 18:31 sunset keeps
        // the window open through 18, closing at 19.
        end = Some(round_hour(set + tz_hours));
    }

    ChimeWindow {
        start: start.map(remap_midnight),
        end: end.map(remap_midnight),
    }
}

/// Wrap fractional hours into [0, 24).
fn wrap_day(fractional_hours: f64) -> f64 {
    fractional_hours - libm::floor(fractional_hours / 24.0) * 24.0
}

fn floor_hour(fractional_hours: f64) -> u8 {
    wrap_day(fractional_hours) as u8
}

fn round_hour(fractional_hours: f64) -> u8 {
    let wrapped = wrap_day(fractional_hours);
    let hour = wrapped as u8;
    if wrapped - hour as f64 >= 0.5 {
        (hour + 1) % 24
    } else {
        hour
    }
}

fn remap_midnight(hour: u8) -> u8 {
    if hour == 0 {
        END_OF_DAY
    } else {
        hour
    }
}
