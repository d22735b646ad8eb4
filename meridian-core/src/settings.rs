//! Persistent settings and backup register layout
//!
//! Everything that must survive deep sleep fits in the 8-word backup bank:
//! word 0 holds the bit-packed global settings, word 1 the geolocation,
//! word 2 one module-specific datum. The bank is written on resign or
//! settings change, read on boot and activate, and never cleared except by
//! explicit reset.

use crate::chime::EdgeSelector;

/// Backup word 0: global settings.
pub const SETTINGS_SLOT: u8 = 0;
/// Backup word 1: geolocation.
pub const LOCATION_SLOT: u8 = 1;
/// Backup word 2: module-specific datum.
pub const MODULE_DATA_SLOT: u8 = 2;

/// How long without input before the active module gets a timeout event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeoutInterval {
    #[default]
    Seconds60,
    Minutes2,
    Minutes5,
    Minutes30,
}

impl TimeoutInterval {
    pub const fn seconds(self) -> u32 {
        match self {
            TimeoutInterval::Seconds60 => 60,
            TimeoutInterval::Minutes2 => 120,
            TimeoutInterval::Minutes5 => 300,
            TimeoutInterval::Minutes30 => 1_800,
        }
    }

    const fn from_bits(bits: u32) -> Self {
        match bits & 0x3 {
            1 => TimeoutInterval::Minutes2,
            2 => TimeoutInterval::Minutes5,
            3 => TimeoutInterval::Minutes30,
            _ => TimeoutInterval::Seconds60,
        }
    }

    const fn to_bits(self) -> u32 {
        match self {
            TimeoutInterval::Seconds60 => 0,
            TimeoutInterval::Minutes2 => 1,
            TimeoutInterval::Minutes5 => 2,
            TimeoutInterval::Minutes30 => 3,
        }
    }
}

/// How long without input before the device drops to low-energy ticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LowEnergyInterval {
    #[default]
    Never,
    Hour1,
    Hours2,
    Hours6,
    Hours12,
    Day1,
    Days2,
    Days7,
}

impl LowEnergyInterval {
    /// Idle seconds before the transition; 0 means never.
    pub const fn seconds(self) -> u32 {
        match self {
            LowEnergyInterval::Never => 0,
            LowEnergyInterval::Hour1 => 3_600,
            LowEnergyInterval::Hours2 => 7_200,
            LowEnergyInterval::Hours6 => 21_600,
            LowEnergyInterval::Hours12 => 43_200,
            LowEnergyInterval::Day1 => 86_400,
            LowEnergyInterval::Days2 => 172_800,
            LowEnergyInterval::Days7 => 604_800,
        }
    }

    const fn from_bits(bits: u32) -> Self {
        match bits & 0x7 {
            1 => LowEnergyInterval::Hour1,
            2 => LowEnergyInterval::Hours2,
            3 => LowEnergyInterval::Hours6,
            4 => LowEnergyInterval::Hours12,
            5 => LowEnergyInterval::Day1,
            6 => LowEnergyInterval::Days2,
            7 => LowEnergyInterval::Days7,
            _ => LowEnergyInterval::Never,
        }
    }

    const fn to_bits(self) -> u32 {
        match self {
            LowEnergyInterval::Never => 0,
            LowEnergyInterval::Hour1 => 1,
            LowEnergyInterval::Hours2 => 2,
            LowEnergyInterval::Hours6 => 3,
            LowEnergyInterval::Hours12 => 4,
            LowEnergyInterval::Day1 => 5,
            LowEnergyInterval::Days2 => 6,
            LowEnergyInterval::Days7 => 7,
        }
    }
}

/// Global device settings, bit-packed into backup word 0.
///
/// Layout (LSB first): 24h mode (1), 24h toggle enable (1), alarm enabled
/// (1), hourly chime "always" override (1), chime start selector (2), chime
/// end selector (2), timezone in signed 15-minute steps (7), low-energy
/// interval (3), timeout interval (2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GlobalSettings {
    pub clock_mode_24h: bool,
    pub clock_mode_toggle: bool,
    pub alarm_enabled: bool,
    pub hourly_chime_always: bool,
    pub chime_start: EdgeSelector,
    pub chime_end: EdgeSelector,
    /// Timezone offset in 15-minute quanta (-48 = UTC-12, +56 = UTC+14).
    pub tz_quarter_hours: i8,
    pub le_interval: LowEnergyInterval,
    pub timeout_interval: TimeoutInterval,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            clock_mode_24h: false,
            clock_mode_toggle: true,
            alarm_enabled: false,
            hourly_chime_always: false,
            chime_start: EdgeSelector::Preset(0),
            chime_end: EdgeSelector::Preset(0),
            tz_quarter_hours: 0,
            le_interval: LowEnergyInterval::Never,
            timeout_interval: TimeoutInterval::Seconds60,
        }
    }
}

impl GlobalSettings {
    pub fn from_bits(bits: u32) -> Self {
        Self {
            clock_mode_24h: bits & 0x1 != 0,
            clock_mode_toggle: bits & 0x2 != 0,
            alarm_enabled: bits & 0x4 != 0,
            hourly_chime_always: bits & 0x8 != 0,
            chime_start: EdgeSelector::from_bits((bits >> 4) & 0x3),
            chime_end: EdgeSelector::from_bits((bits >> 6) & 0x3),
            tz_quarter_hours: sign_extend_7(((bits >> 8) & 0x7F) as u8),
            le_interval: LowEnergyInterval::from_bits(bits >> 15),
            timeout_interval: TimeoutInterval::from_bits(bits >> 18),
        }
    }

    pub fn to_bits(self) -> u32 {
        (self.clock_mode_24h as u32)
            | (self.clock_mode_toggle as u32) << 1
            | (self.alarm_enabled as u32) << 2
            | (self.hourly_chime_always as u32) << 3
            | self.chime_start.to_bits() << 4
            | self.chime_end.to_bits() << 6
            | ((self.tz_quarter_hours as u8 as u32) & 0x7F) << 8
            | self.le_interval.to_bits() << 15
            | self.timeout_interval.to_bits() << 18
    }

    /// Active timezone offset in seconds from UTC.
    pub fn tz_offset_seconds(self) -> i32 {
        self.tz_quarter_hours as i32 * 900
    }
}

const fn sign_extend_7(raw: u8) -> i8 {
    ((raw << 1) as i8) >> 1
}

/// Stored observer location, packed into backup word 1 as latitude
/// centidegrees in the low half and longitude centidegrees in the high
/// half. An all-zero word means "unset".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GeoLocation {
    pub latitude_centidegrees: i16,
    pub longitude_centidegrees: i16,
}

impl GeoLocation {
    /// Decode a backup word; `None` when the location was never set.
    pub fn from_bits(bits: u32) -> Option<Self> {
        if bits == 0 {
            return None;
        }
        Some(Self {
            latitude_centidegrees: bits as u16 as i16,
            longitude_centidegrees: (bits >> 16) as u16 as i16,
        })
    }

    pub fn to_bits(self) -> u32 {
        (self.latitude_centidegrees as u16 as u32)
            | ((self.longitude_centidegrees as u16 as u32) << 16)
    }

    pub fn latitude_degrees(self) -> f64 {
        self.latitude_centidegrees as f64 / 100.0
    }

    pub fn longitude_degrees(self) -> f64 {
        self.longitude_centidegrees as f64 / 100.0
    }
}
