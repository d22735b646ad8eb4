//! Bit-packed calendar timestamp
//!
//! The RTC hands us date and time as a single 32-bit register. Fields are
//! ordered most- to least-significant: year offset, month, day, hour,
//! minute, second. The bit order matches display granularity exactly, so
//! shifting off the low bits compares "everything at or above" a field in
//! one integer operation. That property is what the minimal-redraw renderer
//! is built on; see [`PackedTimestamp::same_prefix`].

/// All year offsets count from this year. A 6-bit offset covers 2020-2083.
pub const REFERENCE_YEAR: u16 = 2020;

const SECOND_SHIFT: u32 = 0;
const MINUTE_SHIFT: u32 = 6;
const HOUR_SHIFT: u32 = 12;
const DAY_SHIFT: u32 = 17;
const MONTH_SHIFT: u32 = 22;
const YEAR_SHIFT: u32 = 26;

const SECOND_MASK: u32 = 0x3F;
const MINUTE_MASK: u32 = 0x3F;
const HOUR_MASK: u32 = 0x1F;
const DAY_MASK: u32 = 0x1F;
const MONTH_MASK: u32 = 0x0F;
const YEAR_MASK: u32 = 0x3F;

/// Two-character weekday codes, indexed Sunday-first.
const WEEKDAY_CODES: [&str; 7] = ["SU", "MO", "TU", "WE", "TH", "FR", "SA"];

/// Field granularity for prefix comparison, finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Granularity {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl Granularity {
    /// Number of low bits to discard so only this field and coarser remain.
    const fn shift(self) -> u32 {
        match self {
            Granularity::Second => SECOND_SHIFT,
            Granularity::Minute => MINUTE_SHIFT,
            Granularity::Hour => HOUR_SHIFT,
            Granularity::Day => DAY_SHIFT,
            Granularity::Month => MONTH_SHIFT,
            Granularity::Year => YEAR_SHIFT,
        }
    }
}

/// A calendar date and time packed into one 32-bit value.
///
/// Two views exist over the same register: an ordered integer for prefix
/// comparison, and named fields for formatting. No range validation is
/// performed; callers own wraparound via modular arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PackedTimestamp(u32);

impl PackedTimestamp {
    /// A value whose prefix never matches a real timestamp at any
    /// granularity (month 15, second 63...). Used as a cached "previous"
    /// to force the next render down the full-reformat path.
    pub const INVALID: Self = Self(u32::MAX);

    /// Pack calendar fields. `year` is the full year (e.g. 2025).
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        let year_offset = year.wrapping_sub(REFERENCE_YEAR) as u32 & YEAR_MASK;
        Self(
            (year_offset << YEAR_SHIFT)
                | ((month as u32 & MONTH_MASK) << MONTH_SHIFT)
                | ((day as u32 & DAY_MASK) << DAY_SHIFT)
                | ((hour as u32 & HOUR_MASK) << HOUR_SHIFT)
                | ((minute as u32 & MINUTE_MASK) << MINUTE_SHIFT)
                | (second as u32 & SECOND_MASK),
        )
    }

    /// Reinterpret a raw register value.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw register value.
    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn year(self) -> u16 {
        REFERENCE_YEAR + ((self.0 >> YEAR_SHIFT) & YEAR_MASK) as u16
    }

    pub const fn month(self) -> u8 {
        ((self.0 >> MONTH_SHIFT) & MONTH_MASK) as u8
    }

    pub const fn day(self) -> u8 {
        ((self.0 >> DAY_SHIFT) & DAY_MASK) as u8
    }

    pub const fn hour(self) -> u8 {
        ((self.0 >> HOUR_SHIFT) & HOUR_MASK) as u8
    }

    pub const fn minute(self) -> u8 {
        ((self.0 >> MINUTE_SHIFT) & MINUTE_MASK) as u8
    }

    pub const fn second(self) -> u8 {
        (self.0 & SECOND_MASK) as u8
    }

    pub const fn with_hour(self, hour: u8) -> Self {
        Self((self.0 & !(HOUR_MASK << HOUR_SHIFT)) | ((hour as u32 & HOUR_MASK) << HOUR_SHIFT))
    }

    pub const fn with_minute(self, minute: u8) -> Self {
        Self(
            (self.0 & !(MINUTE_MASK << MINUTE_SHIFT))
                | ((minute as u32 & MINUTE_MASK) << MINUTE_SHIFT),
        )
    }

    pub const fn with_second(self, second: u8) -> Self {
        Self((self.0 & !SECOND_MASK) | (second as u32 & SECOND_MASK))
    }

    pub const fn with_year(self, year: u16) -> Self {
        let year_offset = year.wrapping_sub(REFERENCE_YEAR) as u32 & YEAR_MASK;
        Self((self.0 & !(YEAR_MASK << YEAR_SHIFT)) | (year_offset << YEAR_SHIFT))
    }

    pub const fn with_month(self, month: u8) -> Self {
        Self((self.0 & !(MONTH_MASK << MONTH_SHIFT)) | ((month as u32 & MONTH_MASK) << MONTH_SHIFT))
    }

    pub const fn with_day(self, day: u8) -> Self {
        Self((self.0 & !(DAY_MASK << DAY_SHIFT)) | ((day as u32 & DAY_MASK) << DAY_SHIFT))
    }

    /// True iff all fields at `granularity` and coarser are equal.
    ///
    /// `same_prefix(a, b, Granularity::Minute)` holds iff `a` and `b`
    /// differ at most in seconds. A coarse-field rollover (minute 59 -> 00
    /// carrying into the hour) naturally fails the comparison because the
    /// coarser bits differ.
    pub const fn same_prefix(self, other: Self, granularity: Granularity) -> bool {
        (self.0 >> granularity.shift()) == (other.0 >> granularity.shift())
    }

    /// Day of week, 0 = Sunday. Sakamoto's method.
    pub fn weekday_index(self) -> usize {
        const OFFSETS: [i32; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
        let mut y = self.year() as i32;
        let m = self.month().clamp(1, 12) as i32;
        let d = self.day() as i32;
        if m < 3 {
            y -= 1;
        }
        ((y + y / 4 - y / 100 + y / 400 + OFFSETS[(m - 1) as usize] + d).rem_euclid(7)) as usize
    }

    /// Two-character weekday code for the display ("SU".."SA").
    pub fn weekday_code(self) -> &'static str {
        WEEKDAY_CODES[self.weekday_index()]
    }

    /// Seconds since `REFERENCE_YEAR`-01-01 00:00:00.
    pub fn as_seconds(self) -> i64 {
        let days =
            days_from_civil(self.year() as i32, self.month() as u32, self.day() as u32)
                - days_from_civil(REFERENCE_YEAR as i32, 1, 1);
        days * 86_400
            + self.hour() as i64 * 3_600
            + self.minute() as i64 * 60
            + self.second() as i64
    }

    /// Inverse of [`as_seconds`](Self::as_seconds).
    pub fn from_seconds(seconds: i64) -> Self {
        let days = seconds.div_euclid(86_400) + days_from_civil(REFERENCE_YEAR as i32, 1, 1);
        let secs = seconds.rem_euclid(86_400);
        let (year, month, day) = civil_from_days(days);
        Self::new(
            year as u16,
            month as u8,
            day as u8,
            (secs / 3_600) as u8,
            ((secs / 60) % 60) as u8,
            (secs % 60) as u8,
        )
    }

    /// Shift this timestamp into another zone by a signed offset delta in
    /// seconds. Converting local time to UTC is `to_zone(-tz_offset)`.
    pub fn to_zone(self, delta_seconds: i32) -> Self {
        Self::from_seconds(self.as_seconds() + delta_seconds as i64)
    }
}

/// Days since 1970-01-01 for a civil date (Gregorian, proleptic).
fn days_from_civil(year: i32, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year } as i64;
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = if month > 2 { month - 3 } else { month + 9 } as i64;
    let doy = (153 * mp + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Civil date for days since 1970-01-01. Inverse of [`days_from_civil`].
fn civil_from_days(days: i64) -> (i32, u32, u32) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let y = if m <= 2 { y + 1 } else { y } as i32;
    (y, m, d)
}
