//! Display sink trait for the segment LCD
//!
//! The display is a fixed layout of ten character cells plus discrete
//! indicator icons. Writes are memory-mapped segment updates and cannot
//! fail, so the trait is infallible. Every glyph write costs power; callers
//! are expected to write only the cells that changed.

/// Discrete indicator icons around the character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Indicator {
    /// Hourly time-signal bell
    Bell,
    /// Alarm enabled
    Signal,
    /// Post-meridiem, 12-hour mode only
    Pm,
    /// 24-hour mode
    Hour24,
    /// Low available power
    LowBattery,
    /// Colon between hours and minutes
    Colon,
}

/// Trait for the character-cell display.
pub trait DisplaySink {
    /// Write a string starting at a character cell offset (0-9).
    /// Characters beyond the last cell are dropped by the implementation.
    fn write_str(&mut self, offset: u8, text: &str);

    /// Turn an indicator icon on.
    fn set_indicator(&mut self, indicator: Indicator);

    /// Turn an indicator icon off.
    fn clear_indicator(&mut self, indicator: Indicator);

    /// Set a single raw segment, for custom glyphs.
    fn set_segment(&mut self, com: u8, seg: u8);

    /// Clear a single raw segment.
    fn clear_segment(&mut self, com: u8, seg: u8);

    /// Blank every cell and indicator.
    fn clear(&mut self);

    /// Set or clear an indicator from a flag.
    fn indicate(&mut self, indicator: Indicator, on: bool) {
        if on {
            self.set_indicator(indicator);
        } else {
            self.clear_indicator(indicator);
        }
    }
}
