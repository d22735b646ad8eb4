//! Recording test doubles for the hardware seams.

use std::string::String;
use std::vec::Vec;

use crate::power::SleepBound;
use crate::time::PackedTimestamp;
use crate::traits::display::{DisplaySink, Indicator};
use crate::traits::platform::{BackupRegisters, Peripheral, PlatformPower, SleepMode};
use crate::traits::rtc::Rtc;

/// Display double recording every glyph write and indicator state.
#[derive(Default)]
pub struct RecordingDisplay {
    pub writes: Vec<(u8, String)>,
    pub indicators: Vec<(Indicator, bool)>,
    pub cleared: bool,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last recorded state of an indicator (off if never touched).
    pub fn indicator(&self, indicator: Indicator) -> bool {
        self.indicators
            .iter()
            .rev()
            .find(|(i, _)| *i == indicator)
            .map(|(_, on)| *on)
            .unwrap_or(false)
    }
}

impl DisplaySink for RecordingDisplay {
    fn write_str(&mut self, offset: u8, text: &str) {
        self.writes.push((offset, text.into()));
    }

    fn set_indicator(&mut self, indicator: Indicator) {
        self.indicators.push((indicator, true));
    }

    fn clear_indicator(&mut self, indicator: Indicator) {
        self.indicators.push((indicator, false));
    }

    fn set_segment(&mut self, _com: u8, _seg: u8) {}

    fn clear_segment(&mut self, _com: u8, _seg: u8) {}

    fn clear(&mut self) {
        self.cleared = true;
        self.writes.clear();
    }
}

/// Calls a [`MockPlatform`] records, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformCall {
    ArmWake,
    Disable(Peripheral),
    SetTickRate(u8),
    Sleep(SleepMode, SleepBound),
}

#[derive(Default)]
pub struct MockPlatform {
    pub calls: Vec<PlatformCall>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_tick_rate(&self) -> Option<u8> {
        self.calls.iter().rev().find_map(|c| match c {
            PlatformCall::SetTickRate(hz) => Some(*hz),
            _ => None,
        })
    }
}

impl PlatformPower for MockPlatform {
    fn arm_wake(&mut self) {
        self.calls.push(PlatformCall::ArmWake);
    }

    fn disable(&mut self, peripheral: Peripheral) {
        self.calls.push(PlatformCall::Disable(peripheral));
    }

    fn set_tick_rate(&mut self, hz: u8) {
        self.calls.push(PlatformCall::SetTickRate(hz));
    }

    fn sleep(&mut self, mode: SleepMode, bound: SleepBound) {
        self.calls.push(PlatformCall::Sleep(mode, bound));
    }
}

/// In-memory backup register bank with the hardware's bounds behavior.
#[derive(Default)]
pub struct MemoryBackup {
    pub words: [u32; 8],
}

impl MemoryBackup {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BackupRegisters for MemoryBackup {
    fn read(&self, slot: u8) -> u32 {
        if slot < 8 {
            self.words[slot as usize]
        } else {
            0
        }
    }

    fn write(&mut self, slot: u8, value: u32) {
        if slot < 8 {
            self.words[slot as usize] = value;
        }
    }
}

/// Settable fake RTC.
pub struct FakeRtc {
    pub timestamp: PackedTimestamp,
}

impl FakeRtc {
    pub fn at(timestamp: PackedTimestamp) -> Self {
        Self { timestamp }
    }
}

impl Rtc for FakeRtc {
    fn now(&self) -> PackedTimestamp {
        self.timestamp
    }

    fn set(&mut self, timestamp: PackedTimestamp) {
        self.timestamp = timestamp;
    }
}
