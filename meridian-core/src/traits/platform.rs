//! Platform power and backup register seams
//!
//! Core logic never touches hardware registers. Everything sleep- and
//! persistence-related goes through these two traits, which a board crate
//! implements with the real clock-gate and RTC registers.

use crate::power::SleepBound;

/// Peripherals the power controller can gate off.
///
/// Variant order is the mandated teardown order: a peripheral must never be
/// disabled before the ones listed above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Peripheral {
    Timers,
    AnalogInput,
    ExternalInterrupts,
    Serial,
    Display,
}

/// Hardware sleep depths. Both exit only through reset; there is no
/// software-visible resume continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepMode {
    /// RTC and the armed wake source stay powered.
    Standby,
    /// As Standby with the display controller also powered down;
    /// recovery only through cold boot.
    Backup,
}

/// The narrow platform-power interface.
pub trait PlatformPower {
    /// Arm the designated wake interrupt. Must be called before any
    /// peripheral teardown; a sleep entered without an armed wake source
    /// is unrecoverable.
    fn arm_wake(&mut self);

    /// Gate off one peripheral.
    fn disable(&mut self, peripheral: Peripheral);

    /// Select the periodic tick frequency in Hz.
    fn set_tick_rate(&mut self, hz: u8);

    /// Enter a hardware sleep state. On real hardware this does not
    /// return; the device comes back through reset.
    fn sleep(&mut self, mode: SleepMode, bound: SleepBound);
}

/// Number of battery-backed 32-bit backup words.
pub const BACKUP_SLOT_COUNT: u8 = 8;

/// The battery-backed register bank surviving full logic power-down.
///
/// Out-of-range slots read as zero and ignore writes.
pub trait BackupRegisters {
    fn read(&self, slot: u8) -> u32;
    fn write(&mut self, slot: u8, value: u32);
}
