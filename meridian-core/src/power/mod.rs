//! Power state control
//!
//! The device lives in one of four states: ACTIVE (full tick rate),
//! LOW_ENERGY (1 Hz tick, reduced display), DEEP_SLEEP (everything but the
//! RTC and one wake source off), and BACKUP (deep sleep with the display
//! controller also unpowered). The state itself is volatile by design:
//! deep sleep and backup exit only through hardware reset, and a fresh
//! boot always reconstructs ACTIVE.
//!
//! Sleep entry has one hard ordering rule: the wake interrupt is armed
//! before any peripheral is torn down, and peripherals go down in the
//! fixed order timers, analog input, external interrupts, serial, display.
//! A stranded clock gate is the one failure this subsystem cannot recover
//! from.

use crate::traits::platform::{Peripheral, PlatformPower, SleepMode};

/// Volatile power state. Never persisted; reconstructed on every wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    #[default]
    Active,
    LowEnergy,
    DeepSleep,
    Backup,
}

/// How long a sleep may last before the RTC forces a wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepBound {
    /// Wake at the next minute boundary; some module has a background
    /// task pending.
    NextMinute,
    /// Sleep until external wake.
    Unbounded,
}

/// Tick rate while in low-energy state, Hz.
const LOW_ENERGY_TICK_HZ: u8 = 1;

/// Owns tick-rate selection and state transitions.
pub struct PowerController {
    state: PowerState,
    /// Tick rate the active module asked for; restored on wake.
    active_tick_hz: u8,
}

impl Default for PowerController {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerController {
    pub fn new() -> Self {
        Self {
            state: PowerState::Active,
            active_tick_hz: 1,
        }
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    /// Select the tick rate used while ACTIVE. Takes effect immediately
    /// unless the device is in low-energy ticking, in which case it is
    /// remembered for the next wake.
    pub fn set_active_tick_rate(&mut self, platform: &mut dyn PlatformPower, hz: u8) {
        self.active_tick_hz = hz.max(1);
        if self.state == PowerState::Active {
            platform.set_tick_rate(self.active_tick_hz);
        }
    }

    /// Drop to reduced-rate ticking. No-op outside ACTIVE.
    pub fn enter_low_energy(&mut self, platform: &mut dyn PlatformPower) {
        if self.state == PowerState::Active {
            self.state = PowerState::LowEnergy;
            platform.set_tick_rate(LOW_ENERGY_TICK_HZ);
        }
    }

    /// Return to full-rate ticking after qualifying input.
    pub fn wake(&mut self, platform: &mut dyn PlatformPower) {
        if self.state == PowerState::LowEnergy {
            self.state = PowerState::Active;
            platform.set_tick_rate(self.active_tick_hz);
        }
    }

    /// Power down to DEEP_SLEEP. `retain_display` keeps the display
    /// controller alive to show a static sleep message. There is no
    /// resume: the next thing this device does is reset.
    pub fn enter_deep_sleep(
        &mut self,
        platform: &mut dyn PlatformPower,
        retain_display: bool,
        bound: SleepBound,
    ) {
        self.state = PowerState::DeepSleep;
        platform.arm_wake();
        self.tear_down(platform, retain_display);
        platform.sleep(SleepMode::Standby, bound);
    }

    /// Power down to BACKUP: deep sleep plus display power-down.
    /// Recovery only through cold boot.
    pub fn enter_backup(&mut self, platform: &mut dyn PlatformPower, bound: SleepBound) {
        self.state = PowerState::Backup;
        platform.arm_wake();
        self.tear_down(platform, false);
        platform.sleep(SleepMode::Backup, bound);
    }

    fn tear_down(&mut self, platform: &mut dyn PlatformPower, retain_display: bool) {
        platform.disable(Peripheral::Timers);
        platform.disable(Peripheral::AnalogInput);
        platform.disable(Peripheral::ExternalInterrupts);
        platform.disable(Peripheral::Serial);
        if !retain_display {
            platform.disable(Peripheral::Display);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{MockPlatform, PlatformCall};

    #[test]
    fn test_boots_active() {
        let controller = PowerController::new();
        assert_eq!(controller.state(), PowerState::Active);
    }

    #[test]
    fn test_deep_sleep_arms_wake_before_any_teardown() {
        let mut platform = MockPlatform::new();
        let mut controller = PowerController::new();
        controller.enter_deep_sleep(&mut platform, false, SleepBound::Unbounded);

        let arm_index = platform
            .calls
            .iter()
            .position(|c| *c == PlatformCall::ArmWake)
            .expect("wake never armed");
        let first_disable = platform
            .calls
            .iter()
            .position(|c| matches!(c, PlatformCall::Disable(_)))
            .expect("nothing torn down");
        assert!(arm_index < first_disable);
    }

    #[test]
    fn test_teardown_order_is_fixed() {
        let mut platform = MockPlatform::new();
        let mut controller = PowerController::new();
        controller.enter_deep_sleep(&mut platform, false, SleepBound::Unbounded);

        let disabled: std::vec::Vec<_> = platform
            .calls
            .iter()
            .filter_map(|c| match c {
                PlatformCall::Disable(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(
            disabled,
            [
                Peripheral::Timers,
                Peripheral::AnalogInput,
                Peripheral::ExternalInterrupts,
                Peripheral::Serial,
                Peripheral::Display,
            ]
        );
    }

    #[test]
    fn test_retained_display_is_not_torn_down() {
        let mut platform = MockPlatform::new();
        let mut controller = PowerController::new();
        controller.enter_deep_sleep(&mut platform, true, SleepBound::Unbounded);
        assert!(!platform
            .calls
            .contains(&PlatformCall::Disable(Peripheral::Display)));
        assert_eq!(
            platform.calls.last(),
            Some(&PlatformCall::Sleep(SleepMode::Standby, SleepBound::Unbounded))
        );
    }

    #[test]
    fn test_backup_powers_down_display_and_cold_sleeps() {
        let mut platform = MockPlatform::new();
        let mut controller = PowerController::new();
        controller.enter_backup(&mut platform, SleepBound::NextMinute);
        assert!(platform
            .calls
            .contains(&PlatformCall::Disable(Peripheral::Display)));
        assert_eq!(
            platform.calls.last(),
            Some(&PlatformCall::Sleep(SleepMode::Backup, SleepBound::NextMinute))
        );
    }

    #[test]
    fn test_low_energy_reduces_rate_and_wake_restores_it() {
        let mut platform = MockPlatform::new();
        let mut controller = PowerController::new();
        controller.set_active_tick_rate(&mut platform, 8);
        controller.enter_low_energy(&mut platform);
        assert_eq!(controller.state(), PowerState::LowEnergy);
        assert_eq!(platform.last_tick_rate(), Some(1));

        controller.wake(&mut platform);
        assert_eq!(controller.state(), PowerState::Active);
        assert_eq!(platform.last_tick_rate(), Some(8));
    }

    #[test]
    fn test_rate_request_during_low_energy_is_deferred() {
        let mut platform = MockPlatform::new();
        let mut controller = PowerController::new();
        controller.enter_low_energy(&mut platform);
        controller.set_active_tick_rate(&mut platform, 4);
        assert_eq!(platform.last_tick_rate(), Some(1));
        controller.wake(&mut platform);
        assert_eq!(platform.last_tick_rate(), Some(4));
    }
}
