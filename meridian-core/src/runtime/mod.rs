//! Module life-cycle runtime
//!
//! Exactly one module owns the display at a time. The runtime drives each
//! module through its life cycle (setup, activate, event loop, resign),
//! multiplexes the event stream onto the active module, and owns the
//! low-energy and deep-sleep decisions. Everything is single-threaded and
//! cooperative: interrupt sources enqueue events, and a module's event
//! handler always runs to completion before anything else happens.
//!
//! Side effects a module cannot perform safely from inside its own
//! callback (switching modules, changing the tick rate, setting the RTC)
//! are recorded as requests on the [`Context`] and applied by the runtime
//! after the handler returns. No callback ever re-enters the runtime.

pub mod events;
pub mod press;

pub use events::{Button, Event};
pub use press::PressTracker;

use heapless::Vec;

use crate::power::{PowerController, PowerState, SleepBound};
use crate::settings::{GeoLocation, GlobalSettings, LOCATION_SLOT, SETTINGS_SLOT};
use crate::time::PackedTimestamp;
use crate::traits::display::DisplaySink;
use crate::traits::platform::{BackupRegisters, PlatformPower};
use crate::traits::rtc::Rtc;

/// One exclusive display-and-interaction mode of the device.
///
/// A module's state is allocated once and reused for the device's
/// lifetime; entering sleep does not free it. `setup` must therefore
/// detect prior initialization instead of assuming fresh memory.
pub trait Module {
    /// Idempotent one-time initialization of private state.
    fn setup(&mut self, ctx: &mut Context<'_>);

    /// The module just became visible. Any cached "previous timestamp"
    /// must be invalidated here so the next render is a full reformat.
    fn activate(&mut self, ctx: &mut Context<'_>);

    /// Primary handler; runs to completion before the next event.
    /// Returning `false` keeps the device awake for this cycle, deferring
    /// the low-energy transition.
    fn on_event(&mut self, event: Event, ctx: &mut Context<'_>) -> bool;

    /// The module is being switched away from. Persist anything that must
    /// survive into the backup register bank.
    fn resign(&mut self, ctx: &mut Context<'_>);

    /// Whether this module needs a wake at the next minute boundary even
    /// while the device sleeps.
    fn wants_background_task(&mut self, ctx: &mut Context<'_>) -> bool {
        let _ = ctx;
        false
    }
}

/// Everything the runtime borrows from the board for one dispatch.
pub struct Board<'a> {
    pub display: &'a mut dyn DisplaySink,
    pub backup: &'a mut dyn BackupRegisters,
    pub platform: &'a mut dyn PlatformPower,
    pub rtc: &'a mut dyn Rtc,
    /// Most recent supply voltage sample.
    pub battery_millivolts: u16,
}

/// Deferred side effects recorded during a module callback.
#[derive(Debug, Clone, Copy, Default)]
struct Requests {
    move_to: Option<usize>,
    move_next: bool,
    tick_rate: Option<u8>,
    set_time: Option<PackedTimestamp>,
    signal: bool,
}

/// What a module callback sees: the current time, the collaborators it may
/// touch directly, and request methods for everything it may not.
pub struct Context<'a> {
    /// Local time sampled when dispatch began.
    pub now: PackedTimestamp,
    pub settings: &'a mut GlobalSettings,
    pub display: &'a mut dyn DisplaySink,
    pub backup: &'a mut dyn BackupRegisters,
    pub battery_millivolts: u16,
    requests: Requests,
}

impl Context<'_> {
    /// Stored observer location from backup word 1, if ever set.
    pub fn location(&self) -> Option<GeoLocation> {
        GeoLocation::from_bits(self.backup.read(LOCATION_SLOT))
    }

    /// Active timezone offset in seconds from UTC.
    pub fn tz_offset_seconds(&self) -> i32 {
        self.settings.tz_offset_seconds()
    }

    /// Switch to the module at `index` after this handler returns.
    pub fn request_module(&mut self, index: usize) {
        self.requests.move_to = Some(index);
    }

    /// Switch to the next module in table order.
    pub fn request_next_module(&mut self) {
        self.requests.move_next = true;
    }

    /// Change the active tick frequency.
    pub fn request_tick_rate(&mut self, hz: u8) {
        self.requests.tick_rate = Some(hz);
    }

    /// Sound the hourly signal once dispatch completes.
    pub fn request_signal(&mut self) {
        self.requests.signal = true;
    }

    /// Write a new local time to the RTC after this handler returns.
    pub fn request_set_time(&mut self, timestamp: PackedTimestamp) {
        self.requests.set_time = Some(timestamp);
    }
}

/// Shared fallback for events a module does not handle itself: mode
/// navigation and timeout snap-back to the first module.
pub fn default_handler(event: Event, ctx: &mut Context<'_>) -> bool {
    match event {
        Event::ButtonUp(Button::Mode) => ctx.request_next_module(),
        Event::LongPress(Button::Mode) | Event::Timeout => ctx.request_module(0),
        _ => {}
    }
    true
}

/// Externally visible results of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Outcome {
    /// Some module asked for the hourly signal to sound.
    pub signal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RuntimeError {
    /// The statically sized module table is full.
    TableFull,
}

/// Per-module state record: the module itself plus an explicit
/// initialization flag, since backing memory persists across wake cycles.
struct Slot<'a> {
    module: &'a mut dyn Module,
    initialized: bool,
}

/// The module table and dispatcher. `N` is the table capacity, fixed at
/// build time; there is no runtime module loading.
pub struct Runtime<'a, const N: usize> {
    slots: Vec<Slot<'a>, N>,
    active: usize,
    settings: GlobalSettings,
    power: PowerController,
    idle_seconds: u32,
    timeout_fired: bool,
}

impl<'a, const N: usize> Runtime<'a, N> {
    pub fn new(settings: GlobalSettings) -> Self {
        Self {
            slots: Vec::new(),
            active: 0,
            settings,
            power: PowerController::new(),
            idle_seconds: 0,
            timeout_fired: false,
        }
    }

    /// Append a module to the table. Order is navigation order.
    pub fn register(&mut self, module: &'a mut dyn Module) -> Result<(), RuntimeError> {
        self.slots
            .push(Slot {
                module,
                initialized: false,
            })
            .map_err(|_| RuntimeError::TableFull)
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn power_state(&self) -> PowerState {
        self.power.state()
    }

    pub fn settings(&self) -> &GlobalSettings {
        &self.settings
    }

    /// Cold-boot entry: restore settings from the backup bank, run each
    /// module's one-time setup, and activate the first module.
    pub fn boot(&mut self, board: &mut Board<'_>) {
        if self.slots.is_empty() {
            return;
        }
        let bits = board.backup.read(SETTINGS_SLOT);
        if bits != 0 {
            self.settings = GlobalSettings::from_bits(bits);
        }
        for index in 0..self.slots.len() {
            if !self.slots[index].initialized {
                let _ = self.with_module(index, board, |m, ctx| m.setup(ctx));
                self.slots[index].initialized = true;
            }
        }
        let active = self.active;
        let _ = self.with_module(active, board, |m, ctx| m.activate(ctx));
        let _ = self.with_module(active, board, |m, ctx| m.on_event(Event::Activate, ctx));
    }

    /// Deliver one event to the active module and apply its requests.
    pub fn dispatch(&mut self, event: Event, board: &mut Board<'_>) -> Outcome {
        if self.slots.is_empty() {
            return Outcome::default();
        }

        // Qualifying input while low-energy ticking returns the device to
        // ACTIVE; the press itself is consumed by the wake.
        if self.power.state() == PowerState::LowEnergy && event.is_input() {
            self.power.wake(board.platform);
            self.idle_seconds = 0;
            self.timeout_fired = false;
            let active = self.active;
            let (_, requests) =
                self.with_module(active, board, |m, ctx| m.on_event(Event::Activate, ctx));
            return Outcome {
                signal: requests.signal,
            };
        }

        // In the low-energy state the 1 Hz tick arrives as the reduced
        // display update.
        let event = match event {
            Event::Tick { .. } if self.power.state() == PowerState::LowEnergy => {
                Event::LowEnergyUpdate
            }
            e => e,
        };

        match event {
            Event::Tick { subsecond: 0 } => {
                self.idle_seconds = self.idle_seconds.saturating_add(1);
            }
            e if e.is_input() => {
                self.idle_seconds = 0;
                self.timeout_fired = false;
            }
            _ => {}
        }

        let active = self.active;
        let (continue_flag, requests) =
            self.with_module(active, board, |m, ctx| m.on_event(event, ctx));
        let mut signal = requests.signal;
        self.apply_navigation(requests, board);

        // The timeout and low-energy decisions are evaluated only after
        // the current event's handler has returned.
        if matches!(event, Event::Tick { .. }) {
            if !self.timeout_fired && self.idle_seconds >= self.settings.timeout_interval.seconds()
            {
                self.timeout_fired = true;
                let active = self.active;
                let (_, req) =
                    self.with_module(active, board, |m, ctx| m.on_event(Event::Timeout, ctx));
                signal |= req.signal;
                self.apply_navigation(req, board);
            }

            let le_after = self.settings.le_interval.seconds();
            if continue_flag && le_after != 0 && self.idle_seconds >= le_after {
                self.power.enter_low_energy(board.platform);
            }
        }

        Outcome { signal }
    }

    /// Whether sleep must be bounded to the next minute boundary because
    /// some module wants a background wake.
    pub fn sleep_bound(&mut self, board: &mut Board<'_>) -> SleepBound {
        for index in 0..self.slots.len() {
            let (wants, _) =
                self.with_module(index, board, |m, ctx| m.wants_background_task(ctx));
            if wants {
                return SleepBound::NextMinute;
            }
        }
        SleepBound::Unbounded
    }

    /// Deliver a background-task event to every module that asked for one.
    /// The active module does not change.
    pub fn run_background_tasks(&mut self, board: &mut Board<'_>) -> Outcome {
        let mut signal = false;
        for index in 0..self.slots.len() {
            let (wants, _) =
                self.with_module(index, board, |m, ctx| m.wants_background_task(ctx));
            if wants {
                let (_, requests) = self.with_module(index, board, |m, ctx| {
                    m.on_event(Event::BackgroundTask, ctx)
                });
                signal |= requests.signal;
            }
        }
        Outcome { signal }
    }

    /// Power down to deep sleep, bounding the sleep if any module wants a
    /// background wake. Returns only under test doubles; on hardware the
    /// next thing that happens is reset.
    pub fn enter_deep_sleep(&mut self, board: &mut Board<'_>, retain_display: bool) {
        let bound = self.sleep_bound(board);
        self.power
            .enter_deep_sleep(board.platform, retain_display, bound);
    }

    /// Power down to backup. Recovery only through cold boot.
    pub fn enter_backup(&mut self, board: &mut Board<'_>) {
        let bound = self.sleep_bound(board);
        self.power.enter_backup(board.platform, bound);
    }

    fn apply_navigation(&mut self, requests: Requests, board: &mut Board<'_>) {
        if let Some(target) = requests.move_to {
            self.switch_to(target, board);
        } else if requests.move_next {
            let next = self.active + 1;
            self.switch_to(next, board);
        }
    }

    /// Synchronous module switch: the outgoing resign completes before the
    /// incoming activate begins.
    fn switch_to(&mut self, target: usize, board: &mut Board<'_>) {
        let target = target % self.slots.len();
        let active = self.active;
        let _ = self.with_module(active, board, |m, ctx| m.resign(ctx));
        self.active = target;
        let _ = self.with_module(target, board, |m, ctx| m.activate(ctx));
        let _ = self.with_module(target, board, |m, ctx| m.on_event(Event::Activate, ctx));
    }

    /// Run one module callback with a fresh context, then apply deferred
    /// requests and persist the settings word if the callback changed it.
    fn with_module<R>(
        &mut self,
        index: usize,
        board: &mut Board<'_>,
        f: impl FnOnce(&mut dyn Module, &mut Context<'_>) -> R,
    ) -> (R, Requests) {
        let before = self.settings.to_bits();
        let mut ctx = Context {
            now: board.rtc.now(),
            settings: &mut self.settings,
            display: &mut *board.display,
            backup: &mut *board.backup,
            battery_millivolts: board.battery_millivolts,
            requests: Requests::default(),
        };
        let result = f(&mut *self.slots[index].module, &mut ctx);
        let requests = ctx.requests;

        let bits = self.settings.to_bits();
        if bits != before {
            board.backup.write(SETTINGS_SLOT, bits);
        }
        if let Some(timestamp) = requests.set_time {
            board.rtc.set(timestamp);
        }
        if let Some(hz) = requests.tick_rate {
            self.power.set_active_tick_rate(board.platform, hz);
        }
        (result, requests)
    }
}
