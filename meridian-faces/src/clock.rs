//! Main clock face
//!
//! Shows weekday, day of month, and time, redrawing only the cells that
//! changed since the previous tick. Also owns the hourly time signal:
//! when enabled, the face volunteers for a background wake at each minute
//! boundary and asks for the signal at the top of hours inside the
//! resolved chime window.

use meridian_core::chime;
use meridian_core::render::{render_clock, render_low_energy};
use meridian_core::runtime::{default_handler, Button, Context, Event, Module};
use meridian_core::time::PackedTimestamp;
use meridian_core::traits::display::Indicator;

/// Supply voltage below which the low-battery indicator is shown.
const LOW_BATTERY_MILLIVOLTS: u16 = 2_200;

/// The default face.
pub struct ClockFace {
    /// Timestamp currently on the display; INVALID forces a full redraw.
    previous: PackedTimestamp,
    /// Hourly signal toggle, held by the face rather than the settings
    /// word so it resets with the battery.
    signal_enabled: bool,
    battery_low: bool,
    /// Day of month of the last battery sample.
    last_battery_day: Option<u8>,
}

impl Default for ClockFace {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockFace {
    pub fn new() -> Self {
        Self {
            previous: PackedTimestamp::INVALID,
            signal_enabled: false,
            battery_low: false,
            last_battery_day: None,
        }
    }

    /// Sample the battery at most once per day.
    fn check_battery(&mut self, ctx: &mut Context<'_>) {
        let today = ctx.now.day();
        if self.last_battery_day == Some(today) {
            return;
        }
        self.last_battery_day = Some(today);
        self.battery_low = ctx.battery_millivolts < LOW_BATTERY_MILLIVOLTS;
        ctx.display
            .indicate(Indicator::LowBattery, self.battery_low);
    }

    fn draw(&mut self, ctx: &mut Context<'_>) {
        self.check_battery(ctx);
        render_clock(
            ctx.display,
            ctx.now,
            self.previous,
            ctx.settings.clock_mode_24h,
        );
        self.previous = ctx.now;
    }

    /// Whether the signal is allowed to sound during the current hour.
    fn in_chime_window(&self, ctx: &Context<'_>) -> bool {
        if ctx.settings.hourly_chime_always {
            return true;
        }
        let window = chime::resolve(
            ctx.now,
            ctx.tz_offset_seconds(),
            ctx.settings.chime_start,
            ctx.settings.chime_end,
            ctx.location(),
        );
        window.contains(ctx.now.hour())
    }
}

impl Module for ClockFace {
    fn setup(&mut self, _ctx: &mut Context<'_>) {}

    fn activate(&mut self, ctx: &mut Context<'_>) {
        // Display contents are unknown after a switch or wake.
        self.previous = PackedTimestamp::INVALID;
        ctx.display.indicate(Indicator::Bell, self.signal_enabled);
        ctx.display
            .indicate(Indicator::Signal, ctx.settings.alarm_enabled);
        ctx.display
            .indicate(Indicator::Hour24, ctx.settings.clock_mode_24h);
    }

    fn on_event(&mut self, event: Event, ctx: &mut Context<'_>) -> bool {
        match event {
            Event::Activate => {
                self.previous = PackedTimestamp::INVALID;
                self.draw(ctx);
            }
            Event::Tick { .. } => self.draw(ctx),
            Event::LowEnergyUpdate => {
                render_low_energy(ctx.display, ctx.now, ctx.settings.clock_mode_24h);
                self.previous = PackedTimestamp::INVALID;
            }
            Event::BackgroundTask => ctx.request_signal(),
            Event::ButtonUp(Button::Alarm) if ctx.settings.clock_mode_toggle => {
                ctx.settings.clock_mode_24h = !ctx.settings.clock_mode_24h;
                ctx.display
                    .indicate(Indicator::Hour24, ctx.settings.clock_mode_24h);
                self.previous = PackedTimestamp::INVALID;
                self.draw(ctx);
            }
            Event::LongPress(Button::Alarm) => {
                self.signal_enabled = !self.signal_enabled;
                ctx.display.indicate(Indicator::Bell, self.signal_enabled);
            }
            other => return default_handler(other, ctx),
        }
        true
    }

    fn resign(&mut self, _ctx: &mut Context<'_>) {}

    fn wants_background_task(&mut self, ctx: &mut Context<'_>) -> bool {
        // Signal fires at the top of the hour; the minute-boundary wake
        // that asks this question makes minute == 0 the only candidate.
        self.signal_enabled && ctx.now.minute() == 0 && self.in_chime_window(ctx)
    }
}
