//! Time and timezone setting face
//!
//! A paged editor: the light button advances through hour, minute, second,
//! year, month, day, and timezone; the alarm button increments the active
//! field with wraparound. Edits apply to the RTC immediately, so leaving
//! the face mid-edit loses nothing. The face runs at 4 Hz so the active
//! field can blink.

use core::fmt::Write;

use heapless::String;
use meridian_core::runtime::{default_handler, Button, Context, Event, Module};
use meridian_core::time::REFERENCE_YEAR;

/// Tick rate while editing; gives two blink phases per second.
const EDIT_TICK_HZ: u8 = 4;

/// Highest settable year (6-bit offset from the reference year).
const MAX_YEAR: u16 = REFERENCE_YEAR + 63;

/// Timezone bounds in 15-minute quanta: UTC-12 through UTC+14.
const TZ_MIN: i8 = -48;
const TZ_MAX: i8 = 56;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Hour,
    Minute,
    Second,
    Year,
    Month,
    Day,
    Zone,
}

const PAGES: [Page; 7] = [
    Page::Hour,
    Page::Minute,
    Page::Second,
    Page::Year,
    Page::Month,
    Page::Day,
    Page::Zone,
];

impl Page {
    const fn label(self) -> &'static str {
        match self {
            Page::Hour => "HR",
            Page::Minute => "MI",
            Page::Second => "SE",
            Page::Year => "YR",
            Page::Month => "MO",
            Page::Day => "DA",
            Page::Zone => "TZ",
        }
    }

    /// Cell offset and width of the field this page edits, for blinking.
    const fn field(self) -> (u8, usize) {
        match self {
            Page::Hour => (4, 2),
            Page::Minute => (6, 2),
            Page::Second => (8, 2),
            Page::Year => (4, 4),
            Page::Month => (4, 2),
            Page::Day => (6, 2),
            Page::Zone => (4, 5),
        }
    }
}

/// The settings face.
pub struct SetTimeFace {
    page_index: usize,
    /// Alarm held past the long-press threshold; each tick fast-advances.
    fast_advance: bool,
}

impl Default for SetTimeFace {
    fn default() -> Self {
        Self::new()
    }
}

impl SetTimeFace {
    pub fn new() -> Self {
        Self {
            page_index: 0,
            fast_advance: false,
        }
    }

    fn page(&self) -> Page {
        PAGES[self.page_index]
    }

    fn draw(&self, ctx: &mut Context<'_>, blink_hidden: bool) {
        let page = self.page();
        let now = ctx.now;
        let mut buf: String<10> = String::new();
        match page {
            Page::Hour | Page::Minute | Page::Second => {
                let _ = write!(
                    buf,
                    "{}  {:02}{:02}{:02}",
                    page.label(),
                    now.hour(),
                    now.minute(),
                    now.second()
                );
            }
            Page::Year => {
                let _ = write!(buf, "{}  {:04}  ", page.label(), now.year());
            }
            Page::Month | Page::Day => {
                let _ = write!(buf, "{}  {:02}{:02}  ", page.label(), now.month(), now.day());
            }
            Page::Zone => {
                let quanta = ctx.settings.tz_quarter_hours;
                let hours = quanta as i16 / 4;
                let minutes = (quanta as i16 % 4).abs() * 15;
                let _ = write!(buf, "{}  {:+03}{:02} ", page.label(), hours, minutes);
            }
        }
        ctx.display.write_str(0, &buf);

        if blink_hidden {
            let (offset, width) = page.field();
            ctx.display.write_str(offset, &"      "[..width]);
        }
    }

    fn increment(&self, ctx: &mut Context<'_>) {
        let now = ctx.now;
        match self.page() {
            Page::Hour => ctx.request_set_time(now.with_hour((now.hour() + 1) % 24)),
            Page::Minute => ctx.request_set_time(now.with_minute((now.minute() + 1) % 60)),
            // The seconds field resets rather than increments, for syncing
            // against a reference clock.
            Page::Second => ctx.request_set_time(now.with_second(0)),
            Page::Year => {
                let year = if now.year() >= MAX_YEAR {
                    REFERENCE_YEAR
                } else {
                    now.year() + 1
                };
                ctx.request_set_time(now.with_year(year));
            }
            Page::Month => ctx.request_set_time(now.with_month(now.month() % 12 + 1)),
            Page::Day => {
                let day = now.day() % days_in_month(now.year(), now.month()) + 1;
                ctx.request_set_time(now.with_day(day));
            }
            Page::Zone => {
                let quanta = ctx.settings.tz_quarter_hours;
                ctx.settings.tz_quarter_hours = if quanta >= TZ_MAX { TZ_MIN } else { quanta + 1 };
            }
        }
    }
}

impl Module for SetTimeFace {
    fn setup(&mut self, _ctx: &mut Context<'_>) {}

    fn activate(&mut self, ctx: &mut Context<'_>) {
        self.page_index = 0;
        self.fast_advance = false;
        ctx.request_tick_rate(EDIT_TICK_HZ);
    }

    fn on_event(&mut self, event: Event, ctx: &mut Context<'_>) -> bool {
        match event {
            Event::Activate => self.draw(ctx, false),
            Event::Tick { subsecond } => {
                if self.fast_advance {
                    self.increment(ctx);
                    // The RTC write lands after this handler returns; keep
                    // the field visible while it spins.
                    self.draw(ctx, false);
                } else {
                    self.draw(ctx, subsecond % 2 == 1);
                }
            }
            Event::ButtonUp(Button::Light) => {
                self.page_index = (self.page_index + 1) % PAGES.len();
                self.draw(ctx, false);
            }
            Event::ButtonUp(Button::Alarm) => {
                self.increment(ctx);
                // The RTC write lands after this handler returns; the next
                // tick draws the new value.
            }
            Event::LongPress(Button::Alarm) => self.fast_advance = true,
            Event::LongUp(Button::Alarm) => self.fast_advance = false,
            other => return default_handler(other, ctx),
        }
        true
    }

    fn resign(&mut self, ctx: &mut Context<'_>) {
        ctx.request_tick_rate(1);
    }
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 => {
            if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::runtime::Runtime;
    use meridian_core::settings::{GlobalSettings, SETTINGS_SLOT};
    use meridian_core::testkit::{FakeRtc, MemoryBackup, MockPlatform, RecordingDisplay};
    use meridian_core::time::PackedTimestamp;

    struct Fixture {
        display: RecordingDisplay,
        backup: MemoryBackup,
        platform: MockPlatform,
        rtc: FakeRtc,
    }

    impl Fixture {
        fn at(timestamp: PackedTimestamp) -> Self {
            Self {
                display: RecordingDisplay::new(),
                backup: MemoryBackup::new(),
                platform: MockPlatform::new(),
                rtc: FakeRtc::at(timestamp),
            }
        }

        fn board(&mut self) -> meridian_core::runtime::Board<'_> {
            meridian_core::runtime::Board {
                display: &mut self.display,
                backup: &mut self.backup,
                platform: &mut self.platform,
                rtc: &mut self.rtc,
                battery_millivolts: 3_000,
            }
        }
    }

    fn advance_pages(runtime: &mut Runtime<'_, 2>, fixture: &mut Fixture, pages: usize) {
        for _ in 0..pages {
            runtime.dispatch(Event::ButtonUp(Button::Light), &mut fixture.board());
        }
    }

    #[test]
    fn test_activation_raises_the_tick_rate() {
        let mut face = SetTimeFace::new();
        let mut fixture = Fixture::at(PackedTimestamp::new(2025, 8, 23, 10, 15, 30));
        let mut runtime: Runtime<'_, 2> = Runtime::new(GlobalSettings::default());
        runtime.register(&mut face).unwrap();
        runtime.boot(&mut fixture.board());
        assert_eq!(fixture.platform.last_tick_rate(), Some(4));
    }

    #[test]
    fn test_alarm_increments_the_hour_on_the_rtc() {
        let mut face = SetTimeFace::new();
        let mut fixture = Fixture::at(PackedTimestamp::new(2025, 8, 23, 23, 15, 30));
        let mut runtime: Runtime<'_, 2> = Runtime::new(GlobalSettings::default());
        runtime.register(&mut face).unwrap();
        runtime.boot(&mut fixture.board());

        runtime.dispatch(Event::ButtonUp(Button::Alarm), &mut fixture.board());
        // 23 wraps to 0; the date is untouched.
        assert_eq!(fixture.rtc.timestamp.hour(), 0);
        assert_eq!(fixture.rtc.timestamp.day(), 23);
    }

    #[test]
    fn test_light_pages_to_minutes_then_alarm_increments_them() {
        let mut face = SetTimeFace::new();
        let mut fixture = Fixture::at(PackedTimestamp::new(2025, 8, 23, 10, 59, 30));
        let mut runtime: Runtime<'_, 2> = Runtime::new(GlobalSettings::default());
        runtime.register(&mut face).unwrap();
        runtime.boot(&mut fixture.board());

        advance_pages(&mut runtime, &mut fixture, 1);
        runtime.dispatch(Event::ButtonUp(Button::Alarm), &mut fixture.board());
        assert_eq!(fixture.rtc.timestamp.minute(), 0);
        assert_eq!(fixture.rtc.timestamp.hour(), 10); // no carry
    }

    #[test]
    fn test_seconds_page_zeroes_seconds() {
        let mut face = SetTimeFace::new();
        let mut fixture = Fixture::at(PackedTimestamp::new(2025, 8, 23, 10, 15, 42));
        let mut runtime: Runtime<'_, 2> = Runtime::new(GlobalSettings::default());
        runtime.register(&mut face).unwrap();
        runtime.boot(&mut fixture.board());

        advance_pages(&mut runtime, &mut fixture, 2);
        runtime.dispatch(Event::ButtonUp(Button::Alarm), &mut fixture.board());
        assert_eq!(fixture.rtc.timestamp.second(), 0);
    }

    #[test]
    fn test_day_wraps_at_month_length() {
        let mut face = SetTimeFace::new();
        let mut fixture = Fixture::at(PackedTimestamp::new(2025, 2, 28, 10, 0, 0));
        let mut runtime: Runtime<'_, 2> = Runtime::new(GlobalSettings::default());
        runtime.register(&mut face).unwrap();
        runtime.boot(&mut fixture.board());

        advance_pages(&mut runtime, &mut fixture, 5); // day page
        runtime.dispatch(Event::ButtonUp(Button::Alarm), &mut fixture.board());
        assert_eq!(fixture.rtc.timestamp.day(), 1);
    }

    #[test]
    fn test_leap_february_has_29_days() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2100, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
    }

    #[test]
    fn test_timezone_edit_is_persisted() {
        let mut face = SetTimeFace::new();
        let mut fixture = Fixture::at(PackedTimestamp::new(2025, 8, 23, 10, 0, 0));
        let mut runtime: Runtime<'_, 2> = Runtime::new(GlobalSettings::default());
        runtime.register(&mut face).unwrap();
        runtime.boot(&mut fixture.board());

        advance_pages(&mut runtime, &mut fixture, 6); // timezone page
        runtime.dispatch(Event::ButtonUp(Button::Alarm), &mut fixture.board());
        assert_eq!(runtime.settings().tz_quarter_hours, 1);
        let stored = GlobalSettings::from_bits(fixture.backup.words[SETTINGS_SLOT as usize]);
        assert_eq!(stored.tz_quarter_hours, 1);
    }

    #[test]
    fn test_timezone_wraps_at_the_eastern_limit() {
        let mut face = SetTimeFace::new();
        let mut fixture = Fixture::at(PackedTimestamp::new(2025, 8, 23, 10, 0, 0));
        let mut settings = GlobalSettings::default();
        settings.tz_quarter_hours = TZ_MAX;
        let mut runtime: Runtime<'_, 2> = Runtime::new(settings);
        runtime.register(&mut face).unwrap();
        runtime.boot(&mut fixture.board());

        advance_pages(&mut runtime, &mut fixture, 6);
        runtime.dispatch(Event::ButtonUp(Button::Alarm), &mut fixture.board());
        assert_eq!(runtime.settings().tz_quarter_hours, TZ_MIN);
    }

    #[test]
    fn test_holding_alarm_fast_advances_each_tick() {
        let mut face = SetTimeFace::new();
        let mut fixture = Fixture::at(PackedTimestamp::new(2025, 8, 23, 10, 0, 0));
        let mut runtime: Runtime<'_, 2> = Runtime::new(GlobalSettings::default());
        runtime.register(&mut face).unwrap();
        runtime.boot(&mut fixture.board());

        runtime.dispatch(Event::LongPress(Button::Alarm), &mut fixture.board());
        for subsecond in 0..3 {
            runtime.dispatch(Event::Tick { subsecond }, &mut fixture.board());
        }
        assert_eq!(fixture.rtc.timestamp.hour(), 13);

        runtime.dispatch(Event::LongUp(Button::Alarm), &mut fixture.board());
        runtime.dispatch(Event::Tick { subsecond: 3 }, &mut fixture.board());
        assert_eq!(fixture.rtc.timestamp.hour(), 13);
    }

    #[test]
    fn test_blink_phase_hides_the_active_field() {
        let mut face = SetTimeFace::new();
        let mut fixture = Fixture::at(PackedTimestamp::new(2025, 8, 23, 10, 15, 30));
        let mut runtime: Runtime<'_, 2> = Runtime::new(GlobalSettings::default());
        runtime.register(&mut face).unwrap();
        runtime.boot(&mut fixture.board());
        fixture.display.writes.clear();

        runtime.dispatch(Event::Tick { subsecond: 1 }, &mut fixture.board());
        // Full draw followed by a blanking write over the hour field.
        assert_eq!(fixture.display.writes.len(), 2);
        assert_eq!(fixture.display.writes[1], (4, "  ".into()));
    }

    #[test]
    fn test_resign_restores_the_tick_rate() {
        let mut set_time = SetTimeFace::new();
        let mut clock = crate::ClockFace::new();
        let mut fixture = Fixture::at(PackedTimestamp::new(2025, 8, 23, 10, 15, 30));
        let mut runtime: Runtime<'_, 2> = Runtime::new(GlobalSettings::default());
        runtime.register(&mut set_time).unwrap();
        runtime.register(&mut clock).unwrap();
        runtime.boot(&mut fixture.board());
        assert_eq!(fixture.platform.last_tick_rate(), Some(4));

        runtime.dispatch(Event::ButtonUp(Button::Mode), &mut fixture.board());
        assert_eq!(runtime.active_index(), 1);
        assert_eq!(fixture.platform.last_tick_rate(), Some(1));
    }
}
