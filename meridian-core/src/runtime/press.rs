//! Discrete long-press grammar
//!
//! Converts raw button edges plus ticks into the press/held/released event
//! vocabulary. Hold duration is measured in ticks fed by the caller, so
//! the thresholds scale with the active tick rate.

use super::events::{Button, Event};

/// Ticks held before `LongPress` fires (2 s at the default 1 Hz tick).
pub const LONG_PRESS_TICKS: u8 = 2;

/// Ticks held before `LongerPress` fires.
pub const LONGER_PRESS_TICKS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Short,
    Long,
    Longer,
}

#[derive(Debug, Clone, Copy)]
struct Held {
    ticks: u8,
    stage: Stage,
}

/// Per-button hold tracking.
#[derive(Debug, Default)]
pub struct PressTracker {
    held: [Option<Held>; 3],
}

impl PressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw press edge. Always yields `ButtonDown`.
    pub fn press(&mut self, button: Button) -> Event {
        self.held[button.index()] = Some(Held {
            ticks: 0,
            stage: Stage::Short,
        });
        Event::ButtonDown(button)
    }

    /// Raw release edge. A release before the long-press threshold yields
    /// `ButtonUp`; after it, `LongUp`. The held stages can no longer fire
    /// once the button is up.
    pub fn release(&mut self, button: Button) -> Event {
        match self.held[button.index()].take() {
            Some(Held {
                stage: Stage::Long | Stage::Longer,
                ..
            }) => Event::LongUp(button),
            _ => Event::ButtonUp(button),
        }
    }

    /// Advance hold counters by one tick. Emits at most one held-stage
    /// event per tick.
    pub fn tick(&mut self) -> Option<Event> {
        for (index, slot) in self.held.iter_mut().enumerate() {
            let Some(held) = slot else { continue };
            held.ticks = held.ticks.saturating_add(1);

            let button = BUTTONS[index];
            if held.stage == Stage::Short && held.ticks >= LONG_PRESS_TICKS {
                held.stage = Stage::Long;
                return Some(Event::LongPress(button));
            }
            if held.stage == Stage::Long && held.ticks >= LONGER_PRESS_TICKS {
                held.stage = Stage::Longer;
                return Some(Event::LongerPress(button));
            }
        }
        None
    }
}

const BUTTONS: [Button; 3] = [Button::Light, Button::Mode, Button::Alarm];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_press_never_emits_held_stages() {
        let mut tracker = PressTracker::new();
        assert_eq!(tracker.press(Button::Alarm), Event::ButtonDown(Button::Alarm));
        assert_eq!(tracker.tick(), None); // one tick, under threshold
        assert_eq!(tracker.release(Button::Alarm), Event::ButtonUp(Button::Alarm));
        // Counter is gone; further ticks emit nothing.
        assert_eq!(tracker.tick(), None);
        assert_eq!(tracker.tick(), None);
    }

    #[test]
    fn test_long_press_then_long_up() {
        let mut tracker = PressTracker::new();
        tracker.press(Button::Alarm);
        assert_eq!(tracker.tick(), None);
        assert_eq!(tracker.tick(), Some(Event::LongPress(Button::Alarm)));
        assert_eq!(tracker.release(Button::Alarm), Event::LongUp(Button::Alarm));
    }

    #[test]
    fn test_longer_press_fires_once() {
        let mut tracker = PressTracker::new();
        tracker.press(Button::Mode);
        let mut events = std::vec::Vec::new();
        for _ in 0..10 {
            if let Some(e) = tracker.tick() {
                events.push(e);
            }
        }
        assert_eq!(
            events,
            [
                Event::LongPress(Button::Mode),
                Event::LongerPress(Button::Mode)
            ]
        );
    }

    #[test]
    fn test_buttons_track_independently() {
        let mut tracker = PressTracker::new();
        tracker.press(Button::Light);
        tracker.press(Button::Alarm);
        assert_eq!(tracker.release(Button::Light), Event::ButtonUp(Button::Light));
        assert_eq!(tracker.tick(), None);
        assert_eq!(tracker.tick(), Some(Event::LongPress(Button::Alarm)));
    }
}
