//! Runtime events
//!
//! Interrupt sources enqueue events; module code only ever runs from event
//! dispatch. Long presses are discrete event types, not cancellable
//! timers: a button that is released early produces `ButtonUp` and nothing
//! else.

/// Physical buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Light,
    Mode,
    Alarm,
}

impl Button {
    pub(crate) const fn index(self) -> usize {
        match self {
            Button::Light => 0,
            Button::Mode => 1,
            Button::Alarm => 2,
        }
    }
}

/// Events delivered to the active module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// The module just became visible.
    Activate,
    /// Periodic timer tick; `subsecond` counts 0..rate within each second.
    Tick { subsecond: u8 },
    /// Reduced-rate tick while in low-energy state.
    LowEnergyUpdate,
    /// A module's requested background wake fired.
    BackgroundTask,
    /// No input for the configured timeout interval.
    Timeout,
    ButtonDown(Button),
    /// Released before the long-press threshold.
    ButtonUp(Button),
    /// Still held at the long-press threshold.
    LongPress(Button),
    /// Still held at the longer-press threshold.
    LongerPress(Button),
    /// Released after a long press.
    LongUp(Button),
}

impl Event {
    /// The button this event concerns, if any.
    pub fn button(&self) -> Option<Button> {
        match self {
            Event::ButtonDown(b)
            | Event::ButtonUp(b)
            | Event::LongPress(b)
            | Event::LongerPress(b)
            | Event::LongUp(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether this event counts as user input for idle tracking.
    pub fn is_input(&self) -> bool {
        self.button().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_extraction() {
        assert_eq!(Event::LongPress(Button::Alarm).button(), Some(Button::Alarm));
        assert_eq!(Event::Tick { subsecond: 0 }.button(), None);
    }

    #[test]
    fn test_input_classification() {
        assert!(Event::ButtonDown(Button::Mode).is_input());
        assert!(!Event::Timeout.is_input());
        assert!(!Event::BackgroundTask.is_input());
    }
}
