//! Page-select pushbutton
//!
//! The button is wired active-low with a pull-up: the line reads low while it
//! is held. A press is the released → pressed edge. Edges arriving within the
//! debounce window of the last *accepted* edge are ignored.

use core::time::Duration;

use embedded_hal::digital::InputPin;
use log::{debug, error};

/// Anything that can report whether the button is currently held.
pub trait ButtonInput {
    fn is_pressed(&mut self) -> bool;
}

/// Adapter for an active-low `embedded-hal` input pin.
///
/// A pin read error is logged once and reported as released.
pub struct ActiveLowButton<P> {
    pin: P,
    reported_error: bool,
}

impl<P: InputPin> ActiveLowButton<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            reported_error: false,
        }
    }
}

impl<P: InputPin> ButtonInput for ActiveLowButton<P> {
    fn is_pressed(&mut self) -> bool {
        match self.pin.is_low() {
            Ok(low) => low,
            Err(e) => {
                if !self.reported_error {
                    error!("Button read failed: {:?}", e);
                    self.reported_error = true;
                }
                false
            }
        }
    }
}

/// Edge detector with a debounce window.
#[derive(Debug, Clone, Copy)]
pub struct ButtonDebouncer {
    window: Duration,
    was_pressed: bool,
    last_accepted: Option<Duration>,
}

impl ButtonDebouncer {
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            was_pressed: false,
            last_accepted: None,
        }
    }

    /// Feed the current level; returns `true` when an accepted press occurred.
    pub fn update(&mut self, pressed: bool, now: Duration) -> bool {
        let edge = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        if !edge {
            return false;
        }

        let accepted = match self.last_accepted {
            None => true,
            Some(last) => now.saturating_sub(last) > self.window,
        };

        if accepted {
            self.last_accepted = Some(now);
        } else {
            debug!("Button edge at {:?} suppressed by debounce", now);
        }
        accepted
    }

    pub fn last_accepted(&self) -> Option<Duration> {
        self.last_accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    const WINDOW: Duration = Duration::from_millis(500);

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    /// Press and release the button at each time, returning accepted presses.
    fn presses(edges: &[u64]) -> usize {
        let mut debouncer = ButtonDebouncer::new(WINDOW);
        edges
            .iter()
            .filter(|&&at| {
                let accepted = debouncer.update(true, ms(at));
                debouncer.update(false, ms(at + 50));
                accepted
            })
            .count()
    }

    #[test]
    fn test_single_press_is_accepted() {
        assert_eq!(presses(&[0]), 1);
    }

    #[test]
    fn test_holding_is_one_press() {
        let mut debouncer = ButtonDebouncer::new(WINDOW);
        assert!(debouncer.update(true, ms(0)));
        for t in (100..3000).step_by(100) {
            assert!(!debouncer.update(true, ms(t)));
        }
    }

    #[test]
    fn test_bounce_inside_window_is_suppressed() {
        assert_eq!(presses(&[0, 300, 600]), 2);
        assert_eq!(presses(&[0, 200]), 1);
    }

    #[test]
    fn test_edge_exactly_at_window_is_suppressed() {
        assert_eq!(presses(&[0, 500]), 1);
        assert_eq!(presses(&[0, 501]), 2);
    }

    struct FakePin {
        low: Result<bool, ErrorKind>,
    }

    impl ErrorType for FakePin {
        type Error = ErrorKind;
    }

    impl InputPin for FakePin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            self.low.map(|low| !low)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.low
        }
    }

    #[test]
    fn test_active_low_pin() {
        assert!(ActiveLowButton::new(FakePin { low: Ok(true) }).is_pressed());
        assert!(!ActiveLowButton::new(FakePin { low: Ok(false) }).is_pressed());
        assert!(
            !ActiveLowButton::new(FakePin {
                low: Err(ErrorKind::Other)
            })
            .is_pressed()
        );
    }
}
