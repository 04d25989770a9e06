//! Contact-bounce filtering shared by every switch input.

use embedded_hal::digital::InputPin;

use crate::PinError;

/// A confirmed level change on a debounced line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    Pressed,
    Released,
}

/// Debounce state for one digital line.
///
/// A raw level change is confirmed only if it differs from the last confirmed
/// level and at least the debounce window has elapsed since the last confirmed
/// transition. Rejected samples leave the state untouched, so chatter inside
/// the window collapses into at most one transition.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebouncedLine {
    active: bool,
    last_change_ms: u64,
}

impl DebouncedLine {
    /// New line in the released state.
    pub const fn new() -> Self {
        Self {
            active: false,
            last_change_ms: 0,
        }
    }

    /// Last confirmed level.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Feed one raw sample; returns the transition if it is confirmed.
    pub fn confirm(&mut self, raw_active: bool, now_ms: u64, window_ms: u64) -> Option<Transition> {
        if raw_active == self.active {
            return None;
        }
        if now_ms.wrapping_sub(self.last_change_ms) < window_ms {
            return None;
        }
        self.active = raw_active;
        self.last_change_ms = now_ms;
        Some(if raw_active {
            Transition::Pressed
        } else {
            Transition::Released
        })
    }
}

/// A single active-low push button behind a [`DebouncedLine`].
///
/// Used for the encoder push switches and the direction switch's center
/// button, which are plain GPIO lines outside the matrix.
pub struct PushButton<P> {
    pin: P,
    line: DebouncedLine,
    window_ms: u64,
}

impl<P: InputPin> PushButton<P> {
    pub fn new(pin: P, window_ms: u64) -> Self {
        Self {
            pin,
            line: DebouncedLine::new(),
            window_ms,
        }
    }

    /// Sample the pin once and run it through the debouncer.
    pub fn poll(&mut self, now_ms: u64) -> Result<Option<Transition>, PinError> {
        let active = self.pin.is_low().map_err(|_| PinError)?;
        Ok(self.line.confirm(active, now_ms, self.window_ms))
    }

    /// Last confirmed pressed state.
    pub fn is_pressed(&self) -> bool {
        self.line.is_active()
    }
}
