//! Ties every input device into the HID report.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use heapless::Vec;

use buttonbox_hid::{InputReport, AXIS_CENTER};

use crate::debounce::{PushButton, Transition};
use crate::encoder::RotaryEncoder;
use crate::funky::FunkySwitch;
use crate::matrix::MatrixScanner;
use crate::PinError;

/// Report buttons for the two encoder push switches.
pub const ENCODER_BUTTONS: [u8; 2] = [21, 22];

/// Report button for the funky switch's center push.
pub const FUNKY_PUSH_BUTTON: u8 = 23;

/// Report button for the first funky direction; the eight directions occupy
/// this and the following seven numbers in priority order.
pub const DIRECTION_BUTTON_BASE: u8 = 24;

/// Report axes nudged by the two encoders.
pub const ENCODER_AXES: [u8; 2] = [1, 2];

/// How long a press event keeps its report button set.
pub const PRESS_PULSE_MS: u64 = 50;

/// Axis movement per encoder step.
pub const AXIS_STEP: u8 = 8;

/// Quiet time after the last encoder step before its axis recenters.
pub const AXIS_RECENTER_MS: u64 = 50;

/// The input half of the driver loop.
///
/// Owns the scanners, the report and the timing state that turns edge events
/// into report changes. Every press, from whichever device, sets its report
/// button for [`PRESS_PULSE_MS`] and then clears it; encoder steps nudge
/// their axis away from center and a quiet period pulls it back. Deadlines
/// are carried across ticks instead of blocking the loop.
pub struct InputPipeline<R, I, const ROWS: usize, const COLS: usize> {
    matrix: MatrixScanner<R, I, ROWS, COLS>,
    encoders: [RotaryEncoder<I>; 2],
    encoder_buttons: [PushButton<I>; 2],
    funky: FunkySwitch<I>,
    funky_button: PushButton<I>,
    report: InputReport,
    pulse_until: [Option<u64>; 32],
    recenter_at: [Option<u64>; 2],
}

impl<R: OutputPin, I: InputPin, const ROWS: usize, const COLS: usize>
    InputPipeline<R, I, ROWS, COLS>
{
    pub fn new(
        matrix: MatrixScanner<R, I, ROWS, COLS>,
        encoders: [RotaryEncoder<I>; 2],
        encoder_buttons: [PushButton<I>; 2],
        funky: FunkySwitch<I>,
        funky_button: PushButton<I>,
    ) -> Self {
        Self {
            matrix,
            encoders,
            encoder_buttons,
            funky,
            funky_button,
            report: InputReport::neutral(),
            pulse_until: [None; 32],
            recenter_at: [None; 2],
        }
    }

    /// The report as of the last poll, ready to transmit.
    pub fn report(&self) -> &InputReport {
        &self.report
    }

    /// Run one input tick.
    ///
    /// Expires due pulses and recenters first, then polls every device.
    /// Returns the 1-based button numbers newly pressed this tick, for press
    /// feedback lighting.
    pub fn poll<D: DelayNs>(
        &mut self,
        now_ms: u64,
        delay: &mut D,
    ) -> Result<Vec<u8, 32>, PinError> {
        let mut pressed = Vec::new();

        self.expire(now_ms);

        for button in self.matrix.scan(now_ms, delay)? {
            self.press(button, now_ms, &mut pressed);
        }

        for k in 0..2 {
            let step = self.encoders[k].poll(delay)?;
            if step != 0 {
                self.nudge_axis(k, step, now_ms);
            }
            if let Some(Transition::Pressed) = self.encoder_buttons[k].poll(now_ms)? {
                self.press(ENCODER_BUTTONS[k], now_ms, &mut pressed);
            }
        }

        if let Some(direction) = self.funky.poll(delay)? {
            self.press(
                DIRECTION_BUTTON_BASE + direction.index() as u8,
                now_ms,
                &mut pressed,
            );
        }
        if let Some(Transition::Pressed) = self.funky_button.poll(now_ms)? {
            self.press(FUNKY_PUSH_BUTTON, now_ms, &mut pressed);
        }

        Ok(pressed)
    }

    /// Clear pulses and recenter axes whose deadlines have passed.
    fn expire(&mut self, now_ms: u64) {
        for i in 0..self.pulse_until.len() {
            if let Some(deadline) = self.pulse_until[i] {
                if now_ms >= deadline {
                    let _ = self.report.set_button(i as u8 + 1, false);
                    self.pulse_until[i] = None;
                }
            }
        }
        for k in 0..2 {
            if let Some(deadline) = self.recenter_at[k] {
                if now_ms >= deadline {
                    let _ = self.report.set_axis(ENCODER_AXES[k], AXIS_CENTER);
                    self.recenter_at[k] = None;
                }
            }
        }
    }

    /// Register one press: set the report button and schedule its release.
    fn press(&mut self, button: u8, now_ms: u64, pressed: &mut Vec<u8, 32>) {
        if self.report.set_button(button, true).is_err() {
            return;
        }
        self.pulse_until[usize::from(button - 1)] = Some(now_ms + PRESS_PULSE_MS);
        let _ = pressed.push(button);
    }

    /// Move an encoder's axis one step and push out its recenter deadline.
    ///
    /// Steps accumulate while the knob keeps turning; the value saturates at
    /// the axis range ends.
    fn nudge_axis(&mut self, k: usize, step: i8, now_ms: u64) {
        if let Ok(current) = self.report.axis(ENCODER_AXES[k]) {
            let value = if step > 0 {
                current.saturating_add(AXIS_STEP)
            } else {
                current.saturating_sub(AXIS_STEP)
            };
            let _ = self.report.set_axis(ENCODER_AXES[k], value);
            self.recenter_at[k] = Some(now_ms + AXIS_RECENTER_MS);
        }
    }
}
