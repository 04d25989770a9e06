//! Incremental quadrature decoding for rotary encoders.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;

use crate::PinError;

/// Settle time after a phase edge before the confirming re-read.
const SETTLE_US: u32 = 1_000;

/// Quadrature decoder over a CLK/DT pin pair.
///
/// The two lines form a 2-bit Gray-code phase `(clk << 1) | dt`. On any raw
/// phase change the decoder waits [`SETTLE_US`] and re-reads; the settled
/// phase is compared against the last accepted one through the transition
/// tables. A transition not in either table (noise, skipped step) yields no
/// step but still resynchronizes the stored phase.
pub struct RotaryEncoder<P> {
    clk: P,
    dt: P,
    phase: u8,
    position: i32,
}

impl<P: InputPin> RotaryEncoder<P> {
    /// Build a decoder, capturing the current phase as the baseline.
    ///
    /// If the initial read fails the idle detent (both lines pulled high) is
    /// assumed; the first valid poll resynchronizes.
    pub fn new(mut clk: P, mut dt: P) -> Self {
        let phase = Self::read_phase(&mut clk, &mut dt).unwrap_or(0b11);
        Self {
            clk,
            dt,
            phase,
            position: 0,
        }
    }

    /// Poll once; returns `+1` for one clockwise step, `-1` for one
    /// counter-clockwise step, `0` otherwise.
    pub fn poll<D: DelayNs>(&mut self, delay: &mut D) -> Result<i8, PinError> {
        let current = Self::read_phase(&mut self.clk, &mut self.dt)?;
        if current == self.phase {
            return Ok(0);
        }

        delay.delay_us(SETTLE_US);
        let settled = Self::read_phase(&mut self.clk, &mut self.dt)?;

        let step = step_between(self.phase, settled);
        self.phase = settled;
        self.position = self.position.wrapping_add(i32::from(step));
        Ok(step)
    }

    /// Net step count since construction (clockwise positive).
    ///
    /// Advisory only: report composition consumes the per-poll deltas, not
    /// this total.
    pub fn position(&self) -> i32 {
        self.position
    }

    fn read_phase(clk: &mut P, dt: &mut P) -> Result<u8, PinError> {
        let clk_high = clk.is_high().map_err(|_| PinError)?;
        let dt_high = dt.is_high().map_err(|_| PinError)?;
        Ok((u8::from(clk_high) << 1) | u8::from(dt_high))
    }
}

/// Gray-code transition tables: 00→01→11→10→00 is clockwise.
fn step_between(from: u8, to: u8) -> i8 {
    match (from, to) {
        (0b00, 0b01) | (0b01, 0b11) | (0b11, 0b10) | (0b10, 0b00) => 1,
        (0b00, 0b10) | (0b10, 0b11) | (0b11, 0b01) | (0b01, 0b00) => -1,
        _ => 0,
    }
}
