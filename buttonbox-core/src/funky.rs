//! Direction decoding for the eight-way funky switch.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;

use crate::PinError;

/// Delay between the two reads that confirm a direction change.
const CONFIRM_DELAY_US: u32 = 5_000;

/// One of the eight stick directions.
///
/// Declaration order is the resolution priority when several lines read
/// active at once, and the offset into the report's direction button block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    /// All directions in priority order.
    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::UpLeft,
        Direction::UpRight,
        Direction::DownLeft,
        Direction::DownRight,
    ];

    /// Position in [`ALL`](Self::ALL), also the report button offset.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Decoder for the switch's eight active-low direction lines.
///
/// Reads resolve to the first active line in [`Direction::ALL`] order, making
/// the result deterministic if the hardware briefly closes two adjacent
/// lines. A change is only reported after a second read [`CONFIRM_DELAY_US`]
/// later agrees that the direction really moved; a confirmed change back to
/// center is tracked but produces no event.
pub struct FunkySwitch<P> {
    pins: [P; 8],
    last: Option<Direction>,
}

impl<P: InputPin> FunkySwitch<P> {
    /// Build a decoder over the direction lines, ordered per
    /// [`Direction::ALL`].
    pub fn new(pins: [P; 8]) -> Self {
        Self { pins, last: None }
    }

    /// Poll once; returns the new direction if one was just engaged.
    pub fn poll<D: DelayNs>(&mut self, delay: &mut D) -> Result<Option<Direction>, PinError> {
        let current = self.resolve()?;
        if current == self.last {
            return Ok(None);
        }

        delay.delay_us(CONFIRM_DELAY_US);
        let confirmed = self.resolve()?;
        if confirmed == self.last {
            return Ok(None);
        }

        self.last = confirmed;
        Ok(confirmed)
    }

    fn resolve(&mut self) -> Result<Option<Direction>, PinError> {
        for (i, pin) in self.pins.iter_mut().enumerate() {
            if pin.is_low().map_err(|_| PinError)? {
                return Ok(Some(Direction::ALL[i]));
            }
        }
        Ok(None)
    }
}
