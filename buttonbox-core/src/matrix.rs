//! Row/column switch matrix scanning.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use heapless::Vec;

use crate::debounce::{DebouncedLine, Transition};
use crate::PinError;

/// Settle time after driving a row before its columns are sampled.
const ROW_SETTLE_US: u32 = 10;

/// Scanner for a diode-free button matrix.
///
/// Rows are outputs idling high; columns are inputs with pull-ups. One row at
/// a time is driven low and every column sampled after a short settle delay,
/// a low column meaning the key at (row, column) is closed. The mapping table
/// assigns each position its logical button number.
///
/// Each key runs through its own [`DebouncedLine`]. Only press edges are
/// reported upward; releases are tracked internally so the next press can
/// register, matching the one-event-per-press semantics of the report
/// pipeline.
pub struct MatrixScanner<R, C, const ROWS: usize, const COLS: usize> {
    rows: [R; ROWS],
    cols: [C; COLS],
    map: [[u8; COLS]; ROWS],
    lines: [[DebouncedLine; COLS]; ROWS],
    window_ms: u64,
}

impl<R: OutputPin, C: InputPin, const ROWS: usize, const COLS: usize>
    MatrixScanner<R, C, ROWS, COLS>
{
    /// Build a scanner. Row pins must already be driven high.
    pub fn new(rows: [R; ROWS], cols: [C; COLS], map: [[u8; COLS]; ROWS], window_ms: u64) -> Self {
        Self {
            rows,
            cols,
            map,
            lines: [[DebouncedLine::new(); COLS]; ROWS],
            window_ms,
        }
    }

    /// Scan the whole matrix once.
    ///
    /// Returns the logical button numbers that were confirmed as newly
    /// pressed during this scan, in row-major scan order. The capacity bound
    /// matches the report's button count; edges beyond it could not be
    /// represented anyway.
    pub fn scan<D: DelayNs>(
        &mut self,
        now_ms: u64,
        delay: &mut D,
    ) -> Result<Vec<u8, 32>, PinError> {
        let mut pressed = Vec::new();

        for row in 0..ROWS {
            self.rows[row].set_low().map_err(|_| PinError)?;
            delay.delay_us(ROW_SETTLE_US);

            for col in 0..COLS {
                let active = self.cols[col].is_low().map_err(|_| PinError)?;
                if let Some(Transition::Pressed) =
                    self.lines[row][col].confirm(active, now_ms, self.window_ms)
                {
                    let _ = pressed.push(self.map[row][col]);
                }
            }

            self.rows[row].set_high().map_err(|_| PinError)?;
        }

        Ok(pressed)
    }
}
