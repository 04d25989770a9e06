//! The 13-byte HID input report: 32-button bitset plus 8 axis bytes.

/// Report id prepended to every serialized report.
pub const REPORT_ID: u8 = 0x01;

/// Centered axis value (axes are unsigned 0-255).
pub const AXIS_CENTER: u8 = 128;

/// Error type for report mutator calls with out-of-range indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    /// Button number outside 1..=32.
    ButtonOutOfRange,
    /// Axis number outside 1..=8.
    AxisOutOfRange,
}

/// HID gamepad input report.
///
/// Holds the canonical button and axis state between ticks; the driver loop
/// mutates it through the range-checked setters and serializes it with
/// [`as_bytes`](Self::as_bytes) once per tick. Out-of-range setter calls fail
/// without touching existing state.
///
/// Buttons and axes are addressed 1-based, matching the usage numbering in
/// [`REPORT_DESCRIPTOR`](crate::descriptor::REPORT_DESCRIPTOR).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputReport {
    buttons: u32,
    axes: [u8; Self::AXIS_COUNT],
}

impl InputReport {
    /// Number of buttons in the report bitset.
    pub const BUTTON_COUNT: u8 = 32;

    /// Number of one-byte axes.
    pub const AXIS_COUNT: usize = 8;

    /// Size of the serialized report in bytes (id + buttons + axes).
    pub const SIZE: usize = 1 + 4 + Self::AXIS_COUNT;

    /// Neutral report: no buttons pressed, all axes centered.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            buttons: 0,
            axes: [AXIS_CENTER; Self::AXIS_COUNT],
        }
    }

    /// Set or clear button `n` (1..=32).
    pub fn set_button(&mut self, n: u8, pressed: bool) -> Result<(), ReportError> {
        if n < 1 || n > Self::BUTTON_COUNT {
            return Err(ReportError::ButtonOutOfRange);
        }
        let bit = 1u32 << (n - 1);
        if pressed {
            self.buttons |= bit;
        } else {
            self.buttons &= !bit;
        }
        Ok(())
    }

    /// Read button `n` (1..=32).
    pub fn button(&self, n: u8) -> Result<bool, ReportError> {
        if n < 1 || n > Self::BUTTON_COUNT {
            return Err(ReportError::ButtonOutOfRange);
        }
        Ok(self.buttons & (1u32 << (n - 1)) != 0)
    }

    /// Set axis `n` (1..=8) to `value`.
    pub fn set_axis(&mut self, n: u8, value: u8) -> Result<(), ReportError> {
        if n < 1 || n as usize > Self::AXIS_COUNT {
            return Err(ReportError::AxisOutOfRange);
        }
        self.axes[n as usize - 1] = value;
        Ok(())
    }

    /// Read axis `n` (1..=8).
    pub fn axis(&self, n: u8) -> Result<u8, ReportError> {
        if n < 1 || n as usize > Self::AXIS_COUNT {
            return Err(ReportError::AxisOutOfRange);
        }
        Ok(self.axes[n as usize - 1])
    }

    /// Reset to the neutral state (buttons cleared, axes centered).
    pub fn reset(&mut self) {
        *self = Self::neutral();
    }

    /// Serialize to the fixed 13-byte wire layout.
    #[must_use]
    pub fn as_bytes(&self) -> [u8; Self::SIZE] {
        let b = self.buttons.to_le_bytes();
        [
            REPORT_ID,
            b[0],
            b[1],
            b[2],
            b[3],
            self.axes[0],
            self.axes[1],
            self.axes[2],
            self.axes[3],
            self.axes[4],
            self.axes[5],
            self.axes[6],
            self.axes[7],
        ]
    }
}

impl Default for InputReport {
    fn default() -> Self {
        Self::neutral()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_layout() {
        let bytes = InputReport::neutral().as_bytes();
        assert_eq!(bytes.len(), InputReport::SIZE);
        assert_eq!(bytes[0], REPORT_ID);
        assert_eq!(&bytes[1..5], &[0, 0, 0, 0]);
        assert_eq!(&bytes[5..13], &[AXIS_CENTER; 8]);
    }

    #[test]
    fn test_button_bit_packing() {
        // Button n lands in bit (n-1) % 8 of serialized byte (n-1) / 8 + 1.
        for n in 1..=32u8 {
            let mut report = InputReport::neutral();
            report.set_button(n, true).unwrap();
            let bytes = report.as_bytes();
            let byte_idx = (n as usize - 1) / 8 + 1;
            let bit = (n - 1) % 8;
            assert_eq!(bytes[byte_idx], 1 << bit, "button {n}");
            // All other button bytes stay clear.
            for idx in 1..5 {
                if idx != byte_idx {
                    assert_eq!(bytes[idx], 0, "button {n} leaked into byte {idx}");
                }
            }
        }
    }

    #[test]
    fn test_set_button_out_of_range() {
        let mut report = InputReport::neutral();
        report.set_button(7, true).unwrap();
        let before = report.as_bytes();

        assert_eq!(report.set_button(0, true), Err(ReportError::ButtonOutOfRange));
        assert_eq!(report.set_button(33, true), Err(ReportError::ButtonOutOfRange));
        assert_eq!(report.as_bytes(), before);
    }

    #[test]
    fn test_set_and_clear_button() {
        let mut report = InputReport::neutral();
        report.set_button(24, true).unwrap();
        assert!(report.button(24).unwrap());
        report.set_button(24, false).unwrap();
        assert!(!report.button(24).unwrap());
        assert_eq!(report.as_bytes()[1..5], [0, 0, 0, 0]);
    }

    #[test]
    fn test_axis_layout() {
        let mut report = InputReport::neutral();
        report.set_axis(1, 0).unwrap();
        report.set_axis(8, 255).unwrap();
        let bytes = report.as_bytes();
        assert_eq!(bytes[5], 0);
        assert_eq!(bytes[12], 255);
        // Untouched axes stay centered.
        assert_eq!(&bytes[6..12], &[AXIS_CENTER; 6]);
    }

    #[test]
    fn test_set_axis_out_of_range() {
        let mut report = InputReport::neutral();
        assert_eq!(report.set_axis(0, 10), Err(ReportError::AxisOutOfRange));
        assert_eq!(report.set_axis(9, 10), Err(ReportError::AxisOutOfRange));
        assert_eq!(report.axis(9), Err(ReportError::AxisOutOfRange));
        assert_eq!(report.as_bytes(), InputReport::neutral().as_bytes());
    }

    #[test]
    fn test_reset() {
        let mut report = InputReport::neutral();
        report.set_button(3, true).unwrap();
        report.set_axis(2, 200).unwrap();
        report.reset();
        assert_eq!(report, InputReport::neutral());
    }
}
