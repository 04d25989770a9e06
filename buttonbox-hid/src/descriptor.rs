//! HID report descriptor matching [`InputReport`](crate::report::InputReport).

/// HID report descriptor for the button box.
///
/// Declares a gamepad with:
/// - 32 buttons (1 bit each)
/// - 8 axes (X, Y, Z, Rx, Ry, Rz, Slider, Slider), unsigned 8-bit, 0-255
/// - Report ID 1
///
/// The declared input length (32 + 64 bits) plus the report id byte must equal
/// [`InputReport::SIZE`](crate::report::InputReport::SIZE).
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Game Pad)
    0xA1, 0x01, // Collection (Application)
    0x85, 0x01, //   Report ID (1)
    //
    // --- Buttons (32 buttons) ---
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x20, //   Usage Maximum (Button 32)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x20, //   Report Count (32)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Axes (X, Y, Z, Rx, Ry, Rz, Slider, Slider) ---
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x09, 0x32, //   Usage (Z)
    0x09, 0x33, //   Usage (Rx)
    0x09, 0x34, //   Usage (Ry)
    0x09, 0x35, //   Usage (Rz)
    0x09, 0x36, //   Usage (Slider)
    0x09, 0x36, //   Usage (Slider)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, // Logical Maximum (255)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    0xC0, // End Collection
];
