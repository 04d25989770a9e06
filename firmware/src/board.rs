//! Board configuration for the Pico W build.
//!
//! Everything tunable or host-visible is collected here; the peripheral
//! claims themselves live in `main.rs`. GPIO assignment:
//!
//! ```text
//! GP0          WS2812 data
//! GP1-GP5      matrix rows (driven outputs, idle high)
//! GP6-GP9      matrix columns (pull-up inputs)
//! GP10-GP12    encoder 1 CLK / DT / push
//! GP13-GP15    encoder 2 CLK / DT / push
//! GP16-GP22    funky switch up, down, left, right, up-left, up-right, down-left
//! GP26         funky switch down-right
//! GP27         funky switch push
//! GP28         status LED
//! GP23-25, 29  reserved by the cyw43 radio
//! ```

/// Logical button number for each matrix position, row-major.
///
/// Rows are scanned top to bottom, columns left to right, so the physical
/// panel layout reads straight out of this table.
pub const BUTTON_MAP: [[u8; 4]; 5] = [
    [1, 2, 3, 4],
    [5, 6, 7, 8],
    [9, 10, 11, 12],
    [13, 14, 15, 16],
    [17, 18, 19, 20],
];

/// Debounce window for matrix buttons and push switches.
pub const DEBOUNCE_MS: u64 = 20;

/// Driver loop period. Input scan, report transmit and LED animation all
/// run once per tick.
pub const DRIVER_TICK_MS: u64 = 10;

/// WS2812 strip length, one LED behind each matrix button.
pub const LED_COUNT: usize = 20;

/// UDP port the LED control channel listens on.
pub const SIMHUB_PORT: u16 = 8888;

/// pid.codes test VID/PID.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0001;

/// Wi-Fi credentials, baked in at build time:
///
/// ```sh
/// BBOX_WIFI_SSID=racing BBOX_WIFI_PASSWORD=secret cargo build --release
/// ```
///
/// With no SSID set the firmware skips network association and the control
/// channel, and runs as a plain USB device.
pub const WIFI_SSID: &str = match option_env!("BBOX_WIFI_SSID") {
    Some(ssid) => ssid,
    None => "",
};

pub const WIFI_PASSWORD: &str = match option_env!("BBOX_WIFI_PASSWORD") {
    Some(password) => password,
    None => "",
};
