//! USB HID output implementation.

use buttonbox_core::{ReportSink, SinkError};
use buttonbox_hid::{InputReport, REPORT_DESCRIPTOR};
use embassy_usb::class::hid::{HidWriter, State};
use embassy_usb::Builder;

/// USB HID report sink.
///
/// Wraps an embassy-usb HID writer to send input reports.
pub struct HidReportSink<'d> {
    writer: HidWriter<'d, embassy_rp::usb::Driver<'d, embassy_rp::peripherals::USB>, { InputReport::SIZE }>,
    ready: bool,
}

impl<'d> HidReportSink<'d> {
    /// Create a new report sink from the given HID writer.
    pub fn new(
        writer: HidWriter<
            'd,
            embassy_rp::usb::Driver<'d, embassy_rp::peripherals::USB>,
            { InputReport::SIZE },
        >,
    ) -> Self {
        Self {
            writer,
            ready: false,
        }
    }

    /// Wait until the device is ready (USB enumerated).
    pub async fn wait_ready(&mut self) {
        self.writer.ready().await;
        self.ready = true;
    }
}

impl<'d> ReportSink for HidReportSink<'d> {
    async fn send(&mut self, report: &InputReport) -> Result<(), SinkError> {
        self.writer
            .write(&report.as_bytes())
            .await
            .map_err(|_| SinkError::Io)
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}

/// Configure the USB HID class in the USB builder.
///
/// Returns the HID writer for use by the driver loop.
pub fn configure_usb_hid<'d>(
    builder: &mut Builder<'d, embassy_rp::usb::Driver<'d, embassy_rp::peripherals::USB>>,
    state: &'d mut State<'d>,
) -> HidWriter<'d, embassy_rp::usb::Driver<'d, embassy_rp::peripherals::USB>, { InputReport::SIZE }>
{
    let config = embassy_usb::class::hid::Config {
        report_descriptor: REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: 1,
        max_packet_size: 16,
        hid_subclass: embassy_usb::class::hid::HidSubclass::No,
        hid_boot_protocol: embassy_usb::class::hid::HidBootProtocol::None,
    };

    embassy_usb::class::hid::HidWriter::new(builder, state, config)
}
