//! Report sink trait and error types.

use core::future::Future;

use buttonbox_hid::InputReport;

/// Error type for report transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// Transport I/O error.
    Io,
    /// Endpoint not ready (e.g. USB not enumerated).
    NotReady,
}

/// Async trait for the report transport.
///
/// Abstracts where the 13-byte report goes so the driver loop can be
/// exercised on the host and run over USB HID on the device.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap
/// allocation.
pub trait ReportSink {
    /// Transmit one report.
    ///
    /// May wait until the previous report has been collected by the host.
    fn send(&mut self, report: &InputReport) -> impl Future<Output = Result<(), SinkError>>;

    /// Check if the transport is ready to accept a report.
    fn is_ready(&self) -> bool;
}
