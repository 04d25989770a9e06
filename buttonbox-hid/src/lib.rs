//! HID gamepad report layout and descriptor for the button box.
//!
//! This crate owns the wire format the device presents to the host: a single
//! 13-byte input report carrying 32 buttons and 8 one-byte axes, plus the HID
//! report descriptor that declares exactly that layout.
//!
//! # Report Layout
//!
//! ```text
//! byte 0      report id (always 0x01)
//! bytes 1-4   button bitset, button n -> bit (n-1) % 8 of byte (n-1) / 8 + 1
//! bytes 5-12  axes 1-8, one byte each, 128 = centered
//! ```
//!
//! # Example
//!
//! ```
//! use buttonbox_hid::InputReport;
//!
//! let mut report = InputReport::neutral();
//! report.set_button(10, true).unwrap();
//! report.set_axis(1, 136).unwrap();
//!
//! let bytes = report.as_bytes();
//! assert_eq!(bytes[0], 0x01);       // report id
//! assert_eq!(bytes[2], 0b0000_0010); // button 10 = bit 1 of byte 2
//! assert_eq!(bytes[5], 136);        // axis 1
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod descriptor;
pub mod report;

// Re-export main types at crate root
pub use descriptor::REPORT_DESCRIPTOR;
pub use report::{InputReport, ReportError, AXIS_CENTER, REPORT_ID};
