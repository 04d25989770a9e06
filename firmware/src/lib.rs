//! Sim-racing button box firmware for the Pico W.
//!
//! This crate provides the embedded implementation of a button box that
//! scans a key matrix, rotary encoders and a funky switch into a USB HID
//! gamepad report, and drives a WS2812 strip controllable over UDP.

#![no_std]

// Re-export core types for convenience
pub use buttonbox_core::{
    FunkySwitch, InputPipeline, LedService, MatrixScanner, PushButton, ReportSink, RotaryEncoder,
};
pub use simhub_proto::{parse, MAX_DATAGRAM_LEN};

pub mod board;
pub mod strip;
pub mod usb;

pub use strip::Ws2812Strip;
pub use usb::{configure_usb_hid, HidReportSink};
