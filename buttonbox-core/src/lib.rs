//! Platform-agnostic input scanning, report assembly, and LED effects.
//!
//! This crate provides the core logic of the button box without any
//! platform-specific dependencies. It can be used both in embedded `no_std`
//! environments and on host for testing.
//!
//! # Overview
//!
//! The crate is organized into several modules:
//!
//! - [`debounce`]: Edge detection for switches ([`DebouncedLine`], [`PushButton`])
//! - [`matrix`]: Row/column keypad scanning ([`MatrixScanner`])
//! - [`encoder`]: Quadrature decoding ([`RotaryEncoder`])
//! - [`funky`]: Eight-way switch decoding ([`FunkySwitch`], [`Direction`])
//! - [`pipeline`]: Everything above folded into one HID report ([`InputPipeline`])
//! - [`leds`]: Effect rendering over an RGB frame ([`LedEngine`])
//! - [`strip`]: Strip output trait and command service ([`LedStrip`], [`LedService`])
//! - [`output`]: Report sink trait ([`ReportSink`])
//!
//! # Driver Loop
//!
//! The firmware runs one fixed-rate tick:
//!
//! ```text
//! pipeline.poll()   scan devices, update the report, collect new presses
//! sink.send()       transmit the report
//! leds.tick()       feed presses to the effect engine, flush if it changed
//! ```
//!
//! Network commands mutate the LED engine from outside the tick through
//! [`LedService::apply`], so both paths share one service behind a lock.
//!
//! # Example
//!
//! ```rust
//! use buttonbox_core::{Effect, LedEngine};
//! use smart_leds::RGB8;
//!
//! let mut leds: LedEngine<20> = LedEngine::new();
//! leds.set_brightness(128);
//! leds.set_color(0, RGB8 { r: 200, g: 100, b: 50 });
//!
//! // Frames carry the brightness-scaled color.
//! assert_eq!(leds.frame()[0], RGB8 { r: 100, g: 50, b: 25 });
//! assert_eq!(leds.effect(), Effect::Static);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations,
//! making it suitable for embedded systems with limited resources.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod debounce;
pub mod encoder;
pub mod funky;
pub mod leds;
pub mod matrix;
pub mod output;
pub mod pipeline;
pub mod strip;

/// A GPIO read or write failed mid poll.
///
/// Carried up to the driver loop, which logs and skips the tick rather than
/// publishing a half-scanned report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinError;

// Re-export main types at crate root
pub use debounce::{DebouncedLine, PushButton, Transition};
pub use encoder::RotaryEncoder;
pub use funky::{Direction, FunkySwitch};
pub use leds::{LedEngine, REACTIVE_FADE_MS, REACTIVE_HOLD_MS};
pub use matrix::MatrixScanner;
pub use output::{ReportSink, SinkError};
pub use pipeline::{
    InputPipeline, AXIS_RECENTER_MS, AXIS_STEP, DIRECTION_BUTTON_BASE, ENCODER_AXES,
    ENCODER_BUTTONS, FUNKY_PUSH_BUTTON, PRESS_PULSE_MS,
};
pub use strip::{LedService, LedStrip, StripError};

// The protocol crate's command types travel through the LED service API, so
// surface them here too.
pub use simhub_proto::{Command, Effect};
