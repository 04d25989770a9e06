//! UDP/JSON LED control protocol for the button box.
//!
//! Dashboard software (SimHub and friends) drives the device's LED strip over
//! UDP with small JSON datagrams. This crate provides the typed command model
//! and a heap-free parser for the three message kinds:
//!
//! ```text
//! {"type":"led","leds":[{"id":0,"color":"#FF0000"},{"id":3,"color":[0,255,0]}]}
//! {"type":"effect","effect":"RAINBOW"}
//! {"type":"brightness","value":128}
//! ```
//!
//! The protocol is fire-and-forget: no acknowledgement is ever sent, and a
//! datagram that fails to decode is simply dropped by the caller.
//!
//! # Tolerance Rules
//!
//! - Object keys may appear in any order; unknown keys are skipped.
//! - A `led` entry missing its `id` or `color` key is skipped individually;
//!   so is an entry whose id cannot index any strip (negative or > 65535).
//! - Malformed values (bad hex color, wrong value type, broken JSON) fail the
//!   whole message; no partial application ever reaches the LED state.
//! - `brightness` values are clamped to 0..=255, as are `[r,g,b]` channels.
//!
//! # Example
//!
//! ```
//! use simhub_proto::{parse, Command};
//!
//! let msg = br#"{"type":"brightness","value":300}"#;
//! assert_eq!(parse(msg), Ok(Command::SetBrightness(255)));
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations; the
//! led list is a bounded [`heapless::Vec`].

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod command;
pub mod parser;

// Re-export main types at crate root
pub use command::{Command, Effect, LedUpdate, MAX_LED_UPDATES};
pub use parser::{parse, ParseError, MAX_DATAGRAM_LEN};
