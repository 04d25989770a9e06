//! Typed command model for the LED control channel.

use heapless::Vec;
use smart_leds::RGB8;

/// Maximum led entries accepted in a single `led` message.
///
/// A valid entry costs at least 16 bytes of JSON, so a full-size datagram
/// ([`MAX_DATAGRAM_LEN`](crate::parser::MAX_DATAGRAM_LEN)) cannot carry more
/// than this many.
pub const MAX_LED_UPDATES: usize = 64;

/// LED animation mode, as named on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Hold the current colors.
    Static,
    /// Sine-wave intensity over the stored base colors.
    Breathing,
    /// Per-LED hue offset cycling through the color wheel.
    Rainbow,
    /// Light a LED white on button press, fade it back out.
    Reactive,
    /// No local animation; colors come from `led` messages only.
    Simhub,
}

impl Effect {
    /// Resolve a wire tag to an effect, if it names one.
    #[must_use]
    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"STATIC" => Some(Self::Static),
            b"BREATHING" => Some(Self::Breathing),
            b"RAINBOW" => Some(Self::Rainbow),
            b"REACTIVE" => Some(Self::Reactive),
            b"SIMHUB" => Some(Self::Simhub),
            _ => None,
        }
    }

    /// The wire tag for this effect.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Static => "STATIC",
            Self::Breathing => "BREATHING",
            Self::Rainbow => "RAINBOW",
            Self::Reactive => "REACTIVE",
            Self::Simhub => "SIMHUB",
        }
    }
}

/// One (index, color) pair from a `led` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedUpdate {
    /// Zero-based LED index. Indices beyond the physical strip are skipped
    /// when the command is applied.
    pub index: u16,
    /// Unscaled color; global brightness is applied by the LED engine.
    pub color: RGB8,
}

/// A decoded control-channel message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Command {
    /// Set individual LEDs, then flush the strip once.
    SetLeds(Vec<LedUpdate, MAX_LED_UPDATES>),
    /// Switch the active animation effect.
    SetEffect(Effect),
    /// Set the global brightness scalar (already clamped to 0..=255).
    SetBrightness(u8),
}
