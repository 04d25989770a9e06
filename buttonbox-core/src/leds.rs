//! LED effect engine.
//!
//! Pure state: the engine owns the per-LED base colors, the rendered frame
//! and the effect/brightness settings, but never talks to hardware. Callers
//! flush [`frame`](LedEngine::frame) to a strip whenever a mutator or
//! [`advance`](LedEngine::advance) reports a change.

use libm::sinf;
use smart_leds::hsv::{hsv2rgb, Hsv};
use smart_leds::RGB8;

use simhub_proto::Effect;

/// How long a reactive LED holds full white before fading.
pub const REACTIVE_HOLD_MS: u64 = 200;

/// Length of the reactive linear fade that follows the hold.
pub const REACTIVE_FADE_MS: u64 = 300;

const BLACK: RGB8 = RGB8 { r: 0, g: 0, b: 0 };
const WHITE: RGB8 = RGB8 {
    r: 255,
    g: 255,
    b: 255,
};

/// Effect state machine over `N` LEDs.
///
/// Base colors are stored unscaled; global brightness is applied when a color
/// is rendered into the frame. Deriving from the base on every change keeps
/// repeated brightness updates free of cumulative rounding error.
///
/// Frame ownership depends on the effect: STATIC and SIMHUB render each color
/// write directly, while BREATHING, RAINBOW and REACTIVE repaint the frame on
/// every [`advance`](Self::advance).
pub struct LedEngine<const N: usize> {
    effect: Effect,
    brightness: u8,
    base: [RGB8; N],
    frame: [RGB8; N],
    pressed_at: [Option<u64>; N],
}

impl<const N: usize> LedEngine<N> {
    /// New engine: STATIC effect, full brightness, all LEDs off.
    pub fn new() -> Self {
        Self {
            effect: Effect::Static,
            brightness: 255,
            base: [BLACK; N],
            frame: [BLACK; N],
            pressed_at: [None; N],
        }
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// The rendered frame, ready for a strip write.
    pub fn frame(&self) -> &[RGB8; N] {
        &self.frame
    }

    /// Store a base color; out-of-range indices are rejected.
    ///
    /// Returns whether the color was stored. Under STATIC or SIMHUB the
    /// brightness-scaled color is rendered immediately; animated effects pick
    /// the base up on their next repaint.
    pub fn set_color(&mut self, index: usize, color: RGB8) -> bool {
        if index >= N {
            return false;
        }
        self.base[index] = color;
        if matches!(self.effect, Effect::Static | Effect::Simhub) {
            self.frame[index] = scale(color, self.brightness);
        }
        true
    }

    /// Store the same base color for every LED.
    pub fn set_all(&mut self, color: RGB8) {
        for index in 0..N {
            self.set_color(index, color);
        }
    }

    /// Set global brightness (0-255).
    ///
    /// Returns whether the rendered frame changed. Only STATIC and SIMHUB
    /// re-render here; animated effects apply the new value on their next
    /// repaint.
    pub fn set_brightness(&mut self, value: u8) -> bool {
        self.brightness = value;
        match self.effect {
            Effect::Static | Effect::Simhub => {
                let mut changed = false;
                for index in 0..N {
                    let scaled = scale(self.base[index], value);
                    if self.frame[index] != scaled {
                        self.frame[index] = scaled;
                        changed = true;
                    }
                }
                changed
            }
            _ => false,
        }
    }

    /// Switch effects; returns whether the rendered frame changed.
    ///
    /// REACTIVE and SIMHUB start from a dark strip, so entering them clears
    /// the base colors and the frame. The other effects keep whatever is
    /// showing. Press timestamps never survive a switch. Re-selecting the
    /// current effect runs the same entry actions, so a repeated REACTIVE or
    /// SIMHUB command doubles as a reset.
    pub fn set_effect(&mut self, effect: Effect) -> bool {
        self.effect = effect;
        self.pressed_at = [None; N];

        match effect {
            Effect::Reactive | Effect::Simhub => {
                self.base = [BLACK; N];
                let mut changed = false;
                for index in 0..N {
                    if self.frame[index] != BLACK {
                        self.frame[index] = BLACK;
                        changed = true;
                    }
                }
                changed
            }
            _ => false,
        }
    }

    /// Record a button press for reactive lighting.
    ///
    /// Ignored unless REACTIVE is active; out-of-range indices (buttons with
    /// no LED behind them) are ignored too.
    pub fn press(&mut self, index: usize, now_ms: u64) {
        if self.effect != Effect::Reactive || index >= N {
            return;
        }
        self.pressed_at[index] = Some(now_ms);
    }

    /// Advance the active animation to `now_ms`.
    ///
    /// Returns whether the frame changed and needs a strip write. STATIC and
    /// SIMHUB never animate.
    pub fn advance(&mut self, now_ms: u64) -> bool {
        match self.effect {
            Effect::Static | Effect::Simhub => false,
            Effect::Breathing => self.advance_breathing(now_ms),
            Effect::Rainbow => self.advance_rainbow(now_ms),
            Effect::Reactive => self.advance_reactive(now_ms),
        }
    }

    fn advance_breathing(&mut self, now_ms: u64) -> bool {
        // Sine oscillation between 0 and 1, roughly a 3 s period.
        let factor = (sinf(now_ms as f32 / 1000.0 * 2.0) + 1.0) / 2.0;
        let mut changed = false;
        for index in 0..N {
            let next = fade(self.base[index], factor);
            if self.frame[index] != next {
                self.frame[index] = next;
                changed = true;
            }
        }
        changed
    }

    fn advance_rainbow(&mut self, now_ms: u64) -> bool {
        let mut changed = false;
        for index in 0..N {
            // Hue walks 1 degree per 10 ms, offset 10 degrees per LED.
            let hue_deg = (now_ms / 10 + index as u64 * 10) % 360;
            let hue = ((hue_deg * 255) / 360) as u8;
            let next = hsv2rgb(Hsv {
                hue,
                sat: 255,
                val: 255,
            });
            if self.frame[index] != next {
                self.frame[index] = next;
                changed = true;
            }
        }
        changed
    }

    fn advance_reactive(&mut self, now_ms: u64) -> bool {
        let mut changed = false;
        for index in 0..N {
            let pressed_at = match self.pressed_at[index] {
                Some(t) => t,
                None => continue,
            };
            let elapsed = now_ms.wrapping_sub(pressed_at);

            let next = if elapsed < REACTIVE_HOLD_MS {
                scale(WHITE, self.brightness)
            } else if elapsed < REACTIVE_HOLD_MS + REACTIVE_FADE_MS {
                let factor =
                    1.0 - (elapsed - REACTIVE_HOLD_MS) as f32 / REACTIVE_FADE_MS as f32;
                fade(scale(WHITE, self.brightness), factor)
            } else {
                self.pressed_at[index] = None;
                BLACK
            };

            if self.frame[index] != next {
                self.frame[index] = next;
                changed = true;
            }
        }
        changed
    }
}

impl<const N: usize> Default for LedEngine<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Scale one channel by a 0-255 brightness.
#[inline]
fn scale_channel(value: u8, brightness: u8) -> u8 {
    ((u16::from(value) * u16::from(brightness)) / 255) as u8
}

#[inline]
fn scale(color: RGB8, brightness: u8) -> RGB8 {
    RGB8 {
        r: scale_channel(color.r, brightness),
        g: scale_channel(color.g, brightness),
        b: scale_channel(color.b, brightness),
    }
}

/// Scale a color by a factor in `[0, 1]`.
#[inline]
fn fade(color: RGB8, factor: f32) -> RGB8 {
    RGB8 {
        r: (f32::from(color.r) * factor) as u8,
        g: (f32::from(color.g) * factor) as u8,
        b: (f32::from(color.b) * factor) as u8,
    }
}
