//! LED strip trait and the service that feeds it from the effect engine.

use core::future::Future;

use smart_leds::RGB8;

use simhub_proto::Command;

use crate::leds::LedEngine;

/// Error type for a failed strip write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StripError;

/// Async trait for writing a full frame to a physical LED strip.
pub trait LedStrip<const N: usize> {
    /// Latch `frame` onto the strip.
    fn write(&mut self, frame: &[RGB8; N]) -> impl Future<Output = Result<(), StripError>>;
}

/// Couples a [`LedEngine`] to a strip and batches writes.
///
/// Both the driver loop (per-tick animation and press feedback) and the
/// network channel (decoded commands) mutate LED state through this type, so
/// putting a service behind a mutex gives the lock exactly the
/// mutation-plus-flush scope the two contexts need. Every entry point
/// performs at most one strip write.
pub struct LedService<S, const N: usize> {
    engine: LedEngine<N>,
    strip: S,
}

impl<S: LedStrip<N>, const N: usize> LedService<S, N> {
    pub fn new(strip: S) -> Self {
        Self {
            engine: LedEngine::new(),
            strip,
        }
    }

    pub fn engine(&self) -> &LedEngine<N> {
        &self.engine
    }

    /// Apply one decoded network command.
    ///
    /// Led batches flush once after every entry is applied; effect and
    /// brightness changes flush only if they visibly changed the frame.
    pub async fn apply(&mut self, command: &Command) -> Result<(), StripError> {
        match command {
            Command::SetLeds(updates) => {
                for update in updates.iter() {
                    self.engine.set_color(update.index as usize, update.color);
                }
                self.strip.write(self.engine.frame()).await
            }
            Command::SetEffect(effect) => {
                if self.engine.set_effect(*effect) {
                    self.strip.write(self.engine.frame()).await
                } else {
                    Ok(())
                }
            }
            Command::SetBrightness(value) => {
                if self.engine.set_brightness(*value) {
                    self.strip.write(self.engine.frame()).await
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Per-tick step: record presses, advance the animation, flush if the
    /// frame changed.
    ///
    /// `pressed` holds 1-based button numbers; button `n` lights LED `n - 1`,
    /// and buttons beyond the strip are ignored by the engine.
    pub async fn tick(&mut self, now_ms: u64, pressed: &[u8]) -> Result<(), StripError> {
        for &button in pressed {
            if let Some(index) = button.checked_sub(1) {
                self.engine.press(usize::from(index), now_ms);
            }
        }
        if self.engine.advance(now_ms) {
            self.strip.write(self.engine.frame()).await
        } else {
            Ok(())
        }
    }

    /// Unconditionally write the current frame, e.g. to blank the strip at
    /// startup.
    pub async fn flush(&mut self) -> Result<(), StripError> {
        self.strip.write(self.engine.frame()).await
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use core::pin::Pin;
    use core::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
    use std::sync::{Arc, Mutex};
    use std::vec::Vec;

    use simhub_proto::{parse, Effect};

    use super::*;

    const LED_COUNT: usize = 4;

    // Records every frame it is handed.
    struct MockStrip {
        written: Arc<Mutex<Vec<[RGB8; LED_COUNT]>>>,
    }

    impl MockStrip {
        fn new() -> Self {
            Self {
                written: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl LedStrip<LED_COUNT> for MockStrip {
        fn write(
            &mut self,
            frame: &[RGB8; LED_COUNT],
        ) -> impl Future<Output = Result<(), StripError>> {
            self.written.lock().unwrap().push(*frame);
            core::future::ready(Ok(()))
        }
    }

    // Helper to run a future to completion (simple blocking executor)
    fn block_on<F: Future>(mut f: F) -> F::Output {
        fn noop_raw_waker() -> RawWaker {
            fn noop(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                noop_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
            RawWaker::new(core::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(noop_raw_waker()) };
        let mut cx = Context::from_waker(&waker);

        // SAFETY: We don't move f after pinning
        let mut f = unsafe { Pin::new_unchecked(&mut f) };

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(result) => return result,
                Poll::Pending => {
                    panic!("Mock future returned Pending unexpectedly");
                }
            }
        }
    }

    fn service() -> (LedService<MockStrip, LED_COUNT>, Arc<Mutex<Vec<[RGB8; LED_COUNT]>>>) {
        let strip = MockStrip::new();
        let written = strip.written.clone();
        (LedService::new(strip), written)
    }

    #[test]
    fn test_led_datagram_applies_and_flushes_once() {
        let (mut service, written) = service();

        let command = parse(br##"{"type":"led","leds":[{"id":0,"color":"#FF0000"}]}"##).unwrap();
        block_on(service.apply(&command)).unwrap();

        let written = written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0][0], RGB8 { r: 255, g: 0, b: 0 });
    }

    #[test]
    fn test_led_batch_is_one_flush() {
        let (mut service, written) = service();

        let command = parse(
            br##"{"type":"led","leds":[{"id":0,"color":"#110000"},{"id":1,"color":"#002200"},{"id":2,"color":[0,0,51]}]}"##,
        )
        .unwrap();
        block_on(service.apply(&command)).unwrap();

        let written = written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0][1], RGB8 { r: 0, g: 0x22, b: 0 });
        assert_eq!(written[0][2], RGB8 { r: 0, g: 0, b: 51 });
    }

    #[test]
    fn test_brightness_applied_to_stored_colors() {
        let (mut service, written) = service();

        let leds = parse(br#"{"type":"led","leds":[{"id":0,"color":[200,100,50]}]}"#).unwrap();
        block_on(service.apply(&leds)).unwrap();

        let dim = parse(br#"{"type":"brightness","value":128}"#).unwrap();
        block_on(service.apply(&dim)).unwrap();

        let written = written.lock().unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(
            written[1][0],
            RGB8 {
                r: 100,
                g: 50,
                b: 25
            }
        );
    }

    #[test]
    fn test_unchanged_brightness_skips_flush() {
        let (mut service, written) = service();

        let command = parse(br#"{"type":"brightness","value":255}"#).unwrap();
        block_on(service.apply(&command)).unwrap();
        // All LEDs are off; rescaling black changes nothing.
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_effect_entry_flushes_only_when_visible() {
        let (mut service, written) = service();

        // Entering BREATHING or returning to STATIC changes nothing on the
        // wire while the strip is dark.
        let breathing = parse(br#"{"type":"effect","effect":"BREATHING"}"#).unwrap();
        let static_again = parse(br#"{"type":"effect","effect":"STATIC"}"#).unwrap();
        block_on(service.apply(&breathing)).unwrap();
        block_on(service.apply(&static_again)).unwrap();
        assert!(written.lock().unwrap().is_empty());

        // Light an LED, then REACTIVE entry clears it: one flush each.
        let leds = parse(br##"{"type":"led","leds":[{"id":3,"color":"#FFFFFF"}]}"##).unwrap();
        let reactive = parse(br#"{"type":"effect","effect":"REACTIVE"}"#).unwrap();
        block_on(service.apply(&leds)).unwrap();
        block_on(service.apply(&reactive)).unwrap();
        {
            let written = written.lock().unwrap();
            assert_eq!(written.len(), 2);
            assert_eq!(written[1], [RGB8 { r: 0, g: 0, b: 0 }; LED_COUNT]);
        }

        // Back to STATIC: dark stays dark, no flush.
        block_on(service.apply(&static_again)).unwrap();
        assert_eq!(written.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_static_ticks_do_not_write() {
        let (mut service, written) = service();
        for now in [0u64, 10, 20, 30] {
            block_on(service.tick(now, &[])).unwrap();
        }
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_reactive_tick_lights_pressed_button_led() {
        let (mut service, written) = service();

        let reactive = parse(br#"{"type":"effect","effect":"REACTIVE"}"#).unwrap();
        block_on(service.apply(&reactive)).unwrap();

        // Button 2 maps to LED 1.
        block_on(service.tick(1_000, &[2])).unwrap();
        {
            let written = written.lock().unwrap();
            assert_eq!(written.len(), 1);
            assert_eq!(
                written[0][1],
                RGB8 {
                    r: 255,
                    g: 255,
                    b: 255
                }
            );
        }

        // Holding steady inside the hold window writes nothing new.
        block_on(service.tick(1_010, &[])).unwrap();
        assert_eq!(written.lock().unwrap().len(), 1);

        // The fade repaints every tick until the LED goes dark.
        block_on(service.tick(1_300, &[])).unwrap();
        assert_eq!(written.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_buttons_without_leds_are_ignored() {
        let (mut service, written) = service();

        let reactive = parse(br#"{"type":"effect","effect":"REACTIVE"}"#).unwrap();
        block_on(service.apply(&reactive)).unwrap();

        // Button 23 would be LED 22, beyond this strip.
        block_on(service.tick(500, &[23])).unwrap();
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_flush_writes_unconditionally() {
        let (mut service, written) = service();
        block_on(service.flush()).unwrap();
        assert_eq!(written.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_effect_accessor_tracks_commands() {
        let (mut service, _written) = service();
        let rainbow = parse(br#"{"type":"effect","effect":"RAINBOW"}"#).unwrap();
        block_on(service.apply(&rainbow)).unwrap();
        assert_eq!(service.engine().effect(), Effect::Rainbow);
    }
}
