//! PIO-driven WS2812 output behind the core strip trait.

use buttonbox_core::{LedStrip, StripError};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio_programs::ws2812::PioWs2812;
use smart_leds::RGB8;

use crate::board::LED_COUNT;

/// WS2812 strip on PIO0, one DMA transfer per frame.
pub struct Ws2812Strip {
    driver: PioWs2812<'static, PIO0, 0, LED_COUNT>,
}

impl Ws2812Strip {
    pub fn new(driver: PioWs2812<'static, PIO0, 0, LED_COUNT>) -> Self {
        Self { driver }
    }
}

impl LedStrip<LED_COUNT> for Ws2812Strip {
    async fn write(&mut self, frame: &[RGB8; LED_COUNT]) -> Result<(), StripError> {
        // The PIO transfer cannot fail.
        self.driver.write(frame).await;
        Ok(())
    }
}
