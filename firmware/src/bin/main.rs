#![no_std]
#![no_main]

use cyw43::JoinOptions;
use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::{info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{Stack, StackResources};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::{DMA_CH1, PIO0, PIO1, USB};
use embassy_rp::pio::Pio;
use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Delay, Duration, Instant, Ticker, Timer};
use embassy_usb::class::hid::State;
use embassy_usb::{Builder, Config as UsbConfig};
use static_cell::StaticCell;

use buttonbox_rp2040::board::{
    BUTTON_MAP, DEBOUNCE_MS, DRIVER_TICK_MS, LED_COUNT, SIMHUB_PORT, USB_PID, USB_VID,
    WIFI_PASSWORD, WIFI_SSID,
};
use buttonbox_rp2040::{
    configure_usb_hid, parse, FunkySwitch, HidReportSink, InputPipeline, LedService,
    MatrixScanner, PushButton, ReportSink, RotaryEncoder, Ws2812Strip, MAX_DATAGRAM_LEN,
};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
    PIO1_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO1>;
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

/// The LED service shared by the driver loop and the network channel.
/// The lock is held for one mutation plus its strip flush, never across a
/// datagram receive.
type LedServiceMutex = Mutex<CriticalSectionRawMutex, LedService<Ws2812Strip, LED_COUNT>>;
static LED_SERVICE: StaticCell<LedServiceMutex> = StaticCell::new();

/// USB device configuration buffers.
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// HID state.
static HID_STATE: StaticCell<State> = StaticCell::new();

/// WS2812 PIO program, loaded once.
static WS2812_PROGRAM: StaticCell<PioWs2812Program<'static, PIO0>> = StaticCell::new();

/// cyw43 driver state and network stack resources.
static CYW43_STATE: StaticCell<cyw43::State> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Button box starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- Input pins ---
    // Rows idle high; the scanner drives one low at a time.
    let rows = [
        Output::new(p.PIN_1, Level::High),
        Output::new(p.PIN_2, Level::High),
        Output::new(p.PIN_3, Level::High),
        Output::new(p.PIN_4, Level::High),
        Output::new(p.PIN_5, Level::High),
    ];
    let cols = [
        Input::new(p.PIN_6, Pull::Up),
        Input::new(p.PIN_7, Pull::Up),
        Input::new(p.PIN_8, Pull::Up),
        Input::new(p.PIN_9, Pull::Up),
    ];
    let encoders = [
        RotaryEncoder::new(Input::new(p.PIN_10, Pull::Up), Input::new(p.PIN_11, Pull::Up)),
        RotaryEncoder::new(Input::new(p.PIN_13, Pull::Up), Input::new(p.PIN_14, Pull::Up)),
    ];
    let encoder_buttons = [
        PushButton::new(Input::new(p.PIN_12, Pull::Up), DEBOUNCE_MS),
        PushButton::new(Input::new(p.PIN_15, Pull::Up), DEBOUNCE_MS),
    ];
    // Direction lines in priority order: up, down, left, right, diagonals.
    let funky = FunkySwitch::new([
        Input::new(p.PIN_16, Pull::Up),
        Input::new(p.PIN_17, Pull::Up),
        Input::new(p.PIN_18, Pull::Up),
        Input::new(p.PIN_19, Pull::Up),
        Input::new(p.PIN_20, Pull::Up),
        Input::new(p.PIN_21, Pull::Up),
        Input::new(p.PIN_22, Pull::Up),
        Input::new(p.PIN_26, Pull::Up),
    ]);
    let funky_button = PushButton::new(Input::new(p.PIN_27, Pull::Up), DEBOUNCE_MS);

    let pipeline = InputPipeline::new(
        MatrixScanner::new(rows, cols, BUTTON_MAP, DEBOUNCE_MS),
        encoders,
        encoder_buttons,
        funky,
        funky_button,
    );

    let status_led = Output::new(p.PIN_28, Level::Low);

    // --- USB Setup ---
    let usb_driver = Driver::new(p.USB, Irqs);

    let mut usb_config = UsbConfig::new(USB_VID, USB_PID);
    usb_config.manufacturer = Some("BBox");
    usb_config.product = Some("Sim Racing Button Box");
    usb_config.serial_number = Some("001");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let config_descriptor = CONFIG_DESCRIPTOR.init([0; 256]);
    let bos_descriptor = BOS_DESCRIPTOR.init([0; 256]);
    let msos_descriptor = MSOS_DESCRIPTOR.init([0; 256]);
    let control_buf = CONTROL_BUF.init([0; 64]);

    let mut builder = Builder::new(
        usb_driver,
        usb_config,
        config_descriptor,
        bos_descriptor,
        msos_descriptor,
        control_buf,
    );

    // Configure HID class
    let hid_state = HID_STATE.init(State::new());
    let hid_writer = configure_usb_hid(&mut builder, hid_state);

    // Build the USB device
    let usb_device = builder.build();

    let sink = HidReportSink::new(hid_writer);

    // --- LED strip (PIO0) ---
    let Pio {
        mut common, sm0, ..
    } = Pio::new(p.PIO0, Irqs);
    let program = WS2812_PROGRAM.init(PioWs2812Program::new(&mut common));
    let ws2812 = PioWs2812::new(&mut common, sm0, p.DMA_CH0, p.PIN_0, program);

    let leds: &'static LedServiceMutex =
        LED_SERVICE.init(Mutex::new(LedService::new(Ws2812Strip::new(ws2812))));
    // Strip contents are undefined at power-up; blank it before the first tick.
    if leds.lock().await.flush().await.is_err() {
        warn!("Initial led flush failed");
    }

    spawner.must_spawn(usb_task(usb_device));
    spawner.must_spawn(driver_task(pipeline, sink, leds, status_led));

    // --- Wi-Fi chip (PIO1) ---
    // The cyw43 firmware blobs are flashed separately:
    //   probe-rs download 43439A0.bin --binary-format bin --chip RP2040 --base-address 0x10100000
    //   probe-rs download 43439A0_clm.bin --binary-format bin --chip RP2040 --base-address 0x10140000
    let fw = unsafe { core::slice::from_raw_parts(0x10100000 as *const u8, 230321) };
    let clm = unsafe { core::slice::from_raw_parts(0x10140000 as *const u8, 4752) };

    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO1, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH1,
    );

    let state = CYW43_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    spawner.must_spawn(cyw43_task(runner));

    control.init(clm).await;
    // Telemetry streams continuously, keep the radio awake.
    control
        .set_power_management(cyw43::PowerManagementMode::None)
        .await;

    if WIFI_SSID.is_empty() {
        info!("No Wi-Fi credentials, LED control channel disabled");
        return;
    }

    // --- Network stack ---
    let net_config = embassy_net::Config::dhcpv4(Default::default());
    let (stack, net_runner) = embassy_net::new(
        net_device,
        net_config,
        NET_RESOURCES.init(StackResources::new()),
        0, // random seed, nothing here needs unpredictability
    );
    spawner.must_spawn(net_task(net_runner));

    loop {
        match control
            .join(WIFI_SSID, JoinOptions::new(WIFI_PASSWORD.as_bytes()))
            .await
        {
            Ok(()) => break,
            Err(err) => warn!("Wi-Fi join failed with status={}", err.status),
        }
    }
    info!("Wi-Fi associated");

    spawner.must_spawn(simhub_task(stack, leds));
}

/// USB device task - runs the USB stack.
#[embassy_executor::task]
async fn usb_task(mut device: embassy_usb::UsbDevice<'static, Driver<'static, USB>>) {
    device.run().await;
}

/// cyw43 driver task - services the Wi-Fi chip.
#[embassy_executor::task]
async fn cyw43_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO1, 0, DMA_CH1>>,
) -> ! {
    runner.run().await
}

/// Network stack task.
#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Driver loop task - scans inputs, transmits the report, advances the LEDs.
///
/// One fixed-period tick covers the whole input-to-report pipeline. The
/// report goes out every tick whether or not anything changed; the strip is
/// only written when a frame actually changed.
#[embassy_executor::task]
async fn driver_task(
    mut pipeline: InputPipeline<Output<'static>, Input<'static>, 5, 4>,
    mut sink: HidReportSink<'static>,
    leds: &'static LedServiceMutex,
    mut status_led: Output<'static>,
) {
    // Nothing to report until the host has enumerated us.
    sink.wait_ready().await;
    info!("USB HID ready, driver loop running");

    let mut ticker = Ticker::every(Duration::from_millis(DRIVER_TICK_MS));
    loop {
        let now_ms = Instant::now().as_millis();
        match pipeline.poll(now_ms, &mut Delay) {
            Ok(pressed) => {
                if let Err(e) = sink.send(pipeline.report()).await {
                    warn!("Report transmit failed: {:?}", e);
                }
                if let Err(e) = leds.lock().await.tick(now_ms, &pressed).await {
                    warn!("Led flush failed: {:?}", e);
                }
            }
            Err(e) => {
                // Skip the tick rather than transmit a half-scanned report.
                warn!("Input scan failed: {:?}", e);
                status_led.toggle();
            }
        }
        ticker.next().await;
    }
}

/// Network control channel task - receives datagrams and applies decoded
/// commands to the LED service.
#[embassy_executor::task]
async fn simhub_task(stack: Stack<'static>, leds: &'static LedServiceMutex) {
    // Wait until the stack is configured
    while !stack.is_config_up() {
        Timer::after(Duration::from_millis(100)).await;
    }

    let mut rx_meta = [PacketMetadata::EMPTY; 4];
    let mut rx_buffer = [0u8; 2048];
    let mut tx_meta = [PacketMetadata::EMPTY; 4];
    let mut tx_buffer = [0u8; 256];

    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    if socket.bind(SIMHUB_PORT).is_err() {
        warn!("Failed to bind the control channel socket");
        return;
    }
    info!("LED control channel listening on port {}", SIMHUB_PORT);

    let mut buf = [0u8; MAX_DATAGRAM_LEN];
    loop {
        let (len, _meta) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(_) => {
                // Oversized datagrams land here as truncation errors.
                warn!("Datagram receive failed");
                continue;
            }
        };

        match parse(&buf[..len]) {
            Ok(command) => {
                if let Err(e) = leds.lock().await.apply(&command).await {
                    warn!("Led flush failed: {:?}", e);
                }
            }
            Err(e) => warn!("Dropping malformed datagram: {:?}", e),
        }
    }
}
