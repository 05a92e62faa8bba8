//! Jogwheel - Handheld jog pendant firmware
//!
//! Reads a joystick, push-buttons, a rotary encoder and two analog speed
//! switches on an RP2040 and jogs a Grbl controller over a UART.
//!
//! Core 0 runs input capture (edge tasks and the poll task). Core 1 runs the
//! command executor, which owns the UART. The two sides only meet at the
//! command queue.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{Executor, Spawner};
use embassy_rp::adc::{Adc, Channel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use jogwheel_core::config::{parse_config, JogConfig};

use crate::channels::SharedCapture;

/// Embedded configuration (compiled into firmware)
/// Edit jogwheel.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../jogwheel.toml");

mod board;
mod channels;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

static CAPTURE: StaticCell<SharedCapture> = StaticCell::new();

static CORE1_STACK: StaticCell<Stack<8192>> = StaticCell::new();
static CORE1_EXECUTOR: StaticCell<Executor> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Jogwheel firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();

    // Grbl link
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = board::GRBL_BAUDRATE;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);

    info!(
        "UART initialized for Grbl (TX=GPIO{}, RX=GPIO{}, {} baud)",
        board::GRBL_TX_GPIO,
        board::GRBL_RX_GPIO,
        board::GRBL_BAUDRATE
    );

    // Executor gets core 1 to itself
    spawn_core1(p.CORE1, CORE1_STACK.init(Stack::new()), move || {
        let executor = CORE1_EXECUTOR.init(Executor::new());
        executor.run(|spawner| {
            spawner
                .spawn(tasks::executor_task(uart, config))
                .unwrap();
        })
    });

    let capture: &'static SharedCapture = CAPTURE.init(SharedCapture::new(&config));

    // Discrete inputs (active-low)
    let buttons = [
        (board::JOY_LEFT_GPIO, Input::new(p.PIN_6, Pull::Up)),
        (board::JOY_DOWN_GPIO, Input::new(p.PIN_7, Pull::Up)),
        (board::JOY_RIGHT_GPIO, Input::new(p.PIN_8, Pull::Up)),
        (board::JOY_UP_GPIO, Input::new(p.PIN_9, Pull::Up)),
        (board::XY_ZERO_GPIO, Input::new(p.PIN_12, Pull::Up)),
        (board::Z_ZERO_GPIO, Input::new(p.PIN_13, Pull::Up)),
        (board::HOME_GPIO, Input::new(p.PIN_14, Pull::Up)),
        (board::EXTRA_GPIO, Input::new(p.PIN_15, Pull::Up)),
    ];

    for (gpio, input) in buttons {
        match board::PIN_MAP.lookup(gpio) {
            Some(id) => spawner
                .spawn(tasks::button_task(id, input, capture))
                .unwrap(),
            None => warn!("Unhandled GPIO {}", gpio),
        }
    }

    let encoder_a = Input::new(p.PIN_10, Pull::Up);
    let encoder_b = Input::new(p.PIN_11, Pull::Up);

    // Speed switches
    let speed = tasks::SpeedInputs {
        adc: Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default()),
        xy: Channel::new_pin(p.PIN_26, Pull::None),
        z: Channel::new_pin(p.PIN_27, Pull::None),
    };

    info!(
        "Inputs initialized (encoder GPIO{}/{}, speed GPIO{}/{})",
        board::ENCODER_A_GPIO,
        board::ENCODER_B_GPIO,
        board::XY_SPEED_GPIO,
        board::Z_SPEED_GPIO
    );

    spawner
        .spawn(tasks::encoder_task(encoder_a, encoder_b, capture))
        .unwrap();
    spawner
        .spawn(tasks::poll_task(capture, speed, config))
        .unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Parse the embedded configuration, falling back to defaults
fn load_config() -> JogConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!(
                "Parsed embedded configuration: debounce {} ms, repeat {} ms, step {} um",
                config.debounce_ms, config.repeat_ms, config.jog_step_um
            );
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            warn!("Using default configuration");
            JogConfig::default()
        }
    }
}
