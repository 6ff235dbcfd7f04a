//! Inkwatch - E-Paper Notification Watch Firmware
//!
//! Main firmware binary for RP2040-based watch boards. Notifications and
//! time arrive from the companion app through a BLE bridge module on
//! UART0; the 200x200 SSD1681 panel only refreshes what changed.
//!
//! Board wiring:
//!
//! | Function        | Pins                                   |
//! |-----------------|----------------------------------------|
//! | BLE bridge      | UART0 TX GPIO0, RX GPIO1               |
//! | Buttons         | GPIO2 menu, GPIO3 back, GPIO4 up, GPIO5 down |
//! | Panel (SPI1)    | CS GPIO9, SCK GPIO10, MOSI GPIO11      |
//! | Panel control   | DC GPIO8, RST GPIO12, BUSY GPIO13      |
//! | Vibration motor | GPIO14                                 |
//! | Battery         | VSYS/3 on GPIO29 (ADC3)                |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::spi::{Config as SpiConfig, Spi};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_rp::watchdog::Watchdog;
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use inkwatch_core::display::RetainedState;
use inkwatch_core::state::Button;
use inkwatch_core::App;
use inkwatch_drivers::{BatteryMonitor, Ssd1681, VibrationMotor, VoltageDivider};
use inkwatch_hal::rtc::WallClock;
use inkwatch_hal_rp2040::adc::VsysAdc;
use inkwatch_hal_rp2040::flash::Rp2040FlashStorage;
use inkwatch_hal_rp2040::rtc::Rp2040Clock;

mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

// UART buffers must live forever
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 512]> = StaticCell::new();

/// SSD1681 SPI clock
const PANEL_SPI_HZ: u32 = 4_000_000;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Inkwatch firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Configuration and battery log live in flash
    let mut storage = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    let config = config::load_config(&mut storage).await;
    let log_ring = config::resume_log(&mut storage).await;
    info!(
        "Configuration loaded: '{}', idle timeout {}s",
        config.device_name.as_str(),
        config.idle_timeout_s
    );
    let debounce_ms = config.debounce_ms;

    let mut clock = Rp2040Clock::new(p.RTC);

    // Scratch registers survive a watchdog reboot
    let mut watchdog = Watchdog::new(p.WATCHDOG);
    let mut words = [0u32; 4];
    for (index, word) in words.iter_mut().enumerate() {
        *word = watchdog.get_scratch(index);
    }
    let retained = RetainedState::from_words(words);

    let (app, boot_time_s) = match retained {
        Some(retained) => {
            info!("Warm reset, resuming display state");
            let boot_time_s = retained.boot_time_s;
            (App::resume(config, log_ring, &retained), boot_time_s)
        }
        None => {
            let boot_time_s = clock
                .now()
                .map(|now| now.and_utc().timestamp().clamp(0, i64::from(u32::MAX)) as u32)
                .unwrap_or(0);
            (App::new(config, log_ring), boot_time_s)
        }
    };

    // BLE bridge link
    let uart_config = UartConfig::default(); // 115200 baud default
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 512]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    info!("UART initialized for BLE bridge");

    // E-paper panel
    let mut spi_config = SpiConfig::default();
    spi_config.frequency = PANEL_SPI_HZ;
    let spi = Spi::new_txonly(p.SPI1, p.PIN_10, p.PIN_11, p.DMA_CH1, spi_config);
    let cs = Output::new(p.PIN_9, Level::High);
    let spi_device = match ExclusiveDevice::new(spi, cs, Delay) {
        Ok(device) => device,
        Err(never) => match never {},
    };
    let panel = Ssd1681::new(
        spi_device,
        Output::new(p.PIN_8, Level::High),
        Output::new(p.PIN_12, Level::High),
        Input::new(p.PIN_13, Pull::None),
        Delay,
    );
    info!("Panel initialized");

    // Battery voltage on VSYS/3
    let adc = Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default());
    let vsys = Channel::new_pin(p.PIN_29, Pull::None);
    let battery = BatteryMonitor::new(VsysAdc::new(adc, vsys), VoltageDivider::VSYS);

    let motor = VibrationMotor::new(Output::new(p.PIN_14, Level::Low), Delay);

    let watch = tasks::Watch {
        app,
        panel,
        motor,
        battery,
        clock,
        storage,
        watchdog,
        boot_time_s,
    };

    // Spawn tasks
    let buttons = [
        (Input::new(p.PIN_2, Pull::Up), Button::Menu),
        (Input::new(p.PIN_3, Pull::Up), Button::Back),
        (Input::new(p.PIN_4, Pull::Up), Button::Up),
        (Input::new(p.PIN_5, Pull::Up), Button::Down),
    ];
    for (pin, button) in buttons {
        spawner.must_spawn(tasks::button_task(pin, button, debounce_ms));
    }
    spawner.must_spawn(tasks::link_rx_task(rx));
    spawner.must_spawn(tasks::link_tx_task(tx));
    spawner.must_spawn(tasks::watch_task(watch));

    info!("All tasks spawned, firmware running");
}
