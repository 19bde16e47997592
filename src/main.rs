//! CatFeeder Firmware — Main Entry Point
//!
//! Hexagonal architecture: the schedule controller is pure logic, every
//! peripheral sits behind a port trait.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  ServoFeeder      RgbStatusLed   SystemClock   LogEventSink    │
//! │  (ActuatorPort)   (StatusPort)   (TimePort)    (EventSink)     │
//! │  TcpTransport over WiFi (Transport)                            │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │           ScheduleController (pure logic)              │    │
//! │  │  FSM · Schedule · CheckInClient                        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Result, anyhow};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, config::TimerConfig};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::FromValueType;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::{info, warn};

use catfeeder::adapters::log_sink::LogEventSink;
use catfeeder::adapters::tcp_transport::TcpTransport;
use catfeeder::adapters::time::SystemClock;
use catfeeder::app::service::ScheduleController;
use catfeeder::config::FeederConfig;
use catfeeder::drivers::servo::ServoFeeder;
use catfeeder::drivers::status_led::RgbStatusLed;

/// RGB LED PWM carrier.
const LED_PWM_HZ: u32 = 5_000;

fn load_config() -> FeederConfig {
    match option_env!("CATFEEDER_CONFIG_JSON") {
        Some(json) => match FeederConfig::from_json(json) {
            Ok(cfg) => {
                info!("Config loaded from CATFEEDER_CONFIG_JSON");
                cfg
            }
            Err(e) => {
                warn!("Embedded config rejected ({}), using defaults", e);
                FeederConfig::default()
            }
        },
        None => FeederConfig::default(),
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  CatFeeder v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config();
    info!(
        "Backend http://{}:{}{} | min scoops {} | retry {} ms",
        config.backend_host,
        config.backend_port,
        config.backend_path,
        config.min_scoops_per_feeding,
        config.checkin_retry_backoff_ms
    );

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── 3. Network bring-up ───────────────────────────────────
    let mut wifi = BlockingWifi::wrap(EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?, sysloop)?;
    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: config
            .wifi_ssid
            .as_str()
            .try_into()
            .map_err(|_| anyhow!("wifi_ssid too long"))?,
        password: config
            .wifi_password
            .as_str()
            .try_into()
            .map_err(|_| anyhow!("wifi_password too long"))?,
        auth_method: if config.wifi_password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        },
        ..Default::default()
    }))?;
    wifi.start()?;
    // Keep retrying: the feeder is useless offline and has no other UI.
    while let Err(e) = wifi.connect() {
        warn!("WiFi connect failed ({}), retrying", e);
        FreeRtos::delay_ms(5_000);
    }
    wifi.wait_netif_up()?;
    info!("WiFi up: {:?}", wifi.wifi().sta_netif().get_ip_info()?.ip);

    // ── 4. Peripherals ────────────────────────────────────────
    let servo_timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::default().frequency(config.servo.pwm_frequency_hz.Hz()),
    )?;
    let servo_pwm = LedcDriver::new(peripherals.ledc.channel0, &servo_timer, peripherals.pins.gpio0)?;
    let mut feeder = ServoFeeder::new(servo_pwm, FreeRtos, config.servo);

    let led_timer =
        LedcTimerDriver::new(peripherals.ledc.timer1, &TimerConfig::default().frequency(LED_PWM_HZ.Hz()))?;
    let mut status = RgbStatusLed::new(
        LedcDriver::new(peripherals.ledc.channel1, &led_timer, peripherals.pins.gpio1)?,
        LedcDriver::new(peripherals.ledc.channel2, &led_timer, peripherals.pins.gpio2)?,
        LedcDriver::new(peripherals.ledc.channel3, &led_timer, peripherals.pins.gpio3)?,
    );

    // ── 5. Controller ─────────────────────────────────────────
    let transport = TcpTransport::new(config.io_timeout());
    let mut controller = ScheduleController::new(&config, transport);
    let mut clock = SystemClock::new();
    let mut sink = LogEventSink::new();

    controller.run(&mut feeder, &mut status, &mut clock, &mut sink)
}
