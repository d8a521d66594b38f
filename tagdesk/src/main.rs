mod app;
mod config;
mod report;
mod tag;

use std::env::var;
use std::io::BufReader;
use std::thread;
use std::time::{Duration, Instant};
use dotenv::dotenv;
use eyre::WrapErr;
use log::{debug, info};
use sysinfo::System;
use tagdesk_gpio::GpioDriver;
use tagdesk_gpio::delay::StdDelay;
use tagdesk_gpio::gpiod::GpiodDriver;
use tagdesk_gpio::lcd::display::LcdDisplay;
use tagdesk_gpio::lcd::hd44780::driver::{GpioHD44780Driver, LcdPins};
use crate::app::App;
use crate::config::{Config, parse_pin_bus};
use crate::report::HttpReporter;
use crate::tag::LineTagReader;

fn env_pin(name: &str) -> eyre::Result<usize> {
    var(name)
        .wrap_err_with(|| format!("{} is not set", name))?
        .trim()
        .parse()
        .wrap_err_with(|| format!("{} is not a line number", name))
}

fn main() -> eyre::Result<()> {
    // Initialize environment and logger
    dotenv().ok();
    pretty_env_logger::init();

    const UNKNOWN_STR: &str = "???";

    info!("TagDesk starting on {}...", System::host_name().as_deref().unwrap_or(UNKNOWN_STR));
    debug!(
        "System {} kernel {}",
        System::long_os_version().as_deref().unwrap_or(UNKNOWN_STR),
        System::kernel_version().as_deref().unwrap_or(UNKNOWN_STR),
    );

    // Get pin numbers from env
    let gpio_chip = var("TAGDESK_GPIO_CHIP").unwrap_or_else(|_| "/dev/gpiochip0".to_string());
    let lcd_rs_pin_no = env_pin("TAGDESK_LCD_PIN_RS")?;
    let lcd_e_pin_no = env_pin("TAGDESK_LCD_PIN_E")?;
    let lcd_data_pin_nos: [usize; 4] = parse_pin_bus(
        &var("TAGDESK_LCD_PINS_DATA").wrap_err("TAGDESK_LCD_PINS_DATA is not set")?,
    )?;

    info!("LCD @ {} RS: {}, E: {}, D4-D7: {:?}",
        gpio_chip, lcd_rs_pin_no, lcd_e_pin_no, lcd_data_pin_nos);

    debug!("Trying to load config...");
    let config = if let Some(config) = Config::try_load() {
        info!("Config loaded.");
        config
    } else {
        info!("Config not found. Using default");
        let config = Config::default();
        config.save()?;
        info!("Default config saved.");
        config
    };

    debug!("Initializing GPIO driver...");
    let gpio = GpiodDriver::open(&gpio_chip)?;
    debug!("{:?} initialized.", gpio);

    debug!("Initializing LCD driver...");
    let mut lcd_rs_pin = gpio.get_pin(lcd_rs_pin_no)?;
    let lcd_rs_out = lcd_rs_pin.as_output()?;
    let mut lcd_e_pin = gpio.get_pin(lcd_e_pin_no)?;
    let lcd_e_out = lcd_e_pin.as_output()?;
    let mut lcd_data_bus = gpio.get_pin_bus(lcd_data_pin_nos)?;
    let lcd_data_out = lcd_data_bus.as_output()?;
    let driver = GpioHD44780Driver::new(
        LcdPins {
            register_select: lcd_rs_out,
            enable: lcd_e_out,
            data: lcd_data_out,
        },
        StdDelay,
    );
    let mut lcd = LcdDisplay::new(driver, config.lines, config.columns)?;
    lcd.init()?;
    debug!("{:?} initialized.", lcd);

    let mut reader = LineTagReader::spawn(BufReader::new(std::io::stdin()));
    let mut reporter = HttpReporter::new(
        &config.report_url,
        Duration::from_millis(config.report_timeout_ms),
    )?;
    info!("Reporting cards to {}.", config.report_url);

    let poll_interval = Duration::from_millis(config.poll_interval_ms);
    let mut app = App::new(&config, &mut lcd, &mut reader, &mut reporter);

    info!("System ready, scan your card.");
    loop {
        app.update(Instant::now())?;
        thread::sleep(poll_interval);
    }
}
