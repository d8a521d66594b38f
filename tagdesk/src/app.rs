//! The module for the scan loop state and logic.

use crate::config::Config;
use crate::report::TagReporter;
use crate::tag::{TagId, TagReader};
use log::{debug, info, warn};
use std::time::{Duration, Instant};
use tagdesk_gpio::GpioResult;
use tagdesk_gpio::lcd::display::LcdDisplay;
use tagdesk_gpio::lcd::hd44780::driver::CharacterDisplayHal;

/// What the display is currently showing.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AppState {
    /// Nothing drawn yet.
    #[default]
    Starting,
    /// The greeting, waiting for a tag.
    Greeting,
    /// A tag id, since the given instant.
    ShowingTag { tag: TagId, since: Instant },
}

/// The main app state struct.
pub struct App<'a, H> {
    /// Greeting text and timings.
    config: &'a Config,
    state: AppState,
    display: &'a mut LcdDisplay<H>,
    reader: &'a mut dyn TagReader,
    reporter: &'a mut dyn TagReporter,
}

impl<'a, H: CharacterDisplayHal> App<'a, H> {
    pub fn new(
        config: &'a Config,
        display: &'a mut LcdDisplay<H>,
        reader: &'a mut dyn TagReader,
        reporter: &'a mut dyn TagReporter,
    ) -> Self {
        App {
            config,
            state: AppState::default(),
            display,
            reader,
            reporter,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Runs one iteration of the scan loop at time `now`.
    ///
    /// A detected tag is shown and reported right away. Once it has been on display for longer
    /// than the configured time, the greeting comes back. Report failures are only logged; display
    /// failures are returned, as the display cannot be trusted afterwards.
    pub fn update(&mut self, now: Instant) -> GpioResult<()> {
        if self.state == AppState::Starting {
            self.show_greeting()?;
        }

        if let Some(tag) = self.reader.poll() {
            info!("Card detected: {}", tag);
            self.display.show(&format!("Card UID:\n{}", tag))?;
            match self.reporter.report(&tag) {
                Ok(()) => debug!("Card {} reported.", tag),
                Err(e) => warn!("Failed to report card {}: {}", tag, e),
            }
            self.state = AppState::ShowingTag { tag, since: now };
            return Ok(());
        }

        let display_time = Duration::from_millis(self.config.tag_display_ms);
        if let AppState::ShowingTag { tag, since } = &self.state {
            if now.saturating_duration_since(*since) > display_time {
                debug!("Card {} shown long enough.", tag);
                self.show_greeting()?;
            }
        }

        Ok(())
    }

    fn show_greeting(&mut self) -> GpioResult<()> {
        debug!("Showing greeting.");
        self.display.show(&self.config.greeting)?;
        self.state = AppState::Greeting;
        Ok(())
    }
}
