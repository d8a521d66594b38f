use std::env::var_os;
use std::ffi::OsStr;
use std::path::Path;
use dotenv::var;
use log::warn;
use serde::{Serialize, Deserialize};

/// Behavioural settings, stored as JSON.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Number of lines of the LCD.
    pub lines: usize,
    /// Number of columns of the LCD.
    pub columns: usize,
    /// Text shown while no tag is on display.
    pub greeting: String,
    /// Endpoint every detected tag is POSTed to.
    pub report_url: String,
    /// How long a detected tag stays on the display.
    pub tag_display_ms: u64,
    /// Pause between two polls of the reader.
    pub poll_interval_ms: u64,
    /// Connect and read timeout of a single report.
    pub report_timeout_ms: u64,
}

impl Config {
    pub fn try_load() -> Option<Self> {
        let config_str = var_os("CONFIG_FILE");
        let config_str: &OsStr = config_str.as_deref().unwrap_or(OsStr::new("config.json"));
        let config_path = Path::new(config_str);
        if config_path.exists() {
            let file = std::fs::File::open(config_path).ok()?;
            let reader = std::io::BufReader::new(file);
            match serde_json::from_reader(reader) {
                Ok(config) => Some(config),
                Err(e) => {
                    warn!("Config at {} is invalid: {}", config_path.display(), e);
                    None
                }
            }
        } else {
            None
        }
    }

    pub fn save(&self) -> std::io::Result<()> {
        let config_str = var("CONFIG_FILE").unwrap_or_else(|_| "config.json".to_string());
        let config_path = Path::new(&config_str);
        let file = std::fs::File::create(config_path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            lines: 2,
            columns: 16,
            greeting: "Good Morning!".to_string(),
            report_url: "http://127.0.0.1:3002/data".to_string(),
            tag_display_ms: 3000,
            poll_interval_ms: 5,
            report_timeout_ms: 5000,
        }
    }
}

/// Parses a list of four GPIO line offsets, separated by commas, spaces or semicolons.
pub fn parse_pin_bus(pin_str: &str) -> eyre::Result<[usize; 4]> {
    pin_str
        .split([',', ' ', ';'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse())
        .collect::<Result<Vec<_>, _>>()?
        .try_into()
        .map_err(|_| eyre::eyre!("Invalid number of data pins"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = serde_json::from_str(r#"{ "greeting": "Hello", "columns": 20 }"#).unwrap();
        assert_eq!(config.greeting, "Hello");
        assert_eq!(config.columns, 20);
        assert_eq!(config.lines, 2);
        assert_eq!(config.tag_display_ms, 3000);
        assert_eq!(config.poll_interval_ms, 5);
    }

    #[test]
    fn defaults_survive_a_json_round_trip() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert_eq!(serde_json::from_str::<Config>(&json).unwrap(), Config::default());
    }

    #[test]
    fn pin_bus_accepts_mixed_separators() {
        assert_eq!(parse_pin_bus("14, 27;26 33").unwrap(), [14, 27, 26, 33]);
    }

    #[test]
    fn pin_bus_needs_exactly_four_numbers() {
        assert!(parse_pin_bus("14,27,26").is_err());
        assert!(parse_pin_bus("14,27,26,33,5").is_err());
        assert!(parse_pin_bus("14,27,x,33").is_err());
    }
}
