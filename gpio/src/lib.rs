//! GPIO output abstraction and the character LCD stack built on top of it.
//!
//! The [lcd] module holds the HD44780 driver and the text display layered above it. Pins come from
//! a [GpioDriver] backend, such as [gpiod::GpiodDriver], and all timing goes through a
//! [delay::Delay] source.

pub mod delay;
pub mod gpiod;
pub mod lcd;
pub mod soft;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum GpioError {
    #[error("pin already in use")]
    AlreadyInUse,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("the feature is not supported on this backend")]
    NotSupported,
    #[error("invalid display geometry: {lines} lines x {columns} columns")]
    InvalidGeometry { lines: usize, columns: usize },
    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),
    #[error("error: {0}")]
    Other(String),
}

impl From<std::io::Error> for GpioError {
    fn from(err: std::io::Error) -> Self {
        GpioError::Io(err.kind())
    }
}

pub type GpioResult<T> = Result<T, GpioError>;

pub trait GpioDriver: Debug {
    /// Gets the amount of GPIO pins available.
    fn count(&self) -> GpioResult<usize>;

    /// Gets the GPIO pin at the given index.
    fn get_pin(&self, index: usize) -> GpioResult<Box<dyn GpioPin + '_>>;

    /// Gets the GPIO pin bus at the specific indices.
    fn get_pin_bus<const N: usize>(
        &self,
        indices: [usize; N],
    ) -> GpioResult<Box<dyn GpioBus<N> + '_>>;
}

/// Specifies the active level of the GPIO pin.
///
/// By default, the active level is high. A low active level inverts every value written, which
/// is handy behind inverting level shifters.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum GpioActiveLevel {
    #[default] High,
    Low,
}

impl GpioActiveLevel {
    /// Gets the real state that will be outputted on the GPIO pin based on the active level and the value.
    pub fn get_state(&self, value: bool) -> bool {
        match self {
            GpioActiveLevel::High => value,
            GpioActiveLevel::Low => !value,
        }
    }
}

pub trait GpioPin: Debug {
    /// Sets the GPIO pin function to output, allowing writing its state.
    fn as_output(&mut self) -> GpioResult<Box<dyn GpioOutput + '_>>;

    /// Gets whether the GPIO pin supports active level.
    fn supports_active_level(&self) -> bool {
        false
    }
    /// Gets the active level of the GPIO pin.
    fn active_level(&self) -> GpioActiveLevel {
        GpioActiveLevel::High
    }
    /// Sets the active level of the GPIO pin.
    ///
    /// # Errors
    /// - `GpioError::NotSupported` if the pin does not support active level.
    fn set_active_level(&mut self, _level: GpioActiveLevel) -> GpioResult<()> {
        Err(GpioError::NotSupported)
    }
}

pub trait GpioOutput: Debug {
    /// Writes the state of the GPIO pin.
    fn write(&self, value: bool) -> GpioResult<()>;
}

pub trait GpioBus<const N: usize>: Debug {
    fn as_output(&mut self) -> GpioResult<Box<dyn GpioBusOutput<N> + '_>>;

    fn supports_active_level(&self) -> bool {
        false
    }
    fn active_level(&self) -> GpioActiveLevel {
        GpioActiveLevel::High
    }
    fn set_active_level(&mut self, _level: GpioActiveLevel) -> GpioResult<()> {
        Err(GpioError::NotSupported)
    }
}

pub trait GpioBusOutput<const N: usize>: Debug {
    /// Writes all the pins of the bus at once, in bus order.
    fn write(&self, values: &[bool; N]) -> GpioResult<()>;
}

impl dyn GpioBusOutput<4> + '_ {
    /// Writes the values to the GPIO pins in the bus.
    /// The values are written as a nibble, LSb first, so bit `i` lands on line `i`.
    pub fn write_nibble(&self, value: u8) -> GpioResult<()> {
        if value > 0b1111 {
            return Err(GpioError::InvalidArgument);
        }

        let mut values = [false; 4];
        for (i, line) in values.iter_mut().enumerate() {
            *line = (value & (1 << i)) != 0;
        }
        self.write(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soft::SoftGpioBusOutput;
    use crate::testing::{BusEvent, BusLog};

    fn data_bus(log: &BusLog) -> SoftGpioBusOutput<'static, 4> {
        SoftGpioBusOutput::new([
            Box::new(log.output("D4")),
            Box::new(log.output("D5")),
            Box::new(log.output("D6")),
            Box::new(log.output("D7")),
        ])
    }

    #[test]
    fn nibble_bits_map_low_to_high() {
        let log = BusLog::default();
        let bus = data_bus(&log);
        let bus: &dyn GpioBusOutput<4> = &bus;

        bus.write_nibble(0b1010).unwrap();

        assert_eq!(
            log.events(),
            vec![
                BusEvent::Pin("D4", false),
                BusEvent::Pin("D5", true),
                BusEvent::Pin("D6", false),
                BusEvent::Pin("D7", true),
            ]
        );
    }

    #[test]
    fn nibble_rejects_wide_values() {
        let log = BusLog::default();
        let bus = data_bus(&log);
        let bus: &dyn GpioBusOutput<4> = &bus;

        assert_eq!(bus.write_nibble(0x10), Err(GpioError::InvalidArgument));
        assert!(log.events().is_empty());
    }

    #[test]
    fn active_level_low_inverts() {
        assert!(GpioActiveLevel::Low.get_state(false));
        assert!(!GpioActiveLevel::Low.get_state(true));
        assert!(GpioActiveLevel::High.get_state(true));
    }

    #[test]
    fn io_errors_keep_their_kind() {
        let err: GpioError = std::io::Error::from(std::io::ErrorKind::PermissionDenied).into();
        assert_eq!(err, GpioError::Io(std::io::ErrorKind::PermissionDenied));
    }
}
