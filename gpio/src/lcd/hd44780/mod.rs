//! HD44780 LCD module.
//!
//! See [driver::CharacterDisplayHal] for the command-level contract and [driver::GpioHD44780Driver]
//! for the 4-bit parallel implementation over GPIO pins.

pub mod driver;
