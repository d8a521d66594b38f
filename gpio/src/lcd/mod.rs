//! Character LCD support.
//!
//! [hd44780] holds the low-level contract for HD44780-compatible controllers and a driver that
//! bit-bangs it over GPIO pins. [display] renders lines of text through that contract and keeps
//! track of the cursor, without knowing anything about the bus underneath.

pub mod display;
pub mod hd44780;
