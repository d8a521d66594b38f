mod gpio;

use crate::GpioResult;
pub use gpio::*;
use std::fmt::Debug;

/// Clear display. Also moves the cursor home.
pub const CLEAR_DISPLAY: u8 = 0b00000001;
/// Return home, resetting the address counter and any display shift.
pub const RETURN_HOME: u8 = 0b00000010;
/// Commands up to this value need an extended settle time after being sent.
pub const SLOW_COMMAND_MAX: u8 = RETURN_HOME | 0b00000001;
pub const ENTRY_MODE_SET: u8 = 0b00000100;
pub const DISPLAY_CONTROL: u8 = 0b00001000;
pub const FUNCTION_SET: u8 = 0b00100000;
pub const SET_DDRAM_ADDRESS: u8 = 0b10000000;

/// Hardware abstraction for HD44780-compatible character display controllers.
///
/// Implementations only provide [Self::init] and the two write primitives. Every other command is
/// built on top of [Self::write_command], so the same text layer works over a parallel bus, an I²C
/// expander or a simulated bus in tests.
///
/// The contract is write-only: there is no busy flag polling, so implementations are expected to
/// wait out the controller's execution time themselves.
pub trait CharacterDisplayHal: Debug {
    /// Runs the power-on initialization sequence of the controller. Leaves the display on, empty,
    /// with the cursor hidden at the home position.
    fn init(&mut self) -> GpioResult<()>;

    /// Sends a command byte (RS low).
    fn write_command(&mut self, command: u8) -> GpioResult<()>;

    /// Sends a data byte (RS high), usually a character code.
    fn write_data(&mut self, data: u8) -> GpioResult<()>;

    /// Clears the display and sets the cursor to the home position.
    fn clear_display(&mut self) -> GpioResult<()> {
        self.write_command(CLEAR_DISPLAY)
    }

    /// Sets the display to the specified entry mode.
    fn set_entry_mode(&mut self, cursor_direction: CursorDirection, shift: bool) -> GpioResult<()> {
        let mut command = ENTRY_MODE_SET;
        if cursor_direction == CursorDirection::Right {
            command |= 0b00000010;
        }
        if shift {
            command |= 0b00000001;
        }
        self.write_command(command)
    }

    /// Sets the display on/off, cursor on/off, and blinking on/off.
    fn set_display_control(
        &mut self,
        display_on: bool,
        cursor_on: bool,
        blink_on: bool,
    ) -> GpioResult<()> {
        let mut command = DISPLAY_CONTROL;
        if display_on {
            command |= 0b00000100;
        }
        if cursor_on {
            command |= 0b00000010;
        }
        if blink_on {
            command |= 0b00000001;
        }
        self.write_command(command)
    }

    /// Sets the bus width, the line mode and the font.
    ///
    /// `eight_bit` selects the 8-bit interface, `two_lines` the 2-line mode (also used by 4-line
    /// modules), `large_font` the 5x10 font.
    fn function_set(&mut self, eight_bit: bool, two_lines: bool, large_font: bool) -> GpioResult<()> {
        let mut command = FUNCTION_SET;
        if eight_bit {
            command |= 0b00010000;
        }
        if two_lines {
            command |= 0b00001000;
        }
        if large_font {
            command |= 0b00000100;
        }
        self.write_command(command)
    }

    /// Sets the DDRAM address. Only the low 7 bits of `address` are used; anything above wraps,
    /// the same way the controller's address counter does.
    fn set_ddram_address(&mut self, address: u8) -> GpioResult<()> {
        self.write_command(SET_DDRAM_ADDRESS | (address & 0b01111111))
    }
}

impl<T: CharacterDisplayHal + ?Sized> CharacterDisplayHal for &mut T {
    fn init(&mut self) -> GpioResult<()> {
        (**self).init()
    }

    fn write_command(&mut self, command: u8) -> GpioResult<()> {
        (**self).write_command(command)
    }

    fn write_data(&mut self, data: u8) -> GpioResult<()> {
        (**self).write_data(data)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CursorDirection {
    /// Moves the cursor to the left after writing data.
    Left,
    /// Moves the cursor to the right after writing data.
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Commands(Vec<u8>);

    impl CharacterDisplayHal for Commands {
        fn init(&mut self) -> GpioResult<()> {
            Ok(())
        }

        fn write_command(&mut self, command: u8) -> GpioResult<()> {
            self.0.push(command);
            Ok(())
        }

        fn write_data(&mut self, _data: u8) -> GpioResult<()> {
            unreachable!("helpers only send commands")
        }
    }

    #[test]
    fn helpers_build_the_datasheet_bytes() {
        let mut hal = Commands::default();

        hal.function_set(false, true, false).unwrap();
        hal.set_display_control(true, false, false).unwrap();
        hal.set_entry_mode(CursorDirection::Right, false).unwrap();
        hal.clear_display().unwrap();

        assert_eq!(hal.0, vec![0x28, 0x0C, 0x06, 0x01]);
    }

    #[test]
    fn ddram_address_wraps_to_seven_bits() {
        let mut hal = Commands::default();

        hal.set_ddram_address(0x40).unwrap();
        hal.set_ddram_address(0xC5).unwrap();

        assert_eq!(hal.0, vec![0xC0, 0xC5]);
    }

    #[test]
    fn mutable_references_forward() {
        fn move_to_third_line<H: CharacterDisplayHal>(mut hal: H) {
            hal.set_ddram_address(0x14).unwrap();
        }

        let mut hal = Commands::default();
        move_to_third_line(&mut hal);
        assert_eq!(hal.0, vec![0x94]);
    }
}
