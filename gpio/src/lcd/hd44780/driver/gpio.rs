use crate::delay::Delay;
use crate::lcd::hd44780::driver::{CharacterDisplayHal, CursorDirection, SLOW_COMMAND_MAX};
use crate::{GpioBusOutput, GpioOutput, GpioResult};
use log::{debug, trace};
use std::fmt::{Debug, Formatter};

/// The pins of a write-only HD44780 module wired in 4-bit mode. R/W must be tied to ground.
pub struct LcdPins<'a> {
    /// Register select: low for commands, high for data.
    pub register_select: Box<dyn GpioOutput + 'a>,
    /// Enable strobe. The controller latches the data lines on its falling edge.
    pub enable: Box<dyn GpioOutput + 'a>,
    /// D4..D7, bit 0 of a nibble goes to D4.
    pub data: Box<dyn GpioBusOutput<4> + 'a>,
}

impl Debug for LcdPins<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "LcdPins(RS: {:?}, E: {:?}, D: {:?})", self.register_select, self.enable, self.data)
    }
}

/// Driver for an HD44780 controller on a 4-bit parallel bus, bit-banged over GPIO pins.
///
/// Timing is fixed, with no busy flag reads. Every enable pulse holds each level for 1 ms, which is
/// far slower than the controller needs but leaves room for slow GPIO backends. Clear and return
/// home get an extra 5 ms to settle.
pub struct GpioHD44780Driver<'a> {
    pins: LcdPins<'a>,
    delay: Box<dyn Delay + 'a>,
}

impl<'a> GpioHD44780Driver<'a> {
    /// Time to wait for the supply to settle before talking to the controller.
    pub const POWER_ON_MS: u64 = 50;
    /// How long each level of the enable pulse is held.
    pub const PULSE_MS: u64 = 1;
    /// Extra wait after clear display and return home.
    pub const SLOW_COMMAND_MS: u64 = 5;
    /// Waits after each of the three 8-bit function set nibbles of the reset sequence.
    const RESET_NIBBLE_MS: [u64; 3] = [5, 5, 1];

    /// Creates the driver. Does not touch the pins, call [CharacterDisplayHal::init] before use.
    pub fn new(pins: LcdPins<'a>, delay: impl Delay + 'a) -> Self {
        GpioHD44780Driver {
            pins,
            delay: Box::new(delay),
        }
    }

    fn pulse_enable(&self) -> GpioResult<()> {
        let pin = &self.pins.enable;
        pin.write(false)?;
        self.delay.delay_ms(Self::PULSE_MS);
        pin.write(true)?;
        self.delay.delay_ms(Self::PULSE_MS);
        pin.write(false)?;
        self.delay.delay_ms(Self::PULSE_MS);
        Ok(())
    }

    fn write_nibble(&self, nibble: u8) -> GpioResult<()> {
        trace!("Writing nibble: {:04b}", nibble);
        self.pins.data.write_nibble(nibble)?;
        self.pulse_enable()
    }

    fn send(&mut self, data: u8, rs: bool) -> GpioResult<()> {
        trace!("Sending data: {:08b}, RS: {}", data, rs);

        self.pins.register_select.write(rs)?;

        self.write_nibble((data >> 4) & 0x0F)?;
        self.write_nibble(data & 0x0F)?;

        Ok(())
    }
}

impl Debug for GpioHD44780Driver<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GpioHD44780Driver({:?})", self.pins)
    }
}

impl CharacterDisplayHal for GpioHD44780Driver<'_> {
    /// Initializes the controller in 4-bit mode, 2 lines, 5x8 font.
    ///
    /// The controller may power up in 8-bit mode or halfway through a 4-bit transfer, so it is
    /// first forced into 8-bit mode by three `0011` nibbles, then switched to 4-bit mode with
    /// `0010`. After that, full commands set the function, turn the display on with the cursor
    /// hidden, make the cursor advance to the right and clear the display.
    fn init(&mut self) -> GpioResult<()> {
        debug!("Initializing HD44780 in 4-bit mode...");
        self.delay.delay_ms(Self::POWER_ON_MS);

        // Synchronize
        self.pins.register_select.write(false)?;
        for wait_ms in Self::RESET_NIBBLE_MS {
            self.write_nibble(0b0011)?;
            self.delay.delay_ms(wait_ms);
        }
        self.write_nibble(0b0010)?;

        self.function_set(false, true, false)?;
        self.set_display_control(true, false, false)?;
        self.set_entry_mode(CursorDirection::Right, false)?;
        self.clear_display()?;

        debug!("HD44780 initialized.");
        Ok(())
    }

    fn write_command(&mut self, command: u8) -> GpioResult<()> {
        self.send(command, false)?;
        if command <= SLOW_COMMAND_MAX {
            self.delay.delay_ms(Self::SLOW_COMMAND_MS);
        }
        Ok(())
    }

    fn write_data(&mut self, data: u8) -> GpioResult<()> {
        self.send(data, true)
    }
}
