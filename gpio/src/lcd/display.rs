//! Line-oriented text rendering on top of a [CharacterDisplayHal].

use crate::lcd::hd44780::driver::CharacterDisplayHal;
use crate::{GpioError, GpioResult};
use log::warn;

/// DDRAM distance between the start of two consecutive lines.
const LINE_STRIDE: usize = 0x40;

/// A character display with a software-tracked cursor.
///
/// The cursor follows what the controller does on its own: every character written moves it one
/// column to the right, with no wrapping or bounds checks. Only `'\n'` moves it to the start of
/// the next line. Positions past the geometry are sent to the controller as computed, where they
/// wrap around its DDRAM.
#[derive(Debug)]
pub struct LcdDisplay<H> {
    hal: H,
    lines: usize,
    columns: usize,
    cursor_row: usize,
    cursor_col: usize,
}

impl<H: CharacterDisplayHal> LcdDisplay<H> {
    /// Wraps `hal` as a display with the given geometry and the cursor at the origin. Nothing is
    /// sent to the controller.
    ///
    /// # Errors
    /// - `GpioError::InvalidGeometry` if `lines` or `columns` is zero.
    pub fn new(hal: H, lines: usize, columns: usize) -> GpioResult<Self> {
        if lines == 0 || columns == 0 {
            return Err(GpioError::InvalidGeometry { lines, columns });
        }

        Ok(LcdDisplay {
            hal,
            lines,
            columns,
            cursor_row: 0,
            cursor_col: 0,
        })
    }

    /// Initializes the controller. It ends up cleared, so the cursor goes back to the origin.
    pub fn init(&mut self) -> GpioResult<()> {
        self.hal.init()?;
        self.cursor_row = 0;
        self.cursor_col = 0;
        Ok(())
    }

    /// Clears the display and moves the cursor to the origin.
    ///
    /// The settle time the controller needs after a clear is left to the HAL.
    pub fn clear(&mut self) -> GpioResult<()> {
        self.hal.clear_display()?;
        self.cursor_row = 0;
        self.cursor_col = 0;
        Ok(())
    }

    /// Moves the cursor to column `col` of line `row`.
    pub fn move_to(&mut self, col: usize, row: usize) -> GpioResult<()> {
        self.cursor_col = col;
        self.cursor_row = row;
        let address = LINE_STRIDE.wrapping_mul(row).wrapping_add(col) as u8;
        self.hal.set_ddram_address(address)
    }

    /// Writes `text` at the cursor. `'\n'` starts the next line; it is not written itself.
    ///
    /// Every character is sent as its code point. The controller only knows 8-bit codes, so
    /// anything above U+00FF is written as `?`.
    pub fn putstr(&mut self, text: &str) -> GpioResult<()> {
        for c in text.chars() {
            if c == '\n' {
                self.move_to(0, self.cursor_row.wrapping_add(1))?;
                continue;
            }

            let code = u8::try_from(c).unwrap_or_else(|_| {
                warn!("Character {:?} has no 8-bit code", c);
                b'?'
            });
            self.hal.write_data(code)?;
            self.cursor_col = self.cursor_col.wrapping_add(1);
        }
        Ok(())
    }

    /// Replaces the whole display content with `text`.
    pub fn show(&mut self, text: &str) -> GpioResult<()> {
        self.clear()?;
        self.putstr(text)
    }

    /// The cursor position as `(col, row)`.
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_col, self.cursor_row)
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }
}
