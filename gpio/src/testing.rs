//! Recording pins and delays for bus-level tests.
//!
//! All mocks created from one [BusLog] append to the same timeline, so the order of pin writes
//! and waits can be asserted exactly.

use crate::delay::Delay;
use crate::{GpioError, GpioOutput, GpioResult};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum BusEvent {
    Pin(&'static str, bool),
    Delay(Duration),
}

/// One nibble latched by the controller on a falling edge of E.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Transfer {
    pub rs: bool,
    pub nibble: u8,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct BusLog(Rc<RefCell<Vec<BusEvent>>>);

impl BusLog {
    pub fn output(&self, name: &'static str) -> MockOutput {
        MockOutput { name, log: self.clone(), fail: false }
    }

    pub fn failing_output(&self, name: &'static str) -> MockOutput {
        MockOutput { name, log: self.clone(), fail: true }
    }

    pub fn delay(&self) -> MockDelay {
        MockDelay { log: self.clone() }
    }

    pub fn events(&self) -> Vec<BusEvent> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    fn push(&self, event: BusEvent) {
        self.0.borrow_mut().push(event);
    }

    /// Replays the pin writes as the controller would see them, latching RS and D4..D7 on every
    /// high-to-low transition of E.
    pub fn transfers(&self) -> Vec<Transfer> {
        let mut rs = false;
        let mut e = false;
        let mut data = [false; 4];
        let mut transfers = Vec::new();

        for event in self.events() {
            let BusEvent::Pin(name, value) = event else {
                continue;
            };
            match name {
                "RS" => rs = value,
                "E" => {
                    if e && !value {
                        let nibble = data
                            .iter()
                            .enumerate()
                            .fold(0u8, |acc, (i, &bit)| acc | (u8::from(bit) << i));
                        transfers.push(Transfer { rs, nibble });
                    }
                    e = value;
                }
                "D4" => data[0] = value,
                "D5" => data[1] = value,
                "D6" => data[2] = value,
                "D7" => data[3] = value,
                other => panic!("unexpected pin {other}"),
            }
        }

        transfers
    }

    /// Pairs consecutive transfers into bytes, high nibble first. Returns `(rs, byte)`.
    pub fn bytes(&self) -> Vec<(bool, u8)> {
        let transfers = self.transfers();
        assert_eq!(transfers.len() % 2, 0, "odd number of nibbles: {transfers:?}");
        transfers
            .chunks(2)
            .map(|pair| {
                assert_eq!(pair[0].rs, pair[1].rs, "RS changed mid-byte");
                (pair[0].rs, (pair[0].nibble << 4) | pair[1].nibble)
            })
            .collect()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                BusEvent::Delay(duration) => Some(duration),
                BusEvent::Pin(..) => None,
            })
            .collect()
    }
}

#[derive(Debug)]
pub(crate) struct MockOutput {
    name: &'static str,
    log: BusLog,
    fail: bool,
}

impl GpioOutput for MockOutput {
    fn write(&self, value: bool) -> GpioResult<()> {
        if self.fail {
            return Err(GpioError::Io(std::io::ErrorKind::BrokenPipe));
        }
        self.log.push(BusEvent::Pin(self.name, value));
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct MockDelay {
    log: BusLog,
}

impl Delay for MockDelay {
    fn delay(&self, duration: Duration) {
        self.log.push(BusEvent::Delay(duration));
    }
}
