//! Tag identifiers and the readers producing them.

use log::{debug, warn};
use std::fmt::{Display, Formatter};
use std::io::BufRead;
use std::str::FromStr;
use std::sync::mpsc::{Receiver, channel};
use std::thread;
use thiserror::Error;

/// The UID of an RFID tag.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TagId(Vec<u8>);

impl TagId {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        TagId(bytes.into())
    }
}

/// Formats as uppercase hex with no separators, e.g. `DEADBEEF`.
impl Display for TagId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Error, Eq, PartialEq)]
pub enum ParseTagIdError {
    #[error("tag id is empty")]
    Empty,
    #[error("tag id has an odd number of hex digits")]
    OddLength,
    #[error("tag id contains a non-hex character")]
    InvalidDigit,
}

impl FromStr for TagId {
    type Err = ParseTagIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseTagIdError::Empty);
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseTagIdError::InvalidDigit);
        }
        if s.len() % 2 != 0 {
            return Err(ParseTagIdError::OddLength);
        }

        s.as_bytes()
            .chunks(2)
            .map(|pair| {
                std::str::from_utf8(pair)
                    .ok()
                    .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                    .ok_or(ParseTagIdError::InvalidDigit)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(TagId)
    }
}

/// A source of tag detections.
pub trait TagReader {
    /// Returns the tag detected since the last poll, if any. Never blocks.
    fn poll(&mut self) -> Option<TagId>;
}

/// Reads tag ids as hex text, one per line, on a background thread.
///
/// USB readers in keyboard mode type the UID followed by Enter, so pointing this at stdin is
/// enough to use them. Lines that are not valid ids are logged and skipped.
#[derive(Debug)]
pub struct LineTagReader {
    receiver: Receiver<TagId>,
}

impl LineTagReader {
    pub fn spawn(input: impl BufRead + Send + 'static) -> Self {
        let (sender, receiver) = channel();

        thread::spawn(move || {
            for line in input.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("Tag input failed: {}", e);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<TagId>() {
                    Ok(tag) => {
                        if sender.send(tag).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Ignoring tag input {:?}: {}", line, e),
                }
            }
            debug!("Tag input closed.");
        });

        LineTagReader { receiver }
    }
}

impl TagReader for LineTagReader {
    fn poll(&mut self) -> Option<TagId> {
        self.receiver.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    #[test]
    fn formats_as_uppercase_hex() {
        assert_eq!(TagId::new([0xDE, 0xAD, 0x0B, 0x0F]).to_string(), "DEAD0B0F");
    }

    #[test]
    fn parses_hex_in_any_case() {
        assert_eq!("a1B2c3d4".parse::<TagId>(), Ok(TagId::new([0xA1, 0xB2, 0xC3, 0xD4])));
        assert_eq!("  0400ff \r".parse::<TagId>(), Ok(TagId::new([0x04, 0x00, 0xFF])));
    }

    #[test]
    fn rejects_malformed_ids() {
        assert_eq!("".parse::<TagId>(), Err(ParseTagIdError::Empty));
        assert_eq!("ABC".parse::<TagId>(), Err(ParseTagIdError::OddLength));
        assert_eq!("ZZ".parse::<TagId>(), Err(ParseTagIdError::InvalidDigit));
        assert_eq!("+1".parse::<TagId>(), Err(ParseTagIdError::InvalidDigit));
        assert_eq!("éé".parse::<TagId>(), Err(ParseTagIdError::InvalidDigit));
    }

    #[test]
    fn line_reader_yields_valid_lines_in_order() {
        let input = Cursor::new("DEADBEEF\nnot a tag\n\n0102\n");
        let mut reader = LineTagReader::spawn(input);

        let mut tags = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        while tags.len() < 2 && Instant::now() < deadline {
            match reader.poll() {
                Some(tag) => tags.push(tag),
                None => thread::sleep(Duration::from_millis(1)),
            }
        }
        thread::sleep(Duration::from_millis(20));

        assert_eq!(reader.poll(), None);
        assert_eq!(tags, vec![TagId::new([0xDE, 0xAD, 0xBE, 0xEF]), TagId::new([0x01, 0x02])]);
    }
}
