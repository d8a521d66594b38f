//! Reporting detected tags to the attendance server.

use crate::tag::TagId;
use log::debug;
use serde::Serialize;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unsupported report URL {0:?}, expected http://host[:port]/path")]
    InvalidUrl(String),
    #[error("could not resolve {0}")]
    Unresolved(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed HTTP response")]
    MalformedResponse,
    #[error("server answered with status {0}")]
    Status(u16),
}

/// Something that wants to know about every detected tag.
pub trait TagReporter {
    fn report(&mut self, tag: &TagId) -> Result<(), ReportError>;
}

#[derive(Serialize)]
struct CardReport<'a> {
    card_id: &'a str,
}

/// POSTs `{"card_id": "<UID>"}` to a plain HTTP endpoint, one request per tag.
///
/// There is no retry: a failed report is returned as an error and the tag is not queued.
#[derive(Clone, Debug)]
pub struct HttpReporter {
    host: String,
    port: u16,
    path: String,
    timeout: Duration,
}

impl HttpReporter {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ReportError> {
        let invalid = || ReportError::InvalidUrl(url.to_string());

        let rest = url.strip_prefix("http://").ok_or_else(invalid)?;
        let (authority, path) = match rest.find('/') {
            Some(index) => rest.split_at(index),
            None => (rest, "/"),
        };
        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => (host, port.parse().map_err(|_| invalid())?),
            None => (authority, 80),
        };
        if host.is_empty() {
            return Err(invalid());
        }

        Ok(HttpReporter {
            host: host.to_string(),
            port,
            path: path.to_string(),
            timeout,
        })
    }

    fn connect(&self) -> Result<TcpStream, ReportError> {
        let mut last_error = None;
        for addr in (self.host.as_str(), self.port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_error = Some(e),
            }
        }
        Err(match last_error {
            Some(e) => e.into(),
            None => ReportError::Unresolved(self.host.clone()),
        })
    }

    fn host_header(&self) -> String {
        if self.port == 80 {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Skips the response headers and reads `Content-Length` bytes of body.
///
/// Without a length the body is not read at all, since the server may keep the connection open.
fn read_body(reader: &mut impl BufRead) -> std::io::Result<Vec<u8>> {
    let mut content_length = None;
    loop {
        let mut line = Vec::new();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(Vec::new());
        }
        let line = String::from_utf8_lossy(&line);
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse::<u64>().ok();
            }
        }
    }

    let mut body = Vec::new();
    if let Some(length) = content_length {
        reader.take(length).read_to_end(&mut body)?;
    }
    Ok(body)
}

impl TagReporter for HttpReporter {
    fn report(&mut self, tag: &TagId) -> Result<(), ReportError> {
        let card_id = tag.to_string();
        let body = serde_json::to_string(&CardReport { card_id: &card_id })?;

        let mut stream = self.connect()?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;

        write!(
            stream,
            "POST {} HTTP/1.1\r\n\
             Host: {}\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\
             \r\n\
             {}",
            self.path,
            self.host_header(),
            body.len(),
            body,
        )?;
        stream.flush()?;

        let mut reader = BufReader::new(stream);
        let mut status_line = Vec::new();
        reader.read_until(b'\n', &mut status_line)?;
        let status: u16 = String::from_utf8_lossy(&status_line)
            .split_whitespace()
            .nth(1)
            .and_then(|code| code.parse().ok())
            .ok_or(ReportError::MalformedResponse)?;

        // The status decides the outcome, the body is only logged.
        match read_body(&mut reader) {
            Ok(body) => debug!(
                "Report for {} answered {}: {}",
                card_id,
                status,
                String::from_utf8_lossy(&body).trim()
            ),
            Err(e) => debug!("Report for {} answered {}, body unreadable: {}", card_id, status, e),
        }

        if !(200..300).contains(&status) {
            return Err(ReportError::Status(status));
        }
        Ok(())
    }
}
