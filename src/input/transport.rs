use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use thiserror::Error;
use tracing::{debug, error, info, trace};

use super::journal::{Journal, JournalEntry};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("transport is closed")]
    Closed,

    #[error("device rejected command: {0}")]
    Rejected(String),
}

/// Line-oriented session to the input device.
pub trait Transport: Send {
    fn send(&mut self, line: &str) -> Result<(), TransportError>;

    fn close(&mut self) {}

    fn describe(&self) -> String;
}

/// Writes newline-terminated commands straight to the device node
/// (`/dev/ttyACM0`, `\\.\COM33`, ...). Line settings are left to the OS.
pub struct SerialTransport {
    port: String,
    device: Option<File>,
}

impl SerialTransport {
    pub fn open(port: &str) -> Result<Self, TransportError> {
        let device = OpenOptions::new().write(true).open(port)?;
        Ok(Self {
            port: port.to_string(),
            device: Some(device),
        })
    }
}

impl Transport for SerialTransport {
    fn send(&mut self, line: &str) -> Result<(), TransportError> {
        let device = self.device.as_mut().ok_or(TransportError::Closed)?;
        device.write_all(line.as_bytes())?;
        device.write_all(b"\n")?;
        device.flush()?;
        trace!(port = %self.port, line, "sent");
        Ok(())
    }

    fn close(&mut self) {
        if self.device.take().is_some() {
            info!(port = %self.port, "Actuator session closed");
        }
    }

    fn describe(&self) -> String {
        format!("serial:{}", self.port)
    }
}

/// In-process transport. Every accepted line lands in the journal; lines
/// starting with a rejected prefix fail like a dead device would.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    journal: Journal,
    reject_prefix: Option<String>,
    closed: bool,
}

impl MemoryTransport {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            reject_prefix: None,
            closed: false,
        }
    }

    pub fn rejecting(journal: Journal, prefix: impl Into<String>) -> Self {
        Self {
            journal,
            reject_prefix: Some(prefix.into()),
            closed: false,
        }
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }
}

impl Transport for MemoryTransport {
    fn send(&mut self, line: &str) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        if let Some(prefix) = &self.reject_prefix {
            if line.starts_with(prefix.as_str()) {
                return Err(TransportError::Rejected(line.to_string()));
            }
        }
        debug!(line, "dry-run send");
        self.journal.push(JournalEntry::Sent(line.to_string()));
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Opens the device session once at startup. A failure is logged and yields
/// `None`; every keyboard call then degrades to a warned no-op.
pub fn open_session(port: &str) -> Option<Box<dyn Transport>> {
    match SerialTransport::open(port) {
        Ok(transport) => {
            info!(port, "Actuator session opened");
            Some(Box::new(transport))
        }
        Err(e) => {
            error!(port, error = %e, "Failed to open actuator session");
            None
        }
    }
}
