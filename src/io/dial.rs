//! Rotary dial input: record decoding and the blocking read loop.
//!
//! The dial shows up as an input device that emits fixed-size event records.
//! [`DialEvent::decode`] turns one record into a semantic event and is pure;
//! [`run_dial_loop`] owns the device file and blocks on it for the lifetime
//! of the process.
//!
//! ## Record Layout
//!
//! ```text
//! bytes  0..8   timestamp (seconds u32, microseconds u32)
//! bytes  8..10  type  (u16 LE)   0x01 key, 0x02 relative axis
//! bytes 10..12  code  (u16 LE)   0x100 dial button, 0x07 dial axis
//! bytes 12..16  value (i32 LE)   key: 1 down / 0 up, axis: signed steps
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::common::constants::{BTN_DIAL, DIAL_RECORD_SIZE, EV_KEY, EV_REL, REL_DIAL};

/// Errors from the dial read loop.
#[derive(Debug, Error)]
pub enum DialError {
    #[error("cannot open dial device {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read from dial device {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One raw record from the device stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputRecord {
    pub seconds: u32,
    pub microseconds: u32,
    pub kind: u16,
    pub code: u16,
    pub value: i32,
}

impl InputRecord {
    pub fn from_bytes(bytes: &[u8; DIAL_RECORD_SIZE]) -> Self {
        let u32_at = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        let u16_at = |at: usize| u16::from_le_bytes([bytes[at], bytes[at + 1]]);

        Self {
            seconds: u32_at(0),
            microseconds: u32_at(4),
            kind: u16_at(8),
            code: u16_at(10),
            value: i32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
        }
    }

    pub fn to_bytes(self) -> [u8; DIAL_RECORD_SIZE] {
        let mut bytes = [0u8; DIAL_RECORD_SIZE];
        bytes[0..4].copy_from_slice(&self.seconds.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.microseconds.to_le_bytes());
        bytes[8..10].copy_from_slice(&self.kind.to_le_bytes());
        bytes[10..12].copy_from_slice(&self.code.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.value.to_le_bytes());
        bytes
    }
}

/// Semantic event produced by the dial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialEvent {
    ClickDown,
    ClickUp,
    Turn { clockwise: bool, magnitude: i32 },
}

impl DialEvent {
    /// Decode a raw record. Records that are not dial turns or dial button
    /// transitions yield `None`.
    pub fn decode(bytes: &[u8; DIAL_RECORD_SIZE]) -> Option<Self> {
        Self::from_record(&InputRecord::from_bytes(bytes))
    }

    pub fn from_record(record: &InputRecord) -> Option<Self> {
        match (record.kind, record.code) {
            (EV_REL, REL_DIAL) => match record.value {
                0 => None,
                value => Some(DialEvent::Turn {
                    clockwise: value > 0,
                    magnitude: value,
                }),
            },
            (EV_KEY, BTN_DIAL) => match record.value {
                1 => Some(DialEvent::ClickDown),
                0 => Some(DialEvent::ClickUp),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Read records from `reader` until it fails, forwarding every decoded event.
///
/// Returns the error that ended the stream; end of file counts as an error
/// since a device stream never ends on its own.
pub fn pump_events<R: Read>(mut reader: R, mut on_event: impl FnMut(DialEvent)) -> io::Error {
    let mut buffer = [0u8; DIAL_RECORD_SIZE];
    loop {
        if let Err(error) = reader.read_exact(&mut buffer) {
            return error;
        }
        if let Some(event) = DialEvent::decode(&buffer) {
            on_event(event);
        }
    }
}

/// Open the dial device and forward its events until the stream fails.
///
/// Blocks the calling thread; under normal operation this never returns.
pub fn run_dial_loop(path: &Path, on_event: impl FnMut(DialEvent)) -> Result<(), DialError> {
    let file = File::open(path).map_err(|source| DialError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    log_decorated!("Listening for dial events on {}", path.display());

    Err(DialError::Read {
        path: path.to_path_buf(),
        source: pump_events(file, on_event),
    })
}
