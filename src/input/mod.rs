//! Device actuator: key table, wire protocol, transports and the timed
//! keyboard operations built on them.

pub mod journal;
pub mod keyboard;
pub mod keys;
pub mod protocol;
pub mod transport;

pub use journal::{Clock, Journal, JournalClock, JournalEntry, ThreadClock};
pub use keyboard::{KeyTiming, Keyboard};
pub use keys::{key_code, KeyCode, NO_KEY};
pub use protocol::{DeviceCommand, KeyAction, KeyCommand, Transition};
pub use transport::{open_session, MemoryTransport, SerialTransport, Transport, TransportError};
