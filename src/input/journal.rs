use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Something that can block the calling thread for a while.
pub trait Clock: Send {
    fn sleep(&self, duration: Duration);
}

/// Real wall-clock waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadClock;

impl Clock for ThreadClock {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEntry {
    Sent(String),
    Waited(Duration),
}

/// Ordered record of everything the actuator put on the wire and every wait
/// between commands. Cheap to clone; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<JournalEntry>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: JournalEntry) {
        self.entries.lock().push(entry);
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.lock().clone()
    }

    pub fn sent(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter_map(|e| match e {
                JournalEntry::Sent(line) => Some(line.clone()),
                JournalEntry::Waited(_) => None,
            })
            .collect()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.entries
            .lock()
            .iter()
            .filter_map(|e| match e {
                JournalEntry::Waited(d) => Some(*d),
                JournalEntry::Sent(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Records waits into a [`Journal`] instead of sleeping.
#[derive(Debug, Clone, Default)]
pub struct JournalClock {
    journal: Journal,
}

impl JournalClock {
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }
}

impl Clock for JournalClock {
    fn sleep(&self, duration: Duration) {
        self.journal.push(JournalEntry::Waited(duration));
    }
}
