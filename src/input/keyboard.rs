use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

use super::journal::{Clock, ThreadClock};
use super::keys::{key_code, KeyCode, NO_KEY};
use super::protocol::{DeviceCommand, KeyAction, KeyCommand, Transition};
use super::transport::Transport;

/// Default waits, matching what the firmware needs to register a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyTiming {
    /// Wait after each sequential press.
    pub press_duration: Duration,
    /// Hold time between the down and up phases of a chord.
    pub hotkey_interval: Duration,
    /// Per-character wait after a `write`.
    pub write_delay: Duration,
}

impl Default for KeyTiming {
    fn default() -> Self {
        Self {
            press_duration: Duration::from_millis(50),
            hotkey_interval: Duration::from_millis(10),
            write_delay: Duration::from_millis(10),
        }
    }
}

/// The device actuator. Turns logical key actions into timed wire commands.
///
/// Nothing here returns an error to the caller: a missing session degrades to
/// a warned no-op and a failed send is logged and dropped.
pub struct Keyboard {
    transport: Option<Box<dyn Transport>>,
    clock: Box<dyn Clock>,
    timing: KeyTiming,
    held: BTreeMap<KeyCode, String>,
    dropped: u64,
}

impl Keyboard {
    pub fn new(transport: Option<Box<dyn Transport>>, clock: Box<dyn Clock>, timing: KeyTiming) -> Self {
        Self {
            transport,
            clock,
            timing,
            held: BTreeMap::new(),
            dropped: 0,
        }
    }

    /// A keyboard whose session never came up.
    pub fn disconnected() -> Self {
        Self::new(None, Box::new(ThreadClock), KeyTiming::default())
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    pub fn timing(&self) -> KeyTiming {
        self.timing
    }

    /// Sends that failed since startup.
    pub fn dropped_commands(&self) -> u64 {
        self.dropped
    }

    /// Keys currently held through [`Keyboard::key_down`].
    pub fn held_keys(&self) -> Vec<String> {
        self.held.values().cloned().collect()
    }

    fn ensure_session(&self, op: &str) -> bool {
        if self.transport.is_none() {
            warn!(op, "Actuator session not initialized, ignoring");
            return false;
        }
        true
    }

    fn send(&mut self, command: DeviceCommand) -> bool {
        let Some(transport) = self.transport.as_mut() else {
            return false;
        };
        let line = command.to_string();
        match transport.send(&line) {
            Ok(()) => true,
            Err(e) => {
                // Never retried.
                self.dropped += 1;
                warn!(command = %line, error = %e, "Actuator send failed, command dropped");
                false
            }
        }
    }

    /// Resolves and sends one key transition. Unknown keys are skipped.
    fn emit(&mut self, key: &str, transition: Transition) -> bool {
        let code = key_code(key);
        if code == NO_KEY {
            debug!(key, "Unmapped key skipped");
            return false;
        }
        self.send(DeviceCommand::Key(KeyCommand {
            key: key.to_string(),
            transition,
            code,
        }))
    }

    pub fn press<K: AsRef<str>>(&mut self, keys: &[K]) {
        let duration = self.timing.press_duration;
        self.press_for(keys, duration);
    }

    /// Sequential presses: each key is sent, then `duration` elapses before the next.
    pub fn press_for<K: AsRef<str>>(&mut self, keys: &[K], duration: Duration) {
        if !self.ensure_session("press") {
            return;
        }
        for key in keys {
            if self.emit(key.as_ref(), Transition::Press) {
                self.clock.sleep(duration);
            }
        }
    }

    pub fn key_down(&mut self, key: &str) {
        if !self.ensure_session("keyDown") {
            return;
        }
        if self.emit(key, Transition::Down) {
            self.held.insert(key_code(key), key.to_string());
        }
    }

    pub fn key_up(&mut self, key: &str) {
        if !self.ensure_session("keyUp") {
            return;
        }
        if self.emit(key, Transition::Up) {
            self.held.remove(&key_code(key));
        }
    }

    pub fn hotkey<K: AsRef<str>>(&mut self, keys: &[K]) {
        let interval = self.timing.hotkey_interval;
        self.hotkey_with_interval(keys, interval);
    }

    /// Chord: every down first, one wait of `interval`, then every up.
    ///
    /// The up phase is owned by a guard, so it is attempted for every key whose
    /// down was attempted even if this frame unwinds between the two phases.
    pub fn hotkey_with_interval<K: AsRef<str>>(&mut self, keys: &[K], interval: Duration) {
        if !self.ensure_session("hotkey") {
            return;
        }
        let mut chord = Chord::new(self);
        for key in keys {
            chord.down(key.as_ref());
        }
        chord.keyboard.clock.sleep(interval);
        chord.release();
    }

    pub fn write(&mut self, phrase: &str) {
        let delay = self.timing.write_delay;
        self.write_with_delay(phrase, delay);
    }

    /// Sends the phrase as one command, then waits `delay` per character.
    /// A phrase with a line break would split into extra device commands and
    /// is refused.
    pub fn write_with_delay(&mut self, phrase: &str, delay: Duration) {
        if !self.ensure_session("write") {
            return;
        }
        if phrase.contains(['\n', '\r']) {
            warn!(phrase = %phrase.escape_debug(), "Phrase contains a line break, not written");
            return;
        }
        if self.send(DeviceCommand::Write(phrase.to_string())) {
            let chars = phrase.chars().count() as u32;
            self.clock.sleep(delay * chars);
        }
    }

    pub fn execute(&mut self, action: &KeyAction) {
        match action {
            KeyAction::Press(keys) => self.press(keys),
            KeyAction::Hotkey(keys) => self.hotkey(keys),
            KeyAction::Write(phrase) => self.write(phrase),
        }
    }

    /// Releases the last pressed key, if any. Returns it when the up was sent.
    pub fn release_key(&mut self, last_pressed: Option<&str>) -> Option<String> {
        let key = last_pressed?;
        if !self.ensure_session("release") {
            return None;
        }
        if self.emit(key, Transition::Up) {
            self.held.remove(&key_code(key));
            return Some(key.to_string());
        }
        None
    }

    /// Sends `keyUp` for everything still held. Returns the keys released.
    pub fn release_held(&mut self) -> Vec<String> {
        let held: Vec<String> = self.held.values().cloned().collect();
        held.into_iter()
            .filter(|key| self.release_key(Some(key.as_str())).is_some())
            .collect()
    }

    pub fn close(&mut self) {
        let released = self.release_held();
        if !released.is_empty() {
            debug!(?released, "Released held keys on close");
        }
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
    }
}

/// Scoped down/up pairing for one chord.
struct Chord<'a> {
    keyboard: &'a mut Keyboard,
    downs: Vec<String>,
    released: bool,
}

impl<'a> Chord<'a> {
    fn new(keyboard: &'a mut Keyboard) -> Self {
        Self {
            keyboard,
            downs: Vec::new(),
            released: false,
        }
    }

    fn down(&mut self, key: &str) {
        if key_code(key) == NO_KEY {
            return;
        }
        // Remembered even if the send failed; the up is still attempted.
        self.keyboard.emit(key, Transition::Down);
        self.downs.push(key.to_string());
    }

    fn release(mut self) {
        self.release_all();
    }

    fn release_all(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        for key in std::mem::take(&mut self.downs) {
            self.keyboard.emit(&key, Transition::Up);
        }
    }
}

impl Drop for Chord<'_> {
    fn drop(&mut self) {
        self.release_all();
    }
}
