//! Priority-ordered healing and support observers.
//!
//! Each observer is a pure decision over the context. The chain runs them in
//! a fixed order and executes whatever they ask for; a failing observer is
//! logged and skipped, it never stops the ones after it.

pub mod observers;
pub mod settings;

use thiserror::Error;
use tracing::{debug, warn};

use crate::input::{KeyAction, Keyboard};
use crate::kernel::context::Context;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObserverError {
    #[error("observer {observer} is enabled but has no hotkey bound")]
    MissingHotkey { observer: &'static str },
}

/// Implementations report problems through [`ObserverError`]; a panic is not
/// caught and stops the process.
pub trait Observer: Send {
    fn name(&self) -> &'static str;

    /// `Ok(Some(action))` when the condition holds.
    fn observe(&self, ctx: &Context) -> Result<Option<KeyAction>, ObserverError>;
}

/// Outcome of one pass over the chain.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChainReport {
    pub fired: Vec<(&'static str, KeyAction)>,
    pub failed: Vec<(&'static str, ObserverError)>,
}

pub struct ObserverChain {
    observers: Vec<Box<dyn Observer>>,
}

impl ObserverChain {
    pub fn new(observers: Vec<Box<dyn Observer>>) -> Self {
        Self { observers }
    }

    /// The production order. Poison is cleared before any potion is spent.
    pub fn standard() -> Self {
        use observers::*;
        Self::new(vec![
            Box::new(EatFood),
            Box::new(AutoHaste),
            Box::new(ClearPoison),
            Box::new(HealingBySpells),
            Box::new(HealingByPotions),
            Box::new(HealingByMana),
            Box::new(SwapAmulet),
            Box::new(SwapRing),
            Box::new(ComboSpells),
        ])
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.observers.iter().map(|o| o.name()).collect()
    }

    /// Decisions only, nothing is sent.
    pub fn decide(&self, ctx: &Context) -> ChainReport {
        let mut report = ChainReport::default();
        for observer in &self.observers {
            match observer.observe(ctx) {
                Ok(Some(action)) => report.fired.push((observer.name(), action)),
                Ok(None) => {}
                Err(e) => {
                    warn!(observer = observer.name(), error = %e, "Observer failed");
                    report.failed.push((observer.name(), e));
                }
            }
        }
        report
    }

    /// Decides, then actuates every fired observer in chain order.
    pub fn run(&self, ctx: &Context, keyboard: &mut Keyboard) -> ChainReport {
        let report = self.decide(ctx);
        for (name, action) in &report.fired {
            debug!(observer = name, ?action, "Observer fired");
            keyboard.execute(action);
        }
        report
    }
}

impl Default for ObserverChain {
    fn default() -> Self {
        Self::standard()
    }
}
