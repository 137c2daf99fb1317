pub mod config;
pub mod gameplay;
pub mod healing;
pub mod input;
pub mod kernel;
pub mod perception;
pub mod rl;

pub use config::AgentConfig;
pub use kernel::agent::Agent;
pub use kernel::context::Context;
pub use kernel::reactor::{Decision, Reactor, ReactorConfig};
