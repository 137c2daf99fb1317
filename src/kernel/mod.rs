pub mod agent;
pub mod context;
pub mod event;
pub mod reactor;
pub mod telemetry;
pub mod time;
