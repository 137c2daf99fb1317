use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::agent::Agent;
use super::context::Context;
use super::event::ControlCommand;
use super::telemetry::{TelemetryEvent, TelemetryRecorder};
use super::time::{remaining_budget, Tick, PAUSE_BACKOFF_MS, TICK_MS};
use crate::config::{ControlConfig, DecisionMode};
use crate::gameplay::{Concern, ResolveError, TaskOrchestrator};
use crate::healing::ObserverChain;
use crate::perception::StageError;
use crate::rl::env::{observe, transition};
use crate::rl::{Action, EnvError, Observation, ObservationSpace, Policy};

#[derive(Debug, Error)]
pub enum TickError {
    #[error("perception failed: {0}")]
    Perception(#[from] StageError),

    #[error("decision failed: {0}")]
    Decision(#[from] ResolveError),

    #[error("learning step failed: {0}")]
    Learning(#[from] EnvError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactorConfig {
    pub tick_budget: Duration,
    pub pause_backoff: Duration,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            tick_budget: Duration::from_millis(TICK_MS),
            pause_backoff: Duration::from_millis(PAUSE_BACKOFF_MS),
        }
    }
}

impl From<&ControlConfig> for ReactorConfig {
    fn from(control: &ControlConfig) -> Self {
        Self {
            tick_budget: control.tick_budget(),
            pause_backoff: control.pause_backoff(),
        }
    }
}

/// The decision stage. Exactly one per reactor.
pub enum Decision {
    Scripted {
        orchestrator: TaskOrchestrator,
        observers: ObserverChain,
    },
    Learning {
        policy: Box<dyn Policy>,
        space: ObservationSpace,
        /// Last snapshot and its observation; `None` until the first pass.
        episode: Option<(Context, Observation)>,
    },
}

impl Decision {
    pub fn scripted() -> Self {
        Decision::Scripted {
            orchestrator: TaskOrchestrator::new(),
            observers: ObserverChain::standard(),
        }
    }

    pub fn learning(policy: impl Policy + 'static) -> Self {
        Decision::Learning {
            policy: Box::new(policy),
            space: ObservationSpace::default(),
            episode: None,
        }
    }

    pub fn mode(&self) -> DecisionMode {
        match self {
            Decision::Scripted { .. } => DecisionMode::Scripted,
            Decision::Learning { .. } => DecisionMode::Learning,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Pause flag set: nothing perceived, decided or sent.
    Paused,
    Completed {
        tick: Tick,
        concern: Option<Concern>,
        elapsed: Duration,
    },
}

pub struct Reactor {
    pub agent: Agent,
    pub decision: Decision,
    pub config: ReactorConfig,
    pub telemetry: TelemetryRecorder,
    commands: Option<mpsc::Receiver<ControlCommand>>,
    reported_drops: u64,
}

impl Reactor {
    pub fn new(agent: Agent, decision: Decision, config: ReactorConfig) -> Self {
        Self {
            agent,
            decision,
            config,
            telemetry: TelemetryRecorder::new(),
            commands: None,
            reported_drops: 0,
        }
    }

    pub fn with_commands(mut self, commands: mpsc::Receiver<ControlCommand>) -> Self {
        self.commands = Some(commands);
        self
    }

    /// Returns `true` when the command asks the loop to stop.
    pub fn apply_command(&mut self, command: ControlCommand) -> bool {
        let ctx = &mut self.agent.context;
        match command {
            ControlCommand::Pause => {
                ctx.pause.gameplay = true;
                info!("Paused");
            }
            ControlCommand::Resume => {
                ctx.pause.gameplay = false;
                info!("Resumed");
            }
            ControlCommand::ToggleCave => {
                ctx.cave.enabled = !ctx.cave.enabled;
                info!(enabled = ctx.cave.enabled, "Cave mode toggled");
            }
            ControlCommand::Shutdown => {
                info!("Shutdown requested");
                return true;
            }
        }
        false
    }

    fn drain_commands(&mut self) -> bool {
        let mut pending = Vec::new();
        if let Some(rx) = self.commands.as_mut() {
            while let Ok(command) = rx.try_recv() {
                pending.push(command);
            }
        }
        let mut stop = false;
        for command in pending {
            stop |= self.apply_command(command);
        }
        stop
    }

    /// One synchronous iteration: perceive, decide, actuate. Never awaits.
    pub fn tick_step(&mut self) -> Result<TickOutcome, TickError> {
        if self.agent.context.pause.gameplay {
            self.telemetry.record(TelemetryEvent::TickPaused);
            return Ok(TickOutcome::Paused);
        }
        let started = Instant::now();
        self.agent.context.tick = self.agent.context.tick.next();
        let tick = self.agent.context.tick;

        let decided = self.perceive_and_decide();
        self.report_drops();

        match decided {
            Ok(concern) => {
                let elapsed = started.elapsed();
                self.telemetry.record(TelemetryEvent::TickCompleted {
                    tick,
                    elapsed_us: elapsed.as_micros() as u64,
                });
                if let Some(concern) = concern {
                    self.telemetry.record(TelemetryEvent::ConcernSelected { concern });
                }
                Ok(TickOutcome::Completed { tick, concern, elapsed })
            }
            Err(e) => {
                self.telemetry.record(TelemetryEvent::TickFailed {
                    tick,
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn perceive_and_decide(&mut self) -> Result<Option<Concern>, TickError> {
        let agent = &mut self.agent;
        let telemetry = &mut self.telemetry;

        match &mut self.decision {
            Decision::Scripted { orchestrator, observers } => {
                agent.perceive()?;
                let decided = orchestrator.handle_gameplay_tasks(&mut agent.context);
                for task in orchestrator.drain_installed() {
                    telemetry.record(TelemetryEvent::TaskInstalled { task });
                }
                // A resolve failure skips the tasks; survival still runs.
                if decided.is_ok() {
                    orchestrator.run_current(&mut agent.context, &mut agent.keyboard);
                    agent.context.radar.last_coordinate_visited = agent.context.radar.coordinate;
                }
                let report = observers.run(&agent.context, &mut agent.keyboard);
                for (observer, _) in &report.fired {
                    telemetry.record(TelemetryEvent::ObserverFired { observer: *observer });
                }
                for (observer, _) in &report.failed {
                    telemetry.record(TelemetryEvent::ObserverFailed { observer: *observer });
                }
                Ok(Some(decided?))
            }
            Decision::Learning { policy, space, episode } => {
                // Each branch perceives exactly once.
                let Some((previous, observation)) = episode.as_ref() else {
                    *episode = Some(observe(agent, space)?);
                    return Ok(None);
                };
                let action = Action::try_from(policy.select_action(observation)).map_err(EnvError::from)?;
                let (result, current) = transition(agent, space, previous, action)?;
                telemetry.record(TelemetryEvent::ActionTaken {
                    action,
                    reward: result.reward,
                });
                debug!(?action, reward = result.reward, "Learning step");
                if result.terminated {
                    info!(tick = current.tick.frame, "Episode terminated");
                    *episode = None;
                } else {
                    *episode = Some((current, result.observation));
                }
                Ok(None)
            }
        }
    }

    fn report_drops(&mut self) {
        let dropped = self.agent.keyboard.dropped_commands();
        if dropped > self.reported_drops {
            self.telemetry.record(TelemetryEvent::CommandsDropped {
                count: dropped - self.reported_drops,
            });
            self.reported_drops = dropped;
        }
    }

    /// Async driver. Runs until cancelled or told to shut down, then lets go
    /// of held keys and closes the transport.
    pub async fn run(&mut self, cancel: CancellationToken) {
        info!(
            budget_ms = self.config.tick_budget.as_millis() as u64,
            mode = ?self.decision.mode(),
            "Control loop started"
        );

        loop {
            if self.drain_commands() || cancel.is_cancelled() {
                break;
            }

            let started = Instant::now();
            let wait = match self.tick_step() {
                Ok(TickOutcome::Paused) => self.config.pause_backoff,
                outcome => {
                    if let Err(e) = outcome {
                        error!(tick = self.agent.context.tick.frame, error = %e, "Tick failed, continuing");
                    }
                    let elapsed = started.elapsed();
                    if elapsed > self.config.tick_budget {
                        warn!(elapsed_ms = elapsed.as_millis() as u64, "Tick overran its budget");
                        self.telemetry.record(TelemetryEvent::TickOverrun {
                            tick: self.agent.context.tick,
                            elapsed_us: elapsed.as_micros() as u64,
                            budget_us: self.config.tick_budget.as_micros() as u64,
                        });
                    }
                    remaining_budget(self.config.tick_budget, elapsed)
                }
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }
        }

        self.shutdown();
    }

    /// Releases held keys and closes the session. Returns the keys released.
    pub fn shutdown(&mut self) -> Vec<String> {
        let released = self.agent.keyboard.release_held();
        self.agent.keyboard.close();
        self.report_drops();
        self.telemetry.record(self.telemetry.aggregate_session());
        info!(?released, tick = self.agent.context.tick.frame, "Control loop stopped");
        released
    }
}
