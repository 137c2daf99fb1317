use serde::Serialize;
use thiserror::Error;
use tracing::info;

use super::action::{execute_action, Action, ActionError};
use super::observation::{extract_observation, Observation, ObservationSpace};
use super::reward::{reward_components, RewardComponents};
use crate::kernel::agent::Agent;
use crate::kernel::context::{Context, PauseFlags};
use crate::kernel::time::Tick;
use crate::perception::StageError;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("reset() must be called before step()")]
    NotReset,

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("perception failed: {0}")]
    Perception(#[from] StageError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepInfo {
    pub tick: Tick,
    pub action: Action,
    pub reward: RewardComponents,
    /// Features that fell outside the declared bounds.
    pub out_of_bounds: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f64,
    pub terminated: bool,
    /// Always false; episodes only end on death.
    pub truncated: bool,
    pub info: StepInfo,
}

/// Perceive and snapshot without acting.
pub fn observe(agent: &mut Agent, space: &ObservationSpace) -> Result<(Context, Observation), EnvError> {
    agent.perceive()?;
    let snapshot = agent.context.snapshot();
    let observation = extract_observation(&snapshot);
    space.check(&observation);
    Ok((snapshot, observation))
}

/// Act, perceive, score. Returns the new snapshot for the next transition.
pub fn transition(
    agent: &mut Agent,
    space: &ObservationSpace,
    previous: &Context,
    action: Action,
) -> Result<(StepResult, Context), EnvError> {
    execute_action(action, &agent.context, &mut agent.keyboard);
    agent.perceive()?;

    let current = agent.context.snapshot();
    let observation = extract_observation(&current);
    let out_of_bounds = space.check(&observation);
    let reward = reward_components(previous, &current, action);
    let result = StepResult {
        observation,
        reward: reward.total(),
        terminated: current.hp_percentage() == 0.0,
        truncated: false,
        info: StepInfo {
            tick: current.tick,
            action,
            reward,
            out_of_bounds,
        },
    };
    Ok((result, current))
}

/// Reset/step surface for an external trainer.
pub struct AgentEnv {
    agent: Agent,
    space: ObservationSpace,
    previous: Option<Context>,
}

impl AgentEnv {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent,
            space: ObservationSpace::default(),
            previous: None,
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut Agent {
        &mut self.agent
    }

    pub fn into_agent(self) -> Agent {
        self.agent
    }

    pub fn observation_space(&self) -> &ObservationSpace {
        &self.space
    }

    pub fn action_count(&self) -> u32 {
        Action::COUNT
    }

    /// Clears both pause flags, runs one perception pass, and starts a fresh
    /// episode from the resulting snapshot.
    pub fn reset(&mut self) -> Result<Observation, EnvError> {
        info!("Resetting environment");
        self.agent.context.pause = PauseFlags::default();
        let (snapshot, observation) = observe(&mut self.agent, &self.space)?;
        self.previous = Some(snapshot);
        Ok(observation)
    }

    pub fn step(&mut self, action_id: u32) -> Result<StepResult, EnvError> {
        let previous = self.previous.as_ref().ok_or(EnvError::NotReset)?;
        let action = Action::try_from(action_id)?;
        self.agent.context.tick = self.agent.context.tick.next();
        let (result, current) = transition(&mut self.agent, &self.space, previous, action)?;
        self.previous = Some(current);
        Ok(result)
    }

    /// Lets go of anything still held and ends the episode.
    pub fn close(&mut self) -> Vec<String> {
        info!("Closing environment");
        self.previous = None;
        self.agent.keyboard.release_held()
    }
}
