//! Learning decision path: observation, discrete actions, reward and a
//! reset/step environment over the live agent.

pub mod action;
pub mod env;
pub mod observation;
pub mod policy;
pub mod reward;
pub mod runner;

pub use action::{execute_action, Action, ActionError};
pub use env::{AgentEnv, EnvError, StepInfo, StepResult};
pub use observation::{extract_observation, Observation, ObservationSpace, OBSERVATION_LEN};
pub use policy::{IdlePolicy, Policy, ThresholdPolicy};
pub use reward::{calculate_reward, reward_components, RewardComponents};
pub use runner::{run_episode, EpisodeSummary};
