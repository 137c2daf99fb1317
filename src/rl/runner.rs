use serde::Serialize;
use tracing::info;

use super::env::{AgentEnv, EnvError};
use super::observation::Observation;
use super::policy::Policy;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub steps: u64,
    pub total_reward: f64,
    pub terminated: bool,
    pub final_observation: Observation,
}

/// Rolls `policy` from a fresh reset until death or `max_steps`.
pub fn run_episode(env: &mut AgentEnv, policy: &mut dyn Policy, max_steps: u64) -> Result<EpisodeSummary, EnvError> {
    let mut observation = env.reset()?;
    let mut summary = EpisodeSummary {
        steps: 0,
        total_reward: 0.0,
        terminated: false,
        final_observation: observation,
    };
    while summary.steps < max_steps {
        let result = env.step(policy.select_action(&observation))?;
        summary.steps += 1;
        summary.total_reward += result.reward;
        observation = result.observation;
        if result.terminated {
            summary.terminated = true;
            break;
        }
    }
    summary.final_observation = observation;
    info!(
        steps = summary.steps,
        total_reward = summary.total_reward,
        terminated = summary.terminated,
        "Episode finished"
    );
    Ok(summary)
}
