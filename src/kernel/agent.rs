use crate::config::AgentConfig;
use crate::input::Keyboard;
use crate::kernel::context::Context;
use crate::perception::{PerceptionPipeline, PipelineRun, StageError};

/// Everything one control loop owns: the context, the stages that rebuild it
/// and the actuator that acts on it.
pub struct Agent {
    pub context: Context,
    pub pipeline: PerceptionPipeline,
    pub keyboard: Keyboard,
}

impl Agent {
    pub fn new(context: Context, pipeline: PerceptionPipeline, keyboard: Keyboard) -> Self {
        Self {
            context,
            pipeline,
            keyboard,
        }
    }

    pub fn from_config(config: &AgentConfig, pipeline: PerceptionPipeline, keyboard: Keyboard) -> Self {
        Self::new(Context::from_config(config), pipeline, keyboard)
    }

    pub fn perceive(&mut self) -> Result<PipelineRun, StageError> {
        self.pipeline.run(&mut self.context)
    }
}
