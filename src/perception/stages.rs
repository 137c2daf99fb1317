use super::pipeline::{Stage, StageError};
use crate::gameplay::creatures::{find_closest_coordinate, target_creature};
use crate::kernel::context::{Context, Coordinate};

/// Leaves the context as it found it. Fills unbound collaborator slots.
#[derive(Debug, Clone, Copy)]
pub struct Passthrough {
    name: &'static str,
}

impl Passthrough {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Stage for Passthrough {
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&mut self, _ctx: &mut Context) -> Result<(), StageError> {
        Ok(())
    }
}

/// Adapts a closure into a named stage.
pub struct FnStage<F> {
    name: &'static str,
    f: F,
}

impl<F> FnStage<F>
where
    F: FnMut(&mut Context) -> Result<(), StageError> + Send,
{
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> Stage for FnStage<F>
where
    F: FnMut(&mut Context) -> Result<(), StageError> + Send,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&mut self, ctx: &mut Context) -> Result<(), StageError> {
        (self.f)(ctx)
    }
}

/// Non-hunting branch: the target is whatever monster is flagged as attacked.
#[derive(Debug, Default, Clone, Copy)]
pub struct TargetCreatureStage;

impl Stage for TargetCreatureStage {
    fn name(&self) -> &'static str {
        "target_creature"
    }

    fn apply(&mut self, ctx: &mut Context) -> Result<(), StageError> {
        ctx.cave.target_creature = target_creature(&ctx.game_window.monsters);
        ctx.cave.is_attacking_some_creature = ctx.cave.target_creature.is_some();
        Ok(())
    }
}

/// Picks a starting waypoint when none is selected: the nearest one on the
/// player's floor, else the first.
#[derive(Debug, Default, Clone, Copy)]
pub struct WaypointIndexStage;

impl Stage for WaypointIndexStage {
    fn name(&self) -> &'static str {
        "waypoint_index"
    }

    fn apply(&mut self, ctx: &mut Context) -> Result<(), StageError> {
        let waypoints = &mut ctx.cave.waypoints;
        if waypoints.current_index.is_some() || waypoints.items.is_empty() {
            return Ok(());
        }
        let nearest = ctx.radar.coordinate.and_then(|position| {
            let (indices, coords): (Vec<usize>, Vec<Coordinate>) = waypoints
                .items
                .iter()
                .enumerate()
                .filter(|(_, wp)| wp.coordinate.z == position.z)
                .map(|(i, wp)| (i, wp.coordinate))
                .unzip();
            find_closest_coordinate(&position, &coords).map(|i| indices[i])
        });
        waypoints.current_index = Some(nearest.unwrap_or(0));
        Ok(())
    }
}
