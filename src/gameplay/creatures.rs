use crate::kernel::context::{Context, Coordinate, Creature};

/// Index of the candidate nearest to `target` on the horizontal plane.
/// Ties keep the earliest candidate.
pub fn find_closest_coordinate(target: &Coordinate, candidates: &[Coordinate]) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .min_by_key(|(_, c)| target.planar_distance_sq(c))
        .map(|(i, _)| i)
}

pub fn closest_creature(monsters: &[Creature], position: &Coordinate) -> Option<Creature> {
    let coords: Vec<Coordinate> = monsters.iter().map(|m| m.coordinate).collect();
    find_closest_coordinate(position, &coords).map(|i| monsters[i].clone())
}

/// The creature currently under attack, if the game window shows one.
pub fn target_creature(monsters: &[Creature]) -> Option<Creature> {
    monsters.iter().find(|m| m.is_being_attacked).cloned()
}

/// Any visible monster not on the ignore list.
pub fn has_creatures_to_attack(ctx: &Context) -> bool {
    ctx.game_window
        .monsters
        .iter()
        .any(|m| !ctx.cave.ignored_creatures.iter().any(|ignored| ignored == &m.name))
}
