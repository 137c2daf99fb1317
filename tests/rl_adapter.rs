use cavebot::input::{Journal, JournalClock, KeyTiming, Keyboard, MemoryTransport};
use cavebot::kernel::context::{Coordinate, Creature};
use cavebot::perception::{FnStage, PerceptionPipeline, Slot, StageError};
use cavebot::rl::{
    calculate_reward, extract_observation, reward_components, run_episode, Action, ActionError, AgentEnv, EnvError,
    IdlePolicy, Observation, OBSERVATION_LEN,
};
use cavebot::{Agent, Context};

const EPS: f64 = 1e-9;

fn with_hp(hp: f64) -> Context {
    let mut ctx = Context::new();
    ctx.status_bar.hp_percentage = Some(hp);
    ctx.status_bar.mana_percentage = Some(0.5);
    ctx
}

fn engaged(mut ctx: Context) -> Context {
    ctx.cave.target_creature = Some(Creature::new("Orc", Coordinate::new(1, 1, 7)));
    ctx.cave.is_attacking_some_creature = true;
    ctx
}

/// An env whose status bar replays `hp` one reading per perception pass.
fn scripted_env(hp: Vec<f64>) -> (AgentEnv, Journal) {
    let mut readings = hp.into_iter();
    let pipeline = PerceptionPipeline::new().with_stage(
        Slot::StatsBar,
        FnStage::new("stats_bar", move |ctx: &mut Context| {
            if let Some(hp) = readings.next() {
                ctx.status_bar.hp_percentage = Some(hp);
            }
            ctx.status_bar.mana_percentage = Some(0.5);
            Ok(())
        }),
    );
    let journal = Journal::new();
    let keyboard = Keyboard::new(
        Some(Box::new(MemoryTransport::new(journal.clone()))),
        Box::new(JournalClock::new(journal.clone())),
        KeyTiming::default(),
    );
    (AgentEnv::new(Agent::new(Context::new(), pipeline, keyboard)), journal)
}

#[test]
fn reward_for_losing_health_while_idle() {
    let reward = calculate_reward(&with_hp(1.0), &with_hp(0.2), Action::DoNothing);
    assert!((reward - -80.5).abs() < EPS, "got {reward}");
}

#[test]
fn reward_for_a_kill() {
    let previous = engaged(with_hp(0.6));
    let current = with_hp(1.0);
    let parts = reward_components(&previous, &current, Action::AttackHotkey);
    assert_eq!(parts.kill, 50.0);
    assert!((parts.total() - 90.1).abs() < EPS, "got {}", parts.total());
}

#[test]
fn reward_for_dying() {
    let parts = reward_components(&with_hp(0.5), &with_hp(0.0), Action::ArrowUp);
    assert_eq!(parts.death, -500.0);
    assert!((parts.total() - -549.9).abs() < EPS, "got {}", parts.total());

    // Already dead last step: no second penalty.
    let parts = reward_components(&with_hp(0.0), &with_hp(0.0), Action::ArrowUp);
    assert_eq!(parts.death, 0.0);
}

#[test]
fn target_still_engaged_is_not_a_kill() {
    let previous = engaged(with_hp(1.0));
    let current = engaged(with_hp(1.0));
    assert_eq!(reward_components(&previous, &current, Action::AttackHotkey).kill, 0.0);
}

#[test]
fn observation_has_eight_features_in_order() {
    let mut ctx = with_hp(0.75);
    ctx.radar.coordinate = Some(Coordinate::new(1000, 2000, 7));
    ctx.game_window.monsters = vec![
        Creature::new("Orc", Coordinate::new(1001, 2000, 7)),
        Creature::new("Orc", Coordinate::new(1002, 2000, 7)),
    ];
    let obs: Observation = extract_observation(&ctx);
    assert_eq!(obs.len(), OBSERVATION_LEN);
    assert_eq!(obs, [0.75, 0.5, 0.0, 2.0, 0.0, 1000.0, 2000.0, 7.0]);
}

#[test]
fn step_before_reset_is_an_error() {
    let (mut env, journal) = scripted_env(vec![1.0]);
    assert!(matches!(env.step(Action::ArrowUp.id()), Err(EnvError::NotReset)));
    assert!(journal.entries().is_empty());
}

#[test]
fn unknown_action_id_is_rejected_without_acting() {
    let (mut env, journal) = scripted_env(vec![1.0, 1.0]);
    env.reset().unwrap();
    let tick = env.agent().context.tick;

    assert!(matches!(env.step(8), Err(EnvError::Action(ActionError::Unknown(8)))));
    assert!(journal.entries().is_empty());
    assert_eq!(env.agent().context.tick, tick);
}

#[test]
fn reset_clears_pause_and_perceives() {
    let (mut env, _journal) = scripted_env(vec![0.6]);
    env.agent_mut().context.pause.gameplay = true;
    env.agent_mut().context.pause.ui = true;

    let obs = env.reset().unwrap();

    let ctx = &env.agent().context;
    assert!(!ctx.pause.gameplay && !ctx.pause.ui);
    assert!(ctx.version > 0, "reset must run a perception pass");
    assert!((obs[0] - 0.6).abs() < 1e-6);
    assert_eq!(env.action_count(), 8);
}

#[test]
fn step_acts_then_scores_the_new_snapshot() {
    let (mut env, journal) = scripted_env(vec![1.0, 0.7]);
    env.reset().unwrap();

    let result = env.step(Action::ArrowUp.id()).unwrap();

    assert_eq!(journal.sent(), vec!["press,218"]);
    assert!((result.reward - (-30.0 + 0.1)).abs() < 1e-6, "got {}", result.reward);
    assert!(!result.terminated);
    assert!(!result.truncated);
    assert_eq!(result.info.action, Action::ArrowUp);
    assert_eq!(result.info.tick.frame, 1);
    assert!(result.info.out_of_bounds.is_empty());
}

#[test]
fn potion_actions_use_configured_hotkeys() {
    let (mut env, journal) = scripted_env(vec![1.0, 1.0, 1.0]);
    env.agent_mut().context.healing.potions.first_mana_potion.hotkey = "f2".into();
    env.reset().unwrap();

    env.step(Action::ManaPotion.id()).unwrap();
    // Nothing bound for health potions: the step still happens, no key goes out.
    env.step(Action::HealthPotion.id()).unwrap();

    assert_eq!(journal.sent(), vec!["press,195"]);
}

#[test]
fn episode_ends_on_death() {
    let (mut env, _journal) = scripted_env(vec![1.0, 0.5, 0.0, 1.0]);
    let mut policy = IdlePolicy;

    let summary = run_episode(&mut env, &mut policy, 10).unwrap();

    assert!(summary.terminated);
    assert_eq!(summary.steps, 2);
    assert!((summary.total_reward - (-50.5 + -550.5)).abs() < 1e-6, "got {}", summary.total_reward);
    assert_eq!(summary.final_observation[0], 0.0);
}

#[test]
fn episode_stops_at_step_limit() {
    let (mut env, journal) = scripted_env(vec![1.0; 8]);
    let mut always_right = |_: &Observation| Action::ArrowRight.id();

    let summary = run_episode(&mut env, &mut always_right, 3).unwrap();

    assert!(!summary.terminated);
    assert_eq!(summary.steps, 3);
    assert_eq!(journal.sent(), vec!["press,215"; 3]);
}

#[test]
fn perception_failure_surfaces_from_step() {
    let mut passes = 0;
    let pipeline = PerceptionPipeline::new().with_stage(
        Slot::Radar,
        FnStage::new("radar", move |_: &mut Context| {
            passes += 1;
            if passes > 1 {
                Err(StageError::failed("radar", "minimap not found"))
            } else {
                Ok(())
            }
        }),
    );
    let mut env = AgentEnv::new(Agent::new(Context::new(), pipeline, Keyboard::disconnected()));
    env.reset().unwrap();

    match env.step(Action::DoNothing.id()) {
        Err(EnvError::Perception(e)) => assert_eq!(e.stage(), "radar"),
        other => panic!("expected perception error, got {other:?}"),
    }
}

#[test]
fn close_lets_go_of_held_keys() {
    let (mut env, journal) = scripted_env(vec![1.0]);
    env.reset().unwrap();
    env.agent_mut().keyboard.key_down("shift");
    journal.clear();

    assert_eq!(env.close(), vec!["shift".to_string()]);
    assert_eq!(journal.sent(), vec!["keyUp,129"]);
    assert!(matches!(env.step(0), Err(EnvError::NotReset)));
}
