use cavebot::gameplay::{Concern, ResolveError, Task, TaskKind, TaskOrchestrator, TaskStatus};
use cavebot::input::{Journal, JournalClock, KeyTiming, Keyboard, MemoryTransport};
use cavebot::kernel::context::{ChatTab, Context, Coordinate, Creature, Way, Waypoint};
use cavebot::kernel::time::Tick;

fn hunting_context() -> Context {
    let mut ctx = Context::new();
    ctx.cave.enabled = true;
    ctx.cave.run_to_creatures = true;
    ctx.cave.task_request_debounce_ticks = 10;
    ctx.cave.hotkeys.loot = "f5".into();
    ctx.radar.coordinate = Some(Coordinate::new(100, 100, 7));
    ctx.cave.waypoints.items = vec![
        Waypoint::new("walk", Coordinate::new(105, 100, 7)),
        Waypoint::new("walk", Coordinate::new(110, 100, 7)),
    ];
    ctx.cave.waypoints.current_index = Some(0);
    ctx
}

fn recorded_keyboard() -> (Keyboard, Journal) {
    let journal = Journal::new();
    let kb = Keyboard::new(
        Some(Box::new(MemoryTransport::new(journal.clone()))),
        Box::new(JournalClock::new(journal.clone())),
        KeyTiming::default(),
    );
    (kb, journal)
}

fn orc(x: i32) -> Creature {
    Creature::new("Orc", Coordinate::new(x, 100, 7))
}

#[test]
fn loot_dominates_combat() {
    let mut orch = TaskOrchestrator::new();
    let mut ctx = hunting_context();
    ctx.game_window.monsters = vec![orc(102)];

    assert_eq!(orch.handle_gameplay_tasks(&mut ctx).unwrap(), Concern::Cave);
    assert_eq!(orch.root_task().map(Task::name), Some("attackClosestCreature"));

    let corpse = orc(101);
    ctx.loot.corpses_to_loot = vec![corpse.clone(), orc(99)];
    ctx.tick = Tick { frame: 50 };

    assert_eq!(orch.handle_gameplay_tasks(&mut ctx).unwrap(), Concern::LootCorpses);
    assert_eq!(ctx.way, Some(Way::LootCorpses));
    let root = orch.root_task().expect("loot root installed");
    assert_eq!(
        root.kind,
        TaskKind::LootCorpse { corpse: corpse.clone() },
        "first queued corpse is looted, no distance sort"
    );

    // Attackable creatures keep appearing; the loot tree stays.
    let loot_id = root.id;
    for frame in 51..60 {
        ctx.tick = Tick { frame };
        ctx.game_window.monsters = vec![orc(103), orc(104)];
        assert_eq!(orch.handle_gameplay_tasks(&mut ctx).unwrap(), Concern::LootCorpses);
        assert_eq!(orch.root_task().map(|t| t.id), Some(loot_id), "loot root replaced at tick {frame}");
    }
}

#[test]
fn attack_task_is_not_thrashed() {
    let mut orch = TaskOrchestrator::new();
    let mut ctx = hunting_context();
    ctx.cave.task_request_debounce_ticks = 0;
    ctx.game_window.monsters = vec![orc(103)];

    orch.handle_gameplay_tasks(&mut ctx).unwrap();
    let first = orch.root_task().map(|t| t.id).expect("attack root installed");

    // The gate alone would re-resolve every tick; a closer monster shows up.
    for frame in 1..20 {
        ctx.tick = Tick { frame };
        ctx.game_window.monsters = vec![orc(103), orc(101)];
        assert_eq!(orch.handle_gameplay_tasks(&mut ctx).unwrap(), Concern::Cave);
        assert_eq!(orch.root_task().map(|t| t.id), Some(first), "attack root replaced at tick {frame}");
    }
    assert_eq!(orch.drain_installed(), vec!["attackClosestCreature"]);
}

#[test]
fn combat_requests_are_debounced() {
    let mut orch = TaskOrchestrator::new();
    let mut ctx = hunting_context();
    ctx.tick = Tick { frame: 1 };
    ctx.game_window.monsters = vec![orc(103)];

    orch.handle_gameplay_tasks(&mut ctx).unwrap();
    assert_eq!(ctx.cave.last_tasks_request, Some(Tick { frame: 1 }));

    // Attack tree ends early (target lost); within the window nothing new is requested.
    orch.set_root_task(&ctx, None);
    ctx.tick = Tick { frame: 5 };
    orch.handle_gameplay_tasks(&mut ctx).unwrap();
    assert!(orch.root_task().is_none());

    ctx.tick = Tick { frame: 11 };
    orch.handle_gameplay_tasks(&mut ctx).unwrap();
    assert_eq!(orch.root_task().map(Task::name), Some("attackClosestCreature"));
}

#[test]
fn ignored_creatures_fall_back_to_waypoints() {
    let mut orch = TaskOrchestrator::new();
    let mut ctx = hunting_context();
    ctx.cave.ignored_creatures = vec!["Orc".into()];
    ctx.game_window.monsters = vec![orc(102)];

    assert_eq!(orch.handle_gameplay_tasks(&mut ctx).unwrap(), Concern::Waypoint);
    assert_eq!(orch.root_task().map(|t| &t.kind), Some(&TaskKind::FollowWaypoint { index: 0 }));
}

#[test]
fn chat_tab_task_defers_everything() {
    let mut orch = TaskOrchestrator::new();
    let mut ctx = hunting_context();
    orch.set_root_task(&ctx, Some(Task::new(TaskKind::SelectChatTab { tab: "Loot".into() })));
    ctx.loot.corpses_to_loot = vec![orc(101)];
    ctx.game_window.monsters = vec![orc(102)];

    assert_eq!(orch.handle_gameplay_tasks(&mut ctx).unwrap(), Concern::ChatTab);
    assert_eq!(orch.root_task().map(Task::name), Some("selectChatTab"));
    assert!(ctx.game_window.previous_monsters.is_empty(), "deferred tick records nothing");

    ctx.chat.tabs = vec![ChatTab {
        name: "Loot".into(),
        is_selected: true,
        has_unread: false,
    }];
    let mut kb = Keyboard::disconnected();
    assert_eq!(orch.run_current(&mut ctx, &mut kb), Some(TaskStatus::Completed));
    assert!(orch.root_task().is_none());
}

#[test]
fn cave_without_hunting_follows_route() {
    let mut orch = TaskOrchestrator::new();
    let mut ctx = hunting_context();
    ctx.cave.run_to_creatures = false;
    ctx.game_window.monsters = vec![orc(102)];
    let (mut kb, journal) = recorded_keyboard();

    assert_eq!(orch.handle_gameplay_tasks(&mut ctx).unwrap(), Concern::Waypoint);
    assert_eq!(orch.run_current(&mut ctx, &mut kb), Some(TaskStatus::Running));
    assert_eq!(journal.sent(), vec!["press,215"], "walks east toward the waypoint");

    ctx.radar.coordinate = Some(Coordinate::new(105, 100, 7));
    assert_eq!(orch.run_current(&mut ctx, &mut kb), Some(TaskStatus::Completed));
    assert_eq!(ctx.cave.waypoints.current_index, Some(1));
}

#[test]
fn unknown_waypoint_type_is_surfaced() {
    let mut orch = TaskOrchestrator::new();
    let mut ctx = hunting_context();
    ctx.cave.run_to_creatures = false;
    ctx.cave.waypoints.items[0] = Waypoint::new("teleport", Coordinate::new(1, 1, 7));

    let err = orch.handle_gameplay_tasks(&mut ctx).unwrap_err();
    assert_eq!(err, ResolveError::UnknownWaypointType { kind: "teleport".into() });
    assert!(orch.root_task().is_none());
}

#[test]
fn loot_tree_walks_then_collects() {
    let mut orch = TaskOrchestrator::new();
    let mut ctx = hunting_context();
    let corpse = orc(101);
    ctx.loot.corpses_to_loot = vec![corpse];
    let (mut kb, journal) = recorded_keyboard();

    orch.handle_gameplay_tasks(&mut ctx).unwrap();
    assert_eq!(orch.run_current(&mut ctx, &mut kb), Some(TaskStatus::Running));
    ctx.radar.coordinate = Some(Coordinate::new(101, 100, 7));
    // Arrival completes the walk; the next tick collects.
    assert_eq!(orch.run_current(&mut ctx, &mut kb), Some(TaskStatus::Running));
    assert_eq!(orch.run_current(&mut ctx, &mut kb), Some(TaskStatus::Completed));

    assert_eq!(journal.sent(), vec!["press,215", "press,198"]);
    assert!(ctx.loot.corpses_to_loot.is_empty());
}

#[test]
fn failed_loot_tree_skips_its_corpse() {
    let mut orch = TaskOrchestrator::new();
    let mut ctx = hunting_context();
    ctx.cave.hotkeys.loot.clear();
    ctx.cave.task_request_debounce_ticks = 0;
    ctx.radar.coordinate = Some(Coordinate::new(101, 100, 7));
    ctx.loot.corpses_to_loot = vec![orc(101)];
    ctx.game_window.monsters = vec![orc(103)];
    let (mut kb, journal) = recorded_keyboard();

    assert_eq!(orch.handle_gameplay_tasks(&mut ctx).unwrap(), Concern::LootCorpses);
    // Already standing on it: the walk completes, then collecting fails.
    assert_eq!(orch.run_current(&mut ctx, &mut kb), Some(TaskStatus::Running));
    assert_eq!(orch.run_current(&mut ctx, &mut kb), Some(TaskStatus::Failed));

    assert!(ctx.loot.corpses_to_loot.is_empty());
    assert!(orch.root_task().is_none());
    assert!(journal.entries().is_empty());

    ctx.tick = Tick { frame: 1 };
    assert_eq!(orch.handle_gameplay_tasks(&mut ctx).unwrap(), Concern::Cave);
    assert_eq!(orch.root_task().map(Task::name), Some("attackClosestCreature"));
}
