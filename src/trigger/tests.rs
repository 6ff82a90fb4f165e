//! Tests for the trigger module

use super::*;
use crate::types::command::{CommandKind, EventCommand};
use crate::types::context::Direction;
use crate::types::event::GameEvent;
use crate::types::page::{EventPage, PageConditions, TriggerCondition};
use crate::types::state::GameData;

fn page(trigger: TriggerKind) -> EventPage {
    EventPage::new(trigger).with_commands(vec![EventCommand::new(CommandKind::PlaySe, 0)])
}

fn catalog(events: Vec<GameEvent>) -> EventCatalog {
    events
        .into_iter()
        .fold(EventCatalog::new(1), EventCatalog::with_event)
}

fn resolver_for(catalog: &EventCatalog, state: &GameData) -> TriggerResolver {
    let mut resolver = TriggerResolver::new(1);
    resolver.update_event_handlers(catalog, state);
    resolver
}

fn ids(requests: &[TriggerRequest]) -> Vec<u32> {
    requests.iter().map(|r| r.event_id).collect()
}

#[test]
fn action_button_needs_press_and_facing_tile() {
    let catalog = catalog(vec![
        GameEvent::new(1, "sign", 5, 4).with_page(page(TriggerKind::ActionButton)),
    ]);
    let state = GameData::new();
    let mut resolver = resolver_for(&catalog, &state);

    // facing the sign without pressing
    let ctx = TriggerContext::new(1, 5, 5, Direction::Up);
    assert!(resolver.resolve(&ctx, &state, false).is_empty());

    // pressing while facing away
    let ctx = TriggerContext::new(1, 5, 5, Direction::Down).with_action();
    assert!(resolver.resolve(&ctx, &state, false).is_empty());

    // diagonal is not adjacent
    let ctx = TriggerContext::new(1, 4, 5, Direction::Up).with_action();
    assert!(resolver.resolve(&ctx, &state, false).is_empty());

    let ctx = TriggerContext::new(1, 5, 5, Direction::Up).with_action();
    let requests = resolver.resolve(&ctx, &state, false);
    assert_eq!(
        requests,
        vec![TriggerRequest {
            event_id: 1,
            page_index: 0,
            trigger: TriggerKind::ActionButton
        }]
    );
}

#[test]
fn active_handler_reports_running_until_finished() {
    let catalog = catalog(vec![
        GameEvent::new(1, "sign", 5, 4).with_page(page(TriggerKind::ActionButton)),
    ]);
    let state = GameData::new();
    let mut resolver = resolver_for(&catalog, &state);
    let ctx = TriggerContext::new(1, 5, 5, Direction::Up).with_action();

    assert_eq!(resolver.resolve(&ctx, &state, false).len(), 1);
    assert!(resolver.handler(1).unwrap().is_active());
    assert!(resolver.resolve(&ctx, &state, false).is_empty());

    // a refresh does not forget that the event is running
    resolver.update_event_handlers(&catalog, &state);
    assert!(resolver.resolve(&ctx, &state, false).is_empty());

    resolver.on_event_finished(1);
    assert_eq!(resolver.resolve(&ctx, &state, false).len(), 1);
}

#[test]
fn touch_triggers_use_tile_and_diagonal_adjacency() {
    let catalog = catalog(vec![
        GameEvent::new(1, "trap", 3, 3).with_page(page(TriggerKind::PlayerTouch)),
        GameEvent::new(2, "slime", 8, 8).with_page(page(TriggerKind::EventTouch)),
    ]);
    let state = GameData::new();

    let mut resolver = resolver_for(&catalog, &state);
    let ctx = TriggerContext::new(1, 3, 4, Direction::Up);
    assert!(resolver.resolve(&ctx, &state, false).is_empty());
    let ctx = TriggerContext::new(1, 3, 3, Direction::Up);
    assert_eq!(ids(&resolver.resolve(&ctx, &state, false)), vec![1]);

    let mut resolver = resolver_for(&catalog, &state);
    let ctx = TriggerContext::new(1, 9, 9, Direction::Up);
    assert_eq!(ids(&resolver.resolve(&ctx, &state, false)), vec![2]);

    let mut resolver = resolver_for(&catalog, &state);
    let ctx = TriggerContext::new(1, 10, 8, Direction::Up);
    assert!(resolver.resolve(&ctx, &state, false).is_empty());
}

#[test]
fn position_cache_overrides_authored_tile() {
    let catalog = catalog(vec![
        GameEvent::new(1, "walker", 0, 0).with_page(page(TriggerKind::PlayerTouch)),
    ]);
    let state = GameData::new();
    let mut resolver = resolver_for(&catalog, &state);

    let mut ctx = TriggerContext::new(1, 6, 2, Direction::Up);
    ctx.event_positions.insert(1, (6, 2));
    assert_eq!(ids(&resolver.resolve(&ctx, &state, false)), vec![1]);
}

#[test]
fn first_blocking_trigger_wins_in_id_order() {
    let catalog = catalog(vec![
        GameEvent::new(7, "cutscene", 0, 0).with_page(page(TriggerKind::Autorun)),
        GameEvent::new(3, "intro", 0, 0).with_page(page(TriggerKind::Autorun)),
        GameEvent::new(5, "ambience", 0, 0).with_page(page(TriggerKind::Parallel)),
    ]);
    let state = GameData::new();
    let mut resolver = resolver_for(&catalog, &state);
    let ctx = TriggerContext::new(1, 20, 20, Direction::Down);

    let requests = resolver.resolve(&ctx, &state, false);
    assert_eq!(ids(&requests), vec![3, 5]);
    assert!(!resolver.handler(7).unwrap().is_active());

    // 3 is still running: 7 stays blocked
    assert!(resolver.resolve(&ctx, &state, true).is_empty());

    resolver.on_event_finished(3);
    // 3 fires again before 7 because its page is still active
    assert_eq!(ids(&resolver.resolve(&ctx, &state, false)), vec![3]);
}

#[test]
fn blocked_handler_stays_inactive() {
    let catalog = catalog(vec![
        GameEvent::new(2, "chest", 1, 0).with_page(page(TriggerKind::ActionButton)),
    ]);
    let state = GameData::new();
    let mut resolver = resolver_for(&catalog, &state);
    let ctx = TriggerContext::new(1, 0, 0, Direction::Right).with_action();

    assert!(resolver.resolve(&ctx, &state, true).is_empty());
    assert!(!resolver.handler(2).unwrap().is_active());
    assert_eq!(ids(&resolver.resolve(&ctx, &state, false)), vec![2]);
}

#[test]
fn parallel_ignores_foreground_slot() {
    let catalog = catalog(vec![
        GameEvent::new(4, "clock", 0, 0).with_page(page(TriggerKind::Parallel)),
    ]);
    let state = GameData::new();
    let mut resolver = resolver_for(&catalog, &state);
    let ctx = TriggerContext::new(1, 9, 9, Direction::Down);

    assert_eq!(ids(&resolver.resolve(&ctx, &state, true)), vec![4]);
    assert!(resolver.resolve(&ctx, &state, true).is_empty());
}

#[test]
fn trigger_conditions_gate_the_trigger() {
    let catalog = catalog(vec![GameEvent::new(1, "guard", 5, 5).with_page(
        page(TriggerKind::Autorun)
            .with_trigger_condition(TriggerCondition::Proximity { radius: Some(2) })
            .with_trigger_condition(TriggerCondition::Switch {
                switch_id: 1,
                value: true,
            }),
    )]);
    let mut state = GameData::new();
    let mut resolver = resolver_for(&catalog, &state);

    let near = TriggerContext::new(1, 7, 6, Direction::Down);
    let far = TriggerContext::new(1, 8, 5, Direction::Down);
    assert!(resolver.resolve(&near, &state, false).is_empty());

    state.set_switch(1, true);
    assert!(resolver.resolve(&far, &state, false).is_empty());
    assert_eq!(ids(&resolver.resolve(&near, &state, false)), vec![1]);
}

#[test]
fn handlers_follow_the_active_page() {
    let event = GameEvent::new(1, "door", 0, 0)
        .with_page(page(TriggerKind::ActionButton))
        .with_page(
            page(TriggerKind::PlayerTouch).with_conditions(PageConditions {
                switch1_id: Some(2),
                ..Default::default()
            }),
        );
    let catalog = catalog(vec![event]);
    let mut state = GameData::new();
    let mut resolver = resolver_for(&catalog, &state);
    assert_eq!(resolver.handler(1).unwrap().page_index, 0);

    state.set_switch(2, true);
    // not automatic
    assert_eq!(resolver.handler(1).unwrap().page_index, 0);
    resolver.update_event_handlers(&catalog, &state);
    let handler = resolver.handler(1).unwrap();
    assert_eq!(handler.page_index, 1);
    assert_eq!(handler.trigger, TriggerKind::PlayerTouch);
}

#[test]
fn event_without_active_page_has_no_handler() {
    let event = GameEvent::new(1, "ghost", 0, 0).with_page(page(TriggerKind::Autorun).with_conditions(
        PageConditions {
            switch1_id: Some(9),
            ..Default::default()
        },
    ));
    let catalog = catalog(vec![event]);
    let mut state = GameData::new();
    let mut resolver = resolver_for(&catalog, &state);
    assert!(resolver.handler(1).is_none());

    state.set_switch(9, true);
    resolver.update_event_handlers(&catalog, &state);
    let ctx = TriggerContext::new(1, 0, 0, Direction::Down);
    assert_eq!(ids(&resolver.resolve(&ctx, &state, false)), vec![1]);

    // page deactivates while running: the handler lingers until the run ends
    state.set_switch(9, false);
    resolver.update_event_handlers(&catalog, &state);
    let handler = resolver.handler(1).unwrap();
    assert!(handler.is_retired());
    assert!(resolver.resolve(&ctx, &state, false).is_empty());

    resolver.on_event_finished(1);
    assert!(resolver.handler(1).is_none());
}

#[test]
fn erased_events_stay_gone_until_reset() {
    let catalog = catalog(vec![
        GameEvent::new(1, "coin", 0, 0).with_page(page(TriggerKind::PlayerTouch)),
    ]);
    let state = GameData::new();
    let mut resolver = resolver_for(&catalog, &state);

    resolver.erase(1);
    resolver.update_event_handlers(&catalog, &state);
    assert!(resolver.is_erased(1));
    assert!(resolver.handler(1).is_none());

    resolver.reset();
    resolver.update_event_handlers(&catalog, &state);
    assert!(resolver.handler(1).is_some());
}
