//! Integration tests for the meditation engine.
//!
//! Drives full plans through the public API against a SQLite store and checks
//! what survives a restart.

use std::rc::Rc;

use chrono::{Duration, TimeZone, Utc};
use medifast_core::meditation::MeditationSnapshot;
use medifast_core::{
    Calendar, Capabilities, Event, ManualClock, MeditationEngine, MeditationPhase,
    MeditationPlan, RecordingCues, SoundCue, SqliteStore, Store,
};

fn caps(store: Rc<dyn Store>, cues: Rc<RecordingCues>, clock: Rc<ManualClock>) -> Capabilities {
    Capabilities::new(store, cues, clock, Calendar::utc())
}

#[test]
fn test_plan_with_warmup_and_two_sessions() {
    let t0 = Utc.with_ymd_and_hms(2024, 6, 3, 7, 0, 0).unwrap();
    let store: Rc<dyn Store> = Rc::new(SqliteStore::open_memory().unwrap());
    let cues = Rc::new(RecordingCues::new());
    let clock = Rc::new(ManualClock::new(t0));

    let mut engine =
        MeditationEngine::new(caps(store.clone(), cues.clone(), clock.clone())).with_minute_secs(1);
    let plan = MeditationPlan::new(vec![4, 6], Some(5), Some(2)).with_post_session_cues(false, true);
    engine.start_plan(plan.clone());

    let mut events = Vec::new();
    for s in 1..=20 {
        events.extend(engine.tick(t0 + Duration::seconds(s), true));
    }

    assert_eq!(engine.phase(), MeditationPhase::Completed);
    let completed: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, Event::SessionCompleted { .. }))
        .collect();
    assert_eq!(completed.len(), 2);
    assert!(matches!(
        events.last(),
        Some(Event::MeditationCompleted { sessions: 2, .. })
    ));

    // 4s session: midpoints at 2, 4. 6s session: 2, 4, 6. Plus two post-session dings.
    assert_eq!(cues.count_sound(SoundCue::SessionMid), 7);
    assert_eq!(cues.count_sound(SoundCue::SessionEnd), 1);

    let reopened = MeditationEngine::new(caps(store, Rc::new(RecordingCues::new()), clock));
    assert_eq!(reopened.plan(), &plan);
    assert_eq!(reopened.history().len(), 2);
    assert_eq!(reopened.history()[0].duration_secs, 4);
    assert_eq!(reopened.history()[1].duration_secs, 6);
    assert_eq!(reopened.streaks().current_streak, 1);
}

#[test]
fn test_streak_across_days() {
    let t0 = Utc.with_ymd_and_hms(2024, 6, 3, 21, 0, 0).unwrap();
    let store: Rc<dyn Store> = Rc::new(SqliteStore::open_memory().unwrap());
    let clock = Rc::new(ManualClock::new(t0));
    let mut engine = MeditationEngine::new(caps(
        store,
        Rc::new(RecordingCues::new()),
        clock.clone(),
    ))
    .with_minute_secs(1);

    for day in 0..3 {
        let start = t0 + Duration::days(day);
        clock.set(start);
        engine.start_plan(MeditationPlan::single(1));
        engine.tick(start + Duration::seconds(1), true);
    }
    // Second session on the same day leaves the streak alone.
    let start = t0 + Duration::days(2) + Duration::hours(1);
    clock.set(start);
    engine.start_plan(MeditationPlan::single(1));
    engine.tick(start + Duration::seconds(1), true);

    assert_eq!(engine.streaks().current_streak, 3);
    assert_eq!(engine.history_streak(), 3);
    assert_eq!(engine.history().len(), 4);

    // Two-day gap resets.
    let start = t0 + Duration::days(5);
    clock.set(start);
    engine.start_plan(MeditationPlan::single(1));
    engine.tick(start + Duration::seconds(1), true);
    assert_eq!(engine.streaks().current_streak, 1);
    assert_eq!(engine.streaks().best_streak, 3);
}

#[test]
fn test_snapshot_serializes_phase_inline() {
    let t0 = Utc.with_ymd_and_hms(2024, 6, 3, 7, 0, 0).unwrap();
    let mut engine = MeditationEngine::new(caps(
        Rc::new(SqliteStore::open_memory().unwrap()),
        Rc::new(RecordingCues::new()),
        Rc::new(ManualClock::new(t0)),
    ));
    engine.start_plan(MeditationPlan::single(10));
    engine.tick(t0 + Duration::seconds(30), true);

    let json = serde_json::to_value(engine.snapshot()).unwrap();
    assert_eq!(json["phase"], "running");
    assert_eq!(json["index"], 0);
    assert_eq!(json["remaining_secs"], 570);

    let back: MeditationSnapshot = serde_json::from_value(json).unwrap();
    assert_eq!(back.phase, MeditationPhase::Running { index: 0 });
}

#[test]
fn test_delete_session_persists() {
    let t0 = Utc.with_ymd_and_hms(2024, 6, 3, 7, 0, 0).unwrap();
    let store: Rc<dyn Store> = Rc::new(SqliteStore::open_memory().unwrap());
    let clock = Rc::new(ManualClock::new(t0));
    let mut engine = MeditationEngine::new(caps(
        store.clone(),
        Rc::new(RecordingCues::new()),
        clock.clone(),
    ))
    .with_minute_secs(1);
    engine.start_plan(MeditationPlan::new(vec![1, 1], None, None));
    engine.tick(t0 + Duration::seconds(2), true);
    let id = engine.history()[0].id;

    assert_eq!(
        engine.delete_session(id),
        vec![Event::MeditationSessionDeleted { id }]
    );
    let reopened = MeditationEngine::new(caps(store, Rc::new(RecordingCues::new()), clock));
    assert_eq!(reopened.history().len(), 1);
    assert_ne!(reopened.history()[0].id, id);
}
