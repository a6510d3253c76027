//! Integration tests for guided breathing sessions.

use std::rc::Rc;

use medifast_core::breathing::BreathDirection;
use medifast_core::{
    BreathingEngine, BreathingPhase, BreathingSettings, Calendar, Capabilities, Event,
    ManualClock, MemoryStore, RecordingCues, SoundCue, Store,
};

fn engine(store: Rc<dyn Store>, cues: Rc<RecordingCues>) -> BreathingEngine {
    BreathingEngine::new(Capabilities::new(
        store,
        cues,
        Rc::new(ManualClock::new(chrono::Utc::now())),
        Calendar::utc(),
    ))
}

#[test]
fn test_three_round_session() {
    let store: Rc<dyn Store> = Rc::new(MemoryStore::new());
    let cues = Rc::new(RecordingCues::new());
    let mut e = engine(store.clone(), cues.clone());

    let settings = BreathingSettings::new(3, 5, 2, 2);
    e.start_settings(settings.clone());

    let mut events = Vec::new();
    for round in 1..=3u32 {
        // Five paced breaths at two seconds each.
        for _ in 0..10 {
            events.extend(e.tick(true));
        }
        assert_eq!(e.breaths(), 5);
        events.extend(e.double_tap());
        for _ in 0..(20 + round) {
            events.extend(e.tick(true));
        }
        events.extend(e.double_tap());
        assert_eq!(e.phase(), BreathingPhase::Recovery);
        for _ in 0..2 {
            events.extend(e.tick(true));
        }
    }

    assert_eq!(e.phase(), BreathingPhase::Completed);
    let retentions: Vec<u32> = e.results().iter().map(|r| r.retention_secs).collect();
    assert_eq!(retentions, vec![21, 22, 23]);
    assert_eq!(
        events.last(),
        Some(&Event::BreathingCompleted {
            rounds_recorded: 3,
            early: false
        })
    );
    assert_eq!(cues.count_sound(SoundCue::SessionEnd), 1);

    let reopened = engine(store, Rc::new(RecordingCues::new()));
    assert_eq!(reopened.settings(), &settings);
    assert_eq!(reopened.results().len(), 3);
    assert_eq!(reopened.best_retention_secs(), Some(23));
}

#[test]
fn test_snapshot_tracks_breath_halves() {
    let mut e = engine(Rc::new(MemoryStore::new()), Rc::new(RecordingCues::new()));
    e.start_settings(BreathingSettings::new(1, 30, 15, 4));

    let snap = e.snapshot();
    assert_eq!(snap.title, "Take deep breaths");
    assert_eq!(snap.breath, BreathDirection::Inhale);
    assert_eq!(snap.display, "0");

    e.tick(true);
    e.tick(true);
    let snap = e.snapshot();
    assert_eq!(snap.breath, BreathDirection::Exhale);
    assert_eq!(snap.breath_progress, 0.5);

    e.double_tap();
    for _ in 0..75 {
        e.tick(true);
    }
    let snap = e.snapshot();
    assert_eq!(snap.title, "Let go and hold");
    assert_eq!(snap.display, "01:15");
}

#[test]
fn test_new_session_replaces_saved_rounds() {
    let store: Rc<dyn Store> = Rc::new(MemoryStore::new());
    let mut e = engine(store.clone(), Rc::new(RecordingCues::new()));
    e.start_settings(BreathingSettings::new(1, 30, 15, 3));
    e.double_tap();
    e.double_tap();
    e.double_tap();
    assert_eq!(e.phase(), BreathingPhase::Completed);

    e.start_settings(BreathingSettings::new(2, 30, 15, 3));
    e.double_tap();
    e.double_tap();
    e.finish_early();

    let reopened = engine(store, Rc::new(RecordingCues::new()));
    assert_eq!(reopened.results().len(), 1);
    assert_eq!(reopened.settings().rounds, 2);
}
