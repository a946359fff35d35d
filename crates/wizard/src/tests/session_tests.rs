use super::*;
use crate::edit::{EditFlow, EditStep, EditStepKind};
use rand::{rngs::StdRng, Rng, SeedableRng};
use shared::domain::{ChannelId, EditMode};

fn picked(ids: &[i64]) -> EditStep {
    EditStep::PickAddChannels {
        channels: ids.iter().copied().map(ChannelId).collect(),
    }
}

fn method(ids: &[i64]) -> EditStep {
    EditStep::AddMethod {
        channels: ids.iter().copied().map(ChannelId).collect(),
    }
}

#[test]
fn start_opens_first_step_with_empty_history() {
    let store = SessionStore::<EditFlow>::new();
    let session = store.start(UserId(1), EditMode::DeleteChannel);

    assert_eq!(session.current.kind(), EditStepKind::DeletePickChannels);
    assert!(session.stack.is_empty());
    assert_eq!(store.get(UserId(1)).expect("session").mode, EditMode::DeleteChannel);
}

#[test]
fn start_overwrites_previous_session() {
    let store = SessionStore::<EditFlow>::new();
    store.start(UserId(1), EditMode::AddChannel);
    store.set_step(UserId(1), method(&[5]), true).expect("step");

    let session = store.start(UserId(1), EditMode::OrderCategory);

    assert_eq!(session.current.kind(), EditStepKind::CategoryOrderPick);
    assert!(session.stack.is_empty());
    assert_eq!(store.len(), 1);
}

#[test]
fn set_step_without_session_is_rejected() {
    let store = SessionStore::<EditFlow>::new();
    assert!(store.set_step(UserId(9), picked(&[]), true).is_none());
    assert!(store.is_empty());
}

#[test]
fn set_step_rejects_step_from_another_mode() {
    let store = SessionStore::<EditFlow>::new();
    store.start(UserId(1), EditMode::DeleteChannel);

    assert!(store.set_step(UserId(1), method(&[1]), true).is_none());

    let session = store.get(UserId(1)).expect("session");
    assert_eq!(session.current.kind(), EditStepKind::DeletePickChannels);
    assert!(session.stack.is_empty());
}

#[test]
fn replace_without_push_keeps_history() {
    let store = SessionStore::<EditFlow>::new();
    store.start(UserId(1), EditMode::AddChannel);

    let session = store
        .set_step(UserId(1), picked(&[1, 2]), false)
        .expect("step");

    assert_eq!(session.current, picked(&[1, 2]));
    assert!(!session.can_go_back());
}

#[test]
fn go_back_restores_pushed_step() {
    let store = SessionStore::<EditFlow>::new();
    store.start(UserId(1), EditMode::AddChannel);
    store.set_step(UserId(1), picked(&[3]), false).expect("pick");
    store.set_step(UserId(1), method(&[3]), true).expect("method");

    let session = store.go_back(UserId(1)).expect("back");

    assert_eq!(session.current, picked(&[3]));
    assert!(session.stack.is_empty());
}

#[test]
fn go_back_on_empty_history_falls_back_to_first_step() {
    let store = SessionStore::<EditFlow>::new();
    store.start(UserId(1), EditMode::AddChannel);
    store.set_step(UserId(1), picked(&[3]), false).expect("pick");

    let session = store.go_back(UserId(1)).expect("back");

    assert_eq!(session.current, picked(&[]));
}

#[test]
fn go_back_without_session_is_none() {
    let store = SessionStore::<EditFlow>::new();
    assert!(store.go_back(UserId(4)).is_none());
}

#[test]
fn end_removes_session() {
    let store = SessionStore::<EditFlow>::new();
    store.start(UserId(1), EditMode::AddChannel);

    assert!(store.end(UserId(1)).is_some());
    assert!(store.get(UserId(1)).is_none());
    assert!(store.end(UserId(1)).is_none());
}

#[test]
fn sessions_are_isolated_per_user() {
    let store = SessionStore::<EditFlow>::new();
    store.start(UserId(1), EditMode::AddChannel);
    store.start(UserId(2), EditMode::AddChannel);
    store.set_step(UserId(1), method(&[7]), true).expect("step");

    let other = store.get(UserId(2)).expect("other");
    assert_eq!(other.current, picked(&[]));
    assert!(other.stack.is_empty());
}

#[test]
fn stack_depth_tracks_pushes_minus_backs() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..50 {
        let store = SessionStore::<EditFlow>::new();
        store.start(UserId(1), EditMode::AddChannel);
        let pushes = rng.gen_range(0..20usize);
        let backs = rng.gen_range(0..=pushes);
        for idx in 0..pushes {
            let step = if idx % 2 == 0 {
                method(&[idx as i64])
            } else {
                picked(&[idx as i64])
            };
            store.set_step(UserId(1), step, true).expect("push");
        }
        for _ in 0..backs {
            store.go_back(UserId(1)).expect("back");
        }
        let session = store.get(UserId(1)).expect("session");
        assert_eq!(session.stack.len(), pushes - backs);
    }
}

#[test]
fn sweep_idle_drops_only_stale_sessions() {
    let store = SessionStore::<EditFlow>::new();
    store.start(UserId(1), EditMode::AddChannel);
    store.start(UserId(2), EditMode::AddChannel);

    let later = Utc::now() + Duration::minutes(20);
    assert_eq!(store.sweep_idle(later, Duration::minutes(30)), 0);
    assert_eq!(store.sweep_idle(later, Duration::minutes(15)), 2);
    assert!(store.is_empty());
}
