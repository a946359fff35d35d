use super::*;

fn channel_add(user: i64) -> PendingEntry {
    PendingEntry::new(
        UserId(user),
        PendingAction::ChannelAdd {
            channel_id: ChannelId(10),
            channel_name: "general".to_string(),
            category_id: CategoryId::from("lobby"),
            category_name: "Lobby".to_string(),
        },
    )
}

#[test]
fn tokens_are_twelve_alphanumeric_chars_and_distinct() {
    let pending = PendingActions::new();
    let first = pending.create(channel_add(1));
    let second = pending.create(channel_add(1));

    assert_eq!(first.len(), TOKEN_LENGTH);
    assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(first, second);
    assert_eq!(pending.len(), 2);
}

#[test]
fn consume_is_single_use() {
    let pending = PendingActions::new();
    let token = pending.create(channel_add(1));

    let entry = pending.consume(&token).expect("first consume");
    assert_eq!(entry.user_id, UserId(1));
    assert!(pending.consume(&token).is_none());
    assert!(pending.peek(&token).is_none());
}

#[test]
fn peek_leaves_entry_in_place() {
    let pending = PendingActions::new();
    let token = pending.create(channel_add(3));

    assert!(pending.peek(&token).is_some());
    assert!(pending.peek(&token).is_some());
    assert_eq!(pending.len(), 1);
}

#[test]
fn cancel_reports_whether_something_was_removed() {
    let pending = PendingActions::new();
    let token = pending.create(channel_add(1));

    assert!(pending.cancel(&token));
    assert!(!pending.cancel(&token));
    assert!(pending.is_empty());
}

#[test]
fn expired_entries_read_as_absent() {
    let pending = PendingActions::with_ttl(Duration::minutes(10));
    let mut entry = channel_add(1);
    entry.created_at = Utc::now() - Duration::minutes(11);
    let token = pending.create(entry);

    assert!(pending.peek(&token).is_none());
    assert!(pending.consume(&token).is_none());
    assert!(pending.is_empty());
}

#[test]
fn sweep_removes_old_entries_only() {
    let pending = PendingActions::new();
    let mut old = channel_add(1);
    old.created_at = Utc::now() - Duration::minutes(30);
    let stale = pending.create(old);
    let fresh = pending.create(channel_add(2));

    assert_eq!(pending.sweep_expired(Utc::now(), Duration::minutes(10)), 1);
    assert!(pending.peek(&stale).is_none());
    assert!(pending.peek(&fresh).is_some());
}

#[test]
fn action_serializes_with_screaming_tag() {
    let action = PendingAction::CatAdd {
        id: CategoryId::from("games"),
        name: "Games".to_string(),
        order: Some(2),
    };
    let json = serde_json::to_value(&action).expect("json");

    assert_eq!(json["type"], "CAT_ADD");
    assert_eq!(json["payload"]["id"], "games");
    assert_eq!(action.kind(), "CAT_ADD");
}
