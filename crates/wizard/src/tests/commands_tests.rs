use super::*;
use crate::test_support::*;
use shared::domain::{CategoryId, ChannelId};

async fn run(nav: &Navigator, actor: &Actor, context: &InvocationContext, command: Command) -> Reply {
    handle_command(nav, actor, context, command)
        .await
        .expect("command")
}

fn token_of(reply: &Reply) -> String {
    let screen = screen_of(reply);
    let confirm = screen
        .components
        .iter()
        .flat_map(|row| row.custom_ids())
        .find(|id| id.starts_with("admin:confirm:"))
        .expect("confirm button");
    confirm.trim_start_matches("admin:confirm:").to_string()
}

fn choice_values(reply: &Reply) -> Vec<String> {
    let Reply::Choices(choices) = reply else {
        panic!("expected choices, got {reply:?}");
    };
    choices.iter().map(|c| c.value.clone()).collect()
}

#[tokio::test]
async fn navi_add_stages_pending_action() {
    let nav = seeded_navigator().await;
    let actor = moderator();

    let reply = run(
        &nav,
        &actor,
        &in_channel(104),
        Command::NaviAdd {
            category: "games".to_string(),
        },
    )
    .await;

    let token = token_of(&reply);
    let entry = nav.pending.peek(&token).expect("pending");
    assert_eq!(entry.user_id, actor.user_id);
    assert_eq!(entry.action.kind(), "CHANNEL_ADD");
    assert!(screen_of(&reply).content.contains("chan-104"));
    let doc = nav.storage.read_all().await.expect("read");
    assert!(doc.entry(ChannelId(104)).is_none());
}

#[tokio::test]
async fn navi_add_requires_manage_channels() {
    let nav = seeded_navigator().await;
    let reply = run(
        &nav,
        &member(),
        &in_channel(104),
        Command::NaviAdd {
            category: "games".to_string(),
        },
    )
    .await;

    assert_eq!(screen_of(&reply).content, PERMISSION_DENIED);
    assert!(nav.pending.is_empty());
}

#[tokio::test]
async fn navi_add_outside_a_guild_channel() {
    let nav = seeded_navigator().await;
    let reply = run(
        &nav,
        &owner(),
        &InvocationContext::default(),
        Command::NaviAdd {
            category: "games".to_string(),
        },
    )
    .await;

    assert!(screen_of(&reply).content.contains("only works inside"));
}

#[tokio::test]
async fn navi_add_accepts_category_name_case_insensitively() {
    let nav = seeded_navigator().await;
    let reply = run(
        &nav,
        &owner(),
        &in_channel(104),
        Command::NaviAdd {
            category: "GAMES".to_string(),
        },
    )
    .await;
    assert!(!token_of(&reply).is_empty());

    let reply = run(
        &nav,
        &owner(),
        &in_channel(104),
        Command::NaviAdd {
            category: "nowhere".to_string(),
        },
    )
    .await;
    assert_eq!(screen_of(&reply).content, CATEGORY_NOT_FOUND);
}

#[tokio::test]
async fn navi_remove_checks_current_registration() {
    let nav = seeded_navigator().await;
    let actor = owner();

    let reply = run(
        &nav,
        &actor,
        &in_channel(104),
        Command::NaviRemove {
            category: "lobby".to_string(),
        },
    )
    .await;
    assert!(screen_of(&reply).content.contains("not registered in the navigator"));

    let reply = run(
        &nav,
        &actor,
        &in_channel(101),
        Command::NaviRemove {
            category: "games".to_string(),
        },
    )
    .await;
    assert!(screen_of(&reply).content.contains("not registered in that category"));

    let reply = run(
        &nav,
        &actor,
        &in_channel(101),
        Command::NaviRemove {
            category: "lobby".to_string(),
        },
    )
    .await;
    let entry = nav.pending.peek(&token_of(&reply)).expect("pending");
    assert_eq!(entry.action.kind(), "CHANNEL_REMOVE");
}

#[tokio::test]
async fn category_add_needs_administrator() {
    let nav = seeded_navigator().await;
    let reply = run(
        &nav,
        &moderator(),
        &in_channel(101),
        Command::NaviCategoryAdd {
            name: "Study".to_string(),
            order: None,
        },
    )
    .await;

    assert_eq!(screen_of(&reply).content, PERMISSION_DENIED);
}

#[tokio::test]
async fn category_add_stages_slugged_id() {
    let nav = seeded_navigator().await;
    let reply = run(
        &nav,
        &owner(),
        &in_channel(101),
        Command::NaviCategoryAdd {
            name: "Games".to_string(),
            order: Some(1),
        },
    )
    .await;

    let entry = nav.pending.peek(&token_of(&reply)).expect("pending");
    assert_eq!(
        entry.action,
        PendingAction::CatAdd {
            id: CategoryId::from("games-1"),
            name: "Games".to_string(),
            order: Some(1),
        }
    );
    assert!(screen_of(&reply).content.contains("position 1"));
}

#[tokio::test]
async fn category_add_order_zero_appends_in_preview_and_apply() {
    let nav = seeded_navigator().await;
    let actor = owner();
    let reply = run(
        &nav,
        &actor,
        &in_channel(101),
        Command::NaviCategoryAdd {
            name: "Zed".to_string(),
            order: Some(0),
        },
    )
    .await;
    assert!(screen_of(&reply).content.contains("at position 3?"));
    let token = token_of(&reply);
    let entry = nav.pending.peek(&token).expect("pending");
    assert_eq!(
        entry.action,
        PendingAction::CatAdd {
            id: CategoryId::from("zed"),
            name: "Zed".to_string(),
            order: None,
        }
    );

    crate::confirm::handle_component(&nav, &actor, &format!("admin:confirm:{token}"))
        .await
        .expect("confirm");

    let doc = nav.storage.read_all().await.expect("read");
    assert_eq!(doc.category(&CategoryId::from("zed")).expect("zed").order, 3);
}

#[tokio::test]
async fn category_add_rejects_blank_name() {
    let nav = seeded_navigator().await;
    let reply = run(
        &nav,
        &owner(),
        &in_channel(101),
        Command::NaviCategoryAdd {
            name: "  ".to_string(),
            order: None,
        },
    )
    .await;

    assert_eq!(screen_of(&reply).content, "A category needs a name.");
    assert!(nav.pending.is_empty());
}

#[tokio::test]
async fn category_remove_stages_with_channel_count() {
    let nav = seeded_navigator().await;
    let reply = run(
        &nav,
        &owner(),
        &in_channel(101),
        Command::NaviCategoryRemove {
            category: "lobby".to_string(),
        },
    )
    .await;

    assert!(screen_of(&reply).content.contains("its 2 channel(s)"));
    let entry = nav.pending.peek(&token_of(&reply)).expect("pending");
    assert_eq!(entry.action.kind(), "CAT_REMOVE");
}

#[tokio::test]
async fn register_and_unregister_current_channel() {
    let nav = seeded_navigator().await;
    let actor = moderator();

    let reply = run(
        &nav,
        &actor,
        &in_channel(104),
        Command::NaviRegister {
            category: "games".to_string(),
        },
    )
    .await;
    assert_eq!(screen_of(&reply).content, "Registered <#104> in \"Games\".");
    let doc = nav.storage.read_all().await.expect("read");
    assert_eq!(doc.entry(ChannelId(104)).expect("entry").position, 2);

    run(&nav, &actor, &in_channel(104), Command::NaviUnregister).await;
    let reply = run(&nav, &actor, &in_channel(103), Command::NaviUnregister).await;
    assert_eq!(screen_of(&reply).content, "Unregistered <#103>.");

    let doc = nav.storage.read_all().await.expect("read");
    assert!(doc.category(&CategoryId::from("games")).is_none());
}

#[tokio::test]
async fn register_moving_last_channel_prunes_old_category() {
    let nav = seeded_navigator().await;

    let reply = run(
        &nav,
        &moderator(),
        &in_channel(103),
        Command::NaviRegister {
            category: "Lobby".to_string(),
        },
    )
    .await;

    assert_eq!(screen_of(&reply).content, "Registered <#103> in \"Lobby\".");
    let doc = nav.storage.read_all().await.expect("read");
    assert!(doc.category(&CategoryId::from("games")).is_none());
    assert_eq!(doc.entry(ChannelId(103)).expect("entry").position, 3);
    assert_eq!(doc.category(&CategoryId::from("lobby")).expect("lobby").order, 1);
}

#[tokio::test]
async fn view_lists_layout() {
    let nav = seeded_navigator().await;
    let reply = run(&nav, &member(), &in_channel(101), Command::NaviView).await;

    assert_eq!(
        screen_of(&reply).content,
        "1. **Lobby** (`lobby`)\n   1. <#101>\n   2. <#102>\n2. **Games** (`games`)\n   1. <#103>"
    );
}

#[test]
fn empty_layout_has_placeholder() {
    assert_eq!(
        render_layout(&NavigatorDocument::default()),
        "No categories are registered yet."
    );
}

#[tokio::test]
async fn autocomplete_filters_categories() {
    let nav = seeded_navigator().await;

    let reply = autocomplete(&nav, &in_channel(101), "navi_add", "GAM")
        .await
        .expect("autocomplete");
    assert_eq!(choice_values(&reply), vec!["games"]);

    let reply = autocomplete(&nav, &in_channel(101), "navi_register", "")
        .await
        .expect("autocomplete");
    assert_eq!(choice_values(&reply), vec!["lobby", "games"]);
}

#[tokio::test]
async fn remove_autocomplete_offers_only_current_category() {
    let nav = seeded_navigator().await;

    let reply = autocomplete(&nav, &in_channel(103), "navi_remove", "")
        .await
        .expect("autocomplete");
    assert_eq!(choice_values(&reply), vec!["games"]);

    let reply = autocomplete(&nav, &in_channel(103), "navi_remove", "lob")
        .await
        .expect("autocomplete");
    assert!(choice_values(&reply).is_empty());

    let reply = autocomplete(&nav, &in_channel(105), "navi_remove", "")
        .await
        .expect("autocomplete");
    assert!(choice_values(&reply).is_empty());
}

#[tokio::test]
async fn autocomplete_for_unknown_command_is_empty() {
    let nav = seeded_navigator().await;
    let reply = autocomplete(&nav, &in_channel(101), "navi_view", "")
        .await
        .expect("autocomplete");
    assert!(choice_values(&reply).is_empty());
}
