use super::*;
use crate::test_support::*;

async fn press(nav: &Navigator, actor: &Actor, custom_id: &str, value: Option<&str>) -> Reply {
    let values: Vec<String> = value.into_iter().map(str::to_string).collect();
    handle_component(nav, actor, &in_channel(104), custom_id, &values)
        .await
        .expect("handler")
}

fn step(nav: &Navigator, actor: &Actor) -> NaviStep {
    nav.navi_sessions.get(actor.user_id).expect("session").current
}

async fn favorites(nav: &Navigator, actor: &Actor) -> Vec<ChannelId> {
    nav.storage
        .get_favorites(actor.user_id)
        .await
        .expect("favorites")
}

#[tokio::test]
async fn open_shows_home_with_visible_favorites() {
    let nav = seeded_navigator().await;
    let actor = member();
    nav.storage
        .add_favorite(actor.user_id, ChannelId(101))
        .await
        .expect("fav");
    nav.storage
        .add_favorite(actor.user_id, ChannelId(900))
        .await
        .expect("fav");

    let reply = open(&nav, &actor, &in_channel(104)).await.expect("open");

    let screen = screen_of(&reply);
    assert!(screen.content.contains("<#101>"));
    assert!(!screen.content.contains("<#900>"));
    assert!(screen.has_component("navi:home:go"));
    assert!(!screen.has_component("navi:nav:back"));
    assert_eq!(screen.accent_color.as_deref(), Some(crate::ui::VIEW_ACCENT));
}

#[tokio::test]
async fn browse_with_no_categories_shows_info() {
    let nav = navigator().await;
    let actor = member();
    open(&nav, &actor, &in_channel(104)).await.expect("open");

    let reply = press(&nav, &actor, "navi:home:go", None).await;

    assert!(screen_of(&reply).content.contains("No categories are registered yet."));
    assert!(matches!(step(&nav, &actor), NaviStep::Home { .. }));
}

#[tokio::test]
async fn browse_to_channel_produces_deep_link() {
    let nav = seeded_navigator().await;
    let actor = member();
    open(&nav, &actor, &in_channel(104)).await.expect("open");

    let reply = press(&nav, &actor, "navi:home:go", None).await;
    assert!(screen_of(&reply).has_component("navi:pickcat"));
    press(&nav, &actor, "navi:pickcat", Some("lobby")).await;
    let reply = press(&nav, &actor, "navi:chanlist", Some("102")).await;

    assert!(screen_of(&reply)
        .content
        .contains("https://discord.com/channels/1/102"));
    let session = nav.navi_sessions.get(actor.user_id).expect("session");
    assert_eq!(session.stack.len(), 3);
}

#[tokio::test]
async fn channel_outside_listing_is_refused() {
    let nav = seeded_navigator().await;
    let actor = member();
    open(&nav, &actor, &in_channel(104)).await.expect("open");
    press(&nav, &actor, "navi:home:go", None).await;
    press(&nav, &actor, "navi:pickcat", Some("lobby")).await;

    let reply = press(&nav, &actor, "navi:chanlist", Some("103")).await;

    assert!(matches!(reply, Reply::Message(_)));
    assert_eq!(step(&nav, &actor).kind(), NaviStepKind::ChannelList);
}

#[tokio::test]
async fn back_walks_history_then_home_clears_it() {
    let nav = seeded_navigator().await;
    let actor = member();
    open(&nav, &actor, &in_channel(104)).await.expect("open");
    press(&nav, &actor, "navi:home:go", None).await;
    press(&nav, &actor, "navi:pickcat", Some("games")).await;

    press(&nav, &actor, "navi:nav:back", None).await;
    assert_eq!(step(&nav, &actor).kind(), NaviStepKind::PickCategory);

    press(&nav, &actor, "navi:nav:home", None).await;
    let session = nav.navi_sessions.get(actor.user_id).expect("session");
    assert_eq!(session.current.kind(), NaviStepKind::Home);
    assert!(session.stack.is_empty());
}

#[tokio::test]
async fn stale_navi_event_is_ignored() {
    let nav = seeded_navigator().await;
    let actor = member();
    open(&nav, &actor, &in_channel(104)).await.expect("open");

    let reply = press(&nav, &actor, "navi:reorder:target", Some("0")).await;

    assert!(reply.is_ignored());
    assert_eq!(step(&nav, &actor).kind(), NaviStepKind::Home);
}

#[tokio::test]
async fn favorite_from_channel_screen() {
    let nav = seeded_navigator().await;
    let actor = member();
    open(&nav, &actor, &in_channel(104)).await.expect("open");
    press(&nav, &actor, "navi:home:go", None).await;
    press(&nav, &actor, "navi:pickcat", Some("games")).await;
    press(&nav, &actor, "navi:chanlist", Some("103")).await;

    let reply = press(&nav, &actor, "navi:picked:favorite", None).await;
    assert!(screen_of(&reply).content.starts_with("Added <#103>"));

    let reply = press(&nav, &actor, "navi:picked:favorite", None).await;
    assert!(screen_of(&reply).content.starts_with("That channel is already"));
    assert_eq!(favorites(&nav, &actor).await, vec![ChannelId(103)]);
}

#[tokio::test]
async fn add_current_channel_respects_limit() {
    let nav = seeded_navigator().await;
    let actor = member();
    for id in 101..=105 {
        nav.storage
            .add_favorite(actor.user_id, ChannelId(id))
            .await
            .expect("fav");
    }
    let context = in_channel(106);
    open(&nav, &actor, &context).await.expect("open");
    handle_component(&nav, &actor, &context, "navi:home:edit", &[])
        .await
        .expect("edit");

    let reply = handle_component(
        &nav,
        &actor,
        &context,
        "navi:editfav",
        &[FavoriteMenu::AddCurrent.value().to_string()],
    )
    .await
    .expect("menu");

    assert!(screen_of(&reply).content.starts_with("You can keep at most 5"));
    assert_eq!(favorites(&nav, &actor).await.len(), MAX_FAVORITES);
    assert_eq!(step(&nav, &actor).kind(), NaviStepKind::EditFavorites);
}

#[tokio::test]
async fn add_current_hidden_without_channel_context() {
    let nav = seeded_navigator().await;
    let actor = member();
    let context = InvocationContext::default();
    open(&nav, &actor, &context).await.expect("open");

    let reply = handle_component(&nav, &actor, &context, "navi:home:edit", &[])
        .await
        .expect("edit");

    let screen = screen_of(&reply);
    let has_add_current = screen.components.iter().any(|row| match row {
        shared::protocol::ComponentRow::StringSelect { options, .. } => options
            .iter()
            .any(|o| o.value == FavoriteMenu::AddCurrent.value()),
        _ => false,
    });
    assert!(!has_add_current);
}

#[tokio::test]
async fn add_favorite_from_category_returns_to_menu() {
    let nav = seeded_navigator().await;
    let actor = member();
    open(&nav, &actor, &in_channel(104)).await.expect("open");
    press(&nav, &actor, "navi:home:edit", None).await;
    press(
        &nav,
        &actor,
        "navi:editfav",
        Some(FavoriteMenu::AddFromCategory.value()),
    )
    .await;
    press(&nav, &actor, "navi:favcat", Some("lobby")).await;

    let reply = press(&nav, &actor, "navi:favchan", Some("102")).await;

    assert!(screen_of(&reply).content.starts_with("Added <#102>"));
    let session = nav.navi_sessions.get(actor.user_id).expect("session");
    assert_eq!(session.current.kind(), NaviStepKind::EditFavorites);
    assert_eq!(session.stack.len(), 1);
    assert_eq!(favorites(&nav, &actor).await, vec![ChannelId(102)]);
}

#[tokio::test]
async fn remove_favorite() {
    let nav = seeded_navigator().await;
    let actor = member();
    for id in [101, 102] {
        nav.storage
            .add_favorite(actor.user_id, ChannelId(id))
            .await
            .expect("fav");
    }
    open(&nav, &actor, &in_channel(104)).await.expect("open");
    press(&nav, &actor, "navi:home:edit", None).await;
    press(&nav, &actor, "navi:editfav", Some(FavoriteMenu::Remove.value())).await;

    press(&nav, &actor, "navi:removefav", Some("101")).await;

    assert_eq!(favorites(&nav, &actor).await, vec![ChannelId(102)]);
    assert_eq!(step(&nav, &actor).kind(), NaviStepKind::EditFavorites);
}

#[tokio::test]
async fn remove_with_no_favorites_stays_on_menu() {
    let nav = seeded_navigator().await;
    let actor = member();
    open(&nav, &actor, &in_channel(104)).await.expect("open");
    press(&nav, &actor, "navi:home:edit", None).await;

    let reply = press(&nav, &actor, "navi:editfav", Some(FavoriteMenu::Remove.value())).await;

    assert!(screen_of(&reply)
        .content
        .starts_with("You have no favorites to remove."));
    assert_eq!(step(&nav, &actor).kind(), NaviStepKind::EditFavorites);
}

#[tokio::test]
async fn reorder_maps_visible_positions_to_stored_ones() {
    let nav = seeded_navigator().await;
    let actor = member();
    for id in [101, 900, 102, 103] {
        nav.storage
            .add_favorite(actor.user_id, ChannelId(id))
            .await
            .expect("fav");
    }
    open(&nav, &actor, &in_channel(104)).await.expect("open");
    press(&nav, &actor, "navi:home:edit", None).await;
    press(&nav, &actor, "navi:editfav", Some(FavoriteMenu::Reorder.value())).await;
    assert_eq!(step(&nav, &actor).kind(), NaviStepKind::ReorderSource);

    press(&nav, &actor, "navi:reorder:pick", Some("2")).await;
    assert_eq!(step(&nav, &actor).kind(), NaviStepKind::ReorderTarget);
    press(&nav, &actor, "navi:reorder:target", Some("0")).await;

    assert_eq!(
        favorites(&nav, &actor).await,
        vec![ChannelId(103), ChannelId(101), ChannelId(900), ChannelId(102)]
    );
}

#[test]
fn deep_link_format() {
    assert_eq!(
        deep_link(GuildId(10), ChannelId(20)),
        "https://discord.com/channels/10/20"
    );
}
