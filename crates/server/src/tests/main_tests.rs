use super::*;
use axum::{body, body::Body, http::Request};
use shared::domain::{Actor, Role, UserId};
use storage::Category;
use tower::ServiceExt;

async fn test_app() -> (Router, Navigator) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .upsert_channel(ChannelId(10), GuildId(1), "general", ChannelKind::Text)
        .await
        .expect("channel");
    storage
        .update_navigator(|doc| {
            doc.insert_category_at(Category::new("lobby", "Lobby"), 0);
            doc.register_channel(ChannelId(10), &CategoryId::from("lobby"));
        })
        .await
        .expect("seed");
    let navigator = Navigator::new(storage);
    let app = build_router(Arc::new(AppState {
        navigator: navigator.clone(),
    }));
    (app, navigator)
}

async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

fn post_event(event: &InboundEvent) -> Request<Body> {
    Request::post("/interactions")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(event).expect("encode")))
        .expect("request")
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let (app, _navigator) = test_app().await;
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn interactions_dispatch_commands() {
    let (app, navigator) = test_app().await;
    let event = InboundEvent::Command {
        actor: Actor::new(UserId(5), Role::Member),
        context: Default::default(),
        command: shared::protocol::Command::NaviView,
    };

    let response = app.oneshot(post_event(&event)).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let reply: Reply = json_body(response).await;
    let screen = reply.screen().expect("screen");
    assert!(screen.content.contains("**Lobby**"));
    assert!(screen.content.contains("<#10>"));
    assert!(navigator.edit_sessions.is_empty());
}

#[tokio::test]
async fn interactions_keep_wizard_state_between_requests() {
    let (app, navigator) = test_app().await;
    let actor = Actor::new(UserId(1), Role::Owner);
    let open = InboundEvent::Command {
        actor: actor.clone(),
        context: Default::default(),
        command: shared::protocol::Command::NaviEdit {
            mode: shared::domain::EditMode::AddChannel,
        },
    };
    app.clone().oneshot(post_event(&open)).await.expect("open");

    let stale = InboundEvent::Component {
        actor: actor.clone(),
        context: Default::default(),
        custom_id: "naviedit:add:method:new".to_string(),
        values: Vec::new(),
    };
    let response = app.oneshot(post_event(&stale)).await.expect("response");
    let reply: Reply = json_body(response).await;

    assert!(reply.is_ignored());
    assert!(navigator.edit_sessions.get(actor.user_id).is_some());
}

#[tokio::test]
async fn malformed_event_is_rejected() {
    let (app, _navigator) = test_app().await;
    let request = Request::post("/interactions")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"type":"teleport"}"#))
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn navigator_layout_lists_categories_in_order() {
    let (app, _navigator) = test_app().await;
    let request = Request::get("/navigator")
        .body(Body::empty())
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let layout: LayoutResponse = json_body(response).await;
    assert_eq!(layout.categories.len(), 1);
    assert_eq!(layout.categories[0].id, CategoryId::from("lobby"));
    assert_eq!(layout.categories[0].order, 1);
    assert_eq!(layout.categories[0].channels, vec![ChannelId(10)]);
}

#[tokio::test]
async fn directory_upsert_feeds_channel_lookups() {
    let (app, navigator) = test_app().await;
    let request = Request::put("/directory/channels/22")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({ "guild_id": 1, "name": "voice-lounge", "kind": "voice" })
                .to_string(),
        ))
        .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let stored = navigator
        .storage
        .channel(ChannelId(22))
        .await
        .expect("lookup")
        .expect("stored");
    assert_eq!(stored.name, "voice-lounge");
    assert_eq!(stored.kind, ChannelKind::Voice);

    let blank = Request::put("/directory/channels/23")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({ "guild_id": 1, "name": "  " }).to_string(),
        ))
        .expect("request");
    let response = app.oneshot(blank).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
