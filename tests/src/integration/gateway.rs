//! # Gateway Flow
//!
//! The node as deployed: `NodeContainer` built from a seed file, the axum
//! router in front, the event bus behind. Drives a whole lifecycle over HTTP
//! and checks what reached each participant.

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use match_node::{build_router, AppState, NodeConfig, NodeContainer};
    use serde_json::{json, Value};
    use shared_bus::{EventFilter, MatchEvent};
    use shared_types::UserId;
    use std::io::Write;
    use tower::ServiceExt;

    const ALICE: &str = "11111111-1111-4111-8111-111111111111";
    const BOB: &str = "22222222-2222-4222-8222-222222222222";
    const A1: &str = "aaaaaaaa-aaaa-4aaa-8aaa-aaaaaaaaaaaa";
    const B1: &str = "bbbbbbbb-bbbb-4bbb-8bbb-bbbbbbbbbbbb";

    fn node() -> (NodeContainer, Router) {
        let mut seed = tempfile::NamedTempFile::new().unwrap();
        write!(
            seed,
            r#"{{
                "users": [
                    {{ "token": "alice-token", "id": "{ALICE}" }},
                    {{ "token": "bob-token", "id": "{BOB}" }}
                ],
                "teams": [
                    {{ "id": "{A1}", "name": "A1", "captain": "{ALICE}" }},
                    {{ "id": "{B1}", "name": "B1", "captain": "{BOB}" }}
                ]
            }}"#
        )
        .unwrap();

        let config = NodeConfig {
            seed_file: Some(seed.path().to_path_buf()),
            ..Default::default()
        };
        let container = NodeContainer::build(&config).unwrap();
        let state = AppState {
            api: container.service.clone(),
            identity: container.identity.clone(),
        };
        let router = build_router(state, &config.gateway);
        (container, router)
    }

    async fn call(
        router: &Router,
        method: Method,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json");
        let request = builder
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_full_lifecycle_over_http() {
        let (container, router) = node();
        let alice: UserId = ALICE.parse().unwrap();
        let bob: UserId = BOB.parse().unwrap();
        let mut alice_inbox = container.bus.subscribe(EventFilter::for_recipient(alice));
        let mut bob_inbox = container.bus.subscribe(EventFilter::for_recipient(bob));

        let (status, request) = call(
            &router,
            Method::POST,
            "/matches",
            "alice-token",
            Some(json!({ "challenger_team": A1, "opponent_team": B1, "match_type": "ranked" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(request["match_type"], "ranked");
        let request_id = request["id"].as_str().unwrap().to_string();

        let (status, _) = call(
            &router,
            Method::POST,
            &format!("/matches/{request_id}/respond"),
            "bob-token",
            Some(json!({ "decision": "accept" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(
            &router,
            Method::POST,
            &format!("/matches/{request_id}/complete"),
            "alice-token",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, result) = call(
            &router,
            Method::POST,
            &format!("/matches/{request_id}/outcome"),
            "alice-token",
            Some(json!({
                "winner_team": A1,
                "scores": { "challenger": 2, "opponent": 1 },
                "best_player": { "name": "Rin", "team": A1 }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{result}");
        let result_id = result["id"].as_str().unwrap().to_string();

        let (status, body) = call(
            &router,
            Method::POST,
            &format!("/outcomes/{result_id}/verify"),
            "alice-token",
            Some(json!({ "decision": "confirm" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "self_verification");

        let (status, body) = call(
            &router,
            Method::POST,
            &format!("/outcomes/{result_id}/verify"),
            "bob-token",
            Some(json!({ "decision": "confirm", "feedback": "gg" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["verification_state"], "verified");
        assert_eq!(body["opponent_feedback"], "gg");

        let (_, stats) = call(
            &router,
            Method::GET,
            &format!("/teams/{A1}/statistics"),
            "bob-token",
            None,
        )
        .await;
        assert_eq!(stats["wins"], 1);
        assert_eq!(stats["total_matches"], 1);

        let to_bob = bob_inbox.drain();
        assert_eq!(to_bob.len(), 3, "{to_bob:?}");
        assert!(matches!(to_bob[0], MatchEvent::MatchProposed { .. }));
        assert!(matches!(to_bob[2], MatchEvent::OutcomeReported { .. }));

        let to_alice = alice_inbox.drain();
        assert_eq!(to_alice.len(), 2, "{to_alice:?}");
        assert!(matches!(to_alice[1], MatchEvent::OutcomeVerified { .. }));
    }

    #[tokio::test]
    async fn test_unknown_token_never_reaches_the_service() {
        let (container, router) = node();
        let mut everything = container.bus.subscribe(EventFilter::all());

        let (status, body) = call(
            &router,
            Method::POST,
            "/matches",
            "forged-token",
            Some(json!({ "challenger_team": A1, "opponent_team": B1 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthenticated");
        assert!(everything.drain().is_empty());
    }
}
