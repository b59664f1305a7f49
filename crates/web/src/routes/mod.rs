use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use crate::features::{participants, picks, seasons};
use crate::middleware::auth::identify;
use crate::state::AppState;

/// API routes. Every request passes through [`identify`] first.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/seasons", seasons::routes::routes())
        .nest("/api/picks", picks::routes::routes())
        .nest("/api/participants", participants::routes::routes())
        .layer(middleware::from_fn_with_state(state.clone(), identify))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use base64::{Engine, engine::general_purpose::STANDARD};
    use chrono::NaiveDate;
    use resolver::{KnowledgeSource, SourceError, SubjectFacts};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use storage::Database;
    use storage::credentials::hash_password_with_rounds;
    use storage::repository::participant::ParticipantRepository;
    use tower::ServiceExt;

    struct FixedSource;

    #[async_trait::async_trait]
    impl KnowledgeSource for FixedSource {
        async fn resolve_subject(&self, name: &str) -> Result<SubjectFacts, SourceError> {
            match name {
                "Gone Early" => Ok(SubjectFacts {
                    birth_date: NaiveDate::from_ymd_opt(1950, 5, 1).unwrap(),
                    death_date: NaiveDate::from_ymd_opt(2024, 5, 1),
                    source_url: "https://en.wikipedia.org/wiki/Gone_Early".to_string(),
                    short_description: "Actor".to_string(),
                }),
                "Offline" => Err(SourceError::Transient("timed out".to_string())),
                _ => Err(SourceError::NotFound(name.to_string())),
            }
        }

        fn name(&self) -> &'static str {
            "Fixed"
        }
    }

    struct TestApp {
        app: Router,
        jim: i64,
        drew: i64,
    }

    async fn setup() -> TestApp {
        let db = Database::in_memory().await.unwrap();
        let participants = ParticipantRepository::new(db.pool());
        let jim = participants.create("Jim").await.unwrap().id;
        let drew = participants.create("Drew").await.unwrap().id;
        participants
            .set_credentials(jim, "jim", &hash_password_with_rounds("hunter2", 1_000).unwrap())
            .await
            .unwrap();
        participants
            .set_credentials(drew, "drew", &hash_password_with_rounds("swordfish", 1_000).unwrap())
            .await
            .unwrap();

        let state = AppState::new(db, Arc::new(FixedSource));
        TestApp {
            app: router(state),
            jim,
            drew,
        }
    }

    fn basic(username: &str, password: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        auth: Option<String>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            request = request.header(header::AUTHORIZATION, auth);
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn draft(t: &TestApp, subject: &str) -> i64 {
        let (status, body) = send(
            &t.app,
            "POST",
            "/api/picks",
            Some(basic("jim", "hunter2")),
            Some(json!({ "participant_id": t.jim, "subject_name": subject, "season_year": 2024 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_public_leaderboard() {
        let t = setup().await;

        let (status, body) = send(&t.app, "GET", "/api/seasons/2024/leaderboard", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_mutations_require_credentials() {
        let t = setup().await;
        let payload = json!({ "participant_id": t.jim, "subject_name": "A", "season_year": 2024 });

        let (status, _) = send(&t.app, "POST", "/api/picks", None, Some(payload.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &t.app,
            "POST",
            "/api/picks",
            Some(basic("jim", "wrong")),
            Some(payload),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_drafting_rules() {
        let t = setup().await;
        draft(&t, "A").await;

        let (status, _) = send(
            &t.app,
            "POST",
            "/api/picks",
            Some(basic("jim", "hunter2")),
            Some(json!({ "participant_id": t.jim, "subject_name": "A", "season_year": 2024 })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(
            &t.app,
            "POST",
            "/api/picks",
            Some(basic("jim", "hunter2")),
            Some(json!({ "participant_id": t.drew, "subject_name": "B", "season_year": 2024 })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &t.app,
            "POST",
            "/api/picks",
            Some(basic("jim", "hunter2")),
            Some(json!({ "participant_id": t.jim, "subject_name": "", "season_year": 2024 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_resolve_scores_and_claims_first_blood() {
        let t = setup().await;
        let pick = draft(&t, "Gone Early").await;

        let (status, _) = send(
            &t.app,
            "POST",
            &format!("/api/picks/{}/resolve", pick),
            Some(basic("drew", "swordfish")),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &t.app,
            "POST",
            &format!("/api/picks/{}/resolve", pick),
            Some(basic("jim", "hunter2")),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "deceased");
        assert_eq!(body["death_age"], 74);
        assert_eq!(body["points"], 26);
        assert_eq!(body["is_first_blood"], true);

        let (_, first_blood) =
            send(&t.app, "GET", "/api/seasons/2024/first-blood", None, None).await;
        assert_eq!(first_blood[0]["pick_id"], pick);

        let (_, season) = send(&t.app, "GET", "/api/seasons/2024", None, None).await;
        assert_eq!(season["season"]["first_blood_winner_id"], t.jim);
    }

    #[tokio::test]
    async fn test_upstream_failures_are_distinguished() {
        let t = setup().await;
        let missing = draft(&t, "Nobody Known").await;
        let offline = draft(&t, "Offline").await;

        let (status, body) = send(
            &t.app,
            "POST",
            &format!("/api/picks/{}/resolve", missing),
            Some(basic("jim", "hunter2")),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("Could not find data"));

        let (status, _) = send(
            &t.app,
            "POST",
            &format!("/api/picks/{}/resolve", offline),
            Some(basic("jim", "hunter2")),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_drafts_hidden_until_locked() {
        let t = setup().await;
        draft(&t, "A").await;

        let (_, anonymous) = send(&t.app, "GET", "/api/seasons/2024/picks", None, None).await;
        assert!(anonymous.as_array().unwrap().is_empty());

        let (_, own) = send(
            &t.app,
            "GET",
            "/api/seasons/2024/picks",
            Some(basic("jim", "hunter2")),
            None,
        )
        .await;
        assert_eq!(own.as_array().unwrap().len(), 1);
        assert_eq!(own[0]["participant_name"], "Jim");

        let (_, others) = send(
            &t.app,
            "GET",
            &format!("/api/participants/{}/picks?season=2024", t.jim),
            Some(basic("drew", "swordfish")),
            None,
        )
        .await;
        assert!(others.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_and_unmark_death() {
        let t = setup().await;
        let pick = draft(&t, "A").await;

        let (status, _) = send(
            &t.app,
            "POST",
            &format!("/api/picks/{}/death", pick),
            Some(basic("jim", "hunter2")),
            Some(json!({ "death_date": "2024-03-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &t.app,
            "PUT",
            &format!("/api/picks/{}/date", pick),
            Some(basic("jim", "hunter2")),
            Some(json!({ "date_type": "birth", "new_date": "1940-03-02" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &t.app,
            "POST",
            &format!("/api/picks/{}/death", pick),
            Some(basic("jim", "hunter2")),
            Some(json!({ "death_date": "2024-03-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["death_age"], 83);
        assert_eq!(body["points"], 17);

        let (status, body) = send(
            &t.app,
            "DELETE",
            &format!("/api/picks/{}/death", pick),
            Some(basic("jim", "hunter2")),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "living");
        assert_eq!(body["points"], 0);

        let (status, _) = send(
            &t.app,
            "DELETE",
            &format!("/api/picks/{}", pick),
            Some(basic("jim", "hunter2")),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
