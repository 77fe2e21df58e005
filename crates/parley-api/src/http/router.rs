//! Axum router configuration with middleware.
//!
//! Chat routes are under `/api/v1/chat/`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let chat_routes = Router::new()
        .route("/new", post(handlers::chat::new_chat))
        .route("/all-chats", get(handlers::chat::all_chats))
        .route("/delete", delete(handlers::chat::delete_chats));

    Router::new()
        .nest("/api/v1/chat", chat_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness plus a database round-trip (no auth required).
async fn health_check(State(state): State<AppState>) -> (StatusCode, axum::Json<serde_json::Value>) {
    let db_ok = sqlx::query("SELECT 1")
        .execute(&state.db_pool.reader)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Health check database probe failed"))
        .is_ok();

    let status = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        axum::Json(serde_json::json!({
            "status": if db_ok { "ok" } else { "degraded" },
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Method, Request, Response, header};
    use secrecy::SecretString;
    use serde_json::Value;
    use tower::ServiceExt;

    use parley_core::llm::box_provider::BoxChatModel;
    use parley_core::llm::provider::ChatModel;
    use parley_core::repository::user::UserRepository;
    use parley_infra::sqlite::pool::{DatabasePool, database_url_for};
    use parley_types::config::AppConfig;
    use parley_types::llm::{GenerateRequest, GenerateResponse, LlmError, Usage};
    use parley_types::user::User;

    use super::*;
    use crate::http::error::{
        MESSAGE_REQUIRED, NOT_REGISTERED, TOKEN_EXPIRED, TOKEN_NOT_RECEIVED,
    };
    use crate::http::extractors::auth::TokenKeys;

    const SECRET: &str = "router-test-secret";

    /// Replies `echo: <last text>`; fails when asked to "fail".
    struct EchoModel;

    impl ChatModel for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo-1"
        }

        async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
            tokio::time::sleep(Duration::from_millis(1)).await;
            let last = request
                .contents
                .last()
                .map(|c| c.joined_text())
                .unwrap_or_default();
            if last == "fail" {
                return Err(LlmError::Overloaded("try later".to_string()));
            }
            Ok(GenerateResponse {
                text: format!("echo: {last}"),
                finish_reason: Some("STOP".to_string()),
                usage: Usage::default(),
            })
        }
    }

    struct TestApp {
        state: AppState,
        user: User,
        token: String,
    }

    impl TestApp {
        async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let url = database_url_for(dir.path());
            // Leak tempdir so it lives for the test
            std::mem::forget(dir);
            let pool = DatabasePool::new(&url).await.unwrap();

            let tokens = TokenKeys::new(&SecretString::from(SECRET), 7);
            let state = AppState::new(
                AppConfig::default(),
                pool,
                BoxChatModel::new(EchoModel),
                tokens,
            );

            let user = state
                .chat_service
                .user_repo()
                .create_user(&User::new("Ada", "ada@example.com"))
                .await
                .unwrap();
            let token = state.tokens.issue(&user).unwrap();

            Self { state, user, token }
        }

        async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = build_router(self.state.clone())
                .oneshot(request)
                .await
                .unwrap();
            read_json(response).await
        }

        fn cookie(&self) -> String {
            format!("auth_token={}", self.token)
        }
    }

    async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn send_request(cookie: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/chat/new")
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn bare_request(method: Method, uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn roles(chats: &Value) -> Vec<&str> {
        chats
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["role"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = TestApp::new().await;
        let (status, body) = app.call(bare_request(Method::GET, "/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_send_then_list_round_trip() {
        let app = TestApp::new().await;

        let (status, body) = app
            .call(send_request(&app.cookie(), r#"{"message":"hello"}"#))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(roles(&body["chats"]), vec!["user", "assistant"]);
        assert_eq!(body["chats"][0]["content"], "hello");
        assert_eq!(body["chats"][1]["content"], "echo: hello");

        let (status, listed) = app
            .call(bare_request(Method::GET, "/api/v1/chat/all-chats", Some(&app.cookie())))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["message"], "OK");
        assert_eq!(listed["chats"], body["chats"]);
    }

    #[tokio::test]
    async fn test_second_send_returns_full_history() {
        let app = TestApp::new().await;
        app.call(send_request(&app.cookie(), r#"{"message":"a"}"#)).await;

        let (status, body) = app
            .call(send_request(&app.cookie(), r#"{"message":"c"}"#))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            roles(&body["chats"]),
            vec!["user", "assistant", "user", "assistant"]
        );
        assert_eq!(body["chats"][3]["content"], "echo: c");
    }

    #[tokio::test]
    async fn test_bearer_token_accepted() {
        let app = TestApp::new().await;
        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/v1/chat/all-chats")
            .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
            .body(Body::empty())
            .unwrap();

        let (status, body) = app.call(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chats"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_missing_token() {
        let app = TestApp::new().await;
        let (status, body) = app
            .call(bare_request(Method::GET, "/api/v1/chat/all-chats", None))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], TOKEN_NOT_RECEIVED);
    }

    #[tokio::test]
    async fn test_invalid_and_expired_tokens() {
        let app = TestApp::new().await;

        let (status, body) = app
            .call(bare_request(Method::GET, "/api/v1/chat/all-chats", Some("auth_token=garbage")))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], TOKEN_EXPIRED);

        let expired = TokenKeys::new(&SecretString::from(SECRET), -1)
            .issue(&app.user)
            .unwrap();
        let (status, body) = app
            .call(bare_request(
                Method::DELETE,
                "/api/v1/chat/delete",
                Some(&format!("auth_token={expired}")),
            ))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], TOKEN_EXPIRED);
    }

    #[tokio::test]
    async fn test_unregistered_user_rejected_everywhere() {
        let app = TestApp::new().await;
        let ghost = User::new("Ghost", "ghost@example.com");
        let cookie = format!("auth_token={}", app.state.tokens.issue(&ghost).unwrap());

        let (status, body) = app.call(send_request(&cookie, r#"{"message":"hi"}"#)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], NOT_REGISTERED);

        for (method, uri) in [
            (Method::GET, "/api/v1/chat/all-chats"),
            (Method::DELETE, "/api/v1/chat/delete"),
        ] {
            let (status, body) = app.call(bare_request(method, uri, Some(&cookie))).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["message"], NOT_REGISTERED);
        }
    }

    #[tokio::test]
    async fn test_blank_or_missing_message_is_422() {
        let app = TestApp::new().await;

        for body in [r#"{"message":"   "}"#, "{}", "not json"] {
            let (status, resp) = app.call(send_request(&app.cookie(), body)).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "body: {body}");
            assert_eq!(resp["message"], MESSAGE_REQUIRED);
        }

        let chats = app
            .state
            .chat_service
            .user_repo()
            .find_by_id(&app.user.id)
            .await
            .unwrap()
            .unwrap()
            .chats;
        assert!(chats.is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_is_500_and_stores_nothing() {
        let app = TestApp::new().await;
        app.call(send_request(&app.cookie(), r#"{"message":"a"}"#)).await;

        let (status, body) = app
            .call(send_request(&app.cookie(), r#"{"message":"fail"}"#))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Something went wrong");

        let (_, listed) = app
            .call(bare_request(Method::GET, "/api/v1/chat/all-chats", Some(&app.cookie())))
            .await;
        assert_eq!(listed["chats"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let app = TestApp::new().await;
        app.call(send_request(&app.cookie(), r#"{"message":"a"}"#)).await;

        for _ in 0..2 {
            let (status, body) = app
                .call(bare_request(Method::DELETE, "/api/v1/chat/delete", Some(&app.cookie())))
                .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["message"], "OK");
        }

        let (_, listed) = app
            .call(bare_request(Method::GET, "/api/v1/chat/all-chats", Some(&app.cookie())))
            .await;
        assert!(listed["chats"].as_array().unwrap().is_empty());
    }
}
