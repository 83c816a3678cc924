use crate::cli::Args;
use crate::models::chat::{ ChatRequest, ErrorReply };
use crate::relay::{ ChatRelay, RelayError, MESSAGES_REQUIRED };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::State,
    extract::rejection::JsonRejection,
    response::IntoResponse,
    http::StatusCode,
};
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, warn, error };
use uuid::Uuid;

const INTERNAL_ERROR: &str = "An internal server error occurred.";

#[derive(Clone)]
struct AppState {
    relay: Arc<ChatRelay>,
}

pub fn build_router(relay: Arc<ChatRelay>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/health", get(health_handler))
        .layer(cors)
        .with_state(AppState { relay })
}

pub async fn start_http_server(
    addr: &str,
    relay: Arc<ChatRelay>,
    args: &Args,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    let app = build_router(relay);

    if args.enable_tls && args.tls_cert_path.is_some() && args.tls_key_path.is_some() {
        let cert_path = args.tls_cert_path.as_ref().unwrap();
        let key_path = args.tls_key_path.as_ref().unwrap();

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
            cert_path,
            key_path
        ).await?;

        info!("Starting HTTPS API server on: https://{}", addr);
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service()).await?;
    } else {
        info!("Starting HTTP API server on: http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app.into_make_service()).await?;
    }

    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Chat request {} rejected: {}", request_id, rejection);
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorReply { error: MESSAGES_REQUIRED.to_string() }),
            ).into_response();
        }
    };

    match state.relay.handle_chat(request).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(err) => {
            let (status, message) = match &err {
                RelayError::InvalidRequest(msg) => {
                    warn!("Chat request {} rejected: {}", request_id, msg);
                    (StatusCode::BAD_REQUEST, msg.clone())
                }
                RelayError::MissingApiKey => {
                    error!("Chat request {} failed: {}", request_id, err);
                    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
                }
                // Upstream detail stays in the server log only.
                RelayError::Upstream(detail) => {
                    error!("Chat request {} failed upstream: {}", request_id, detail);
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
                }
            };
            (status, Json(ErrorReply { error: message })).into_response()
        }
    }
}
