pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod upstream;
pub mod utils;

use std::time::Duration;

use axum::Json;
use axum::http::HeaderValue;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, openapi};
use utoipa_scalar::{Scalar, Servable as ScalarServable};

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PromptGate API",
        version = "1.0.0",
        description = "Scan-gated chat gateway over a generative model API"
    ),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::chat::list_chats,
        handlers::chat::create_chat,
        handlers::chat::get_chat,
        handlers::chat::delete_chat,
        handlers::turn::submit_turn,
        handlers::scan_record::list_prompt_inputs,
        handlers::scan_record::get_prompt_input,
        handlers::scan_record::list_prompt_outputs,
        handlers::scan_record::get_prompt_output,
        handlers::model_probe::list_models,
    ),
    tags(
        (name = "Auth", description = "Authentication and sessions"),
        (name = "Chats", description = "Chat CRUD, owner-scoped"),
        (name = "Turns", description = "Scan-gated chat turns"),
        (name = "Scan Records", description = "Stored scan verdicts, read-only"),
        (name = "Models", description = "Model collaborator probes"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age));

    if config.allow_origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allow_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);

    let router = axum::Router::new()
        .nest("/api", routes::api_routes())
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(cors)
        .with_state(state);

    router.merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
}
