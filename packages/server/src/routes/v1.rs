use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/chats", chat_routes())
        .route("/gemini", post(handlers::turn::submit_turn))
        .merge(scan_record_routes())
        .route("/models", get(handlers::model_probe::list_models))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/me", get(handlers::auth::me))
}

fn chat_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::chat::list_chats).post(handlers::chat::create_chat),
        )
        .route(
            "/{id}",
            get(handlers::chat::get_chat).delete(handlers::chat::delete_chat),
        )
}

fn scan_record_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/prompt-inputs",
            get(handlers::scan_record::list_prompt_inputs),
        )
        .route(
            "/prompt-inputs/{id}",
            get(handlers::scan_record::get_prompt_input),
        )
        .route(
            "/prompt-outputs",
            get(handlers::scan_record::list_prompt_outputs),
        )
        .route(
            "/prompt-outputs/{id}",
            get(handlers::scan_record::get_prompt_output),
        )
}
