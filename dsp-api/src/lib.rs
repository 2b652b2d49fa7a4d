use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod health;
pub mod receipts;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    // Generated receipts (and the logo) are served straight from disk
    let static_files = ServeDir::new(state.store.static_dir());

    Router::new()
        .merge(receipts::routes())
        .merge(health::routes())
        .nest_service(&format!("/{}", dsp_store::STATIC_MOUNT), static_files)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
