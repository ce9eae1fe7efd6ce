use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};

use ministry_tracker_backend::config::AppConfig;
use ministry_tracker_backend::rest;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let config = AppConfig::from_env()?;
    info!("Using data directory {}", config.data_directory.display());

    let state = ministry_tracker_backend::build_state(&config.data_directory)?;

    // CORS setup to allow the admin frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/assignments",
            get(rest::list_assignments).post(rest::create_assignment),
        )
        .route(
            "/assignments/:id",
            get(rest::get_assignment)
                .put(rest::update_assignment)
                .delete(rest::delete_assignment),
        )
        .route(
            "/assignments/:id/distribute",
            post(rest::distribute_assignment),
        )
        .route(
            "/assignments/:id/statuses",
            get(rest::list_assignment_statuses),
        )
        .route("/assignments/:id/submissions", post(rest::submit_homework))
        .route("/distribution/overdue-sweep", post(rest::overdue_sweep))
        .route(
            "/couples",
            get(rest::list_couples).post(rest::create_couple),
        )
        .route(
            "/couples/:id",
            get(rest::get_couple)
                .put(rest::update_couple)
                .delete(rest::delete_couple),
        )
        .route(
            "/coaches",
            get(rest::list_coaches).post(rest::create_coach),
        )
        .route("/coaches/options", get(rest::coach_options))
        .route(
            "/coaches/:id",
            get(rest::get_coach)
                .put(rest::update_coach)
                .delete(rest::delete_coach),
        );

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(state);

    info!("Starting server on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
