use std::sync::Arc;

use anyhow::Context;
use resolver::WikipediaSource;
use storage::Database;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod middleware;
mod routes;
mod state;

use config::Config;
use features::{participants, picks, seasons};
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        seasons::handlers::list_seasons,
        seasons::handlers::get_season,
        seasons::handlers::get_leaderboard,
        seasons::handlers::get_first_blood,
        seasons::handlers::get_picks,
        seasons::handlers::get_stats,
        picks::handlers::create_pick,
        picks::handlers::delete_pick,
        picks::handlers::resolve_pick,
        picks::handlers::mark_death,
        picks::handlers::unmark_death,
        picks::handlers::update_date,
        picks::handlers::import_picks,
        participants::handlers::list_participants,
        participants::handlers::participant_picks,
    ),
    components(
        schemas(
            storage::dto::pick::PickEntry,
            storage::dto::pick::PickResponse,
            storage::dto::pick::CreatePickRequest,
            storage::dto::pick::MarkDeathRequest,
            storage::dto::pick::DateKind,
            storage::dto::pick::UpdateDateRequest,
            storage::dto::pick::ImportPicksRequest,
            storage::dto::pick::ImportSummary,
            storage::dto::season::LeaderboardEntry,
            storage::dto::season::FirstBloodEntry,
            storage::dto::season::SeasonSummary,
            storage::dto::season::PickAgeInfo,
            storage::dto::season::ParticipantStats,
            storage::dto::participant::ParticipantResponse,
            storage::models::Pick,
            storage::models::PickStatus,
            storage::models::Season,
        )
    ),
    tags(
        (name = "seasons", description = "Season standings and first blood"),
        (name = "picks", description = "Drafting, resolving and correcting picks"),
        (name = "participants", description = "Participants and their picks"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Basic)
                        .build(),
                ),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting Deathpool API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!("Opening database at: {}", config.database_url);
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let source = WikipediaSource::new(config.wikipedia.clone())
        .context("Failed to build Wikipedia client")?;
    let state = AppState::new(db, Arc::new(source));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    axum::serve(listener, app).await?;

    Ok(())
}
