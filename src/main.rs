use axum::Router;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use dotenvy::dotenv;
use tera::Tera;
use tracing::info;

use orderboard::establish_connection;
use orderboard::handlers::{events_router, meal_router, order_router, AppState};
use orderboard::reload::ReloadHub;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let mut conn = establish_connection();
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");

    let templates = Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*"))?;
    let state = AppState {
        templates,
        reload: ReloadHub::new(),
    };

    let app = Router::new()
        .merge(order_router())
        .merge(meal_router())
        .merge(events_router())
        .with_state(state);

    let address = std::env::var("HTTP_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8100".to_string());
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("orderboard listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
