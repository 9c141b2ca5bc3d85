// src/main.rs

use std::sync::Arc;

use axum::{Router, routing::get};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Deklaracje modułów
mod config; // dla src/config.rs
mod datatable; // dla src/datatable.rs
mod date_helper; // dla src/date_helper.rs
mod errors; // dla src/errors.rs
mod filters; // dla src/filters.rs
mod handlers; // dla src/handlers.rs
mod models; // dla src/models.rs
mod pagination; // dla src/pagination.rs
mod search; // dla src/search.rs
mod services; // dla src/services.rs
mod state; // dla src/state.rs

// Importy z własnych modułów
use crate::config::{AppConfig, DatatablesConfig};
use crate::date_helper::DateHelper;
use crate::handlers::*;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Inicjalizacja systemu logowania (tracing)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "datatables_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Inicjalizacja serwera...");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("{}", err);
            std::process::exit(1);
        }
    };

    // --- Połączenie z bazą danych ---
    let pool = match PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("Pomyślnie połączono z bazą danych");
            pool
        }
        Err(err) => {
            tracing::error!("Nie można połączyć z bazą danych: {:?}", err);
            std::process::exit(1);
        }
    };

    // --- Definicje tabel ---
    let datatables_config = match DatatablesConfig::load(&config.datatables_config).await {
        Ok(datatables_config) => datatables_config,
        Err(err) => {
            tracing::error!("{}", err);
            std::process::exit(1);
        }
    };

    let date_helper = DateHelper::new(config.user_utc_offset);
    tracing::info!("Strefa czasowa użytkownika: UTC{}", date_helper.user_offset());

    let app_state = match AppState::new(pool, &datatables_config, date_helper) {
        Ok(app_state) => Arc::new(app_state),
        Err(err) => {
            tracing::error!("{}", err);
            std::process::exit(1);
        }
    };

    // Definicja routingu aplikacji
    let app = Router::new()
        .route(
            "/api/datatables/{name}",
            get(list_rows_handler).post(list_rows_form_handler),
        )
        .route("/api/datatables/{name}/columns", get(columns_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    tracing::info!("Serwer nasłuchuje na {}", config.server_addr);

    // Utworzenie listenera TCP
    let listener = match TcpListener::bind(config.server_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Nie można powiązać adresu {}: {}", config.server_addr, e);
            return;
        }
    };

    // Uruchomienie serwera Axum
    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        tracing::error!("Błąd serwera: {}", e);
    }
}
