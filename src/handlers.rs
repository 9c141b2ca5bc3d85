// src/handlers.rs
use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{Path, Query, State},
};

use crate::errors::AppError;
use crate::filters::DatatablesParams;
use crate::pagination::{DatatablesColumn, DatatablesResponse};
use crate::services::datatable_response;
use crate::state::AppState;

async fn respond(
    app_state: &AppState,
    name: &str,
    raw_params: &HashMap<String, String>,
) -> Result<Json<DatatablesResponse>, AppError> {
    let datatable = app_state.datatable(name)?;
    let params = DatatablesParams::from_map(raw_params);
    tracing::debug!("Parametry tabeli '{}': {:?}", name, params);

    let response = datatable_response(&datatable, &app_state.db_pool, &params).await?;
    Ok(Json(response))
}

pub async fn list_rows_handler(
    State(app_state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(raw_params): Query<HashMap<String, String>>,
) -> Result<Json<DatatablesResponse>, AppError> {
    tracing::info!("Obsłużono zapytanie GET /api/datatables/{}", name);
    respond(&app_state, &name, &raw_params).await
}

/// Widżet może wysyłać parametry metodą POST (`sServerMethod`).
pub async fn list_rows_form_handler(
    State(app_state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Form(raw_params): Form<HashMap<String, String>>,
) -> Result<Json<DatatablesResponse>, AppError> {
    tracing::info!("Obsłużono zapytanie POST /api/datatables/{}", name);
    respond(&app_state, &name, &raw_params).await
}

pub async fn columns_handler(
    State(app_state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<DatatablesColumn>>, AppError> {
    let datatable = app_state.datatable(&name)?;
    Ok(Json(datatable.make_datatables_columns()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatable::tests::service;
    use sqlx::postgres::PgPoolOptions;

    fn app_state() -> Arc<AppState> {
        let db_pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/datatables_test")
            .unwrap();
        Arc::new(AppState {
            db_pool,
            datatables: HashMap::from([("library".to_string(), Arc::new(service()))]),
        })
    }

    #[tokio::test]
    async fn columns_endpoint_returns_definitions() {
        let Json(columns) = columns_handler(State(app_state()), Path("library".to_string()))
            .await
            .unwrap();
        assert_eq!(columns[0].data_prop, "Checkbox");
        assert_eq!(columns[1].data_prop, "TrackTitle");
        assert_eq!(columns.len(), 6);
    }

    #[tokio::test]
    async fn unknown_table_is_not_found() {
        let result = columns_handler(State(app_state()), Path("playlists".to_string())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = list_rows_handler(
            State(app_state()),
            Path("playlists".to_string()),
            Query(HashMap::new()),
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn unknown_table_is_not_found_for_form_requests() {
        let form = HashMap::from([
            ("sEcho".to_string(), "1".to_string()),
            ("iColumns".to_string(), "0".to_string()),
        ]);
        let result =
            list_rows_form_handler(State(app_state()), Path("playlists".to_string()), Form(form))
                .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
