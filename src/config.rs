// src/config.rs
use std::env;
use std::net::SocketAddr;
use std::path::Path;

use chrono::FixedOffset;
use serde::Deserialize;
use validator::Validate;

use crate::datatable::{DatatableDefinition, DatatableSettings};
use crate::errors::AppError;
use crate::models::{ColumnInfo, ModelQuery, TableMap};

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_DATATABLES_CONFIG: &str = "datatables.json";
const DEFAULT_USER_UTC_OFFSET: &str = "+00:00";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub server_addr: SocketAddr,
    pub datatables_config: String,
    pub user_utc_offset: FixedOffset,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("DATABASE_URL musi być ustawione".to_string()))?;

        let max_connections = env_or(
            "DATABASE_MAX_CONNECTIONS",
            &DEFAULT_MAX_CONNECTIONS.to_string(),
        )
        .parse::<u32>()
        .map_err(|_| {
            AppError::Config("DATABASE_MAX_CONNECTIONS musi być liczbą całkowitą".to_string())
        })?;

        let server_addr = env_or("SERVER_ADDR", DEFAULT_SERVER_ADDR)
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("Nieprawidłowy SERVER_ADDR: {}", e)))?;

        let user_utc_offset = parse_utc_offset(&env_or("USER_UTC_OFFSET", DEFAULT_USER_UTC_OFFSET))?;

        Ok(Self {
            database_url,
            max_connections,
            server_addr,
            datatables_config: env_or("DATATABLES_CONFIG", DEFAULT_DATATABLES_CONFIG),
            user_utc_offset,
        })
    }
}

/// Przesunięcie w formacie `+HH:MM` / `-HH:MM`.
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset, AppError> {
    value
        .trim()
        .parse::<FixedOffset>()
        .map_err(|e| AppError::Config(format!("Nieprawidłowy USER_UTC_OFFSET '{}': {}", value, e)))
}

/// Definicja tabeli wczytana z pliku konfiguracyjnego.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConfiguredDatatable {
    #[validate(length(min = 1, message = "Nazwa tabeli jest wymagana"))]
    pub name: String,
    #[validate(nested)]
    pub model: ModelQuery,
    #[validate(length(min = 1, message = "Wymagana jest co najmniej jedna mapa tabeli"), nested)]
    pub tables: Vec<TableMap>,
    #[validate(length(min = 1, message = "Wymagana jest co najmniej jedna kolumna"), nested)]
    pub columns: Vec<ColumnInfo>,
    #[serde(default)]
    pub order: Option<Vec<String>>,
    #[serde(default)]
    pub settings: DatatableSettings,
}

impl DatatableDefinition for ConfiguredDatatable {
    fn model(&self) -> &ModelQuery {
        &self.model
    }

    fn table_maps(&self) -> &[TableMap] {
        &self.tables
    }

    fn columns(&self) -> Vec<ColumnInfo> {
        self.columns.clone()
    }

    fn settings(&self) -> DatatableSettings {
        self.settings.clone()
    }

    fn order(&self) -> Vec<String> {
        self.order
            .clone()
            .unwrap_or_else(|| self.columns.iter().map(|c| c.prop.clone()).collect())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DatatablesConfig {
    #[validate(nested)]
    pub datatables: Vec<ConfiguredDatatable>,
}

impl DatatablesConfig {
    pub fn from_json(content: &str) -> Result<Self, AppError> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| AppError::Config(format!("Nieprawidłowy plik definicji tabel: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::Config(format!("Nie można wczytać pliku {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "datatables": [
            {
                "name": "library",
                "model": {
                    "model": "AudioFile",
                    "from": "cc_files AS \"AudioFile\"",
                    "filter": "\"AudioFile\".file_exists = true"
                },
                "tables": [
                    {
                        "model": "AudioFile",
                        "table": "cc_files",
                        "columns": [
                            { "property": "TrackTitle", "field": "track_title", "column_type": "VARCHAR" },
                            { "property": "Length", "field": "length", "column_type": "TIME" }
                        ]
                    }
                ],
                "columns": [
                    { "prop": "TrackTitle", "title": "Title", "width": "170px", "class": "library_title" },
                    { "prop": "Length", "title": "Length", "searchable": false }
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_configured_datatables() {
        let config = DatatablesConfig::from_json(SAMPLE).unwrap();
        assert_eq!(config.datatables.len(), 1);

        let table = &config.datatables[0];
        assert_eq!(table.name, "library");
        assert_eq!(table.order(), vec!["TrackTitle".to_string(), "Length".to_string()]);
        assert!(table.aliases().is_empty());
        assert!(!table.columns[1].searchable);
        assert!(table.settings().visibility.is_empty());
    }

    #[test]
    fn rejects_empty_columns() {
        let mut value: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
        value["datatables"][0]["columns"] = serde_json::json!([]);
        assert!(matches!(
            DatatablesConfig::from_json(&value.to_string()),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn shipped_definitions_build_services() {
        use crate::datatable::DatatableService;
        use crate::date_helper::DateHelper;

        let config = DatatablesConfig::from_json(include_str!("../datatables.json")).unwrap();
        for table in &config.datatables {
            let service = DatatableService::new(table, DateHelper::default()).unwrap();
            assert_eq!(service.aliases(), ["OwnerName"]);
            assert_eq!(service.make_datatables_columns().len(), table.columns.len() + 1);
        }
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            DatatablesConfig::from_json("{ \"datatables\": "),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn parses_offsets() {
        assert_eq!(
            parse_utc_offset("+02:00").unwrap(),
            FixedOffset::east_opt(7200).unwrap()
        );
        assert_eq!(
            parse_utc_offset("-05:30").unwrap(),
            FixedOffset::west_opt(5 * 3600 + 1800).unwrap()
        );
        assert!(parse_utc_offset("Europe/Warsaw").is_err());
    }
}
