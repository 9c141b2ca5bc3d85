// src/state.rs

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::PgPool;

use crate::config::DatatablesConfig;
use crate::datatable::DatatableService;
use crate::date_helper::DateHelper;
use crate::errors::AppError;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub datatables: HashMap<String, Arc<DatatableService>>,
}

impl AppState {
    pub fn new(
        db_pool: PgPool,
        config: &DatatablesConfig,
        date_helper: DateHelper,
    ) -> Result<Self, AppError> {
        let mut datatables = HashMap::new();
        for definition in &config.datatables {
            let service = DatatableService::new(definition, date_helper)?;
            if datatables
                .insert(definition.name.clone(), Arc::new(service))
                .is_some()
            {
                return Err(AppError::InvalidDefinition(format!(
                    "Tabela '{}' zdefiniowana więcej niż raz",
                    definition.name
                )));
            }
            tracing::info!("Zarejestrowano tabelę '{}'", definition.name);
        }
        Ok(Self {
            db_pool,
            datatables,
        })
    }

    pub fn datatable(&self, name: &str) -> Result<Arc<DatatableService>, AppError> {
        self.datatables
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Nie znaleziono tabeli '{}'", name)))
    }
}
