// src/datatable.rs
use std::collections::{HashMap, HashSet};

use maud::html;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{Postgres, QueryBuilder};

use crate::date_helper::DateHelper;
use crate::errors::AppError;
use crate::filters::{DatatablesParams, SortDirection};
use crate::models::{ColumnInfo, ColumnType, ModelQuery, ResolvedColumn, SearchKind, TableMap};
use crate::pagination::DatatablesColumn;
use crate::search::{ColumnFilter, search_date, search_number, search_string};

pub const CHECKBOX_PROP: &str = "Checkbox";

/// Zapisane ustawienia widoku tabeli (np. ukryte kolumny).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatatableSettings {
    #[serde(default)]
    pub visibility: HashMap<String, bool>,
}

/// Opis konkretnej tabeli: jakie kolumny istnieją i jak mapują się na pola modeli.
pub trait DatatableDefinition: Send + Sync {
    fn model(&self) -> &ModelQuery;
    fn table_maps(&self) -> &[TableMap];
    fn columns(&self) -> Vec<ColumnInfo>;
    fn settings(&self) -> DatatableSettings;
    /// Kolejność kolumn wysyłana do widżetu
    fn order(&self) -> Vec<String>;

    /// Kolumny wyliczane; nie da się ich przeszukiwać.
    fn aliases(&self) -> Vec<String> {
        self.columns()
            .into_iter()
            .filter(ColumnInfo::is_alias)
            .map(|c| c.prop)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SelectedColumn {
    pub sql: String,
    pub column_type: ColumnType,
}

/// Plan zapytania wyliczony z parametrów żądania, przed wykonaniem.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub filters: Vec<ColumnFilter>,
    pub order_by: Vec<(String, SortDirection)>,
    pub limit: Option<i64>,
    pub offset: i64,
}

pub struct DatatableService {
    model: ModelQuery,
    table_maps: Vec<TableMap>,
    columns: Vec<ColumnInfo>,
    settings: DatatableSettings,
    column_keys: Vec<String>,
    order: Vec<String>,
    aliases: Vec<String>,
    selected: Vec<SelectedColumn>,
    date_helper: DateHelper,
}

impl DatatableService {
    pub fn new(
        definition: &dyn DatatableDefinition,
        date_helper: DateHelper,
    ) -> Result<Self, AppError> {
        let columns = definition.columns();
        let column_keys: Vec<String> = columns.iter().map(|c| c.prop.clone()).collect();

        let mut seen = HashSet::new();
        if let Some(duplicate) = column_keys.iter().find(|k| !seen.insert(k.as_str())) {
            return Err(AppError::InvalidDefinition(format!(
                "Kolumna '{}' zdefiniowana więcej niż raz",
                duplicate
            )));
        }

        let mut service = Self {
            model: definition.model().clone(),
            table_maps: definition.table_maps().to_vec(),
            settings: definition.settings(),
            order: definition.order(),
            aliases: definition.aliases(),
            columns,
            column_keys,
            selected: Vec::new(),
            date_helper,
        };

        if let Some(unknown) = service
            .order
            .iter()
            .find(|prop| !service.column_keys.contains(prop))
        {
            return Err(AppError::InvalidDefinition(format!(
                "Kolumna '{}' z listy kolejności nie jest zdefiniowana",
                unknown
            )));
        }

        service.selected = service
            .columns
            .iter()
            .map(|info| service.selected_column(info))
            .collect::<Result<_, _>>()?;

        tracing::debug!(
            "Zainicjalizowano tabelę dla modelu {} ({} kolumn, tabele: {:?})",
            service.model.model,
            service.column_keys.len(),
            service.table_maps.iter().map(|t| t.table.as_str()).collect::<Vec<_>>()
        );
        Ok(service)
    }

    pub fn column_keys(&self) -> &[String] {
        &self.column_keys
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn model(&self) -> &ModelQuery {
        &self.model
    }

    pub(crate) fn selected(&self) -> &[SelectedColumn] {
        &self.selected
    }

    fn column_info(&self, prop: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.prop == prop)
    }

    fn selected_column(&self, info: &ColumnInfo) -> Result<SelectedColumn, AppError> {
        match &info.expression {
            Some(expression) => Ok(SelectedColumn {
                sql: format!("({})", expression),
                column_type: info.column_type.unwrap_or(ColumnType::Varchar),
            }),
            None => {
                let resolved = self.get_column_type(&info.prop)?;
                Ok(SelectedColumn {
                    sql: resolved.column,
                    column_type: resolved.column_type,
                })
            }
        }
    }

    /// `Model.Property` albo samo `Property` (wtedy model bazowy).
    pub fn get_column_type(&self, prop: &str) -> Result<ResolvedColumn, AppError> {
        let mut segments = prop.split('.');
        let (base, property) = match (segments.next(), segments.next()) {
            (Some(base), Some(property)) => (base, property),
            _ => (self.model.model.as_str(), prop),
        };

        let table_map = self
            .table_maps
            .iter()
            .find(|t| t.model == base)
            .ok_or_else(|| {
                AppError::InvalidDefinition(format!("Brak mapy tabeli dla modelu '{}'", base))
            })?;
        let column = table_map.column(property).ok_or_else(|| {
            AppError::InvalidDefinition(format!(
                "Model '{}' nie ma właściwości '{}'",
                base, property
            ))
        })?;

        Ok(ResolvedColumn {
            column_type: column.column_type,
            column: format!("\"{}\".{}", base, column.field),
        })
    }

    fn is_visible(&self, info: &ColumnInfo) -> bool {
        self.settings
            .visibility
            .get(&info.prop)
            .copied()
            .unwrap_or(info.visible)
    }

    pub fn make_datatables_columns(&self) -> Vec<DatatablesColumn> {
        let mut datatables_columns: Vec<DatatablesColumn> = self
            .order
            .iter()
            .filter_map(|prop| self.column_info(prop))
            .map(|info| DatatablesColumn {
                title: info.title.clone(),
                data_prop: info.prop.clone(),
                sortable: info.sortable,
                searchable: info.searchable,
                visible: self.is_visible(info),
                width: info.width.clone(),
                class: info.class.clone(),
                search: info.advanced_search.clone(),
            })
            .collect();

        enhance_datatables_columns(&mut datatables_columns);
        datatables_columns
    }

    /// Warunki wyszukiwania zaawansowanego, po jednym na kolumnę.
    pub fn search_filters(&self, params: &DatatablesParams) -> Vec<ColumnFilter> {
        let mut filters = Vec::new();
        for column in &params.columns {
            let prop = column.data_prop.as_str();
            if !column.searchable
                || column.search.is_empty()
                || !self.column_keys.iter().any(|k| k == prop)
                || self.aliases.iter().any(|a| a == prop)
            {
                continue;
            }

            let info = match self.get_column_type(prop) {
                Ok(info) => info,
                Err(e) => {
                    tracing::warn!("Pomijam wyszukiwanie w kolumnie {}: {}", prop, e);
                    continue;
                }
            };
            let value = column.search.as_str();

            let filter = match info.column_type.search_kind() {
                SearchKind::DateRange => {
                    let (from, to) = params.split_range(value);
                    search_date(&info.column, from, to, &self.date_helper)
                }
                SearchKind::NumberRange => {
                    let (from, to) = params.split_range(value);
                    search_number(&info.column, from, to)
                }
                SearchKind::Substring => {
                    Some(search_string(&info.column, value, info.column_type))
                }
            };

            if let Some(filter) = filter {
                tracing::debug!("Wyszukiwanie w kolumnie {} ({})", prop, info.column_type);
                filters.push(filter);
            }
        }
        filters
    }

    pub fn order_by(&self, params: &DatatablesParams) -> Vec<(String, SortDirection)> {
        params
            .sorting
            .iter()
            .filter_map(|sort| {
                // Sortujemy tylko po kolumnach opisanych w iColumns
                let column = params.columns.get(sort.column)?;
                if !column.sortable {
                    return None;
                }
                let Some(index) = self.column_keys.iter().position(|k| *k == column.data_prop)
                else {
                    tracing::warn!(
                        "Pomijam sortowanie po nieznanej kolumnie '{}'",
                        column.data_prop
                    );
                    return None;
                };
                Some((self.selected[index].sql.clone(), sort.direction))
            })
            .collect()
    }

    pub fn plan_query(&self, params: &DatatablesParams) -> QueryPlan {
        QueryPlan {
            filters: self.search_filters(params),
            order_by: self.order_by(params),
            limit: params.limit(),
            offset: params.offset(),
        }
    }

    fn push_where(&self, builder: &mut QueryBuilder<'static, Postgres>, filters: &[ColumnFilter]) {
        let mut conditions_added = false;
        let mut append_where_or_and = |builder: &mut QueryBuilder<'static, Postgres>| {
            if !conditions_added {
                builder.push(" WHERE ");
                conditions_added = true;
            } else {
                builder.push(" AND ");
            }
        };

        if let Some(base_filter) = &self.model.filter {
            append_where_or_and(builder);
            builder.push("(").push(base_filter).push(")");
        }
        for filter in filters {
            append_where_or_and(builder);
            filter.push_to(builder);
        }
    }

    pub fn count_query(&self, filters: &[ColumnFilter]) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", self.model.from));
        self.push_where(&mut builder, filters);
        builder
    }

    pub fn data_query(&self, plan: &QueryPlan) -> QueryBuilder<'static, Postgres> {
        let select_list = self
            .selected
            .iter()
            .enumerate()
            .map(|(i, c)| format!("CAST({} AS {}) AS c{}", c.sql, c.column_type.select_cast(), i))
            .collect::<Vec<_>>()
            .join(", ");

        let mut builder =
            QueryBuilder::new(format!("SELECT {} FROM {}", select_list, self.model.from));
        self.push_where(&mut builder, &plan.filters);

        if !plan.order_by.is_empty() {
            let order = plan
                .order_by
                .iter()
                .map(|(column, direction)| format!("{} {}", column, direction.as_sql()))
                .collect::<Vec<_>>()
                .join(", ");
            builder.push(format_args!(" ORDER BY {}", order));
        }
        if let Some(limit) = plan.limit {
            builder.push(" LIMIT ").push_bind(limit);
        }
        builder.push(" OFFSET ").push_bind(plan.offset);
        builder
    }

    /// Zamienia płaskie wiersze na obiekty zagnieżdżone wg ścieżek kolumn.
    pub fn create_output(&self, records: Vec<Vec<Value>>) -> Vec<Map<String, Value>> {
        let mut output: Vec<Map<String, Value>> = records
            .into_iter()
            .map(|record| {
                let mut item = Map::new();
                for (column, value) in self.column_keys.iter().zip(record) {
                    let getters: Vec<&str> = column.split('.').collect();
                    make_array(&mut item, &getters, value);
                }
                item
            })
            .collect();

        enhance_datatables_output(&mut output);
        output
    }
}

pub fn make_array(item: &mut Map<String, Value>, getters: &[&str], value: Value) {
    match getters {
        [] => {}
        [key] => {
            item.insert(key.to_string(), value);
        }
        [key, rest @ ..] => {
            let entry = item
                .entry(key.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(nested) = entry {
                make_array(nested, rest, value);
            }
        }
    }
}

fn enhance_datatables_columns(datatables_columns: &mut Vec<DatatablesColumn>) {
    let checkbox = DatatablesColumn {
        title: String::new(),
        data_prop: CHECKBOX_PROP.to_string(),
        sortable: false,
        searchable: false,
        visible: true,
        width: "25px".to_string(),
        class: "library_checkbox".to_string(),
        search: None,
    };
    datatables_columns.insert(0, checkbox);
}

// Kolumny tylko do wyświetlania, których nie liczymy w bazie
fn enhance_datatables_output(output: &mut [Map<String, Value>]) {
    let checkbox = html! { input type="checkbox"; }.into_string();
    for row in output.iter_mut() {
        row.insert(CHECKBOX_PROP.to_string(), Value::String(checkbox.clone()));
    }
}
