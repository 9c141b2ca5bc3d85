// src/services.rs

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::datatable::{DatatableService, SelectedColumn};
use crate::errors::AppError;
use crate::filters::DatatablesParams;
use crate::models::ColumnType;
use crate::pagination::{DatatablePage, DatatablesResponse};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl DatatableService {
    /// Wykonuje zapytania dla jednej strony tabeli:
    /// 1. licznik wszystkich rekordów (bez wyszukiwania),
    /// 2. licznik po zastosowaniu wyszukiwania zaawansowanego,
    /// 3. dane z sortowaniem i paginacją.
    pub async fn build_query(
        &self,
        pool: &PgPool,
        params: &DatatablesParams,
    ) -> Result<DatatablePage, AppError> {
        let total_count = self
            .count_query(&[])
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await?;

        let plan = self.plan_query(params);

        let count = if plan.filters.is_empty() {
            total_count
        } else {
            self.count_query(&plan.filters)
                .build_query_scalar::<i64>()
                .fetch_one(pool)
                .await?
        };

        let mut data_query = self.data_query(&plan);
        tracing::debug!("Zapytanie o dane: {}", data_query.sql());
        let rows = data_query.build().fetch_all(pool).await?;

        let media = rows
            .iter()
            .map(|row| decode_row(row, self.selected()))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            "Model {} ({} kolumn, {} wyliczanych): {} rekordów, {} po filtrach, zwrócono {}",
            self.model().model,
            self.column_keys().len(),
            self.aliases().len(),
            total_count,
            count,
            media.len()
        );

        Ok(DatatablePage {
            total_count,
            count,
            media,
        })
    }
}

fn decode_row(row: &PgRow, columns: &[SelectedColumn]) -> Result<Vec<Value>, AppError> {
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| decode_value(row, i, column.column_type))
        .collect()
}

fn decode_value(row: &PgRow, index: usize, column_type: ColumnType) -> Result<Value, AppError> {
    let value = match column_type {
        ColumnType::Boolean => row.try_get::<Option<bool>, _>(index)?.map(Value::from),
        ColumnType::TinyInt | ColumnType::SmallInt | ColumnType::Integer | ColumnType::BigInt => {
            row.try_get::<Option<i64>, _>(index)?.map(Value::from)
        }
        ColumnType::Real
        | ColumnType::Float
        | ColumnType::Double
        | ColumnType::Numeric
        | ColumnType::Decimal => row.try_get::<Option<f64>, _>(index)?.map(Value::from),
        ColumnType::Date => row
            .try_get::<Option<NaiveDate>, _>(index)?
            .map(|d| Value::String(d.format(DATE_FORMAT).to_string())),
        ColumnType::Timestamp => row
            .try_get::<Option<NaiveDateTime>, _>(index)?
            .map(|ts| Value::String(ts.format(TIMESTAMP_FORMAT).to_string())),
        ColumnType::Char | ColumnType::Varchar | ColumnType::LongVarchar | ColumnType::Time => {
            row.try_get::<Option<String>, _>(index)?.map(Value::String)
        }
    };
    Ok(value.unwrap_or(Value::Null))
}

/// Pełna odpowiedź dla widżetu: liczniki, wiersze i echo żądania.
pub async fn datatable_response(
    service: &DatatableService,
    pool: &PgPool,
    params: &DatatablesParams,
) -> Result<DatatablesResponse, AppError> {
    let page = service.build_query(pool, params).await?;

    Ok(DatatablesResponse {
        echo: params.echo,
        total_records: page.total_count,
        total_display_records: page.count,
        data: service.create_output(page.media),
    })
}
