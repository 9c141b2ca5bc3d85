// src/pagination.rs
use serde::Serialize;
use serde_json::{Map, Value};

/// Definicja kolumny w formacie oczekiwanym przez widżet.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DatatablesColumn {
    #[serde(rename = "sTitle")]
    pub title: String,
    #[serde(rename = "mDataProp")]
    pub data_prop: String,
    #[serde(rename = "bSortable")]
    pub sortable: bool,
    #[serde(rename = "bSearchable")]
    pub searchable: bool,
    #[serde(rename = "bVisible")]
    pub visible: bool,
    #[serde(rename = "sWidth")]
    pub width: String,
    #[serde(rename = "sClass")]
    pub class: String,
    pub search: Option<Value>,
}

/// Wynik zapytania: liczniki i wiersze (wartości w kolejności kolumn).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatatablePage {
    pub total_count: i64,
    pub count: i64,
    pub media: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
pub struct DatatablesResponse {
    #[serde(rename = "sEcho")]
    pub echo: Option<i64>,
    #[serde(rename = "iTotalRecords")]
    pub total_records: i64,
    #[serde(rename = "iTotalDisplayRecords")]
    pub total_display_records: i64,
    #[serde(rename = "aaData")]
    pub data: Vec<Map<String, Value>>,
}
