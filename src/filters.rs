// src/filters.rs
use std::collections::HashMap;

/// Kierunek sortowania przesłany przez widżet w `sSortDir_i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Ustawienia jednej kolumny widżetu (`mDataProp_i`, `bSearchable_i`...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnParams {
    pub data_prop: String,
    pub searchable: bool,
    pub search: String,
    pub sortable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortParams {
    pub column: usize,
    pub direction: SortDirection,
}

/// Parametry żądania w formacie "server-side processing" widżetu.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatatablesParams {
    pub echo: Option<i64>,
    pub columns: Vec<ColumnParams>,
    pub range_separator: Option<String>,
    pub sorting: Vec<SortParams>,
    pub display_start: i64,
    pub display_length: i64,
}

// Liczby czytamy "po ludzku": początkowe cyfry, reszta ignorowana, brak = 0
fn int_value(raw: Option<&String>) -> i64 {
    let Some(raw) = raw else { return 0 };
    let trimmed = raw.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map_or(0, |n| sign * n)
}

fn flag_value(raw: Option<&String>) -> bool {
    raw.is_some_and(|v| v == "true")
}

impl DatatablesParams {
    pub fn from_map(params: &HashMap<String, String>) -> Self {
        // Każda kolumna i każde sortowanie to co najmniej jeden klucz w żądaniu
        let column_count = (int_value(params.get("iColumns")).max(0) as usize).min(params.len());
        let columns = (0..column_count)
            .map(|i| ColumnParams {
                data_prop: params
                    .get(&format!("mDataProp_{}", i))
                    .cloned()
                    .unwrap_or_default(),
                searchable: flag_value(params.get(&format!("bSearchable_{}", i))),
                search: params
                    .get(&format!("sSearch_{}", i))
                    .cloned()
                    .unwrap_or_default(),
                sortable: flag_value(params.get(&format!("bSortable_{}", i))),
            })
            .collect();

        let sorting_count =
            (int_value(params.get("iSortingCols")).max(0) as usize).min(params.len());
        let sorting = (0..sorting_count)
            .filter_map(|i| {
                let column = int_value(params.get(&format!("iSortCol_{}", i)));
                if column < 0 {
                    return None;
                }
                let direction = match params.get(&format!("sSortDir_{}", i)).map(String::as_str) {
                    Some("asc") => SortDirection::Asc,
                    _ => SortDirection::Desc,
                };
                Some(SortParams {
                    column: column as usize,
                    direction,
                })
            })
            .collect();

        Self {
            echo: params.get("sEcho").map(|_| int_value(params.get("sEcho"))),
            columns,
            range_separator: params
                .get("sRangeSeparator")
                .filter(|s| !s.is_empty())
                .cloned(),
            sorting,
            display_start: int_value(params.get("iDisplayStart")),
            display_length: int_value(params.get("iDisplayLength")),
        }
    }

    /// `None` gdy widżet prosi o wszystkie wiersze (`-1`) albo nie podał limitu.
    pub fn limit(&self) -> Option<i64> {
        (self.display_length > 0).then_some(self.display_length)
    }

    pub fn offset(&self) -> i64 {
        self.display_start.max(0)
    }

    pub fn split_range<'a>(&self, value: &'a str) -> (Option<&'a str>, Option<&'a str>) {
        match self.range_separator.as_deref() {
            Some(separator) => {
                let mut parts = value.split(separator);
                (parts.next(), parts.next())
            }
            None => (Some(value), None),
        }
    }
}
