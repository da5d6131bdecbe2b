//! Column descriptors and per-cell value derivation

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::constants::table::{ACTIONS_COLUMN, MISSING_VALUE};

/// How a column obtains its value from a row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// `row[key]`
    #[default]
    Plain,
    /// Walk a dot-separated path through nested objects
    RelationLookup,
    /// Aggregate over a nested collection
    Computed,
    /// No value, the renderer draws view/edit/delete triggers
    ActionSet,
}

/// Aggregations available to computed columns
///
/// Stored by name; names that are not recognised survive as `Unknown` and
/// display as the missing-value sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Computation {
    /// Number of entries in `asesores`
    CountAdvisors,
    /// Number of entries in `contratos`
    CountContracts,
    /// Sum of `contratos[].valor`, non-numeric entries count as 0
    SumValue,
    /// Number of `contratos` whose `estado` is `activo`
    CountActive,
    Unknown(String),
}

impl Computation {
    pub fn as_str(&self) -> &str {
        match self {
            Computation::CountAdvisors => "count_asesores",
            Computation::CountContracts => "count_contratos",
            Computation::SumValue => "sum_valor",
            Computation::CountActive => "count_activos",
            Computation::Unknown(name) => name,
        }
    }

    fn evaluate(&self, row: &Value) -> Value {
        match self {
            Computation::CountAdvisors => Value::from(collection(row, "asesores").len()),
            Computation::CountContracts => Value::from(collection(row, "contratos").len()),
            Computation::SumValue => {
                let total: f64 = collection(row, "contratos")
                    .iter()
                    .map(|contract| contract.get("valor").map(lenient_number).unwrap_or(0.0))
                    .sum();
                serde_json::Number::from_f64(total)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::from(0))
            }
            Computation::CountActive => Value::from(
                collection(row, "contratos")
                    .iter()
                    .filter(|contract| contract.get("estado").and_then(Value::as_str) == Some("activo"))
                    .count(),
            ),
            Computation::Unknown(name) => {
                debug!(computation = %name, "Unknown computation, showing placeholder");
                missing()
            }
        }
    }
}

impl From<String> for Computation {
    fn from(name: String) -> Self {
        match name.as_str() {
            "count_asesores" => Computation::CountAdvisors,
            "count_contratos" => Computation::CountContracts,
            "sum_valor" => Computation::SumValue,
            "count_activos" => Computation::CountActive,
            _ => Computation::Unknown(name),
        }
    }
}

impl From<Computation> for String {
    fn from(computation: Computation) -> Self {
        computation.as_str().to_string()
    }
}

/// A single table column
///
/// Order within the owning `Vec` is the display order. Keys are unique per table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub key: String,
    pub label: String,
    pub selected: bool,
    #[serde(default)]
    pub fixed: bool,
    #[serde(default)]
    pub kind: ColumnKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computation: Option<Computation>,
}

impl ColumnDescriptor {
    /// Selected, movable plain column
    pub fn plain(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            selected: true,
            fixed: false,
            kind: ColumnKind::Plain,
            relation_path: None,
            computation: None,
        }
    }

    pub fn relation(key: &str, label: &str, path: &str) -> Self {
        Self {
            kind: ColumnKind::RelationLookup,
            relation_path: Some(path.to_string()),
            ..Self::plain(key, label)
        }
    }

    pub fn computed(key: &str, label: &str, computation: Computation) -> Self {
        Self {
            kind: ColumnKind::Computed,
            computation: Some(computation),
            ..Self::plain(key, label)
        }
    }

    /// The view/edit/delete column, always fixed
    pub fn actions(label: &str) -> Self {
        Self {
            fixed: true,
            kind: ColumnKind::ActionSet,
            ..Self::plain(ACTIONS_COLUMN, label)
        }
    }

    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.selected = false;
        self
    }

    /// Fixed columns are shown whatever their `selected` flag says
    pub fn is_visible(&self) -> bool {
        self.selected || self.fixed
    }

    pub fn is_action_column(&self) -> bool {
        self.kind == ColumnKind::ActionSet || self.key == ACTIONS_COLUMN
    }
}

/// Columns to render, in descriptor order
pub fn visible_columns(columns: &[ColumnDescriptor]) -> Vec<&ColumnDescriptor> {
    columns.iter().filter(|c| c.is_visible()).collect()
}

/// Derive the value a cell displays
///
/// Never fails: anything that cannot be resolved yields `"-"`.
pub fn display_value(row: &Value, column: &ColumnDescriptor) -> Value {
    if column.is_action_column() {
        return Value::String(String::new());
    }

    match column.kind {
        ColumnKind::RelationLookup => match &column.relation_path {
            Some(path) => lookup_path(row, path),
            None => plain_value(row, &column.key),
        },
        ColumnKind::Computed => match &column.computation {
            Some(computation) => computation.evaluate(row),
            None => missing(),
        },
        ColumnKind::Plain | ColumnKind::ActionSet => plain_value(row, &column.key),
    }
}

/// Render a derived value as cell text
///
/// Arrays are joined with `", "`, null shows the placeholder.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => MISSING_VALUE.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(format_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Numeric reading of a value, 0 when it has none
///
/// Strings are read up to the end of their leading number, so `"10.5 USD"`
/// counts as 10.5.
pub fn lenient_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(s),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}

fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |mut at: usize| {
        while bytes.get(at).is_some_and(u8::is_ascii_digit) {
            at += 1;
        }
        at
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        digits += frac_end - end - 1;
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }

    // An exponent only counts when digits follow it
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_end = digits_from(end + 1 + sign);
        if exp_end > end + 1 + sign {
            end = exp_end;
        }
    }

    text[..end].parse().ok()
}

fn plain_value(row: &Value, key: &str) -> Value {
    match row.get(key) {
        Some(Value::Null) | None => missing(),
        Some(value) => value.clone(),
    }
}

fn lookup_path(row: &Value, path: &str) -> Value {
    let mut current = row;
    for segment in path.split('.') {
        match current.get(segment) {
            Some(Value::Null) | None => return missing(),
            Some(next) => current = next,
        }
    }
    current.clone()
}

fn collection<'a>(row: &'a Value, key: &str) -> &'a [Value] {
    row.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn missing() -> Value {
    Value::String(MISSING_VALUE.to_string())
}
