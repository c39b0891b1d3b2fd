use crate::dataset::{ColumnRule, DatasetSpec};
use serde_json::Value;
use sheetfeed_odoo::FieldValue;

/// The flattened output of one run: a fixed header plus one row per child
/// record. Built fresh per run and written wholesale to the destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header row followed by data rows, as sent to the destination.
    pub fn to_values(&self) -> Vec<Vec<Value>> {
        let mut values = Vec::with_capacity(self.rows.len() + 1);
        values.push(
            self.headers
                .iter()
                .map(|h| Value::String(h.clone()))
                .collect(),
        );
        values.extend(self.rows.iter().cloned());
        values
    }
}

/// Expands each parent's child list into one flat row per child, in
/// (parent order, child order). Every row has exactly one cell per schema
/// column regardless of which source fields were present.
pub fn flatten_records(records: &[FieldValue], spec: &DatasetSpec) -> Table {
    let headers = spec
        .columns
        .iter()
        .map(|column| column.header.to_string())
        .collect();

    let mut rows = Vec::new();
    for parent in records {
        let children = parent
            .get(spec.child_field)
            .map(FieldValue::items)
            .unwrap_or(&[]);
        for child in children {
            rows.push(
                spec.columns
                    .iter()
                    .map(|column| cell(parent, child, &column.rule))
                    .collect(),
            );
        }
    }

    Table { headers, rows }
}

fn cell(parent: &FieldValue, child: &FieldValue, rule: &ColumnRule) -> Value {
    match rule {
        ColumnRule::Child(field) => Value::String(child.display_sub(field)),
        ColumnRule::Parent(field) => Value::String(parent.display_sub(field)),
        ColumnRule::ChildNumber(field) => child
            .get(field)
            .and_then(FieldValue::as_number)
            .map(|n| Value::Number(n.clone()))
            .unwrap_or_else(|| Value::Number(0.into())),
        ColumnRule::ChildCodeName { field, code, name } => {
            let composite = match child.get(field) {
                Some(value) if !value.is_missing() => {
                    format!("[{}] {}", value.display_sub(code), value.display_sub(name))
                }
                _ => String::new(),
            };
            Value::String(composite)
        }
    }
}
