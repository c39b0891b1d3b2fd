use serde_json::Value;

/// One field of a fetched record, decoded from Odoo's wire encoding.
///
/// Odoo overloads JSON shapes heavily: a relational field arrives either as a
/// nested object (when sub-fields were requested) or as an `[id, label]`
/// pair, and any absent value is sent as literal `false`. Decoding happens
/// once per record at the API boundary so downstream code never re-sniffs
/// raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// `null` or the `false` absent sentinel.
    Missing,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    /// Two-element `[id, label]` relational reference.
    Reference { id: i64, label: String },
    /// Nested mapping; entry order follows the wire order.
    Record(Vec<(String, FieldValue)>),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn from_json(value: Value) -> FieldValue {
        match value {
            Value::Null => FieldValue::Missing,
            // Odoo sends `false` for any absent field value.
            Value::Bool(false) => FieldValue::Missing,
            Value::Bool(true) => FieldValue::Bool(true),
            Value::Number(n) => FieldValue::Number(n),
            Value::String(s) => FieldValue::Text(s),
            Value::Array(items) => match reference_parts(&items) {
                Some((id, label)) => FieldValue::Reference { id, label },
                None => FieldValue::List(items.into_iter().map(FieldValue::from_json).collect()),
            },
            Value::Object(map) => FieldValue::Record(
                map.into_iter()
                    .map(|(key, value)| (key, FieldValue::from_json(value)))
                    .collect(),
            ),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// Looks up an entry of a `Record`; `None` for every other variant.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        match self {
            FieldValue::Record(entries) => entries
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&serde_json::Number> {
        match self {
            FieldValue::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn items(&self) -> &[FieldValue] {
        match self {
            FieldValue::List(items) => items,
            _ => &[],
        }
    }

    /// Canonical display string. Total: every variant renders to a string.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Missing => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Reference { label, .. } => label.clone(),
            FieldValue::Record(entries) => {
                if let Some(label) = self.get("display_name") {
                    return label.display();
                }
                entries
                    .iter()
                    .map(|(_, value)| value.display())
                    .collect::<Vec<_>>()
                    .join(" ")
            }
            FieldValue::List(items) => items
                .iter()
                .map(FieldValue::display)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Display of one sub-field of a `Record` ("" when absent). Other
    /// variants ignore the sub-field name and render themselves.
    pub fn display_sub(&self, name: &str) -> String {
        match self {
            FieldValue::Record(_) => self.get(name).map(FieldValue::display).unwrap_or_default(),
            _ => self.display(),
        }
    }
}

fn reference_parts(items: &[Value]) -> Option<(i64, String)> {
    if items.len() != 2 {
        return None;
    }
    let id = items[0].as_i64()?;
    let label = match &items[1] {
        Value::String(s) => s.clone(),
        Value::Null | Value::Bool(false) => String::new(),
        _ => return None,
    };
    Some((id, label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> FieldValue {
        FieldValue::from_json(value)
    }

    #[test]
    fn record_with_display_name_renders_the_label() {
        let value = decode(json!({"id": 7, "display_name": "Acme Corp"}));
        assert_eq!(value.display(), "Acme Corp");
    }

    #[test]
    fn record_without_display_name_joins_values_in_order() {
        let value = decode(json!({"a": 1, "b": 2}));
        assert_eq!(value.display(), "1 2");
    }

    #[test]
    fn reference_pair_renders_the_label() {
        let value = decode(json!([7, "Acme"]));
        assert_eq!(
            value,
            FieldValue::Reference {
                id: 7,
                label: "Acme".to_string()
            }
        );
        assert_eq!(value.display(), "Acme");
    }

    #[test]
    fn reference_pair_with_falsy_label_renders_empty() {
        assert_eq!(decode(json!([7, ""])).display(), "");
        assert_eq!(decode(json!([7, false])).display(), "");
    }

    #[test]
    fn absent_sentinels_render_empty() {
        assert_eq!(decode(json!(false)).display(), "");
        assert_eq!(decode(json!(null)).display(), "");
        assert!(decode(json!(false)).is_missing());
    }

    #[test]
    fn numbers_render_without_locale_formatting() {
        assert_eq!(decode(json!(1250)).display(), "1250");
        assert_eq!(decode(json!(12.5)).display(), "12.5");
        assert_eq!(decode(json!(-3)).display(), "-3");
    }

    #[test]
    fn plain_strings_and_true_render_as_themselves() {
        assert_eq!(decode(json!("PO00042")).display(), "PO00042");
        assert_eq!(decode(json!(true)).display(), "true");
    }

    #[test]
    fn non_pair_arrays_decode_as_lists() {
        let value = decode(json!(["a", "b", "c"]));
        assert_eq!(value.display(), "a b c");
        assert_eq!(value.items().len(), 3);
    }

    #[test]
    fn sub_field_lookup_recurses_into_records() {
        let value = decode(json!({"default_code": "HW-1", "name": "Widget"}));
        assert_eq!(value.display_sub("default_code"), "HW-1");
        assert_eq!(value.display_sub("name"), "Widget");
        assert_eq!(value.display_sub("nope"), "");
    }

    #[test]
    fn sub_field_lookup_on_non_record_falls_back_to_display() {
        assert_eq!(decode(json!([7, "Acme"])).display_sub("name"), "Acme");
        assert_eq!(decode(json!(false)).display_sub("name"), "");
    }
}
