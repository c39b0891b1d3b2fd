use serde_json::{Map, Value};

/// Declarative selection of fields to fetch from a model, nesting recursively
/// through relational fields. Serializes to the `specification` argument of
/// `web_search_read`: `{"f": {}}` for a plain field, `{"f": {"fields": ...}}`
/// for a relational one.
#[derive(Debug, Clone, Default)]
pub struct FieldSpec {
    entries: Vec<(String, Option<FieldSpec>)>,
}

impl FieldSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a plain field.
    pub fn field(mut self, name: &str) -> Self {
        self.entries.push((name.to_string(), None));
        self
    }

    /// Select a relational field with its own sub-field spec.
    pub fn related(mut self, name: &str, sub: FieldSpec) -> Self {
        self.entries.push((name.to_string(), Some(sub)));
        self
    }

    /// Select a relational field expanded to just its display label. This is
    /// the common case for reference columns.
    pub fn label(self, name: &str) -> Self {
        self.related(name, FieldSpec::new().field("display_name"))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (name, sub) in &self.entries {
            let entry = match sub {
                Some(sub) => {
                    let mut wrapper = Map::new();
                    wrapper.insert("fields".to_string(), sub.to_json());
                    Value::Object(wrapper)
                }
                None => Value::Object(Map::new()),
            };
            map.insert(name.clone(), entry);
        }
        Value::Object(map)
    }
}
