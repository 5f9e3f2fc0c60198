//! Accumulates `WHERE` conditions together with their positional
//! parameters.

use rusqlite::types::ToSql;

#[derive(Default)]
pub(crate) struct SqlFilter {
    conditions: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
}

impl SqlFilter {
    /// Binds a value and returns its `?N` placeholder.
    pub fn bind<V: ToSql + 'static>(&mut self, value: V) -> String {
        self.params.push(Box::new(value));
        format!("?{}", self.params.len())
    }

    pub fn push(&mut self, condition: String) {
        self.conditions.push(condition);
    }

    /// `column = value`
    pub fn eq<V: ToSql + 'static>(&mut self, column: &str, value: V) {
        let placeholder = self.bind(value);
        self.push(format!("{} = {}", column, placeholder));
    }

    /// `column >= value`
    pub fn ge<V: ToSql + 'static>(&mut self, column: &str, value: V) {
        let placeholder = self.bind(value);
        self.push(format!("{} >= {}", column, placeholder));
    }

    /// `column IN (values...)`. Does nothing for an empty slice.
    ///
    /// The set is bound once as a JSON array and expanded with `json_each`,
    /// so its size is not capped by SQLite's parameter limit.
    pub fn in_list(&mut self, column: &str, values: &[i64]) {
        if values.is_empty() {
            return;
        }
        let placeholder = self.bind(serde_json::Value::from(values.to_vec()).to_string());
        self.push(format!(
            "{} IN (SELECT value FROM json_each({}))",
            column, placeholder
        ));
    }

    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn params(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}
