//! Schema template and row building for model inference.
//!
//! The template is the single reference row the model was trained against.
//! Every submission starts from a fresh copy of it and overwrites only the
//! columns the form collected, so the row handed to the model always has the
//! exact column set and order the model expects.

use crate::error::ArtifactError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A single cell of the feature table.
///
/// The variant of a template default implicitly defines the value kind the
/// column accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FeatureValue {
    /// Numeric view of the value, `None` for text.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            FeatureValue::Integer(v) => Some(*v as f32),
            FeatureValue::Float(v) => Some(*v as f32),
            FeatureValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Integer(v) => write!(f, "{}", v),
            FeatureValue::Float(v) => write!(f, "{}", v),
            FeatureValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for FeatureValue {
    fn from(v: i64) -> Self {
        FeatureValue::Integer(v)
    }
}

impl From<u8> for FeatureValue {
    fn from(v: u8) -> Self {
        FeatureValue::Integer(v as i64)
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Float(v)
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        FeatureValue::Text(v.to_string())
    }
}

/// pandas `DataFrame.to_json(orient="split")` layout.
#[derive(Debug, Deserialize)]
struct SplitFrame {
    columns: Vec<String>,
    data: Vec<Vec<FeatureValue>>,
}

/// Immutable reference row defining the model's input schema.
#[derive(Debug, Clone)]
pub struct SchemaTemplate {
    columns: Arc<[String]>,
    defaults: Vec<FeatureValue>,
    index: HashMap<String, usize>,
}

impl SchemaTemplate {
    /// Build a template from ordered `(column, default)` pairs.
    ///
    /// Column names must be unique and there must be at least one column.
    pub fn new<I, S>(columns: I) -> Result<Self, ArtifactError>
    where
        I: IntoIterator<Item = (S, FeatureValue)>,
        S: Into<String>,
    {
        let (names, defaults): (Vec<String>, Vec<FeatureValue>) = columns
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .unzip();

        if names.is_empty() {
            return Err(ArtifactError::InvalidSchema(
                "template has no columns".to_string(),
            ));
        }

        let mut index = HashMap::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            if index.insert(name.clone(), position).is_some() {
                return Err(ArtifactError::InvalidSchema(format!(
                    "duplicate column {:?}",
                    name
                )));
            }
        }

        Ok(Self {
            columns: names.into(),
            defaults,
            index,
        })
    }

    /// Parse a split-orient JSON frame holding exactly one row.
    pub fn from_split_json(json: &str) -> Result<Self, ArtifactError> {
        let frame: SplitFrame = serde_json::from_str(json)?;

        let mut rows = frame.data.into_iter();
        let row = match (rows.next(), rows.next()) {
            (Some(row), None) => row,
            (None, _) => {
                return Err(ArtifactError::InvalidSchema(
                    "template has no data row".to_string(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(ArtifactError::InvalidSchema(
                    "template must contain exactly one row".to_string(),
                ))
            }
        };

        if row.len() != frame.columns.len() {
            return Err(ArtifactError::InvalidSchema(format!(
                "row has {} values for {} columns",
                row.len(),
                frame.columns.len()
            )));
        }

        Self::new(frame.columns.into_iter().zip(row))
    }

    /// Column names in model order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false for a loaded template.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether `column` is part of the schema.
    pub fn contains(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    /// Default value of a column.
    pub fn default_of(&self, column: &str) -> Option<&FeatureValue> {
        self.index.get(column).map(|&i| &self.defaults[i])
    }

    /// A fresh, independent copy of the default row.
    pub fn fresh_row(&self) -> FeatureRow {
        FeatureRow {
            columns: Arc::clone(&self.columns),
            values: self.defaults.clone(),
        }
    }

    /// Allow-list intersection of template columns and supplied values.
    ///
    /// Yields the column position and value for every key that is a template
    /// column, in the order the values were supplied.
    pub fn intersect<'a>(
        &'a self,
        values: &'a InputValues,
    ) -> impl Iterator<Item = (usize, &'a FeatureValue)> + 'a {
        values
            .iter()
            .filter_map(move |(column, value)| self.index.get(column).map(|&i| (i, value)))
    }
}

/// Field values collected from a submission, keyed by template column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputValues {
    entries: Vec<(String, FeatureValue)>,
}

impl InputValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any earlier value for the same column.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<FeatureValue>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FeatureValue)> {
        self.entries.iter().map(|(c, v)| (c, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>, V: Into<FeatureValue>> FromIterator<(S, V)> for InputValues {
    fn from_iter<T: IntoIterator<Item = (S, V)>>(iter: T) -> Self {
        let mut values = InputValues::new();
        for (column, value) in iter {
            values.insert(column, value);
        }
        values
    }
}

/// A populated single-row feature table with the template's exact shape.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    columns: Arc<[String]>,
    values: Vec<FeatureValue>,
}

impl FeatureRow {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[FeatureValue] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(column, value)` pairs in model order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl Serialize for FeatureRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Merge submitted values into a fresh copy of the template.
///
/// Keys that are not template columns are skipped without error so the
/// template may be a superset of the collected fields. Values are not
/// validated here; callers are expected to have checked them already.
pub fn build_row(template: &SchemaTemplate, values: &InputValues) -> FeatureRow {
    let mut row = template.fresh_row();
    let mut written = 0usize;

    for (position, value) in template.intersect(values) {
        row.values[position] = value.clone();
        written += 1;
    }

    if written < values.len() {
        debug!(
            supplied = values.len(),
            written = written,
            "Skipped values for columns missing from template"
        );
    }

    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> SchemaTemplate {
        SchemaTemplate::new(vec![
            ("school", FeatureValue::from("GP")),
            ("age", FeatureValue::from(17_i64)),
            ("subject", FeatureValue::from("Math")),
            ("absences", FeatureValue::from(4_i64)),
            ("G1", FeatureValue::from(11_i64)),
            ("G2", FeatureValue::from(11_i64)),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_row_overwrites_known_columns() {
        let template = template();
        let values: InputValues = vec![
            ("age", FeatureValue::from(19_i64)),
            ("subject", FeatureValue::from("Portuguese")),
        ]
        .into_iter()
        .collect();

        let row = build_row(&template, &values);

        assert_eq!(row.columns(), template.columns());
        assert_eq!(row.get("age"), Some(&FeatureValue::Integer(19)));
        assert_eq!(row.get("subject"), Some(&FeatureValue::from("Portuguese")));
        // untouched columns keep their defaults
        assert_eq!(row.get("school"), Some(&FeatureValue::from("GP")));
        assert_eq!(row.get("G1"), Some(&FeatureValue::Integer(11)));
    }

    #[test]
    fn test_build_row_skips_unknown_columns() {
        let template = template();
        let values: InputValues = vec![
            ("G1", FeatureValue::from(3_i64)),
            ("famsup", FeatureValue::from("yes")),
        ]
        .into_iter()
        .collect();

        let row = build_row(&template, &values);

        assert_eq!(row.len(), template.len());
        assert!(row.get("famsup").is_none());
        assert_eq!(row.get("G1"), Some(&FeatureValue::Integer(3)));
    }

    #[test]
    fn test_build_row_does_not_mutate_template() {
        let template = template();
        let values: InputValues = vec![("absences", FeatureValue::from(30_i64))]
            .into_iter()
            .collect();

        let first = build_row(&template, &values);
        let second = build_row(&template, &values);

        assert_eq!(first, second);
        assert_eq!(template.default_of("absences"), Some(&FeatureValue::Integer(4)));
        assert_eq!(template.fresh_row().get("absences"), Some(&FeatureValue::Integer(4)));
    }

    #[test]
    fn test_build_row_with_no_values_is_template() {
        let template = template();
        let row = build_row(&template, &InputValues::new());
        assert_eq!(row, template.fresh_row());
    }

    #[test]
    fn test_input_values_insert_replaces() {
        let mut values = InputValues::new();
        values.insert("age", 15_i64);
        values.insert("age", 16_i64);
        assert_eq!(values.len(), 1);
        assert_eq!(values.get("age"), Some(&FeatureValue::Integer(16)));
    }

    #[test]
    fn test_from_split_json() {
        let json = r#"{
            "columns": ["school", "age", "studytime_ratio"],
            "index": [0],
            "data": [["GP", 17, 0.5]]
        }"#;

        let template = SchemaTemplate::from_split_json(json).unwrap();

        assert_eq!(template.columns(), &["school", "age", "studytime_ratio"]);
        assert_eq!(template.default_of("age"), Some(&FeatureValue::Integer(17)));
        assert_eq!(
            template.default_of("studytime_ratio"),
            Some(&FeatureValue::Float(0.5))
        );
    }

    #[test]
    fn test_from_split_json_rejects_bad_shapes() {
        let two_rows = r#"{"columns": ["a"], "data": [[1], [2]]}"#;
        let no_rows = r#"{"columns": ["a"], "data": []}"#;
        let width = r#"{"columns": ["a", "b"], "data": [[1]]}"#;
        let duplicate = r#"{"columns": ["a", "a"], "data": [[1, 2]]}"#;

        for json in [two_rows, no_rows, width, duplicate] {
            assert!(matches!(
                SchemaTemplate::from_split_json(json),
                Err(ArtifactError::InvalidSchema(_))
            ));
        }

        assert!(matches!(
            SchemaTemplate::from_split_json("not json"),
            Err(ArtifactError::Json(_))
        ));
    }

    #[test]
    fn test_row_serializes_in_column_order() {
        let row = template().fresh_row();
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(
            json,
            r#"{"school":"GP","age":17,"subject":"Math","absences":4,"G1":11,"G2":11}"#
        );
    }
}
