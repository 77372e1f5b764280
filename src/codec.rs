//! Category Codec - label <-> integer code mapping for model inputs/outputs
//!
//! A model is trained on integer codes; a code is the label's position in the
//! column's ordered category list. Matching is exact: callers normalize
//! casing before encoding.

use crate::error::{PredictionError, PredictionResult};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Ordered labels for one feature column. Codes are dense `[0, len)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CategoryTable {
    labels: Vec<String>,
    index: FxHashMap<String, usize>,
}

impl CategoryTable {
    /// Build a table; duplicate labels are rejected since a code must be unique.
    pub fn new(labels: Vec<String>) -> Result<Self, String> {
        let mut index = FxHashMap::default();
        index.reserve(labels.len());
        for (code, label) in labels.iter().enumerate() {
            if index.insert(label.clone(), code).is_some() {
                return Err(format!("duplicate category label '{}'", label));
            }
        }
        Ok(Self { labels, index })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn code_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn label_of(&self, code: i64) -> Option<&str> {
        if code < 0 {
            return None;
        }
        self.labels.get(code as usize).map(|s| s.as_str())
    }
}

impl TryFrom<Vec<String>> for CategoryTable {
    type Error = String;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(labels)
    }
}

impl From<CategoryTable> for Vec<String> {
    fn from(table: CategoryTable) -> Self {
        table.labels
    }
}

/// Category tables keyed by column name (e.g. "Crop", "State", "Soil_Type")
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTables {
    columns: FxHashMap<String, CategoryTable>,
}

impl CategoryTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a column table
    pub fn with_column<S: Into<String>>(mut self, column: &str, labels: Vec<S>) -> Result<Self, String> {
        let table = CategoryTable::new(labels.into_iter().map(Into::into).collect())?;
        self.columns.insert(column.to_string(), table);
        Ok(self)
    }

    pub fn column(&self, column: &str) -> Option<&CategoryTable> {
        self.columns.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &CategoryTable)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn encode(&self, label: &str, column: &str) -> PredictionResult<usize> {
        encode(label, column, self)
    }

    pub fn decode(&self, code: i64, column: &str) -> PredictionResult<&str> {
        decode(code, column, self)
    }
}

/// Encode `label` into its code for `column`.
///
/// An unknown column is reported as an unknown category: from the caller's
/// side both mean the artifact cannot interpret the value.
pub fn encode(label: &str, column: &str, tables: &CategoryTables) -> PredictionResult<usize> {
    tables
        .column(column)
        .and_then(|table| table.code_of(label))
        .ok_or_else(|| PredictionError::unknown_category(label, column))
}

/// Decode `code` back into its label for `column`. Valid codes are `0..len`.
pub fn decode<'a>(code: i64, column: &str, tables: &'a CategoryTables) -> PredictionResult<&'a str> {
    tables
        .column(column)
        .and_then(|table| table.label_of(code))
        .ok_or_else(|| PredictionError::InvalidCode {
            code,
            column: column.to_string(),
        })
}
