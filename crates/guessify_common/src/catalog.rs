//! Entity catalog loaded from a CSV table.
//!
//! One row per entity, a `name` column, and one yes/no column per attribute.
//! The catalog is immutable after loading and is shared read-only between
//! game sessions.
//!
//! Records are split on line breaks before fields are split, so a quoted
//! field may contain commas but not a newline. A leading UTF-8 byte order
//! mark is ignored.

use crate::error::{GuessError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Column holding the entity name
pub const NAME_COLUMN: &str = "name";

/// Cell values treated as "no value"; rows containing one are dropped
const MISSING_MARKERS: &[&str] = &["", "na", "nan", "null", "n/a"];

/// A single entity with its attribute vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    /// One value per catalog attribute, in catalog attribute order
    pub values: Vec<bool>,
}

/// Rows skipped while loading
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub rows_read: usize,
    pub dropped_missing: Vec<usize>,
    pub dropped_duplicates: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    attributes: Vec<String>,
    entities: Vec<Entity>,
    entity_index: HashMap<String, usize>,
    attribute_index: HashMap<String, usize>,
    summary: LoadSummary,
}

enum Cell {
    Value(bool),
    Missing,
}

impl Catalog {
    /// Load a catalog from a CSV file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            GuessError::Data(format!("cannot read catalog {}: {}", path.display(), e))
        })?;
        let catalog = Self::parse(&text)?;
        info!(
            "Loaded {} entities with {} attributes from {}",
            catalog.len(),
            catalog.attributes.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Load a catalog from any reader
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| GuessError::Data(format!("cannot read catalog source: {}", e)))?;
        Self::parse(&text)
    }

    /// Parse CSV text
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header_line) = lines
            .next()
            .ok_or_else(|| GuessError::Data("catalog source is empty".to_string()))?;
        let header: Vec<String> = split_csv_line(header_line)
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();

        let name_col = header
            .iter()
            .position(|h| h == NAME_COLUMN)
            .ok_or_else(|| GuessError::Data("catalog has no 'name' column".to_string()))?;

        let attr_cols: Vec<usize> = (0..header.len()).filter(|&i| i != name_col).collect();
        if attr_cols.is_empty() {
            return Err(GuessError::Data("catalog has no attribute columns".to_string()));
        }
        let attributes: Vec<String> = attr_cols.iter().map(|&i| header[i].clone()).collect();

        let mut attribute_index = HashMap::with_capacity(attributes.len());
        for (i, key) in attributes.iter().enumerate() {
            if key.is_empty() {
                return Err(GuessError::Data(format!("attribute column {} has no name", i + 1)));
            }
            if attribute_index.insert(key.clone(), i).is_some() {
                return Err(GuessError::Data(format!("duplicate attribute column '{}'", key)));
            }
        }

        let mut summary = LoadSummary::default();
        let mut entities = Vec::new();
        let mut entity_index = HashMap::new();

        for (line_no, line) in lines {
            summary.rows_read += 1;
            let cells = split_csv_line(line);
            let name = cells.get(name_col).map(|s| s.trim()).unwrap_or("");

            let mut values = Vec::with_capacity(attr_cols.len());
            let mut complete = !is_missing(name);
            for (attr_pos, &col) in attr_cols.iter().enumerate() {
                let raw = cells.get(col).map(|s| s.as_str()).unwrap_or("");
                match parse_cell(raw) {
                    Some(Cell::Value(v)) => values.push(v),
                    Some(Cell::Missing) => complete = false,
                    None => {
                        return Err(GuessError::Data(format!(
                            "line {}: invalid value '{}' for attribute '{}' (expected yes/no)",
                            line_no + 1,
                            raw.trim(),
                            attributes[attr_pos]
                        )))
                    }
                }
            }

            if !complete {
                warn!("Dropping incomplete catalog row at line {}", line_no + 1);
                summary.dropped_missing.push(line_no + 1);
                continue;
            }
            if entity_index.contains_key(name) {
                warn!("Dropping duplicate catalog entry '{}' at line {}", name, line_no + 1);
                summary.dropped_duplicates.push(name.to_string());
                continue;
            }

            entity_index.insert(name.to_string(), entities.len());
            entities.push(Entity {
                name: name.to_string(),
                values,
            });
        }

        if entities.is_empty() {
            return Err(GuessError::Data(
                "catalog has no valid rows after dropping duplicates and incomplete rows"
                    .to_string(),
            ));
        }

        Ok(Self {
            attributes,
            entities,
            entity_index,
            attribute_index,
            summary,
        })
    }

    /// Attribute keys in column order
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Entities in file order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entity_index.get(name).map(|&i| &self.entities[i])
    }

    /// Attribute vector of an entity by name
    pub fn vector(&self, name: &str) -> Option<&[bool]> {
        self.entity(name).map(|e| e.values.as_slice())
    }

    /// Column index of an attribute key
    pub fn attribute_position(&self, key: &str) -> Option<usize> {
        self.attribute_index.get(key).copied()
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attribute_index.contains_key(key)
    }

    pub fn load_summary(&self) -> &LoadSummary {
        &self.summary
    }
}

fn is_missing(raw: &str) -> bool {
    let token = raw.trim().to_ascii_lowercase();
    MISSING_MARKERS.contains(&token.as_str())
}

fn parse_cell(raw: &str) -> Option<Cell> {
    if is_missing(raw) {
        return Some(Cell::Missing);
    }
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" => Some(Cell::Value(true)),
        "no" => Some(Cell::Value(false)),
        _ => None,
    }
}

/// Split one CSV line, honouring double-quoted fields and `""` escapes
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "name,actor,musician\nA,yes,no\nB,yes,yes\nC,no,no\n";

    #[test]
    fn test_parse_small_catalog() {
        let catalog = Catalog::parse(SMALL).unwrap();
        assert_eq!(catalog.attributes(), &["actor".to_string(), "musician".to_string()]);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.vector("B"), Some(&[true, true][..]));
        assert_eq!(catalog.entity("C").map(|e| e.name.as_str()), Some("C"));
        assert_eq!(catalog.attribute_position("musician"), Some(1));
        assert!(catalog.vector("Z").is_none());
    }

    #[test]
    fn test_byte_order_mark_stripped() {
        let catalog = Catalog::parse("\u{feff}name,actor\nA,yes\n").unwrap();
        assert_eq!(catalog.attributes(), &["actor".to_string()]);
        assert_eq!(catalog.vector("A"), Some(&[true][..]));
    }

    #[test]
    fn test_quoted_newline_not_supported() {
        // both halves of the split record are incomplete rows and get dropped
        let catalog = Catalog::parse("name,actor\n\"Jo\nBloggs\",yes\nA,no\n").unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.entity("A").is_some());
    }

    #[test]
    fn test_name_column_anywhere() {
        let catalog = Catalog::parse("actor,name\nyes,A\n").unwrap();
        assert_eq!(catalog.attributes(), &["actor".to_string()]);
        assert_eq!(catalog.vector("A"), Some(&[true][..]));
    }

    #[test]
    fn test_missing_name_column() {
        let err = Catalog::parse("title,actor\nA,yes\n").unwrap_err();
        assert!(matches!(err, GuessError::Data(_)));
    }

    #[test]
    fn test_empty_source() {
        assert!(matches!(Catalog::parse("").unwrap_err(), GuessError::Data(_)));
        assert!(matches!(Catalog::parse("name\nA\n").unwrap_err(), GuessError::Data(_)));
    }

    #[test]
    fn test_invalid_token() {
        let err = Catalog::parse("name,actor\nA,maybe\n").unwrap_err();
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn test_tokens_case_insensitive() {
        let catalog = Catalog::parse("name,actor\nA, Yes \nB,NO\n").unwrap();
        assert_eq!(catalog.vector("A"), Some(&[true][..]));
        assert_eq!(catalog.vector("B"), Some(&[false][..]));
    }

    #[test]
    fn test_drops_incomplete_and_duplicates() {
        let text = "name,actor,musician\nA,yes,no\nB,yes,\nA,no,no\nC,no\nD,NaN,yes\nE,no,yes\n";
        let catalog = Catalog::parse(text).unwrap();
        let names: Vec<&str> = catalog.entities().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "E"]);
        // first occurrence wins
        assert_eq!(catalog.vector("A"), Some(&[true, false][..]));

        let summary = catalog.load_summary();
        assert_eq!(summary.rows_read, 6);
        assert_eq!(summary.dropped_missing, vec![3, 5, 6]);
        assert_eq!(summary.dropped_duplicates, vec!["A".to_string()]);
    }

    #[test]
    fn test_no_valid_rows() {
        let err = Catalog::parse("name,actor\nA,\nB,na\n").unwrap_err();
        assert!(matches!(err, GuessError::Data(_)));
    }

    #[test]
    fn test_quoted_names() {
        let catalog = Catalog::parse("name,actor\n\"Smith, Will\",yes\n\"The \"\"Rock\"\"\",yes\n").unwrap();
        assert!(catalog.entity("Smith, Will").is_some());
        assert!(catalog.entity("The \"Rock\"").is_some());
    }

    #[test]
    fn test_every_entity_complete() {
        let catalog = Catalog::parse(SMALL).unwrap();
        for entity in catalog.entities() {
            assert_eq!(entity.values.len(), catalog.attributes().len());
        }
    }
}
