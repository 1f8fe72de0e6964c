//! Typed model for the Safety Data Sheet report document.
//!
//! The service returns a loosely structured JSON tree. Everything is resolved
//! once, at the wire boundary, into the tagged variants below; the rendering
//! layers never inspect `serde_json::Value` again.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value as Json;

/// Section keys look like "Section1" .. "Section16".
static SECTION_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Section(\d+)$").unwrap());

/// Numeric suffix of a section key, if the key matches the naming pattern.
pub fn section_number(key: &str) -> Option<u32> {
    SECTION_KEY
        .captures(key)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Leaf of the report tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(f64),
    Bool(bool),
    /// JSON null or an empty string
    Missing,
}

/// A report value: scalar, ordered list, or nested labeled block.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<Value>),
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Total conversion from any JSON value. Cycles cannot occur in a
    /// JSON-decoded document, so plain recursion is safe here.
    pub fn from_json(json: &Json) -> Value {
        match json {
            Json::Null => Value::Scalar(Scalar::Missing),
            Json::Bool(b) => Value::Scalar(Scalar::Bool(*b)),
            Json::Number(n) => match n.as_f64() {
                Some(f) => Value::Scalar(Scalar::Number(f)),
                // Not representable as f64; keep the serialized form
                None => Value::Scalar(Scalar::Text(n.to_string())),
            },
            Json::String(s) if s.trim().is_empty() => Value::Scalar(Scalar::Missing),
            Json::String(s) => Value::Scalar(Scalar::Text(s.clone())),
            Json::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
            Json::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Scalar(Scalar::Missing))
    }
}

/// One SDS section, already filtered to non-empty `data`.
#[derive(Debug, Clone)]
pub struct Section {
    pub key: String,
    pub number: u32,
    pub title: String,
    pub data: Vec<(String, Value)>,
    pub data_sources: Vec<String>,
    pub notes: Vec<String>,
}

impl Section {
    /// The hazard-identification slot in the SDS numbering.
    pub fn is_hazard(&self) -> bool {
        self.number == 2
    }
}

/// The parsed report: sections sorted numerically by key suffix.
#[derive(Debug, Clone, Default)]
pub struct ReportDocument {
    pub sections: Vec<Section>,
    pub metadata: Option<ReportMetadata>,
}

impl ReportDocument {
    pub fn section(&self, key: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.key == key)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportMetadata {
    /// Wire shape is unspecified (string timestamp or numeric seconds);
    /// formatted leniently at display time.
    #[serde(default)]
    pub generation_time: Option<Json>,
    #[serde(default)]
    pub canonical_smiles: Option<String>,
}

impl ReportMetadata {
    pub fn generation_time_display(&self) -> Option<String> {
        match self.generation_time.as_ref()? {
            Json::String(s) => Some(s.clone()),
            Json::Number(n) => Some(format!("{:.2}s", n.as_f64().unwrap_or(0.0))),
            other => Some(other.to_string()),
        }
    }
}

/// Wire shape of `POST /api/validate`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationResponse {
    pub valid: bool,
    #[serde(default)]
    pub canonical_smiles: Option<String>,
    #[serde(default)]
    pub molecular_formula: Option<String>,
    #[serde(default)]
    pub molecular_weight: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ValidationResponse {
    /// Feedback lines shown under the input field: canonical form plus
    /// formula/weight for a positive result, the error line otherwise.
    pub fn summary_lines(&self) -> Vec<String> {
        if self.valid {
            let mut lines = Vec::new();
            if let Some(canonical) = &self.canonical_smiles {
                lines.push(format!("Canonical: {canonical}"));
            }
            match (&self.molecular_formula, self.molecular_weight) {
                (Some(formula), Some(weight)) => {
                    lines.push(format!("{formula}  ({weight:.2} g/mol)"));
                }
                (Some(formula), None) => lines.push(formula.clone()),
                (None, Some(weight)) => lines.push(format!("{weight:.2} g/mol")),
                (None, None) => {}
            }
            if lines.is_empty() {
                lines.push("Valid SMILES".to_string());
            }
            lines
        } else {
            let reason = self.error.as_deref().unwrap_or("invalid SMILES");
            vec![format!("Invalid: {reason}")]
        }
    }
}

/// Wire shape of `POST /api/sds`.
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    pub sds: serde_json::Map<String, Json>,
    #[serde(default)]
    pub metadata: Option<ReportMetadata>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    data: Option<Json>,
    #[serde(default)]
    data_sources: Vec<String>,
    #[serde(default)]
    notes: Vec<String>,
}

impl GenerateResponse {
    /// Resolve the wire payload into the typed document.
    ///
    /// Keys not matching the section pattern and sections with missing or
    /// empty `data` are silently dropped; sections come out sorted by the
    /// numeric key suffix, not lexicographically.
    pub fn into_document(self) -> ReportDocument {
        let mut sections: Vec<Section> = self
            .sds
            .into_iter()
            .filter_map(|(key, raw)| {
                let number = section_number(&key)?;
                let raw: RawSection = serde_json::from_value(raw).ok()?;
                let data = match raw.data {
                    Some(Json::Object(map)) if !map.is_empty() => map
                        .iter()
                        .map(|(k, v)| (k.clone(), Value::from_json(v)))
                        .collect::<Vec<_>>(),
                    _ => return None,
                };
                Some(Section {
                    title: raw.title.unwrap_or_else(|| key.clone()),
                    key,
                    number,
                    data,
                    data_sources: raw.data_sources,
                    notes: raw.notes,
                })
            })
            .collect();
        sections.sort_by_key(|s| s.number);
        ReportDocument {
            sections,
            metadata: self.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn section_number_matches_pattern_only() {
        assert_eq!(section_number("Section1"), Some(1));
        assert_eq!(section_number("Section10"), Some(10));
        assert_eq!(section_number("section1"), None);
        assert_eq!(section_number("Section"), None);
        assert_eq!(section_number("Section1b"), None);
        assert_eq!(section_number("metadata"), None);
    }

    #[test]
    fn from_json_is_total_over_json_shapes() {
        assert!(Value::from_json(&json!(null)).is_missing());
        assert!(Value::from_json(&json!("")).is_missing());
        assert!(Value::from_json(&json!("   ")).is_missing());
        assert_eq!(
            Value::from_json(&json!(true)),
            Value::Scalar(Scalar::Bool(true))
        );
        assert_eq!(
            Value::from_json(&json!(46.07)),
            Value::Scalar(Scalar::Number(46.07))
        );
        match Value::from_json(&json!({"a": [1, "x"], "b": {"c": null}})) {
            Value::Object(fields) => assert_eq!(fields.len(), 2),
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn from_json_tolerates_deep_nesting() {
        let mut json = json!("leaf");
        for _ in 0..500 {
            json = json!([json]);
        }
        let mut value = Value::from_json(&json);
        let mut depth = 0;
        while let Value::List(items) = value {
            value = items.into_iter().next().unwrap();
            depth += 1;
        }
        assert_eq!(depth, 500);
    }

    #[test]
    fn document_sorts_numerically_and_skips_empty_data() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "sds": {
                "Section10": {"title": "Stability", "data": {"State": "stable"}},
                "Section2": {"title": "Hazards", "data": {"Signal Word": "Danger"}},
                "Section1": {"title": "Identification", "data": {"Name": "Ethanol"}},
                "Section3": {"title": "Composition", "data": {}},
                "Section4": {"title": "First Aid"},
                "NotASection": {"title": "x", "data": {"y": 1}}
            }
        }))
        .unwrap();
        let doc = response.into_document();
        let keys: Vec<&str> = doc.sections.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, ["Section1", "Section2", "Section10"]);
        assert!(doc.section("Section2").unwrap().is_hazard());
        assert!(!doc.section("Section1").unwrap().is_hazard());
    }

    #[test]
    fn section_fields_keep_wire_order() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "sds": {
                "Section9": {
                    "title": "Physical and Chemical Properties",
                    "data": {
                        "Physical State": "liquid",
                        "Boiling Point": "78.37 C",
                        "Appearance": "colorless"
                    }
                }
            }
        }))
        .unwrap();
        let doc = response.into_document();
        let fields: Vec<&str> = doc.sections[0]
            .data
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(fields, ["Physical State", "Boiling Point", "Appearance"]);
    }

    #[test]
    fn validation_summary_positive_and_negative() {
        let ok: ValidationResponse = serde_json::from_value(json!({
            "valid": true,
            "canonical_smiles": "CCO",
            "molecular_formula": "C2H6O",
            "molecular_weight": 46.07
        }))
        .unwrap();
        let lines = ok.summary_lines();
        assert_eq!(lines[0], "Canonical: CCO");
        assert!(lines[1].contains("C2H6O"));
        assert!(lines[1].contains("46.07"));

        let bad: ValidationResponse =
            serde_json::from_value(json!({"valid": false, "error": "bad token"})).unwrap();
        assert_eq!(bad.summary_lines(), vec!["Invalid: bad token"]);
    }
}
