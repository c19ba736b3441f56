use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a disease came from and where it has spread to, each location
/// carrying a confidence weight in [0, 1].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TransmissionInfo {
    #[serde(default)]
    pub from_locations: HashMap<String, f64>,
    #[serde(default)]
    pub to_locations: HashMap<String, f64>,
}

impl TransmissionInfo {
    pub fn is_empty(&self) -> bool {
        self.from_locations.is_empty() && self.to_locations.is_empty()
    }
}

/// Ground truth for one disease. Constructed fresh per request and discarded
/// after the call; all fact checking compares against this.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiseaseRecord {
    pub name: String,
    #[serde(default)]
    pub symptoms: HashMap<String, f64>,
    #[serde(default)]
    pub transmission: TransmissionInfo,
}

impl DiseaseRecord {
    /// Builds a record from caller-supplied raw fields. Symptom and location
    /// fields accept a mapping, a list of names, or a single name; anything
    /// else normalizes to empty.
    pub fn from_parts(name: impl Into<String>, symptoms: &Value, from: &Value, to: &Value) -> Self {
        Self {
            name: name.into(),
            symptoms: normalize_locations(symptoms),
            transmission: TransmissionInfo {
                from_locations: normalize_locations(from),
                to_locations: normalize_locations(to),
            },
        }
    }
}

/// Converts heterogeneous location (or symptom) input into a uniform
/// name -> confidence mapping. Unrecognized shapes normalize to an empty map
/// rather than erroring.
pub fn normalize_locations(value: &Value) -> HashMap<String, f64> {
    match value {
        Value::Object(map) => map
            .iter()
            .filter(|(key, _)| !key.is_empty())
            .map(|(key, weight)| (key.clone(), weight.as_f64().unwrap_or(1.0)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .filter(|name| !name.is_empty())
            .map(|name| (name.to_string(), 1.0))
            .collect(),
        Value::String(name) if !name.is_empty() => HashMap::from([(name.clone(), 1.0)]),
        _ => HashMap::new(),
    }
}

/// Which canonical fact a correction disputes. Variants are declared in
/// report order: name first, then symptoms, then geography.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionCategory {
    DiseaseName,
    Symptom,
    Origin,
    AffectedArea,
}

impl CorrectionCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            CorrectionCategory::DiseaseName => "disease name",
            CorrectionCategory::Symptom => "symptom",
            CorrectionCategory::Origin => "origin",
            CorrectionCategory::AffectedArea => "affected area",
        }
    }
}

/// One (claimed value, true value) pair surfaced by the discrepancy detector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Correction {
    pub category: CorrectionCategory,
    pub claim: String,
    pub truth: String,
}

impl Correction {
    pub fn new(
        category: CorrectionCategory,
        claim: impl Into<String>,
        truth: impl Into<String>,
    ) -> Self {
        Self {
            category,
            claim: claim.into(),
            truth: truth.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FactCheckRequest {
    pub disease_name: String,
    #[serde(default)]
    pub symptoms: Value,
    #[serde(default)]
    pub transmission_from: Value,
    #[serde(default)]
    pub transmission_to: Value,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FactCheckResponse {
    pub corrected_text: String,
    pub had_misinformation: bool,
    pub corrections: Vec<Correction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryRequest {
    pub disease_name: String,
    #[serde(default)]
    pub symptoms: Value,
    #[serde(default)]
    pub transmission_from: Value,
    #[serde(default)]
    pub transmission_to: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub had_misinformation: bool,
    pub corrections: Vec<Correction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutbreakRequest {
    pub disease_name: Option<String>,
    pub origin_airport: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutbreakResponse {
    pub instance_id: String,
    pub disease_name: String,
    pub color: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HopRequest {
    pub location_name: String,
    pub location_type: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HopResponse {
    pub instance_id: String,
    pub logged: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mapping_input_passes_through_unchanged() {
        let input = json!({"Asia": 0.9, "Europe": 0.4});
        let normalized = normalize_locations(&input);
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized["Asia"], 0.9);
        assert_eq!(normalized["Europe"], 0.4);
    }

    #[test]
    fn list_input_defaults_to_full_confidence() {
        let normalized = normalize_locations(&json!(["Asia", "Europe"]));
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized["Asia"], 1.0);
        assert_eq!(normalized["Europe"], 1.0);
    }

    #[test]
    fn scalar_input_becomes_single_entry() {
        let normalized = normalize_locations(&json!("Global"));
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized["Global"], 1.0);
    }

    #[test]
    fn unrecognized_input_normalizes_to_empty() {
        assert!(normalize_locations(&Value::Null).is_empty());
        assert!(normalize_locations(&json!(42)).is_empty());
        assert!(normalize_locations(&json!(true)).is_empty());
        assert!(normalize_locations(&json!("")).is_empty());
    }

    #[test]
    fn mapping_with_non_numeric_weight_defaults_to_one() {
        let normalized = normalize_locations(&json!({"Asia": "high"}));
        assert_eq!(normalized["Asia"], 1.0);
    }

    #[test]
    fn record_from_parts_normalizes_all_fields() {
        let record = DiseaseRecord::from_parts(
            "COVID-19",
            &json!({"fever": 0.9, "cough": 0.8}),
            &json!(["Asia", "Europe"]),
            &json!("Global"),
        );
        assert_eq!(record.name, "COVID-19");
        assert_eq!(record.symptoms.len(), 2);
        assert_eq!(record.transmission.from_locations.len(), 2);
        assert_eq!(record.transmission.to_locations["Global"], 1.0);
    }
}
