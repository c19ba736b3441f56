use std::collections::HashMap;

use crate::factcheck::{FactCheckOutcome, FactChecker};
use crate::generator::TextGenerator;
use crate::models::DiseaseRecord;

/// Conversational prompt for the text generator describing one disease.
/// Empty record categories fall back to neutral wording rather than being
/// omitted.
pub fn build_disease_prompt(record: &DiseaseRecord) -> String {
    let symptoms_text = joined_or(&record.symptoms, "various symptoms");
    let origins_text = joined_or(&record.transmission.from_locations, "Unknown");
    let affected_text = joined_or(&record.transmission.to_locations, "various populations");

    format!(
        "Create a clear, empathetic description of {} that:\n\
         - Uses accessible language without technical jargon or medical terminology\n\
         - Prioritizes accuracy while maintaining a reassuring tone\n\
         - Uses natural phrases like \"commonly causes\", \"you may experience\", \"often leads to\"\n\
         - Covers its typical symptoms: {}\n\
         - Mentions its origins in {} and its impact on {}\n\
         - Avoids exact statistics, percentages, or absolute statements\n\
         - Keeps the description under 120 words and patient-friendly and casual",
        record.name, symptoms_text, origins_text, affected_text
    )
}

/// Generates a disease summary and immediately fact-checks it against the
/// same record, appending a correction note when the generated text strays.
/// Pure request/response; nothing is cached between calls.
#[derive(Clone)]
pub struct SummaryService {
    generator: TextGenerator,
    checker: FactChecker,
}

impl SummaryService {
    pub fn new(generator: TextGenerator) -> Self {
        let checker = FactChecker::new(generator.clone());
        Self { generator, checker }
    }

    pub async fn generate_and_verify(&self, record: &DiseaseRecord) -> FactCheckOutcome {
        let prompt = build_disease_prompt(record);
        let raw = self.generator.generate(&prompt).await;
        self.checker.check(&raw, record).await
    }
}

fn joined_or(map: &HashMap<String, f64>, fallback: &str) -> String {
    if map.is_empty() {
        return fallback.to_string();
    }
    let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prompt_names_disease_and_known_facts() {
        let record = DiseaseRecord::from_parts(
            "COVID-19",
            &json!(["fever", "cough"]),
            &json!(["Asia"]),
            &json!(["Global"]),
        );
        let prompt = build_disease_prompt(&record);
        assert!(prompt.contains("COVID-19"));
        assert!(prompt.contains("cough, fever"));
        assert!(prompt.contains("origins in Asia"));
        assert!(prompt.contains("impact on Global"));
    }

    #[test]
    fn prompt_falls_back_for_empty_categories() {
        let record = DiseaseRecord {
            name: "Blight Omega".to_string(),
            ..DiseaseRecord::default()
        };
        let prompt = build_disease_prompt(&record);
        assert!(prompt.contains("various symptoms"));
        assert!(prompt.contains("origins in Unknown"));
        assert!(prompt.contains("impact on various populations"));
    }

    #[tokio::test]
    async fn accurate_generation_needs_no_corrections() {
        let record = DiseaseRecord::from_parts(
            "COVID-19",
            &json!(["fever", "cough", "fatigue", "shortness of breath"]),
            &json!(["Asia", "Europe"]),
            &json!(["Global"]),
        );
        let service = SummaryService::new(TextGenerator::Local);

        let outcome = service.generate_and_verify(&record).await;
        assert!(outcome.corrections.is_empty(), "{:?}", outcome.corrections);
        assert!(outcome.corrected_text.contains("respiratory illness"));
        assert!(!outcome.corrected_text.contains("uhmm actwaully"));
    }

    #[tokio::test]
    async fn inaccurate_record_triggers_appended_note() {
        // Canned COVID-19 text claims fever/cough and an Asian origin; a
        // record that disagrees must pick those up as misinformation.
        let record = DiseaseRecord::from_parts(
            "COVID-19",
            &json!(["sneezing"]),
            &json!(["Antarctica"]),
            &json!(["Global"]),
        );
        let service = SummaryService::new(TextGenerator::Local);

        let outcome = service.generate_and_verify(&record).await;
        assert!(!outcome.corrections.is_empty());
        assert!(outcome.corrected_text.contains("\n\nuhmm actwaully"));
    }

    #[tokio::test]
    async fn unknown_disease_falls_back_cleanly() {
        let record = DiseaseRecord {
            name: "Blight Omega".to_string(),
            ..DiseaseRecord::default()
        };
        let service = SummaryService::new(TextGenerator::Local);

        let outcome = service.generate_and_verify(&record).await;
        assert!(outcome.corrections.is_empty());
        assert!(outcome.corrected_text.contains("limited"));
    }
}
