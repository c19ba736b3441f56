use std::collections::HashMap;

use anyhow::{Context, Result};
use regex::Regex;

use crate::generator::TextGenerator;
use crate::models::{Correction, CorrectionCategory, DiseaseRecord};

/// Verb anchors that introduce an origin claim, followed by an optional
/// connecting preposition and a comma-separated run of capitalized places.
const ORIGIN_PATTERN: &str = r"((?i:emerged|originated|came from|started in|first appeared in|began in))(?:\s+(?i:in|from))?\s+([A-Z][A-Za-z]*(?:,\s*[A-Z][A-Za-z]*)*)";

/// Verb anchors that introduce a spread/affected-area claim.
const SPREAD_PATTERN: &str = r"((?i:affects|impacting|spreading to|prevalent in|common in))(?:\s+(?i:in|to|across))?\s+([A-Z][A-Za-z]*(?:,\s*[A-Z][A-Za-z]*)*)";

/// Closed vocabulary of common symptom phrases checked against the record.
const COMMON_SYMPTOMS: [&str; 20] = [
    "fever",
    "cough",
    "fatigue",
    "shortness of breath",
    "loss of taste",
    "loss of smell",
    "headache",
    "sore throat",
    "chills",
    "muscle pain",
    "nausea",
    "vomiting",
    "diarrhea",
    "rash",
    "joint pain",
    "confusion",
    "dizziness",
    "fainting",
    "seizures",
    "paralysis",
];

/// Candidate disease-name mentions that disagree with the canonical name.
///
/// Candidates are maximal runs of capitalized alnum/hyphen words. A candidate
/// is flagged when it differs case-insensitively from the canonical name but
/// shares at least one of its words. Known limitation: a renaming that shares
/// no word with the canonical name ("Corona-20" vs "COVID-19") is not caught.
pub fn extract_name_mentions(text: &str, canonical_name: &str) -> Vec<String> {
    let candidate_re = Regex::new(r"\b[A-Z][A-Za-z0-9-]*(?:\s+[A-Z][A-Za-z0-9-]*)*\b")
        .unwrap_or_else(|_| Regex::new("^$").unwrap());

    let canonical_lower = canonical_name.to_lowercase();
    let canonical_words: Vec<&str> = canonical_lower.split_whitespace().collect();

    let mut mentions = Vec::new();
    for candidate in candidate_re.find_iter(text) {
        let candidate = candidate.as_str();
        let candidate_lower = candidate.to_lowercase();
        if candidate_lower == canonical_lower {
            continue;
        }
        if canonical_words
            .iter()
            .any(|word| candidate_lower.contains(word))
            && !mentions.iter().any(|m: &String| m == candidate)
        {
            mentions.push(candidate.to_string());
        }
    }
    mentions
}

/// Scans for verb-anchored location claims, returning `(verb, places)` pairs.
/// Text with no capitalized place tokens simply yields no mentions.
pub fn extract_location_mentions(text: &str, pattern: &str) -> Result<Vec<(String, Vec<String>)>> {
    let re = Regex::new(pattern).context("invalid location mention pattern")?;

    let mut mentions = Vec::new();
    for captures in re.captures_iter(text) {
        let verb = captures
            .get(1)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let places = captures
            .get(2)
            .map(|m| {
                m.as_str()
                    .split(',')
                    .map(|place| place.trim().to_string())
                    .filter(|place| !place.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        mentions.push((verb, places));
    }
    Ok(mentions)
}

/// Checks one location category. A pattern fault is swallowed: it is logged
/// and degraded to a single generic correction so detection never aborts.
fn check_locations(
    text: &str,
    actual: &HashMap<String, f64>,
    pattern: &str,
    category: CorrectionCategory,
) -> Vec<Correction> {
    let truth = format!("actual {}: {}", category.as_str(), joined_sorted_keys(actual));

    let mentions = match extract_location_mentions(text, pattern) {
        Ok(mentions) => mentions,
        Err(err) => {
            tracing::warn!("error checking {} locations: {err:#}", category.as_str());
            return vec![Correction::new(
                category,
                format!("incorrect {}", category.as_str()),
                truth,
            )];
        }
    };

    let mut corrections = Vec::new();
    for (_verb, places) in mentions {
        for place in places {
            if !actual.contains_key(&place) {
                corrections.push(Correction::new(category, place, truth.clone()));
            }
        }
    }
    corrections
}

fn check_symptoms(text: &str, record: &DiseaseRecord) -> Vec<Correction> {
    let text_lower = text.to_lowercase();
    let truth = format!("actual symptoms: {}", joined_sorted_keys(&record.symptoms));

    COMMON_SYMPTOMS
        .iter()
        .filter(|symptom| {
            !record.symptoms.contains_key(**symptom) && text_lower.contains(**symptom)
        })
        .map(|symptom| Correction::new(CorrectionCategory::Symptom, *symptom, truth.clone()))
        .collect()
}

fn check_name(text: &str, record: &DiseaseRecord) -> Vec<Correction> {
    extract_name_mentions(text, &record.name)
        .into_iter()
        .map(|mention| Correction::new(CorrectionCategory::DiseaseName, mention, &record.name))
        .collect()
}

/// Runs the four category checks independently and concatenates the findings
/// in fixed order: name, symptom, origin, affected area. A category with no
/// ground truth in the record is skipped entirely.
pub fn detect_corrections(text: &str, record: &DiseaseRecord) -> Vec<Correction> {
    let mut corrections = check_name(text, record);

    if !record.symptoms.is_empty() {
        corrections.extend(check_symptoms(text, record));
    }
    if !record.transmission.from_locations.is_empty() {
        corrections.extend(check_locations(
            text,
            &record.transmission.from_locations,
            ORIGIN_PATTERN,
            CorrectionCategory::Origin,
        ));
    }
    if !record.transmission.to_locations.is_empty() {
        corrections.extend(check_locations(
            text,
            &record.transmission.to_locations,
            SPREAD_PATTERN,
            CorrectionCategory::AffectedArea,
        ));
    }
    corrections
}

/// Deterministic single-voice correction note, one sentence per category
/// present, in fixed order. Always names the canonical disease.
pub fn local_correction_note(record: &DiseaseRecord, corrections: &[Correction]) -> String {
    let mut note = format!(
        "uhmm actwaully... as THE expert on {}, I need to correct some things. ",
        record.name
    );

    if let Some(wrong) = first_claim(corrections, CorrectionCategory::DiseaseName) {
        note.push_str(&format!(
            "First, it's called {}, not {}. ",
            record.name, wrong
        ));
    }

    let wrong_symptoms = claims_for(corrections, CorrectionCategory::Symptom);
    if !wrong_symptoms.is_empty() {
        note.push_str(&format!(
            "The REAL symptoms include {}, not {}. ",
            joined_sorted_keys(&record.symptoms),
            wrong_symptoms.join(", ")
        ));
    }

    if let Some(wrong) = first_claim(corrections, CorrectionCategory::Origin) {
        note.push_str(&format!(
            "It originated from {}, NOT {}. ",
            joined_sorted_keys(&record.transmission.from_locations),
            wrong
        ));
    }

    if let Some(wrong) = first_claim(corrections, CorrectionCategory::AffectedArea) {
        note.push_str(&format!(
            "And it affects {}, not just {}. ",
            joined_sorted_keys(&record.transmission.to_locations),
            wrong
        ));
    }

    note.push_str("Please check your facts before posting health information!");
    note
}

/// Instruction prompt for the delegated correction strategy: the external
/// model writes the snarky note, constrained to the detected errors.
pub fn build_correction_prompt(record: &DiseaseRecord, corrections: &[Correction]) -> String {
    let mut prompt = format!(
        "You're a frustrated medical expert correcting misinformation about {}.\n\
         Write a snarky, condescending correction (like an impatient Discord moderator) \
         addressing these errors:\n",
        record.name
    );

    if let Some(wrong) = first_claim(corrections, CorrectionCategory::DiseaseName) {
        prompt.push_str(&format!(
            "- Someone called it '{}' instead of '{}'\n",
            wrong, record.name
        ));
    }

    let wrong_symptoms = claims_for(corrections, CorrectionCategory::Symptom);
    if !wrong_symptoms.is_empty() {
        prompt.push_str(&format!(
            "- They listed incorrect symptoms: {}\n- The actual symptoms are: {}\n",
            wrong_symptoms.join(", "),
            joined_sorted_keys(&record.symptoms)
        ));
    }

    if let Some(wrong) = first_claim(corrections, CorrectionCategory::Origin) {
        prompt.push_str(&format!(
            "- They claimed it originated in {} when it actually came from {}\n",
            wrong,
            joined_sorted_keys(&record.transmission.from_locations)
        ));
    }

    if let Some(wrong) = first_claim(corrections, CorrectionCategory::AffectedArea) {
        prompt.push_str(&format!(
            "- They said it affects {} when it actually affects {}\n",
            wrong,
            joined_sorted_keys(&record.transmission.to_locations)
        ));
    }

    prompt.push_str(
        "Write a snarky correction as if typing to someone spreading misinformation.\n\
         Start with something like \"uhmm actwaully\" and make it clear you're the expert.\n\
         Keep it under 120 words, make it sting with your condescension, and don't use bullet points.\n\
         Don't ask questions - just correct them firmly while sounding like a real person.",
    );
    prompt
}

#[derive(Debug, Clone)]
pub struct FactCheckOutcome {
    pub corrected_text: String,
    pub corrections: Vec<Correction>,
}

/// Detects discrepancies between free text and a disease record, rewrites
/// wrong name mentions in place, and appends a correction note when anything
/// was found. Stateless across calls.
#[derive(Clone)]
pub struct FactChecker {
    generator: TextGenerator,
}

impl FactChecker {
    pub fn new(generator: TextGenerator) -> Self {
        Self { generator }
    }

    pub async fn check(&self, text: &str, record: &DiseaseRecord) -> FactCheckOutcome {
        let corrections = detect_corrections(text, record);

        let mut corrected_text = text.to_string();
        for correction in &corrections {
            if correction.category == CorrectionCategory::DiseaseName {
                corrected_text = corrected_text.replace(&correction.claim, &record.name);
            }
        }

        if let Some(note) = self.compose_correction(record, &corrections).await {
            corrected_text.push_str("\n\n");
            corrected_text.push_str(&note);
        }

        FactCheckOutcome {
            corrected_text,
            corrections,
        }
    }

    /// `None` when there is nothing to correct; the appended note is then a
    /// no-op for the caller.
    pub async fn compose_correction(
        &self,
        record: &DiseaseRecord,
        corrections: &[Correction],
    ) -> Option<String> {
        if corrections.is_empty() {
            return None;
        }

        match &self.generator {
            TextGenerator::Local => Some(local_correction_note(record, corrections)),
            remote => Some(
                remote
                    .generate(&build_correction_prompt(record, corrections))
                    .await,
            ),
        }
    }
}

fn joined_sorted_keys(map: &HashMap<String, f64>) -> String {
    if map.is_empty() {
        return "unknown regions".to_string();
    }
    let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys.join(", ")
}

fn first_claim(corrections: &[Correction], category: CorrectionCategory) -> Option<&str> {
    corrections
        .iter()
        .find(|c| c.category == category)
        .map(|c| c.claim.as_str())
}

fn claims_for(corrections: &[Correction], category: CorrectionCategory) -> Vec<&str> {
    corrections
        .iter()
        .filter(|c| c.category == category)
        .map(|c| c.claim.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn covid_record() -> DiseaseRecord {
        DiseaseRecord::from_parts(
            "COVID-19",
            &json!({"fever": 0.9, "cough": 0.8}),
            &json!(["Asia"]),
            &json!(["Global"]),
        )
    }

    #[test]
    fn detects_origin_affected_and_symptom_mismatches() {
        let record = covid_record();
        let text = "Corona-20 originated in Africa and affects Australia, causing rash";

        let corrections = detect_corrections(text, &record);

        let categories: Vec<CorrectionCategory> =
            corrections.iter().map(|c| c.category).collect();
        assert!(categories.contains(&CorrectionCategory::Symptom));
        assert!(categories.contains(&CorrectionCategory::Origin));
        assert!(categories.contains(&CorrectionCategory::AffectedArea));

        assert!(corrections
            .iter()
            .any(|c| c.category == CorrectionCategory::Origin && c.claim == "Africa"));
        assert!(corrections
            .iter()
            .any(|c| c.category == CorrectionCategory::AffectedArea && c.claim == "Australia"));
        assert!(corrections
            .iter()
            .any(|c| c.category == CorrectionCategory::Symptom && c.claim == "rash"));
    }

    #[test]
    fn renaming_sharing_no_word_is_not_caught() {
        // Documented gap of the word-overlap heuristic: "Corona-20" and
        // "COVID-19" share no word, so the name check stays silent.
        let mentions = extract_name_mentions("Corona-20 is spreading fast", "COVID-19");
        assert!(mentions.is_empty());
    }

    #[test]
    fn renaming_sharing_a_word_is_caught() {
        let mentions =
            extract_name_mentions("Patients with COVID-19 Virus report fever.", "COVID-19");
        assert_eq!(mentions, vec!["COVID-19 Virus".to_string()]);
    }

    #[test]
    fn exact_canonical_mention_is_not_flagged() {
        let mentions = extract_name_mentions("COVID-19 commonly causes fever.", "COVID-19");
        assert!(mentions.is_empty());
    }

    #[test]
    fn corrections_come_out_in_category_order() {
        let record = covid_record();
        let text =
            "The COVID-19 Virus originated in Africa, affects Australia and causes rash.";
        let corrections = detect_corrections(text, &record);

        let categories: Vec<CorrectionCategory> =
            corrections.iter().map(|c| c.category).collect();
        let mut sorted = categories.clone();
        sorted.sort();
        assert_eq!(categories, sorted);
        assert_eq!(categories[0], CorrectionCategory::DiseaseName);
    }

    #[test]
    fn empty_record_categories_disable_their_checks() {
        let record = DiseaseRecord {
            name: "X".to_string(),
            ..DiseaseRecord::default()
        };
        let text = "X causes rash and seizures. It originated in Africa and affects Europe.";
        assert!(detect_corrections(text, &record).is_empty());
    }

    #[test]
    fn location_mentions_pair_verb_with_places() {
        let mentions = extract_location_mentions(
            "The disease first appeared in Asia, Europe and later spread.",
            ORIGIN_PATTERN,
        )
        .unwrap();
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].0, "first appeared in");
        assert_eq!(mentions[0].1, vec!["Asia".to_string(), "Europe".to_string()]);
    }

    #[test]
    fn lowercase_places_yield_no_mentions() {
        let mentions =
            extract_location_mentions("it originated in africa somewhere", ORIGIN_PATTERN).unwrap();
        assert!(mentions.is_empty());
    }

    #[test]
    fn broken_pattern_degrades_to_generic_correction() {
        let record = covid_record();
        let corrections = check_locations(
            "It originated in Africa.",
            &record.transmission.from_locations,
            "(unclosed",
            CorrectionCategory::Origin,
        );
        assert_eq!(corrections.len(), 1);
        assert_eq!(corrections[0].claim, "incorrect origin");
        assert!(corrections[0].truth.contains("Asia"));
    }

    #[tokio::test]
    async fn accurate_text_round_trips_unchanged() {
        let checker = FactChecker::new(TextGenerator::Local);
        let record = covid_record();
        let text = "COVID-19 commonly causes fever and cough. It originated in Asia and affects Global.";

        let outcome = checker.check(text, &record).await;
        assert!(outcome.corrections.is_empty());
        assert_eq!(outcome.corrected_text, text);
    }

    #[tokio::test]
    async fn wrong_name_is_rewritten_and_note_appended() {
        let checker = FactChecker::new(TextGenerator::Local);
        let record = covid_record();
        let text = "Patients with COVID-19 Virus report chills.";

        let outcome = checker.check(text, &record).await;
        assert!(outcome
            .corrected_text
            .starts_with("Patients with COVID-19 report chills."));
        assert!(outcome.corrected_text.contains("\n\nuhmm actwaully"));
        assert!(outcome
            .corrections
            .iter()
            .any(|c| c.category == CorrectionCategory::DiseaseName));
        assert!(outcome
            .corrections
            .iter()
            .any(|c| c.category == CorrectionCategory::Symptom && c.claim == "chills"));
    }

    #[test]
    fn composed_note_contains_all_four_corrected_facts() {
        let record = covid_record();
        let corrections = vec![
            Correction::new(CorrectionCategory::DiseaseName, "COVID-19 Virus", "COVID-19"),
            Correction::new(CorrectionCategory::Symptom, "rash", "actual symptoms: cough, fever"),
            Correction::new(CorrectionCategory::Origin, "Africa", "actual origin: Asia"),
            Correction::new(
                CorrectionCategory::AffectedArea,
                "Australia",
                "actual affected area: Global",
            ),
        ];

        let note = local_correction_note(&record, &corrections);
        assert!(note.contains("COVID-19"));
        assert!(note.contains("it's called COVID-19, not COVID-19 Virus"));
        assert!(note.contains("cough, fever"));
        assert!(note.contains("originated from Asia, NOT Africa"));
        assert!(note.contains("affects Global, not just Australia"));
        assert!(note.ends_with("Please check your facts before posting health information!"));
    }

    #[tokio::test]
    async fn empty_corrections_compose_nothing() {
        let checker = FactChecker::new(TextGenerator::Local);
        let record = covid_record();
        assert!(checker.compose_correction(&record, &[]).await.is_none());
    }

    #[test]
    fn correction_prompt_lists_each_error_category() {
        let record = covid_record();
        let corrections = vec![
            Correction::new(CorrectionCategory::Symptom, "rash", "actual symptoms: cough, fever"),
            Correction::new(CorrectionCategory::Origin, "Africa", "actual origin: Asia"),
        ];

        let prompt = build_correction_prompt(&record, &corrections);
        assert!(prompt.contains("frustrated medical expert"));
        assert!(prompt.contains("incorrect symptoms: rash"));
        assert!(prompt.contains("originated in Africa when it actually came from Asia"));
        assert!(!prompt.contains("Someone called it"));
    }
}
