use anyhow::Result;
use clap::Parser;
use serde_json::json;

use outbreak_watch::config::GeneratorMode;
use outbreak_watch::factcheck::FactChecker;
use outbreak_watch::generator::TextGenerator;
use outbreak_watch::models::DiseaseRecord;
use outbreak_watch::summary::SummaryService;
use outbreak_watch::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "factcheck")]
#[command(about = "Fact-check a post against a disease record, or generate a verified summary")]
struct Cli {
    /// Canonical disease name.
    #[arg(long)]
    disease: String,
    /// Comma-separated true symptoms.
    #[arg(long, default_value = "")]
    symptoms: String,
    /// Comma-separated true origin locations.
    #[arg(long = "from", default_value = "")]
    transmission_from: String,
    /// Comma-separated true affected locations.
    #[arg(long = "to", default_value = "")]
    transmission_to: String,
    /// Text to check. When omitted, a summary is generated and verified.
    #[arg(long)]
    text: Option<String>,
    /// Use the remote Ollama generator instead of the local templates.
    #[arg(long, default_value_t = false)]
    remote: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    if cli.remote {
        config.generator_mode = GeneratorMode::Ollama;
    }

    let record = DiseaseRecord::from_parts(
        cli.disease.clone(),
        &json!(split_list(&cli.symptoms)),
        &json!(split_list(&cli.transmission_from)),
        &json!(split_list(&cli.transmission_to)),
    );

    let generator = TextGenerator::from_config(&config);

    let outcome = match &cli.text {
        Some(text) => FactChecker::new(generator).check(text, &record).await,
        None => {
            SummaryService::new(generator)
                .generate_and_verify(&record)
                .await
        }
    };

    println!("{}", outcome.corrected_text);

    if outcome.corrections.is_empty() {
        println!("\nNo misinformation found.");
    } else {
        println!("\nCorrections ({}):", outcome.corrections.len());
        for correction in &outcome.corrections {
            println!(
                "  [{}] {} -> {}",
                correction.category.as_str(),
                correction.claim,
                correction.truth
            );
        }
    }

    Ok(())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
