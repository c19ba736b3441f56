use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Static airport reference data for the spread demo. Loaded once at process
/// start; never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct Airport {
    pub name: &'static str,
    pub city: &'static str,
    pub state: &'static str,
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

pub const AIRPORTS: [Airport; 10] = [
    Airport { name: "JFK", city: "New York", state: "NY", lat: 40.6413, lng: -73.7781, kind: "airport" },
    Airport { name: "LAX", city: "Los Angeles", state: "CA", lat: 33.9416, lng: -118.4085, kind: "airport" },
    Airport { name: "ORD", city: "Chicago", state: "IL", lat: 41.9742, lng: -87.9073, kind: "airport" },
    Airport { name: "ATL", city: "Atlanta", state: "GA", lat: 33.6407, lng: -84.4277, kind: "airport" },
    Airport { name: "DFW", city: "Dallas", state: "TX", lat: 32.8998, lng: -97.0403, kind: "airport" },
    Airport { name: "DEN", city: "Denver", state: "CO", lat: 39.8561, lng: -104.6737, kind: "airport" },
    Airport { name: "SFO", city: "San Francisco", state: "CA", lat: 37.6213, lng: -122.3790, kind: "airport" },
    Airport { name: "SEA", city: "Seattle", state: "WA", lat: 47.4502, lng: -122.3088, kind: "airport" },
    Airport { name: "MIA", city: "Miami", state: "FL", lat: 25.7959, lng: -80.2871, kind: "airport" },
    Airport { name: "BOS", city: "Boston", state: "MA", lat: 42.3656, lng: -71.0096, kind: "airport" },
];

const DISEASE_PREFIXES: [&str; 6] = ["Flu", "Virus", "Strain", "Pathogen", "Contagion", "Blight"];
const DISEASE_SUFFIXES: [&str; 10] = [
    "Alpha", "Beta", "Gamma", "Delta", "Zeta", "Omega", "X", "Prime", "7", "9",
];
const DISEASE_COLORS: [&str; 12] = [
    "#FF0000", "#0000FF", "#00FF00", "#FFFF00", "#FF00FF", "#00FFFF", "#FFA500", "#800080",
    "#FFFFFF", "#008000", "#FFC0CB", "#4682B4",
];

pub fn random_disease_name() -> String {
    let mut rng = rand::thread_rng();
    let prefix = DISEASE_PREFIXES.choose(&mut rng).unwrap_or(&"Virus");
    let suffix = DISEASE_SUFFIXES.choose(&mut rng).unwrap_or(&"X");
    format!("{prefix} {suffix}")
}

pub fn random_disease_color() -> String {
    let mut rng = rand::thread_rng();
    DISEASE_COLORS
        .choose(&mut rng)
        .unwrap_or(&"#FF0000")
        .to_string()
}

/// One outbreak-start record in `origins.csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginRow {
    pub instance_id: String,
    pub disease_name: String,
    pub origin_airport: String,
    pub timestamp: DateTime<Utc>,
}

/// One spread-hop record in `paths.csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HopRow {
    pub instance_id: String,
    pub timestamp: DateTime<Utc>,
    pub location_name: String,
    pub location_type: String,
    pub lat: f64,
    pub lng: f64,
}

/// Append-only CSV store for outbreak starts and spread hops. Write-only from
/// this process; the visualization frontend consumes the files directly.
#[derive(Clone)]
pub struct OutbreakLog {
    origins_path: PathBuf,
    paths_path: PathBuf,
}

impl OutbreakLog {
    pub fn new(origins_path: PathBuf, paths_path: PathBuf) -> Self {
        Self {
            origins_path,
            paths_path,
        }
    }

    pub fn log_origin(&self, row: &OriginRow) -> Result<()> {
        append_row(&self.origins_path, row)
    }

    pub fn log_hop(&self, row: &HopRow) -> Result<()> {
        append_row(&self.paths_path, row)
    }
}

fn append_row<T: Serialize>(path: &PathBuf, row: &T) -> Result<()> {
    let is_new = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open csv log {}", path.display()))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(is_new)
        .from_writer(file);
    writer
        .serialize(row)
        .with_context(|| format!("failed to append csv row to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to flush csv log {}", path.display()))?;
    Ok(())
}
