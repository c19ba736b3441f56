use std::env;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneratorMode {
    Local,
    Ollama,
}

#[derive(Clone, Debug)]
pub struct ModelConfig {
    pub generation_model: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub data_dir: PathBuf,
    pub ollama_base_url: String,
    pub generator_mode: GeneratorMode,
    pub models: ModelConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let data_dir = env::var("OUTBREAK_WATCH_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let generator_mode = match env::var("GENERATOR_MODE").as_deref() {
            Ok("ollama") => GeneratorMode::Ollama,
            _ => GeneratorMode::Local,
        };

        Self {
            bind_addr: env::var("OUTBREAK_WATCH_BIND")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            data_dir,
            ollama_base_url: env::var("OLLAMA_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:11434".to_string()),
            generator_mode,
            models: ModelConfig {
                generation_model: env::var("GENERATION_MODEL")
                    .unwrap_or_else(|_| "llama3.2".to_string()),
            },
        }
    }

    pub fn origins_csv(&self) -> PathBuf {
        self.data_dir.join("origins.csv")
    }

    pub fn paths_csv(&self) -> PathBuf {
        self.data_dir.join("paths.csv")
    }
}
