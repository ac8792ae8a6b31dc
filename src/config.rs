// =============================================================================
// CONFIG — Configuration du pipeline
// =============================================================================
//
// Trois couches, la dernière gagne :
//
//   1. valeurs par défaut      tables_dir = "tables", delimiter = ",", extension = "csv"
//   2. fichier TOML optionnel  (--config chemin.toml)
//   3. variables d'environnement préfixées STARUST_  (STARUST_TABLES_DIR=...)
//
// Les options de la ligne de commande sont appliquées ensuite par le binaire.
//
// =============================================================================

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::core::error::{PipelineError, Result};
use crate::source::CsvDirSource;

pub const ENV_PREFIX: &str = "STARUST";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Répertoire contenant un fichier par table
    pub tables_dir: PathBuf,
    pub delimiter: String,
    pub extension: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            tables_dir: PathBuf::from("tables"),
            delimiter: ",".to_string(),
            extension: "csv".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Charge la configuration : défauts, puis fichier optionnel, puis environnement.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_layers(path, ENV_PREFIX)
    }

    fn load_layers(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let cfg = builder
            .add_source(Environment::with_prefix(env_prefix))
            .build()?;
        let loaded: PipelineConfig = cfg.try_deserialize()?;
        loaded.delimiter_byte()?;
        Ok(loaded)
    }

    /// Le délimiteur, qui doit être un unique caractère ASCII.
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(PipelineError::Config(format!(
                "délimiteur '{}' invalide : un seul caractère ASCII attendu",
                self.delimiter
            ))),
        }
    }

    /// Construit la source CSV décrite par cette configuration.
    pub fn csv_source(&self) -> Result<CsvDirSource> {
        Ok(CsvDirSource::new(&self.tables_dir)
            .with_delimiter(self.delimiter_byte()?)
            .with_extension(&self.extension))
    }
}
