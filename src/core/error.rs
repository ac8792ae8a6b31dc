// =============================================================================
// ERROR — La taxonomie des erreurs du pipeline
// =============================================================================
//
// Deux familles d'erreurs :
//   - PipelineError : toujours fatale, elle interrompt l'invocation courante
//       NotFound, Schema, MissingColumn, DateParse (+ I/O, CSV, config)
//   - JoinKeyError : une clé de jointure qui ne se résout pas. Jamais
//       retournée comme erreur : la jointure la rapporte à côté de son
//       résultat (JoinOutcome), la ligne garde des attributs NULL et
//       l'événement est journalisé au niveau `warn`.
//
// Aucune sémantique de rollback : chaque étape est une transformation pure
// de son entrée complète, donc rien n'est à moitié écrit quand on échoue.
//
// =============================================================================

use thiserror::Error;

use super::typeside::Value;

/// Résultat standard du pipeline.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Une référence qui ne trouve pas sa ligne dans la table de lookup.
///
/// Ce n'est jamais fatal : la jointure gauche conserve la ligne et remplit
/// les colonnes de droite avec NULL.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{relation}.{column} = {key} : aucune ligne correspondante dans '{lookup}'")]
pub struct JoinKeyError {
    /// Relation de gauche (celle qui porte la référence)
    pub relation: String,
    /// Colonne de jointure côté gauche
    pub column: String,
    /// Valeur de la clé non résolue
    pub key: Value,
    /// Relation de lookup interrogée
    pub lookup: String,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("table '{table}' introuvable : {detail}")]
    NotFound { table: String, detail: String },

    #[error("schéma invalide pour '{relation}' : {detail}")]
    Schema { relation: String, detail: String },

    #[error("colonne '{column}' absente de '{relation}'")]
    MissingColumn { relation: String, column: String },

    #[error("{relation}.{column} : '{value}' ne respecte pas le format {format}")]
    DateParse {
        relation: String,
        column: String,
        value: String,
        format: String,
    },

    #[error("configuration invalide : {0}")]
    Config(String),

    #[error("erreur I/O : {0}")]
    Io(#[from] std::io::Error),

    #[error("erreur CSV : {0}")]
    Csv(#[from] csv::Error),
}

impl PipelineError {
    pub fn schema(relation: &str, detail: impl Into<String>) -> Self {
        PipelineError::Schema {
            relation: relation.to_string(),
            detail: detail.into(),
        }
    }

    pub fn missing_column(relation: &str, column: &str) -> Self {
        PipelineError::MissingColumn {
            relation: relation.to_string(),
            column: column.to_string(),
        }
    }
}

impl From<config::ConfigError> for PipelineError {
    fn from(e: config::ConfigError) -> Self {
        PipelineError::Config(e.to_string())
    }
}
