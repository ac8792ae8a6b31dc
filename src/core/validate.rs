// =============================================================================
// VALIDATE — Vérification des colonnes attendues par chaque étape
// =============================================================================
//
// Deux niveaux :
//   - Avant la réduction : chaque table source doit porter les colonnes que
//     le réducteur consomme. Une absence est une erreur de SCHÉMA (fatale).
//   - Avant l'enrichissement : la table de faits jointe doit porter toutes
//     les colonnes à dériver ou à supprimer. Une absence est une
//     MissingColumn, signe d'un bundle réduit incompatible.
//
// Les références non résolues ne sont PAS vérifiées ici : elles sont
// tolérées par construction (jointures gauches → NULL).
//
// =============================================================================

use super::database::RawDatabase;
use super::error::{PipelineError, Result};
use super::relation::Relation;
use super::schema::columns::*;
use super::schema::TableName;

/// Colonnes consommées par le réducteur, par table source.
pub const REDUCER_REQUIREMENTS: &[(TableName, &[&str])] = &[
    (TableName::Addresses, &[DISTRICT_ID, CITY_ID, STATE_ID, COUNTRY_ID, STREET]),
    (TableName::Districts, &[NAME]),
    (TableName::Cities, &[NAME]),
    (TableName::States, &[NAME]),
    (TableName::Countries, &[NAME]),
    (TableName::Food, &[NAME, CUISINE_ID, PRICE]),
    (TableName::Orders, &[ORDERED_AT]),
    (TableName::Users, &[FIRST_NAME, LAST_NAME, BIRTHDATE_ID, REGISTRED_AT]),
];

/// Vérifie que la base source porte toutes les colonnes du réducteur.
///
/// Collecte TOUTES les absences plutôt que de s'arrêter à la première.
pub fn validate_raw_database(db: &RawDatabase) -> std::result::Result<(), Vec<PipelineError>> {
    let mut errors = Vec::new();

    for (table, required) in REDUCER_REQUIREMENTS {
        let relation = db.get(*table);
        for column in required.iter() {
            if !relation.has_column(column) {
                errors.push(PipelineError::schema(
                    relation.name(),
                    format!("colonne requise '{}' absente", column),
                ));
            }
        }
    }

    for (table, relation) in db.iter() {
        if let Err(e) = check_role_key(table, relation) {
            errors.push(e);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Les tables à rôle ont une clé imposée (`food_id`, `birthdate_id`, `user_id`).
pub fn check_role_key(table: TableName, relation: &Relation) -> Result<()> {
    match table.expected_key() {
        Some(expected) if relation.key_name() != expected => Err(PipelineError::schema(
            relation.name(),
            format!(
                "clé '{}' trouvée, '{}' attendue",
                relation.key_name(),
                expected
            ),
        )),
        _ => Ok(()),
    }
}

/// Vérifie qu'une relation porte chaque colonne ; la première absente
/// donne une MissingColumn.
pub fn require_columns(relation: &Relation, columns: &[&str]) -> Result<()> {
    for column in columns {
        relation.require(column)?;
    }
    Ok(())
}
