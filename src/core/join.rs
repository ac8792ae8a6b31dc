// =============================================================================
// JOIN — Jointure gauche d'une relation contre une table de lookup
// =============================================================================
//
// La seule jointure dont le pipeline a besoin :
//
//   left ⟕ right  ON  left.<colonne> = right.<clé>
//
//   - Toutes les lignes de gauche sont conservées, dans leur ordre
//     (cardinalité préservée, jamais de ligne perdue ni dupliquée :
//      la clé de droite est unique).
//   - Les colonnes de droite (hors clé) sont ajoutées à la fin.
//   - Une référence non résolue donne des NULL et un JoinKeyError
//     dans le rapport ; une référence NULL donne des NULL sans rapport.
//
// COLLISIONS DE NOMS :
//   Si une colonne existe des deux côtés, celle de gauche devient `<nom>_x`
//   et celle de droite `<nom>_y`. C'est ainsi que deux lookups successifs
//   portant chacun une colonne `name` produisent `name_x` / `name_y`, que
//   l'appelant renomme ensuite.
//
// =============================================================================

use tracing::warn;

use super::error::{JoinKeyError, Result};
use super::relation::{Relation, Row};
use super::schema::Column;
use super::typeside::Value;

pub const LEFT_SUFFIX: &str = "_x";
pub const RIGHT_SUFFIX: &str = "_y";

/// Résultat d'une jointure : la relation produite et les clés non résolues.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub relation: Relation,
    pub unmatched: Vec<JoinKeyError>,
}

impl JoinOutcome {
    /// Journalise chaque clé non résolue et retourne la relation.
    pub fn into_logged(self) -> Relation {
        for miss in &self.unmatched {
            warn!(
                relation = %miss.relation,
                column = %miss.column,
                lookup = %miss.lookup,
                key = %miss.key,
                "clé de jointure non résolue, attributs NULL"
            );
        }
        self.relation
    }
}

/// Jointure gauche de `left` sur sa colonne `left_on` contre la clé de `right`.
pub fn left_join(left: &Relation, left_on: &str, right: &Relation) -> Result<JoinOutcome> {
    let on_idx = left.require(left_on)?;

    // Résolution des collisions de noms ; un nom suffixé déjà pris est
    // rejeté par Relation::new
    let mut left_columns: Vec<Column> = left.columns().to_vec();
    let mut right_columns: Vec<Column> = right.columns().to_vec();
    for rc in right_columns.iter_mut() {
        if let Some(lc) = left_columns.iter_mut().find(|lc| lc.name == rc.name) {
            lc.name = format!("{}{}", lc.name, LEFT_SUFFIX);
            rc.name = format!("{}{}", rc.name, RIGHT_SUFFIX);
        }
    }
    let width = right_columns.len();
    let mut unmatched = Vec::new();
    let rows = left
        .rows()
        .iter()
        .map(|row| {
            let reference = &row.values[on_idx];
            let mut values = row.values.clone();
            match right.get(reference) {
                Some(found) => values.extend(found.values.iter().cloned()),
                None => {
                    if !reference.is_null() {
                        unmatched.push(JoinKeyError {
                            relation: left.name().to_string(),
                            column: left_on.to_string(),
                            key: reference.clone(),
                            lookup: right.name().to_string(),
                        });
                    }
                    values.extend(std::iter::repeat(Value::Null).take(width));
                }
            }
            Row::new(row.key.clone(), values)
        })
        .collect();

    left_columns.extend(right_columns);
    let relation = Relation::new(left.name(), left.key().clone(), left_columns, rows)?;
    Ok(JoinOutcome { relation, unmatched })
}
