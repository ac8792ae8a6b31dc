// =============================================================================
// CORE — Module principal du cœur relationnel
// =============================================================================
//
// Ce module regroupe toute la logique pure du pipeline :
// pas de fichiers ni de configuration, uniquement des relations,
// des jointures et des transformations de colonnes.
//
// Architecture :
//   typeside  → les valeurs et types primitifs (String, Integer, Date...)
//   schema    → les noms de tables, leurs rôles et les noms de colonnes
//   error     → la taxonomie d'erreurs du pipeline
//   relation  → une table immuable indexée par sa clé
//   join      → la jointure gauche avec suffixes _x / _y
//   database  → les bundles RawDatabase (12 tables) et ReducedDatabase (6)
//   validate  → la vérification des colonnes attendues
//   reduce    → la réduction dimensionnelle (DimensionReducer)
//   enrich    → l'enrichissement de la table de faits (FactEnricher)
//
// =============================================================================

pub mod typeside;
pub mod schema;
pub mod error;
pub mod relation;
pub mod join;
pub mod database;
pub mod validate;
pub mod reduce;
pub mod enrich;
