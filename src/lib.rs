// =============================================================================
// STARUST — Dénormalisation d'un schéma en étoile en Rust
// =============================================================================
//
// Starust prend une base de livraison de repas en schéma en étoile
// (12 tables : commandes, utilisateurs, plats, adresses et leurs lookups)
// et produit :
//   1. une base RÉDUITE de 6 relations, sans chaînes de lookups
//   2. une table de faits ENRICHIE, prête pour l'analyse
//      (cuisine × type de repas × tranche d'âge)
//
// Architecture :
//   core/    → Le cœur relationnel pur (relations, jointures, réduction)
//   source/  → Chargement des tables (répertoire CSV, mémoire)
//   config   → Configuration (défauts, fichier TOML, environnement)
//
// Pipeline :
//   load_database → reduce_dims → create_orders_by_meal_type_age_cuisine
//
// =============================================================================

pub mod config;
pub mod core;
pub mod source;

pub use crate::core::enrich::create_orders_by_meal_type_age_cuisine;
pub use crate::core::error::{PipelineError, Result};
pub use crate::core::reduce::reduce_dims;
pub use crate::source::{load_database, TableSource};
