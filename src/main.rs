// =============================================================================
// STARUST — Point d'entrée : exécute le pipeline sur un répertoire de CSV
// =============================================================================
//
//   1. Charger la configuration (défauts, fichier, environnement, options)
//   2. Charger les 12 tables
//   3. Réduire les dimensions (6 relations)
//   4. Enrichir la table de faits
//   5. Afficher le résultat
//
// RUST_LOG contrôle le niveau de log (info par défaut).
//
// =============================================================================

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use starust::config::PipelineConfig;
use starust::{create_orders_by_meal_type_age_cuisine, load_database, reduce_dims};

/// Dénormalise une base de livraison de repas en schéma en étoile
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Fichier de configuration TOML
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Répertoire des tables (un fichier par table)
    #[arg(short = 't', long, value_name = "DIR")]
    tables_dir: Option<PathBuf>,

    /// Délimiteur des fichiers CSV
    #[arg(short = 'd', long, value_name = "CHAR")]
    delimiter: Option<String>,

    /// Extension des fichiers de tables
    #[arg(short = 'e', long, value_name = "EXT")]
    extension: Option<String>,

    /// N'affiche que la table de faits enrichie
    #[arg(long)]
    facts_only: bool,
}

impl Args {
    /// Applique les options de la ligne de commande par-dessus la configuration
    fn apply(&self, mut cfg: PipelineConfig) -> PipelineConfig {
        if let Some(dir) = &self.tables_dir {
            cfg.tables_dir = dir.clone();
        }
        if let Some(delimiter) = &self.delimiter {
            cfg.delimiter = delimiter.clone();
        }
        if let Some(extension) = &self.extension {
            cfg.extension = extension.clone();
        }
        cfg
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let cfg = args.apply(
        PipelineConfig::load(args.config.as_deref()).context("lecture de la configuration")?,
    );
    info!(tables_dir = %cfg.tables_dir.display(), "démarrage du pipeline");

    let source = cfg.csv_source()?;
    let raw = load_database(&source)
        .with_context(|| format!("chargement des tables depuis {}", cfg.tables_dir.display()))?;
    let reduced = reduce_dims(&raw).context("réduction dimensionnelle")?;
    let facts = create_orders_by_meal_type_age_cuisine(&reduced).context("enrichissement")?;

    if !args.facts_only {
        for (slot, relation) in reduced.iter() {
            println!("═══ {} ═══", slot);
            println!("{}", relation);
        }
    }
    println!("═══ orders_by_meal_type_age_cuisine ═══");
    println!("{}", facts);
    Ok(())
}
