// =============================================================================
// SOURCE — Chargement des tables sources
// =============================================================================
//
// Une source sait produire une Relation pour chacune des 12 tables connues.
// Grâce au trait TableSource, on peut charger :
//   - un répertoire de fichiers CSV (CsvDirSource)
//   - des relations déjà construites en mémoire (MemorySource)
//
// Le cœur (module core) ne connaît JAMAIS les sources : il reçoit une
// RawDatabase complète. C'est load_database qui fait le pont.
//
// =============================================================================

pub mod csv_dir;
pub mod memory;

pub use self::csv_dir::CsvDirSource;
pub use self::memory::MemorySource;

use std::collections::HashMap;

use tracing::{debug, info};

use crate::core::database::RawDatabase;
use crate::core::error::Result;
use crate::core::relation::Relation;
use crate::core::schema::TableName;
use crate::core::validate::check_role_key;

/// Trait abstrait pour toutes les sources de tables.
pub trait TableSource {
    /// Charge une table. Une table absente de la source donne `NotFound`.
    fn load(&self, table: TableName) -> Result<Relation>;

    /// Retourne le nom de la source (pour les logs)
    fn name(&self) -> &str;
}

/// Charge les 12 tables et vérifie les clés imposées par leur rôle.
pub fn load_database(source: &dyn TableSource) -> Result<RawDatabase> {
    let mut tables = HashMap::with_capacity(TableName::ALL.len());
    for table in TableName::ALL {
        let relation = source.load(table)?;
        check_role_key(table, &relation)?;
        debug!(
            table = %table,
            rows = relation.len(),
            key = relation.key_name(),
            "table chargée"
        );
        tables.insert(table, relation);
    }

    let db = RawDatabase::from_tables(tables)?;
    info!(source = source.name(), rows = db.total_rows(), "base source chargée");
    Ok(db)
}
