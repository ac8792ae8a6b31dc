// =============================================================================
// MEMORY — Source de tables déjà construites
// =============================================================================

use std::collections::HashMap;

use super::TableSource;
use crate::core::error::{PipelineError, Result};
use crate::core::relation::Relation;
use crate::core::schema::TableName;

/// Relations fournies directement par l'appelant (tests, intégrations).
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<TableName, Relation>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute (ou remplace) une table ; retourne &mut Self pour le chaînage
    pub fn insert(&mut self, table: TableName, relation: Relation) -> &mut Self {
        self.tables.insert(table, relation);
        self
    }

    pub fn remove(&mut self, table: TableName) -> Option<Relation> {
        self.tables.remove(&table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl TableSource for MemorySource {
    fn load(&self, table: TableName) -> Result<Relation> {
        self.tables
            .get(&table)
            .cloned()
            .ok_or_else(|| PipelineError::NotFound {
                table: table.to_string(),
                detail: "absente de la source mémoire".into(),
            })
    }

    fn name(&self) -> &str {
        "mémoire"
    }
}
