// =============================================================================
// CSV_DIR — Tables lues depuis un répertoire de fichiers CSV
// =============================================================================
//
// Chaque table `<nom>` est lue depuis `<dir>/<nom>.<extension>`.
//
//   food.csv
//   ┌──────────────────────────────────────┐
//   │ food_id,name,cuisine_id,price        │  ← 1re colonne = clé
//   │ 20,Omelette,breakfast-food,8.5       │
//   │ 21,Ramen,japanese,                   │  ← cellule vide = NULL
//   └──────────────────────────────────────┘
//
// Le type de chaque colonne est inféré sur TOUTES ses cellules
// (voir typeside::infer_type), puis chaque cellule est convertie.
//
// =============================================================================

use std::path::{Path, PathBuf};

use csv::{ErrorKind, ReaderBuilder};
use tracing::debug;

use super::TableSource;
use crate::core::error::{PipelineError, Result};
use crate::core::relation::{Relation, Row};
use crate::core::schema::{Column, TableName};
use crate::core::typeside::{infer_type, parse_cell, Value};

#[derive(Debug, Clone)]
pub struct CsvDirSource {
    dir: PathBuf,
    delimiter: u8,
    extension: String,
}

impl CsvDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CsvDirSource {
            dir: dir.into(),
            delimiter: b',',
            extension: "csv".to_string(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Chemin du fichier d'une table
    pub fn path_of(&self, table: TableName) -> PathBuf {
        self.dir
            .join(table.as_str())
            .with_extension(&self.extension)
    }

    fn read(&self, table: TableName, path: &Path) -> Result<Relation> {
        let name = table.as_str();
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_path(path)?;

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.is_empty() || headers.iter().any(String::is_empty) {
            return Err(PipelineError::schema(name, "en-tête vide ou colonne sans nom"));
        }

        // Lecture brute, colonne par colonne
        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                if matches!(e.kind(), ErrorKind::UnequalLengths { .. }) {
                    PipelineError::schema(
                        name,
                        format!("ligne {} : nombre de champs différent de l'en-tête", line + 2),
                    )
                } else {
                    PipelineError::from(e)
                }
            })?;
            for (column, field) in cells.iter_mut().zip(record.iter()) {
                column.push(field.to_string());
            }
        }

        let types: Vec<_> = cells
            .iter()
            .map(|column| infer_type(column.iter().map(String::as_str)))
            .collect();
        let row_count = cells[0].len();
        let rows = (0..row_count)
            .map(|i| {
                let mut values = cells
                    .iter()
                    .zip(&types)
                    .map(|(column, ty)| parse_cell(&column[i], *ty));
                // `headers` n'est jamais vide ici : la clé existe toujours
                let key = values.next().unwrap_or(Value::Null);
                Row::new(key, values.collect())
            })
            .collect();

        let mut columns = headers
            .iter()
            .zip(&types)
            .map(|(h, ty)| Column::new(h, *ty));
        let key = columns
            .next()
            .ok_or_else(|| PipelineError::schema(name, "aucune colonne clé"))?;

        debug!(table = name, path = %path.display(), rows = row_count, "CSV lu");
        Relation::new(name, key, columns.collect(), rows)
    }
}

impl TableSource for CsvDirSource {
    fn load(&self, table: TableName) -> Result<Relation> {
        let path = self.path_of(table);
        if !path.is_file() {
            return Err(PipelineError::NotFound {
                table: table.to_string(),
                detail: format!("fichier {} introuvable", path.display()),
            });
        }
        self.read(table, &path)
    }

    fn name(&self) -> &str {
        "csv"
    }
}
