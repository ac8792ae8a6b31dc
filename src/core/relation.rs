// =============================================================================
// RELATION — Une table immuable, indexée par une colonne clé
// =============================================================================
//
// Une Relation, c'est :
//   - un NOM (pour les messages et les logs)
//   - une COLONNE CLÉ dont les valeurs sont uniques et non nulles
//   - des COLONNES typées, ordonnées
//   - des LIGNES, dans l'ordre de la source
//
// EXEMPLE :
//
//   food (clé : food_id)
//   ┌─────────┬──────────┬────────────────┬───────┐
//   │ food_id │ name     │ cuisine_id     │ price │
//   ├─────────┼──────────┼────────────────┼───────┤
//   │ 20      │ Omelette │ breakfast-food │ 8.5   │
//   └─────────┴──────────┴────────────────┴───────┘
//
// IMMUABILITÉ : aucune opération ne modifie une relation en place. Les
// transformations consomment `self` et retournent une nouvelle valeur ;
// une étape qui ne possède pas son entrée la clone d'abord.
//
// L'ordre des lignes est toujours préservé : deux exécutions sur les mêmes
// données donnent exactement la même sortie.
//
// =============================================================================

use std::collections::HashMap;
use std::fmt;

use super::error::{PipelineError, Result};
use super::schema::Column;
use super::typeside::{BaseType, JoinKey, Value};

/// Une ligne : sa clé et ses valeurs, alignées sur les colonnes.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub key: Value,
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(key: Value, values: Vec<Value>) -> Self {
        Row { key, values }
    }
}

#[derive(Debug, Clone)]
pub struct Relation {
    name: String,
    key: Column,
    columns: Vec<Column>,
    rows: Vec<Row>,
    /// clé → position de la ligne
    index: HashMap<JoinKey, usize>,
}

impl PartialEq for Relation {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.key == other.key
            && self.columns == other.columns
            && self.rows == other.rows
    }
}

impl Relation {
    /// Construit une relation en vérifiant ses invariants :
    /// noms de colonnes uniques, largeur des lignes, clés uniques et non nulles.
    pub fn new(name: &str, key: Column, columns: Vec<Column>, rows: Vec<Row>) -> Result<Self> {
        let mut seen = HashMap::new();
        for (i, col) in std::iter::once(&key).chain(columns.iter()).enumerate() {
            if let Some(prev) = seen.insert(col.name.as_str(), i) {
                return Err(PipelineError::schema(
                    name,
                    format!("colonne '{}' dupliquée (positions {} et {})", col.name, prev, i),
                ));
            }
        }

        let mut index = HashMap::with_capacity(rows.len());
        for (pos, row) in rows.iter().enumerate() {
            if row.values.len() != columns.len() {
                return Err(PipelineError::schema(
                    name,
                    format!(
                        "ligne {} : {} valeurs pour {} colonnes",
                        pos,
                        row.values.len(),
                        columns.len()
                    ),
                ));
            }
            let jk = row.key.join_key().ok_or_else(|| {
                PipelineError::schema(name, format!("ligne {} : clé '{}' nulle", pos, key.name))
            })?;
            if index.insert(jk, pos).is_some() {
                return Err(PipelineError::schema(
                    name,
                    format!("clé '{}' dupliquée : {}", key.name, row.key),
                ));
            }
        }

        Ok(Relation {
            name: name.to_string(),
            key,
            columns,
            rows,
            index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &Column {
        &self.key
    }

    pub fn key_name(&self) -> &str {
        &self.key.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Nombre de lignes
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Position d'une colonne, ou MissingColumn
    pub fn require(&self, column: &str) -> Result<usize> {
        self.column_index(column)
            .ok_or_else(|| PipelineError::missing_column(&self.name, column))
    }

    /// Cherche une ligne par sa clé.
    pub fn get(&self, key: &Value) -> Option<&Row> {
        key.join_key()
            .and_then(|jk| self.index.get(&jk))
            .map(|&pos| &self.rows[pos])
    }

    /// Lit une cellule : ligne identifiée par sa clé, colonne par son nom.
    pub fn value(&self, key: &Value, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.get(key).map(|row| &row.values[idx])
    }

    /// Toutes les valeurs d'une colonne, dans l'ordre des lignes.
    pub fn column_values(&self, column: &str) -> Result<Vec<&Value>> {
        let idx = self.require(column)?;
        Ok(self.rows.iter().map(|r| &r.values[idx]).collect())
    }

    // ─── Transformations (consomment self) ──────────────────────────────────

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Renomme des colonnes. Chaque colonne source doit exister.
    pub fn rename_columns(mut self, renames: &[(&str, &str)]) -> Result<Self> {
        for (from, to) in renames {
            let idx = self.require(from)?;
            if *from != *to && (self.has_column(to) || self.key.name == *to) {
                return Err(PipelineError::schema(
                    &self.name,
                    format!("renommage '{}' → '{}' : la colonne cible existe déjà", from, to),
                ));
            }
            self.columns[idx].name = to.to_string();
        }
        Ok(self)
    }

    /// Supprime des colonnes. Chaque colonne doit exister.
    pub fn drop_columns(self, to_drop: &[&str]) -> Result<Self> {
        for col in to_drop {
            self.require(col)?;
        }
        let keep: Vec<String> = self
            .columns
            .iter()
            .filter(|c| !to_drop.contains(&c.name.as_str()))
            .map(|c| c.name.clone())
            .collect();
        let keep: Vec<&str> = keep.iter().map(String::as_str).collect();
        self.select(&keep)
    }

    /// Projette et réordonne : la sortie a exactement ces colonnes, dans cet ordre.
    pub fn select(self, wanted: &[&str]) -> Result<Self> {
        for (i, col) in wanted.iter().enumerate() {
            if wanted[..i].contains(col) {
                return Err(PipelineError::schema(
                    &self.name,
                    format!("colonne '{}' demandée deux fois", col),
                ));
            }
        }
        let positions = wanted
            .iter()
            .map(|c| self.require(c))
            .collect::<Result<Vec<_>>>()?;

        let columns = positions.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .into_iter()
            .map(|row| {
                let values = positions.iter().map(|&i| row.values[i].clone()).collect();
                Row::new(row.key, values)
            })
            .collect();

        Ok(Relation {
            name: self.name,
            key: self.key,
            columns,
            rows,
            index: self.index,
        })
    }

    /// Transforme toutes les cellules d'une colonne, avec un nouveau type.
    pub fn map_column<F>(mut self, column: &str, ty: BaseType, mut f: F) -> Result<Self>
    where
        F: FnMut(&Value) -> Result<Value>,
    {
        let idx = self.require(column)?;
        for row in &mut self.rows {
            row.values[idx] = f(&row.values[idx])?;
        }
        self.columns[idx].ty = ty;
        Ok(self)
    }

    /// Ajoute une colonne dérivée d'une colonne existante.
    pub fn derive_column<F>(mut self, source: &str, new_column: Column, mut f: F) -> Result<Self>
    where
        F: FnMut(&Value) -> Value,
    {
        let idx = self.require(source)?;
        if self.has_column(&new_column.name) || self.key.name == new_column.name {
            return Err(PipelineError::schema(
                &self.name,
                format!("colonne dérivée '{}' déjà présente", new_column.name),
            ));
        }
        for row in &mut self.rows {
            let derived = f(&row.values[idx]);
            row.values.push(derived);
        }
        self.columns.push(new_column);
        Ok(self)
    }

    /// Change la colonne clé : renomme et transforme ses valeurs.
    ///
    /// L'unicité est revérifiée sur les nouvelles valeurs.
    pub fn rekey<F>(self, key: Column, mut f: F) -> Result<Self>
    where
        F: FnMut(&Value) -> Result<Value>,
    {
        let rows = self
            .rows
            .into_iter()
            .map(|row| Ok(Row::new(f(&row.key)?, row.values)))
            .collect::<Result<Vec<_>>>()?;
        Relation::new(&self.name, key, self.columns, rows)
    }

    // ─── Rendu ──────────────────────────────────────────────────────────────

    /// Affiche la relation sous forme de tableau texte (pour le debug et le binaire)
    pub fn display(&self) -> String {
        let headers: Vec<&str> = std::iter::once(self.key.name.as_str())
            .chain(self.columns.iter().map(|c| c.name.as_str()))
            .collect();
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| {
                std::iter::once(&r.key)
                    .chain(r.values.iter())
                    .map(render_cell)
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |items: Vec<&str>| -> String {
            items
                .iter()
                .zip(&widths)
                .map(|(s, w)| format!("{:<width$}", s, width = *w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = format!("{} ({} lignes)\n", self.name, self.rows.len());
        out.push_str(&line(headers.clone()));
        out.push('\n');
        for row in &cells {
            out.push_str(&line(row.iter().map(String::as_str).collect()));
            out.push('\n');
        }
        out
    }
}

fn render_cell(v: &Value) -> String {
    match v {
        Value::Null => "NULL".to_string(),
        other => other.to_plain(),
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn food() -> Relation {
        Relation::new(
            "food",
            Column::new("food_id", BaseType::Integer),
            vec![
                Column::new("name", BaseType::String),
                Column::new("cuisine_id", BaseType::String),
                Column::new("price", BaseType::Integer),
            ],
            vec![
                Row::new(Value::Integer(20), vec!["Omelette".into(), "breakfast-food".into(), Value::Integer(8)]),
                Row::new(Value::Integer(21), vec!["Ramen".into(), "japanese".into(), Value::Integer(12)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_create_relation() {
        let r = food();
        assert_eq!(r.len(), 2);
        assert_eq!(r.column_names(), vec!["name", "cuisine_id", "price"]);
        assert_eq!(r.value(&Value::Integer(21), "name"), Some(&Value::from("Ramen")));
    }

    #[test]
    fn test_lookup_by_integral_float_key() {
        let r = food();
        assert!(r.get(&Value::Float(20.0)).is_some());
        assert!(r.get(&Value::Null).is_none());
    }

    #[test]
    fn test_duplicate_key_is_schema_error() {
        let err = Relation::new(
            "food",
            Column::new("food_id", BaseType::Integer),
            vec![],
            vec![Row::new(Value::Integer(1), vec![]), Row::new(Value::Integer(1), vec![])],
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Schema { .. }));
    }

    #[test]
    fn test_null_key_is_schema_error() {
        let err = Relation::new(
            "food",
            Column::new("food_id", BaseType::Integer),
            vec![],
            vec![Row::new(Value::Null, vec![])],
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Schema { .. }));
    }

    #[test]
    fn test_rename_and_drop() {
        let r = food()
            .rename_columns(&[("cuisine_id", "cuisine")])
            .unwrap()
            .drop_columns(&["price"])
            .unwrap();
        assert_eq!(r.column_names(), vec!["name", "cuisine"]);
        assert_eq!(r.value(&Value::Integer(20), "cuisine"), Some(&Value::from("breakfast-food")));
    }

    #[test]
    fn test_rename_missing_column() {
        let err = food().rename_columns(&[("nope", "x")]).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { .. }));
    }

    #[test]
    fn test_select_reorders() {
        let r = food().select(&["price", "name"]).unwrap();
        assert_eq!(r.column_names(), vec!["price", "name"]);
        assert_eq!(r.rows()[0].values, vec![Value::Integer(8), Value::from("Omelette")]);
    }

    #[test]
    fn test_map_and_derive() {
        let r = food()
            .map_column("price", BaseType::Float, |v| match v {
                Value::Integer(i) => Ok(Value::Float(*i as f64)),
                other => Ok(other.clone()),
            })
            .unwrap()
            .derive_column("price", Column::new("expensive", BaseType::Boolean), |v| {
                Value::Boolean(matches!(v, Value::Float(p) if *p > 10.0))
            })
            .unwrap();
        assert_eq!(r.columns()[2].ty, BaseType::Float);
        assert_eq!(r.value(&Value::Integer(21), "expensive"), Some(&Value::Boolean(true)));
        assert_eq!(r.value(&Value::Integer(20), "expensive"), Some(&Value::Boolean(false)));
    }

    #[test]
    fn test_select_rejects_repeated_column() {
        let err = food().select(&["name", "name"]).unwrap_err();
        assert!(matches!(err, PipelineError::Schema { .. }));
    }

    #[test]
    fn test_derive_rejects_existing_names() {
        let err = food()
            .derive_column("price", Column::new("food_id", BaseType::Integer), |v| v.clone())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Schema { .. }));
        let err = food()
            .derive_column("price", Column::new("name", BaseType::Integer), |v| v.clone())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Schema { .. }));
    }

    #[test]
    fn test_rekey() {
        let r = food()
            .rekey(Column::new("code", BaseType::String), |k| Ok(Value::String(format!("F{}", k))))
            .unwrap();
        assert_eq!(r.key_name(), "code");
        assert!(r.get(&Value::from("F20")).is_some());
    }

    #[test]
    fn test_display() {
        let out = food().display();
        assert!(out.starts_with("food (2 lignes)"));
        assert!(out.contains("Omelette"));
        assert!(out.contains("cuisine_id"));
    }
}
