// =============================================================================
// DATABASE — Les deux « bundles » de relations du pipeline
// =============================================================================
//
//   RawDatabase      : les 12 tables telles que chargées
//   ReducedDatabase  : les 6 relations dénormalisées produites par la réduction
//
// Les champs sont nommés : une table manquante est impossible à construire,
// et l'aiguillage se fait par TableName / Role, pas par position.
//
// =============================================================================

use std::collections::HashMap;

use super::error::{PipelineError, Result};
use super::relation::Relation;
use super::schema::TableName;

/// La base source complète.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDatabase {
    pub addresses: Relation,
    pub birthdates: Relation,
    pub cities: Relation,
    pub countries: Relation,
    pub cuisines: Relation,
    pub districts: Relation,
    pub food: Relation,
    pub orders: Relation,
    pub promos: Relation,
    pub restaurants: Relation,
    pub states: Relation,
    pub users: Relation,
}

/// Retire une table du bundle, ou NotFound.
fn take_table(tables: &mut HashMap<TableName, Relation>, name: TableName) -> Result<Relation> {
    tables.remove(&name).ok_or_else(|| PipelineError::NotFound {
        table: name.to_string(),
        detail: "absente du bundle".into(),
    })
}

impl RawDatabase {
    /// Assemble la base à partir de relations indexées par nom de table.
    ///
    /// Chaque table doit être présente ; les entrées en trop sont ignorées.
    pub fn from_tables(mut tables: HashMap<TableName, Relation>) -> Result<Self> {
        let mut take = |name: TableName| take_table(&mut tables, name);
        Ok(RawDatabase {
            addresses: take(TableName::Addresses)?,
            birthdates: take(TableName::Birthdates)?,
            cities: take(TableName::Cities)?,
            countries: take(TableName::Countries)?,
            cuisines: take(TableName::Cuisines)?,
            districts: take(TableName::Districts)?,
            food: take(TableName::Food)?,
            orders: take(TableName::Orders)?,
            promos: take(TableName::Promos)?,
            restaurants: take(TableName::Restaurants)?,
            states: take(TableName::States)?,
            users: take(TableName::Users)?,
        })
    }

    pub fn get(&self, name: TableName) -> &Relation {
        match name {
            TableName::Addresses => &self.addresses,
            TableName::Birthdates => &self.birthdates,
            TableName::Cities => &self.cities,
            TableName::Countries => &self.countries,
            TableName::Cuisines => &self.cuisines,
            TableName::Districts => &self.districts,
            TableName::Food => &self.food,
            TableName::Orders => &self.orders,
            TableName::Promos => &self.promos,
            TableName::Restaurants => &self.restaurants,
            TableName::States => &self.states,
            TableName::Users => &self.users,
        }
    }

    /// Les 12 tables dans l'ordre de TableName::ALL
    pub fn iter(&self) -> impl Iterator<Item = (TableName, &Relation)> {
        TableName::ALL.into_iter().map(move |name| (name, self.get(name)))
    }

    /// Nombre total de lignes dans toutes les tables
    pub fn total_rows(&self) -> usize {
        self.iter().map(|(_, r)| r.len()).sum()
    }
}

/// La base réduite : six relations, sans chaînes de lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedDatabase {
    pub orders: Relation,
    pub users: Relation,
    pub food: Relation,
    pub promos: Relation,
    pub restaurants: Relation,
    pub addresses: Relation,
}

impl ReducedDatabase {
    /// Assemble la base réduite à partir des six tables exposées.
    ///
    /// Les tables consommées (lookups, birthdates) ne doivent pas y figurer.
    pub fn from_tables(mut tables: HashMap<TableName, Relation>) -> Result<Self> {
        let reduced = ReducedDatabase {
            orders: take_table(&mut tables, TableName::Orders)?,
            users: take_table(&mut tables, TableName::Users)?,
            food: take_table(&mut tables, TableName::Food)?,
            promos: take_table(&mut tables, TableName::Promos)?,
            restaurants: take_table(&mut tables, TableName::Restaurants)?,
            addresses: take_table(&mut tables, TableName::Addresses)?,
        };
        if let Some(extra) = tables.keys().min() {
            return Err(PipelineError::schema(
                extra.as_str(),
                "table consommée par la réduction, pas de slot dans la base réduite",
            ));
        }
        Ok(reduced)
    }

    /// Les six relations, avec leur nom de slot
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Relation)> {
        [
            ("orders", &self.orders),
            ("users", &self.users),
            ("food", &self.food),
            ("promos", &self.promos),
            ("restaurants", &self.restaurants),
            ("addresses", &self.addresses),
        ]
        .into_iter()
    }
}
