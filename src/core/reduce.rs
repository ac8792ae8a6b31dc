// =============================================================================
// REDUCE — Réduction dimensionnelle : 12 tables → 6 relations dénormalisées
// =============================================================================
//
// ┌─────────────────────────────────────────────────────────────────────┐
// │                                                                     │
// │  addresses ⟕ districts ⟕ cities     → name_x/name_y = district/city │
// │            ⟕ states    ⟕ countries  → name_x/name_y = state/country │
// │            − {district,city,state,country}_id                       │
// │            → [country, state, city, district, street]               │
// │                                                                     │
// │  food        : cuisine_id → cuisine (id brut, PAS résolu)           │
// │  orders      : ordered_at texte → Timestamp                         │
// │  birthdates  : re-clé par la date elle-même (consommée, non exposée)│
// │  users       : birthdate_id → birthdate (Date), registred_at → TS   │
// │  promos, restaurants : inchangés                                    │
// │                                                                     │
// └─────────────────────────────────────────────────────────────────────┘
//
// ORDRE : les deux paires de jointures géographiques réutilisent la même
// colonne ambiguë `name`. La paire district/city doit être jointe ET
// renommée avant la paire state/country, sinon les suffixes entrent en
// collision.
//
// Chaque fonction part d'un clone de sa table source : la base brute n'est
// jamais modifiée, et relancer la réduction donne la même sortie.
//
// =============================================================================

use std::collections::HashMap;

use tracing::{debug, error, info, warn};

use super::database::{RawDatabase, ReducedDatabase};
use super::error::{PipelineError, Result};
use super::join::{left_join, LEFT_SUFFIX, RIGHT_SUFFIX};
use super::relation::Relation;
use super::schema::columns::*;
use super::schema::{Column, Role, TableName};
use super::typeside::{
    parse_date, parse_timestamp, BaseType, Value, BIRTHDATE_FORMAT, TIMESTAMP_FORMAT_LABEL,
};
use super::validate::validate_raw_database;

/// Point d'entrée : réduit la base brute.
pub fn reduce_dims(db: &RawDatabase) -> Result<ReducedDatabase> {
    if let Err(mut errors) = validate_raw_database(db) {
        for e in &errors {
            error!("{}", e);
        }
        return Err(errors.remove(0));
    }

    // Aiguillage des 12 tables selon leur rôle
    let mut slots = HashMap::new();
    for table in TableName::ALL {
        if let Some(reduced) = reduce_table(db, table)? {
            slots.insert(table, reduced);
        }
    }

    let reduced = ReducedDatabase::from_tables(slots)?;
    info!(
        addresses = reduced.addresses.len(),
        food = reduced.food.len(),
        users = reduced.users.len(),
        orders = reduced.orders.len(),
        "réduction dimensionnelle terminée"
    );
    Ok(reduced)
}

/// Réduit une table selon son rôle ; `None` pour les tables consommées
/// par une autre (lookups, birthdates).
fn reduce_table(db: &RawDatabase, table: TableName) -> Result<Option<Relation>> {
    let relation = db.get(table);
    let reduced = match table.role() {
        Role::Address => reduce_addresses(db)?,
        Role::Lookup => return Ok(None),
        Role::Birthdate => {
            match rekey_birthdates(relation) {
                Ok(rekeyed) => {
                    debug!(rows = rekeyed.len(), "birthdates re-clées par date, non exposées")
                }
                // Relation non exposée : des dates en double ne bloquent pas la réduction
                Err(PipelineError::Schema { relation, detail }) => {
                    warn!(%relation, %detail, "re-clé des birthdates impossible")
                }
                Err(e) => return Err(e),
            }
            return Ok(None);
        }
        Role::Food => reduce_food(relation)?,
        Role::Fact => reduce_orders(relation)?,
        Role::User => reduce_users(relation)?,
        Role::Promo | Role::Restaurant => relation.clone(),
    };
    Ok(Some(reduced))
}

// ─── Adresses ────────────────────────────────────────────────────────────────

/// Joint deux lookups successifs et renomme la paire ambiguë `name_x`/`name_y`.
fn join_lookup_pair(
    base: &Relation,
    first: (&str, &Relation, &str),
    second: (&str, &Relation, &str),
) -> Result<Relation> {
    let (first_on, first_lookup, first_as) = first;
    let (second_on, second_lookup, second_as) = second;

    let step = left_join(base, first_on, first_lookup)?.into_logged();
    let step = left_join(&step, second_on, second_lookup)?.into_logged();

    let name_x = format!("{}{}", NAME, LEFT_SUFFIX);
    let name_y = format!("{}{}", NAME, RIGHT_SUFFIX);
    step.rename_columns(&[(name_x.as_str(), first_as), (name_y.as_str(), second_as)])
}

/// Résout la chaîne géographique d'une adresse.
pub fn reduce_addresses(db: &RawDatabase) -> Result<Relation> {
    let step = join_lookup_pair(
        &db.addresses,
        (DISTRICT_ID, &db.districts, DISTRICT),
        (CITY_ID, &db.cities, CITY),
    )?;
    let step = join_lookup_pair(
        &step,
        (STATE_ID, &db.states, STATE),
        (COUNTRY_ID, &db.countries, COUNTRY),
    )?;

    let reduced = step
        .drop_columns(&[DISTRICT_ID, CITY_ID, STATE_ID, COUNTRY_ID])?
        .select(&REDUCED_ADDRESS)?;
    debug!(columns = ?reduced.column_names(), "adresses réduites");
    Ok(reduced)
}

// ─── Food ────────────────────────────────────────────────────────────────────

/// Renomme `cuisine_id` en `cuisine` (l'id brut est conservé tel quel) et
/// force `price` en flottant.
pub fn reduce_food(food: &Relation) -> Result<Relation> {
    let name = food.name().to_string();
    food.clone()
        .rename_columns(&[(CUISINE_ID, CUISINE)])?
        .map_column(PRICE, BaseType::Float, |v| coerce_float(&name, v))
}

fn coerce_float(relation: &str, v: &Value) -> Result<Value> {
    match v {
        Value::Float(_) | Value::Null => Ok(v.clone()),
        Value::Integer(i) => Ok(Value::Float(*i as f64)),
        Value::String(s) => s.trim().parse().map(Value::Float).map_err(|_| {
            PipelineError::schema(relation, format!("{} : '{}' n'est pas un nombre", PRICE, s))
        }),
        other => Err(PipelineError::schema(
            relation,
            format!("{} : {} n'est pas un nombre", PRICE, other),
        )),
    }
}

// ─── Orders ──────────────────────────────────────────────────────────────────

/// Parse `ordered_at` en timestamp ; aucune jointure ici.
pub fn reduce_orders(orders: &Relation) -> Result<Relation> {
    let name = orders.name().to_string();
    orders
        .clone()
        .map_column(ORDERED_AT, BaseType::Timestamp, |v| {
            to_timestamp(&name, ORDERED_AT, v)
        })
}

/// Convertit une cellule en Timestamp (idempotent sur un Timestamp).
pub fn to_timestamp(relation: &str, column: &str, v: &Value) -> Result<Value> {
    match v {
        Value::Timestamp(_) | Value::Null => Ok(v.clone()),
        Value::Date(d) => Ok(d.and_hms_opt(0, 0, 0).map_or(Value::Null, Value::Timestamp)),
        Value::String(s) => parse_timestamp(s)
            .map(Value::Timestamp)
            .ok_or_else(|| date_error(relation, column, v, TIMESTAMP_FORMAT_LABEL)),
        other => Err(date_error(relation, column, other, TIMESTAMP_FORMAT_LABEL)),
    }
}

/// Convertit une cellule en Date `jour/mois/année` (idempotent sur une Date).
pub fn to_date(relation: &str, column: &str, v: &Value) -> Result<Value> {
    match v {
        Value::Date(_) | Value::Null => Ok(v.clone()),
        Value::Timestamp(ts) => Ok(Value::Date(ts.date())),
        Value::String(s) => parse_date(s)
            .map(Value::Date)
            .ok_or_else(|| date_error(relation, column, v, BIRTHDATE_FORMAT)),
        other => Err(date_error(relation, column, other, BIRTHDATE_FORMAT)),
    }
}

fn date_error(relation: &str, column: &str, v: &Value, format: &str) -> PipelineError {
    PipelineError::DateParse {
        relation: relation.to_string(),
        column: column.to_string(),
        value: v.to_plain(),
        format: format.to_string(),
    }
}

// ─── Birthdates & Users ──────────────────────────────────────────────────────

/// Re-clé la table des dates de naissance par la date elle-même.
///
/// Suppose que les dates sont uniques, ce que le schéma source ne garantit
/// pas : un doublon donne une erreur de schéma, que `reduce_dims` se contente
/// de journaliser.
pub fn rekey_birthdates(birthdates: &Relation) -> Result<Relation> {
    let name = birthdates.name().to_string();
    birthdates.clone().rekey(Column::new(BIRTHDATE, BaseType::Date), |k| {
        to_date(&name, BIRTHDATE_ID, k)
    })
}

/// `birthdate_id` → `birthdate` (Date), `registred_at` → Timestamp.
pub fn reduce_users(users: &Relation) -> Result<Relation> {
    let name = users.name().to_string();
    users
        .clone()
        .rename_columns(&[(BIRTHDATE_ID, BIRTHDATE)])?
        .map_column(BIRTHDATE, BaseType::Date, |v| to_date(&name, BIRTHDATE, v))?
        .map_column(REGISTRED_AT, BaseType::Timestamp, |v| {
            to_timestamp(&name, REGISTRED_AT, v)
        })
}
