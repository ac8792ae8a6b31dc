// =============================================================================
// ENRICH — Enrichissement de la table de faits
// =============================================================================
//
// À partir de la base réduite :
//
//   orders ⟕ food  ON food_id
//          ⟕ users ON user_id
//          + meal_type  ← heure de ordered_at
//          + user_age   ← année de birthdate
//          cuisine → food_cuisine
//          − ids, ordered_at, birthdate, registred_at, name, price, noms
//
// BUCKETS (évalués dans cet ordre, le premier qui s'applique gagne) :
//
//   meal_type   heure ∈ [6, 10)  → breakfast
//               heure ∈ [10, 16] → lunch     (borne haute INCLUSE)
//               sinon / NULL     → dinner
//
//   user_age    année ≥ 1995        → young
//               1970 ≤ année < 1995 → adult
//               sinon / NULL        → old
//
// =============================================================================

use std::fmt;

use chrono::Datelike;
use tracing::{debug, info};

use super::database::ReducedDatabase;
use super::error::Result;
use super::join::left_join;
use super::reduce::{to_date, to_timestamp};
use super::relation::Relation;
use super::schema::columns::*;
use super::schema::Column;
use super::typeside::{BaseType, Value};
use super::validate::require_columns;

/// Colonnes retirées de la table de faits enrichie.
pub const DROPPED_COLUMNS: [&str; 12] = [
    USER_ID,
    ADDRESS_ID,
    RESTAURANT_ID,
    FOOD_ID,
    ORDERED_AT,
    PROMO_ID,
    NAME,
    PRICE,
    FIRST_NAME,
    LAST_NAME,
    BIRTHDATE,
    REGISTRED_AT,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    /// Bucket d'une heure du jour ; une heure inconnue donne `Dinner`.
    pub fn from_hour(hour: Option<u32>) -> Self {
        match hour {
            Some(h) if (6..10).contains(&h) => MealType::Breakfast,
            Some(h) if (10..=16).contains(&h) => MealType::Lunch,
            _ => MealType::Dinner,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserAge {
    Young,
    Adult,
    Old,
}

impl UserAge {
    /// Bucket d'une année de naissance ; une année inconnue donne `Old`.
    pub fn from_year(year: Option<i32>) -> Self {
        match year {
            Some(y) if y >= 1995 => UserAge::Young,
            Some(y) if (1970..1995).contains(&y) => UserAge::Adult,
            _ => UserAge::Old,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserAge::Young => "young",
            UserAge::Adult => "adult",
            UserAge::Old => "old",
        }
    }
}

impl fmt::Display for UserAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Construit la table de faits enrichie.
pub fn create_orders_by_meal_type_age_cuisine(db: &ReducedDatabase) -> Result<Relation> {
    let step = left_join(&db.orders, FOOD_ID, &db.food)?.into_logged();
    let step = left_join(&step, USER_ID, &db.users)?.into_logged();

    // Tout ce qui sera dérivé, renommé ou supprimé doit être là
    require_columns(&step, &DROPPED_COLUMNS)?;
    require_columns(&step, &[CUISINE])?;

    let name = step.name().to_string();
    let enriched = step
        .map_column(ORDERED_AT, BaseType::Timestamp, |v| {
            to_timestamp(&name, ORDERED_AT, v)
        })?
        .derive_column(ORDERED_AT, Column::new(MEAL_TYPE, BaseType::String), |v| {
            Value::from(MealType::from_hour(v.hour()).as_str())
        })?
        .map_column(BIRTHDATE, BaseType::Date, |v| to_date(&name, BIRTHDATE, v))?
        .derive_column(BIRTHDATE, Column::new(USER_AGE, BaseType::String), |v| {
            let year = match v {
                Value::Date(d) => Some(d.year()),
                _ => None,
            };
            Value::from(UserAge::from_year(year).as_str())
        })?
        .rename_columns(&[(CUISINE, FOOD_CUISINE)])?
        .drop_columns(&DROPPED_COLUMNS)?;

    debug!(columns = ?enriched.column_names(), "table de faits enrichie");
    info!(rows = enriched.len(), "enrichissement terminé");
    Ok(enriched)
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::PipelineError;
    use crate::core::relation::Row;
    use crate::core::typeside::parse_timestamp;
    use chrono::NaiveDate;

    fn ts(text: &str) -> Value {
        Value::Timestamp(parse_timestamp(text).unwrap())
    }

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn relation(name: &str, key: &str, cols: &[&str], rows: Vec<(i64, Vec<Value>)>) -> Relation {
        Relation::new(
            name,
            Column::new(key, BaseType::Integer),
            cols.iter().map(|c| Column::new(c, BaseType::String)).collect(),
            rows.into_iter()
                .map(|(k, v)| Row::new(Value::Integer(k), v))
                .collect(),
        )
        .unwrap()
    }

    fn empty(name: &str, key: &str) -> Relation {
        relation(name, key, &[], vec![])
    }

    fn order(user: i64, food: i64, at: &str) -> Vec<Value> {
        vec![
            Value::Integer(user),
            Value::Integer(5),
            Value::Integer(3),
            Value::Integer(food),
            Value::Null,
            ts(at),
        ]
    }

    fn reduced(orders: Vec<(i64, Vec<Value>)>) -> ReducedDatabase {
        ReducedDatabase {
            orders: relation(
                "orders",
                "order_id",
                &["user_id", "address_id", "restaurant_id", "food_id", "promo_id", "ordered_at"],
                orders,
            ),
            food: relation(
                "food",
                "food_id",
                &["name", "cuisine", "price"],
                vec![(20, vec!["Omelette".into(), "breakfast-food".into(), Value::Float(8.5)])],
            ),
            users: relation(
                "users",
                "user_id",
                &["first_name", "last_name", "birthdate", "registred_at"],
                vec![
                    (10, vec!["A".into(), "B".into(), date(1998, 3, 15), ts("2020-01-01T00:00:00")]),
                    (11, vec!["C".into(), "D".into(), date(1994, 12, 31), ts("2020-01-01T00:00:00")]),
                    (12, vec!["E".into(), "F".into(), date(1969, 6, 1), ts("2020-01-01T00:00:00")]),
                    (13, vec!["G".into(), "H".into(), date(1970, 1, 1), ts("2020-01-01T00:00:00")]),
                ],
            ),
            promos: empty("promos", "promo_id"),
            restaurants: empty("restaurants", "restaurant_id"),
            addresses: empty("addresses", "address_id"),
        }
    }

    #[test]
    fn test_meal_type_boundaries() {
        assert_eq!(MealType::from_hour(Some(5)), MealType::Dinner);
        assert_eq!(MealType::from_hour(Some(6)), MealType::Breakfast);
        assert_eq!(MealType::from_hour(Some(9)), MealType::Breakfast);
        assert_eq!(MealType::from_hour(Some(10)), MealType::Lunch);
        assert_eq!(MealType::from_hour(Some(16)), MealType::Lunch);
        assert_eq!(MealType::from_hour(Some(17)), MealType::Dinner);
        assert_eq!(MealType::from_hour(None), MealType::Dinner);
    }

    #[test]
    fn test_user_age_boundaries() {
        assert_eq!(UserAge::from_year(Some(1995)), UserAge::Young);
        assert_eq!(UserAge::from_year(Some(1994)), UserAge::Adult);
        assert_eq!(UserAge::from_year(Some(1970)), UserAge::Adult);
        assert_eq!(UserAge::from_year(Some(1969)), UserAge::Old);
        assert_eq!(UserAge::from_year(None), UserAge::Old);
    }

    #[test]
    fn test_enriched_row() {
        let db = reduced(vec![(1, order(10, 20, "2023-05-01T07:15:00"))]);
        let facts = create_orders_by_meal_type_age_cuisine(&db).unwrap();

        assert_eq!(facts.key_name(), "order_id");
        assert_eq!(facts.column_names(), vec!["food_cuisine", "meal_type", "user_age"]);
        let one = Value::Integer(1);
        assert_eq!(facts.value(&one, "food_cuisine"), Some(&Value::from("breakfast-food")));
        assert_eq!(facts.value(&one, "meal_type"), Some(&Value::from("breakfast")));
        assert_eq!(facts.value(&one, "user_age"), Some(&Value::from("young")));
    }

    #[test]
    fn test_buckets_per_order() {
        let db = reduced(vec![
            (1, order(11, 20, "2023-05-01T10:00:00")),
            (2, order(12, 20, "2023-05-01T16:30:00")),
            (3, order(13, 20, "2023-05-01T17:00:00")),
            (4, order(10, 20, "2023-05-01T05:59:00")),
        ]);
        let facts = create_orders_by_meal_type_age_cuisine(&db).unwrap();
        let col = |key: i64, c: &str| facts.value(&Value::Integer(key), c).cloned();

        assert_eq!(col(1, "meal_type"), Some(Value::from("lunch")));
        assert_eq!(col(2, "meal_type"), Some(Value::from("lunch")));
        assert_eq!(col(3, "meal_type"), Some(Value::from("dinner")));
        assert_eq!(col(4, "meal_type"), Some(Value::from("dinner")));
        assert_eq!(col(1, "user_age"), Some(Value::from("adult")));
        assert_eq!(col(2, "user_age"), Some(Value::from("old")));
        assert_eq!(col(3, "user_age"), Some(Value::from("adult")));
    }

    #[test]
    fn test_unknown_user_and_food_keep_the_order() {
        let db = reduced(vec![(1, order(99, 77, "2023-05-01T12:00:00"))]);
        let facts = create_orders_by_meal_type_age_cuisine(&db).unwrap();
        assert_eq!(facts.len(), 1);
        let one = Value::Integer(1);
        assert_eq!(facts.value(&one, "food_cuisine"), Some(&Value::Null));
        assert_eq!(facts.value(&one, "user_age"), Some(&Value::from("old")));
        assert_eq!(facts.value(&one, "meal_type"), Some(&Value::from("lunch")));
    }

    #[test]
    fn test_dropped_columns_are_absent() {
        let db = reduced(vec![(1, order(10, 20, "2023-05-01T07:15:00"))]);
        let facts = create_orders_by_meal_type_age_cuisine(&db).unwrap();
        for dropped in DROPPED_COLUMNS {
            assert!(!facts.has_column(dropped), "{} devrait être supprimée", dropped);
        }
    }

    #[test]
    fn test_extra_order_columns_pass_through() {
        let mut db = reduced(vec![]);
        db.orders = relation(
            "orders",
            "order_id",
            &["user_id", "address_id", "restaurant_id", "food_id", "promo_id", "ordered_at", "channel"],
            vec![(1, {
                let mut row = order(10, 20, "2023-05-01T20:00:00");
                row.push("app".into());
                row
            })],
        );
        let facts = create_orders_by_meal_type_age_cuisine(&db).unwrap();
        assert_eq!(
            facts.column_names(),
            vec!["channel", "food_cuisine", "meal_type", "user_age"]
        );
    }

    #[test]
    fn test_missing_column_from_incompatible_bundle() {
        let mut db = reduced(vec![(1, order(10, 20, "2023-05-01T07:15:00"))]);
        db.users = db.users.clone().drop_columns(&["registred_at"]).unwrap();
        let err = create_orders_by_meal_type_age_cuisine(&db).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { ref column, .. } if column == "registred_at"));
    }

    #[test]
    fn test_text_dates_are_reparsed() {
        let mut db = reduced(vec![]);
        db.orders = relation(
            "orders",
            "order_id",
            &["user_id", "address_id", "restaurant_id", "food_id", "promo_id", "ordered_at"],
            vec![(1, vec![
                Value::Integer(10),
                Value::Integer(5),
                Value::Integer(3),
                Value::Integer(20),
                Value::Null,
                "2023-05-01 08:00:00".into(),
            ])],
        );
        db.users = relation(
            "users",
            "user_id",
            &["first_name", "last_name", "birthdate", "registred_at"],
            vec![(10, vec!["A".into(), "B".into(), "15/03/1980".into(), Value::Null])],
        );
        let facts = create_orders_by_meal_type_age_cuisine(&db).unwrap();
        let one = Value::Integer(1);
        assert_eq!(facts.value(&one, "meal_type"), Some(&Value::from("breakfast")));
        assert_eq!(facts.value(&one, "user_age"), Some(&Value::from("adult")));
    }
}
