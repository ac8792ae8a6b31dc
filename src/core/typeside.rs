// =============================================================================
// TYPESIDE — Les types primitifs des cellules
// =============================================================================
//
// Chaque cellule d'une Relation contient une Value. Les types de base
// couvrent ce que produit la lecture d'un CSV (texte, entiers, flottants,
// booléens) plus ce que produisent les étapes de réduction (dates et
// timestamps parsés).
//
// ANALOGIE : c'est l'équivalent des dtypes d'un DataFrame, mais fermé et
// explicite. NULL représente une valeur absente ou une jointure non résolue.
//
// CONVERSIONS :
//   texte CSV ──infer_type────▶ Integer | Float | Boolean | String | Null
//   texte     ──parse_date──────▶ Date        (format jour/mois/année)
//   texte     ──parse_timestamp─▶ Timestamp   (ISO-8601, séparateur T ou espace)
//
// =============================================================================

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};

/// Format des dates de naissance (`15/03/1998`).
pub const BIRTHDATE_FORMAT: &str = "%d/%m/%Y";

/// Formats de timestamps acceptés, essayés dans l'ordre.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Libellé utilisé dans les erreurs de parsing de timestamps.
pub const TIMESTAMP_FORMAT_LABEL: &str = "ISO-8601 (%Y-%m-%d[T| ]%H:%M[:%S])";

/// Textes reconnus comme valeur absente à la lecture.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-NaN", "-nan", "<NA>", "N/A", "NA", "NULL", "NaN",
    "None", "n/a", "nan", "null",
];

/// Un type de base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    String,
    Integer,
    Float,
    Boolean,
    /// Date calendaire sans heure
    Date,
    /// Date + heure, sans fuseau
    Timestamp,
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseType::String => write!(f, "String"),
            BaseType::Integer => write!(f, "Int"),
            BaseType::Float => write!(f, "Float"),
            BaseType::Boolean => write!(f, "Bool"),
            BaseType::Date => write!(f, "Date"),
            BaseType::Timestamp => write!(f, "Timestamp"),
        }
    }
}

/// Une valeur concrète dans une cellule.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl Value {
    /// Retourne le BaseType de cette valeur (None pour NULL, qui est polymorphe)
    pub fn get_type(&self) -> Option<BaseType> {
        match self {
            Value::String(_) => Some(BaseType::String),
            Value::Integer(_) => Some(BaseType::Integer),
            Value::Float(_) => Some(BaseType::Float),
            Value::Boolean(_) => Some(BaseType::Boolean),
            Value::Date(_) => Some(BaseType::Date),
            Value::Timestamp(_) => Some(BaseType::Timestamp),
            Value::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Clé hashable utilisée par les index et les jointures.
    ///
    /// Un Float entier (`3.0`) donne la même clé que l'Integer `3` : une
    /// colonne d'ids contenant des NULL reste joignable.
    pub fn join_key(&self) -> Option<JoinKey> {
        match self {
            Value::String(s) => Some(JoinKey::Text(s.clone())),
            Value::Integer(i) => Some(JoinKey::Int(*i)),
            Value::Float(f) if f.fract() == 0.0 && fits_i64(*f) => Some(JoinKey::Int(*f as i64)),
            Value::Float(f) => Some(JoinKey::FloatBits(f.to_bits())),
            Value::Boolean(b) => Some(JoinKey::Bool(*b)),
            Value::Date(d) => Some(JoinKey::Date(*d)),
            Value::Timestamp(ts) => Some(JoinKey::Timestamp(*ts)),
            Value::Null => None,
        }
    }

    /// Texte brut de la valeur, sans guillemets (pour les messages et le rendu).
    pub fn to_plain(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Heure du jour d'un timestamp (0..=23).
    pub fn hour(&self) -> Option<u32> {
        match self {
            Value::Timestamp(ts) => Some(ts.hour()),
            Value::Date(_) => Some(0),
            _ => None,
        }
    }
}

/// Un flottant est représentable exactement en i64 : `i64::MAX as f64` vaut
/// 2^63, hors bornes, d'où l'inégalité stricte.
fn fits_i64(f: f64) -> bool {
    f >= i64::MIN as f64 && f < i64::MAX as f64
}

/// Forme hashable d'une Value non nulle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JoinKey {
    Text(String),
    Int(i64),
    FloatBits(u64),
    Bool(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

// ─── Inférence des colonnes lues depuis un CSV ───────────────────────────────

pub fn is_na(raw: &str) -> bool {
    NA_VALUES.contains(&raw.trim())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

/// Infère le type d'une colonne à partir de toutes ses cellules brutes.
///
/// Entier si toutes les cellules non nulles sont des i64, sinon flottant si
/// toutes sont des f64, sinon booléen, sinon texte. Une colonne entièrement
/// nulle est typée String.
pub fn infer_type<'a>(cells: impl IntoIterator<Item = &'a str> + Clone) -> BaseType {
    let present = || cells.clone().into_iter().filter(|c| !is_na(c));

    if present().next().is_none() {
        return BaseType::String;
    }
    if present().all(|c| c.trim().parse::<i64>().is_ok()) {
        BaseType::Integer
    } else if present().all(|c| c.trim().parse::<f64>().is_ok()) {
        BaseType::Float
    } else if present().all(|c| parse_bool(c).is_some()) {
        BaseType::Boolean
    } else {
        BaseType::String
    }
}

/// Convertit une cellule brute selon le type inféré de sa colonne.
pub fn parse_cell(raw: &str, ty: BaseType) -> Value {
    if is_na(raw) {
        return Value::Null;
    }
    let trimmed = raw.trim();
    match ty {
        BaseType::Integer => trimmed.parse().map(Value::Integer).unwrap_or(Value::Null),
        BaseType::Float => trimmed.parse().map(Value::Float).unwrap_or(Value::Null),
        BaseType::Boolean => parse_bool(trimmed).map(Value::Boolean).unwrap_or(Value::Null),
        BaseType::Date => parse_date(trimmed).map(Value::Date).unwrap_or(Value::Null),
        BaseType::Timestamp => parse_timestamp(trimmed).map(Value::Timestamp).unwrap_or(Value::Null),
        BaseType::String => Value::String(raw.to_string()),
    }
}

// ─── Dates et timestamps ─────────────────────────────────────────────────────

/// Parse une date `jour/mois/année`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), BIRTHDATE_FORMAT).ok()
}

/// Parse un timestamp ISO-8601.
///
/// Un décalage horaire explicite est accepté et l'heure murale est conservée
/// telle quelle. Une date seule vaut minuit.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.naive_local());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_value_types() {
        assert_eq!(Value::from("hello").get_type(), Some(BaseType::String));
        assert_eq!(Value::Integer(42).get_type(), Some(BaseType::Integer));
        assert_eq!(Value::Null.get_type(), None);
    }

    #[test]
    fn test_join_key_unifies_integral_floats() {
        assert_eq!(Value::Float(3.0).join_key(), Value::Integer(3).join_key());
        assert_ne!(Value::Float(3.5).join_key(), Value::Integer(3).join_key());
        assert_eq!(Value::Null.join_key(), None);
    }

    #[test]
    fn test_join_key_of_huge_floats_stays_distinct() {
        assert_ne!(Value::Float(1e20).join_key(), Value::Float(1e21).join_key());
        assert_ne!(Value::Float(1e19).join_key(), Value::Integer(i64::MAX).join_key());
        assert_eq!(
            Value::Float(-9_223_372_036_854_775_808.0).join_key(),
            Value::Integer(i64::MIN).join_key()
        );
    }

    #[test]
    fn test_infer_type() {
        assert_eq!(infer_type(["1", "2", ""]), BaseType::Integer);
        assert_eq!(infer_type(["1", "8.5"]), BaseType::Float);
        assert_eq!(infer_type(["True", "false"]), BaseType::Boolean);
        assert_eq!(infer_type(["breakfast-food", "3"]), BaseType::String);
        assert_eq!(infer_type(["", "NA"]), BaseType::String);
    }

    #[test]
    fn test_parse_cell_na() {
        assert_eq!(parse_cell("", BaseType::Integer), Value::Null);
        assert_eq!(parse_cell("NaN", BaseType::Float), Value::Null);
        assert_eq!(parse_cell(" 7 ", BaseType::Integer), Value::Integer(7));
    }

    #[test]
    fn test_parse_date() {
        let d = parse_date("15/03/1998").unwrap();
        assert_eq!((d.day(), d.month(), d.year()), (15, 3, 1998));
        assert!(parse_date("1998-03-15").is_none());
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = NaiveDate::from_ymd_opt(2023, 5, 1)
            .unwrap()
            .and_hms_opt(7, 15, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2023-05-01T07:15:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-05-01 07:15:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-05-01 07:15"), Some(expected));
        assert_eq!(parse_timestamp("2023-05-01T07:15:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-05-01").map(|t| t.hour()), Some(0));
        assert!(parse_timestamp("01/05/2023").is_none());
    }

    #[test]
    fn test_hour() {
        let ts = parse_timestamp("2023-05-01T16:59:59").unwrap();
        assert_eq!(Value::Timestamp(ts).hour(), Some(16));
        assert_eq!(Value::Null.hour(), None);
    }
}
