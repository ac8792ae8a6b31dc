// =============================================================================
// SCHEMA — Les tables connues et le rôle de chacune
// =============================================================================
//
// La base source est un schéma en étoile :
//
//   districts  cities  states  countries       cuisines
//        \       |       |      /                  :
//         └──── addresses ────┘            food ···┘ (cuisine_id, jamais joint)
//                    ▲                       ▲
//                    │address_id             │food_id
//   promos ◀──── orders (faits) ──────────────┘
//   restaurants ◀──┘     │user_id
//                        ▼
//                      users ──birthdate_id──▶ birthdates
//
// Chaque table reçoit un RÔLE une fois pour toutes, à partir de son nom.
// Le réducteur aiguille les relations selon ce rôle : pas d'inspection
// structurelle des colonnes à chaque appel.
//
// =============================================================================

use std::fmt;
use std::str::FromStr;

use super::error::PipelineError;
use super::typeside::BaseType;

/// Les douze tables de la base source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableName {
    Addresses,
    Birthdates,
    Cities,
    Countries,
    Cuisines,
    Districts,
    Food,
    Orders,
    Promos,
    Restaurants,
    States,
    Users,
}

/// Le rôle d'une table dans la réduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Adresses : racine de la chaîne de lookups géographiques
    Address,
    /// Table de lookup pure (`name`), consommée par une autre table
    Lookup,
    Food,
    /// Consommée comme intermédiaire, jamais exposée
    Birthdate,
    User,
    Promo,
    Restaurant,
    /// La table de faits
    Fact,
}

impl TableName {
    /// Toutes les tables, dans l'ordre alphabétique des noms de fichiers.
    pub const ALL: [TableName; 12] = [
        TableName::Addresses,
        TableName::Birthdates,
        TableName::Cities,
        TableName::Countries,
        TableName::Cuisines,
        TableName::Districts,
        TableName::Food,
        TableName::Orders,
        TableName::Promos,
        TableName::Restaurants,
        TableName::States,
        TableName::Users,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Addresses => "addresses",
            TableName::Birthdates => "birthdates",
            TableName::Cities => "cities",
            TableName::Countries => "countries",
            TableName::Cuisines => "cuisines",
            TableName::Districts => "districts",
            TableName::Food => "food",
            TableName::Orders => "orders",
            TableName::Promos => "promos",
            TableName::Restaurants => "restaurants",
            TableName::States => "states",
            TableName::Users => "users",
        }
    }

    pub fn role(&self) -> Role {
        match self {
            TableName::Addresses => Role::Address,
            TableName::Cities
            | TableName::Countries
            | TableName::Cuisines
            | TableName::Districts
            | TableName::States => Role::Lookup,
            TableName::Food => Role::Food,
            TableName::Birthdates => Role::Birthdate,
            TableName::Users => Role::User,
            TableName::Promos => Role::Promo,
            TableName::Restaurants => Role::Restaurant,
            TableName::Orders => Role::Fact,
        }
    }

    /// Nom de colonne clé imposé par le rôle, quand il y en a un.
    ///
    /// Les autres tables acceptent n'importe quel nom de première colonne.
    pub fn expected_key(&self) -> Option<&'static str> {
        match self.role() {
            Role::Food => Some(columns::FOOD_ID),
            Role::Birthdate => Some(columns::BIRTHDATE_ID),
            Role::User => Some(columns::USER_ID),
            _ => None,
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TableName {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableName::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| PipelineError::NotFound {
                table: s.to_string(),
                detail: "nom de table inconnu".into(),
            })
    }
}

/// Une colonne typée d'une relation (la clé n'en fait pas partie).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub ty: BaseType,
}

impl Column {
    pub fn new(name: &str, ty: BaseType) -> Self {
        Column { name: name.to_string(), ty }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.name, self.ty)
    }
}

/// Noms de colonnes manipulés par le pipeline.
pub mod columns {
    pub const NAME: &str = "name";

    pub const DISTRICT_ID: &str = "district_id";
    pub const CITY_ID: &str = "city_id";
    pub const STATE_ID: &str = "state_id";
    pub const COUNTRY_ID: &str = "country_id";
    pub const STREET: &str = "street";
    pub const DISTRICT: &str = "district";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state";
    pub const COUNTRY: &str = "country";

    pub const FOOD_ID: &str = "food_id";
    pub const CUISINE_ID: &str = "cuisine_id";
    pub const CUISINE: &str = "cuisine";
    pub const PRICE: &str = "price";

    pub const BIRTHDATE_ID: &str = "birthdate_id";
    pub const BIRTHDATE: &str = "birthdate";

    pub const USER_ID: &str = "user_id";
    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";
    pub const REGISTRED_AT: &str = "registred_at";

    pub const ADDRESS_ID: &str = "address_id";
    pub const RESTAURANT_ID: &str = "restaurant_id";
    pub const PROMO_ID: &str = "promo_id";
    pub const ORDERED_AT: &str = "ordered_at";

    pub const FOOD_CUISINE: &str = "food_cuisine";
    pub const MEAL_TYPE: &str = "meal_type";
    pub const USER_AGE: &str = "user_age";

    /// Colonnes de l'adresse réduite, dans l'ordre canonique.
    pub const REDUCED_ADDRESS: [&str; 5] = [COUNTRY, STATE, CITY, DISTRICT, STREET];
}
