//! Domain types for the cocktail API.
//!
//! # Design
//! The wire schema uses short prefixed field names (`idDrink`, `strDrink`,
//! ...). Serde attributes map them onto plain Rust names so the rest of the
//! crate never sees the wire spelling. These types mirror the mock-server's
//! schema but are defined independently; integration tests catch drift.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A single drink recipe returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Drink {
    #[serde(rename = "idDrink")]
    pub id: String,
    #[serde(rename = "strDrink")]
    pub name: String,
    #[serde(rename = "strDrinkDescription")]
    pub description: String,
    #[serde(rename = "strDrinkThumb", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub ingredients: Vec<Ingredient>,
    #[serde(rename = "strInstructions")]
    pub instructions: String,
    #[serde(rename = "strCategory")]
    pub category: DrinkCategory,
    #[serde(rename = "strAlcoholic", deserialize_with = "deserialize_alcoholic")]
    pub alcoholic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// One line of a recipe.
///
/// `id` is generated locally on every decode so list views have a stable
/// key; it is never sent over the wire and is ignored by `PartialEq`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(skip, default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(rename = "strIngredient")]
    pub name: String,
    #[serde(rename = "strMeasure", default, skip_serializing_if = "Option::is_none")]
    pub measurement: Option<String>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, measurement: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            measurement: measurement.map(str::to_string),
        }
    }
}

impl PartialEq for Ingredient {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.measurement == other.measurement
    }
}

/// The closed set of categories the app browses by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrinkCategory {
    Cocktail,
    Beer,
    Wine,
    Shot,
    #[serde(rename = "Non-Alcoholic")]
    NonAlcoholic,
    Coffee,
}

impl DrinkCategory {
    /// Every category, in the order a picker shows them.
    pub const ALL: [DrinkCategory; 6] = [
        DrinkCategory::Cocktail,
        DrinkCategory::Beer,
        DrinkCategory::Wine,
        DrinkCategory::Shot,
        DrinkCategory::NonAlcoholic,
        DrinkCategory::Coffee,
    ];

    /// Display label; identical to the wire value.
    pub fn label(self) -> &'static str {
        match self {
            DrinkCategory::Cocktail => "Cocktail",
            DrinkCategory::Beer => "Beer",
            DrinkCategory::Wine => "Wine",
            DrinkCategory::Shot => "Shot",
            DrinkCategory::NonAlcoholic => "Non-Alcoholic",
            DrinkCategory::Coffee => "Coffee",
        }
    }
}

impl fmt::Display for DrinkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
#[error("unknown drink category: {0}")]
pub struct ParseCategoryError(pub String);

impl FromStr for DrinkCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DrinkCategory::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// Top-level body of every drink endpoint. `null` and a missing key both
/// mean "no drinks".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrinkEnvelope {
    #[serde(default)]
    pub drinks: Option<Vec<Drink>>,
}

/// Body of the list-categories endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryEnvelope {
    #[serde(default)]
    pub drinks: Option<Vec<CategoryEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryEntry {
    #[serde(rename = "strCategory")]
    pub name: String,
}

/// Accepts the boolean form as well as the public API's text markers.
fn deserialize_alcoholic<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Flag(bool),
        Label(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Flag(flag) => Ok(flag),
        Raw::Label(label) => match label.as_str() {
            "Alcoholic" | "Optional alcohol" => Ok(true),
            "Non alcoholic" | "Non-Alcoholic" => Ok(false),
            other => Err(de::Error::custom(format!("unknown alcoholic marker: {other}"))),
        },
    }
}
