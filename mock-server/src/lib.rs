//! Fixture cocktail API.
//!
//! Serves the five read-only endpoints of the public cocktail API over an
//! in-memory catalogue so clients can be exercised without the network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::debug;

const FIXTURE: &str = include_str!("../fixtures/drinks.json");

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Drink {
    #[serde(rename = "idDrink")]
    pub id: String,
    #[serde(rename = "strDrink")]
    pub name: String,
    #[serde(rename = "strDrinkDescription")]
    pub description: String,
    #[serde(rename = "strDrinkThumb", default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
    pub ingredients: Vec<Ingredient>,
    #[serde(rename = "strInstructions")]
    pub instructions: String,
    #[serde(rename = "strCategory")]
    pub category: String,
    #[serde(rename = "strAlcoholic")]
    pub alcoholic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(rename = "strIngredient")]
    pub name: String,
    #[serde(rename = "strMeasure", default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,
}

/// `{"drinks": [...]}`, or `{"drinks": null}` when nothing matched.
#[derive(Debug, Serialize, Deserialize)]
pub struct DrinksBody {
    pub drinks: Option<Vec<Drink>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryName {
    #[serde(rename = "strCategory")]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesBody {
    pub drinks: Vec<CategoryName>,
}

#[derive(Clone)]
struct Catalogue {
    drinks: Arc<Vec<Drink>>,
    next_random: Arc<AtomicUsize>,
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    s: String,
}

#[derive(Deserialize)]
struct LookupParams {
    i: String,
}

#[derive(Deserialize)]
struct CategoryParams {
    c: String,
}

/// The bundled fixture drinks.
pub fn default_catalogue() -> Vec<Drink> {
    serde_json::from_str(FIXTURE).expect("bundled fixture catalogue is valid")
}

pub fn app() -> Router {
    app_with(default_catalogue())
}

/// Router over a caller-supplied catalogue.
pub fn app_with(drinks: Vec<Drink>) -> Router {
    let catalogue = Catalogue {
        drinks: Arc::new(drinks),
        next_random: Arc::new(AtomicUsize::new(0)),
    };
    Router::new()
        .route("/search.php", get(search))
        .route("/lookup.php", get(lookup))
        .route("/random.php", get(random))
        .route("/filter.php", get(filter))
        .route("/list.php", get(list_categories))
        .with_state(catalogue)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn body(drinks: Vec<Drink>) -> Json<DrinksBody> {
    if drinks.is_empty() {
        Json(DrinksBody { drinks: None })
    } else {
        Json(DrinksBody { drinks: Some(drinks) })
    }
}

async fn search(State(cat): State<Catalogue>, Query(params): Query<SearchParams>) -> Json<DrinksBody> {
    let needle = params.s.to_lowercase();
    debug!(query = %params.s, "search");
    body(
        cat.drinks
            .iter()
            .filter(|d| d.name.to_lowercase().contains(&needle))
            .cloned()
            .collect(),
    )
}

async fn lookup(State(cat): State<Catalogue>, Query(params): Query<LookupParams>) -> Json<DrinksBody> {
    debug!(id = %params.i, "lookup");
    body(cat.drinks.iter().filter(|d| d.id == params.i).cloned().collect())
}

/// Rotates through the catalogue so repeated calls see different drinks.
async fn random(State(cat): State<Catalogue>) -> Json<DrinksBody> {
    if cat.drinks.is_empty() {
        return body(Vec::new());
    }
    let index = cat.next_random.fetch_add(1, Ordering::Relaxed) % cat.drinks.len();
    body(vec![cat.drinks[index].clone()])
}

async fn filter(State(cat): State<Catalogue>, Query(params): Query<CategoryParams>) -> Json<DrinksBody> {
    debug!(category = %params.c, "filter");
    body(cat.drinks.iter().filter(|d| d.category == params.c).cloned().collect())
}

async fn list_categories(
    State(cat): State<Catalogue>,
    Query(params): Query<CategoryParams>,
) -> Result<Json<CategoriesBody>, StatusCode> {
    if params.c != "list" {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut names: Vec<String> = Vec::new();
    for drink in cat.drinks.iter() {
        if !names.contains(&drink.category) {
            names.push(drink.category.clone());
        }
    }
    Ok(Json(CategoriesBody {
        drinks: names.into_iter().map(|name| CategoryName { name }).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_covers_every_category() {
        let drinks = default_catalogue();
        for category in ["Cocktail", "Beer", "Wine", "Shot", "Non-Alcoholic", "Coffee"] {
            assert!(
                drinks.iter().any(|d| d.category == category),
                "no fixture drink in {category}"
            );
        }
    }

    #[test]
    fn drink_serializes_wire_names() {
        let drink = default_catalogue().remove(0);
        let json = serde_json::to_value(&drink).unwrap();
        assert_eq!(json["idDrink"], "11007");
        assert_eq!(json["strDrink"], "Margarita");
        assert_eq!(json["strAlcoholic"], true);
        assert_eq!(json["ingredients"][0]["strIngredient"], "Tequila");
        assert!(json["ingredients"][3].get("strMeasure").is_none());
    }

    #[test]
    fn empty_body_serializes_null_drinks() {
        let json = serde_json::to_string(&body(Vec::new()).0).unwrap();
        assert_eq!(json, r#"{"drinks":null}"#);
    }
}
