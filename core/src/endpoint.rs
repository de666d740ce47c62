//! The five request intents the cocktail API understands.

use crate::error::ApiError;
use crate::types::DrinkCategory;

/// Base URL of the public cocktail API.
pub const DEFAULT_BASE_URL: &str = "https://www.thecocktaildb.com/api/json/v1/1";

/// One request the client can build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `search.php?s=`: drinks whose name matches the text.
    Search(String),
    /// `lookup.php?i=`: a single drink by id.
    Lookup(String),
    /// `random.php`
    Random,
    /// `filter.php?c=`: drinks in one category.
    Filter(DrinkCategory),
    /// `list.php?c=list`: every category name the server knows.
    Categories,
}

impl Endpoint {
    /// Path and query relative to the base URL. Free text is
    /// percent-encoded; lookup ids must be ASCII alphanumeric.
    pub fn path_and_query(&self) -> Result<String, ApiError> {
        match self {
            Endpoint::Search(name) => Ok(format!("search.php?s={}", urlencoding::encode(name))),
            Endpoint::Lookup(id) => {
                if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(ApiError::InvalidUrl(format!("bad drink id {id:?}")));
                }
                Ok(format!("lookup.php?i={id}"))
            }
            Endpoint::Random => Ok("random.php".to_string()),
            Endpoint::Filter(category) => Ok(format!(
                "filter.php?c={}",
                urlencoding::encode(category.label())
            )),
            Endpoint::Categories => Ok("list.php?c=list".to_string()),
        }
    }
}
