//! Stateless HTTP request builder and response parser for the cocktail API.
//!
//! # Design
//! `DrinkClient` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Whoever executes the round-trip in between (a `Transport`, or a host app
//! through the FFI) keeps the core deterministic and free of I/O.

use serde::de::DeserializeOwned;

use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CategoryEnvelope, Drink, DrinkCategory, DrinkEnvelope};

/// Synchronous, stateless client for the cocktail API.
#[derive(Debug, Clone)]
pub struct DrinkClient {
    base_url: String,
}

impl DrinkClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the GET request for any endpoint.
    pub fn build(&self, endpoint: &Endpoint) -> Result<HttpRequest, ApiError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ApiError::InvalidUrl(format!(
                "base URL {:?} has no http(s) scheme",
                self.base_url
            )));
        }
        let path = endpoint.path_and_query()?;
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/{path}", self.base_url),
            headers: vec![("accept".to_string(), "application/json".to_string())],
        })
    }

    pub fn build_search(&self, name: &str) -> Result<HttpRequest, ApiError> {
        self.build(&Endpoint::Search(name.to_string()))
    }

    pub fn build_lookup(&self, id: &str) -> Result<HttpRequest, ApiError> {
        self.build(&Endpoint::Lookup(id.to_string()))
    }

    pub fn build_random(&self) -> Result<HttpRequest, ApiError> {
        self.build(&Endpoint::Random)
    }

    pub fn build_filter(&self, category: DrinkCategory) -> Result<HttpRequest, ApiError> {
        self.build(&Endpoint::Filter(category))
    }

    pub fn build_categories(&self) -> Result<HttpRequest, ApiError> {
        self.build(&Endpoint::Categories)
    }

    /// Parse a search or filter response. A null or missing `drinks` key is
    /// an empty list, not an error.
    pub fn parse_drink_list(&self, response: HttpResponse) -> Result<Vec<Drink>, ApiError> {
        let envelope: DrinkEnvelope = decode_body(&response)?;
        Ok(envelope.drinks.unwrap_or_default())
    }

    /// Parse a lookup or random response into its first drink, if any.
    pub fn parse_drink(&self, response: HttpResponse) -> Result<Option<Drink>, ApiError> {
        let envelope: DrinkEnvelope = decode_body(&response)?;
        Ok(envelope.drinks.and_then(|drinks| drinks.into_iter().next()))
    }

    pub fn parse_categories(&self, response: HttpResponse) -> Result<Vec<String>, ApiError> {
        let envelope: CategoryEnvelope = decode_body(&response)?;
        Ok(envelope
            .drinks
            .unwrap_or_default()
            .into_iter()
            .map(|entry| entry.name)
            .collect())
    }
}

/// Serialize drinks through the wire schema, wrapped in the `drinks` envelope.
pub fn encode_drinks(drinks: &[Drink]) -> Result<String, ApiError> {
    let envelope = DrinkEnvelope {
        drinks: Some(drinks.to_vec()),
    };
    serde_json::to_string(&envelope).map_err(|e| ApiError::Decoding(e.to_string()))
}

/// Map the status, reject empty bodies, then decode.
fn decode_body<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    if !response.is_success() {
        return Err(ApiError::ServerStatus(response.status));
    }
    if response.body.trim().is_empty() {
        return Err(ApiError::NoData);
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::Decoding(e.to_string()))
}
