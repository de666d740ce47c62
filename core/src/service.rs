//! `DrinkApi`: the seam between the view model and the network.
//!
//! # Design
//! `DrinkService` composes a stateless `DrinkClient` with a `Transport` and
//! runs build, execute and parse for each call. It is constructed explicitly
//! and handed to whoever needs it; there is no shared global instance.

use tracing::debug;

use crate::client::DrinkClient;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{Drink, DrinkCategory};

/// Blocking drink queries. Each call issues exactly one request.
pub trait DrinkApi: Send + Sync {
    fn search_drinks(&self, name: &str) -> Result<Vec<Drink>, ApiError>;

    /// `Ok(None)` when the id is unknown.
    fn drink(&self, id: &str) -> Result<Option<Drink>, ApiError>;

    fn random_drink(&self) -> Result<Option<Drink>, ApiError>;

    fn drinks_by_category(&self, category: DrinkCategory) -> Result<Vec<Drink>, ApiError>;

    fn categories(&self) -> Result<Vec<String>, ApiError>;
}

/// `DrinkApi` over HTTP.
#[derive(Clone)]
pub struct DrinkService<T> {
    client: DrinkClient,
    transport: T,
}

impl<T: Transport> DrinkService<T> {
    pub fn new(client: DrinkClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &DrinkClient {
        &self.client
    }
}

#[cfg(feature = "ureq")]
impl DrinkService<crate::transport::UreqTransport> {
    /// Service over a fresh `ureq` agent.
    pub fn with_ureq(base_url: &str) -> Self {
        Self::new(DrinkClient::new(base_url), crate::transport::UreqTransport::new())
    }
}

impl<T: Transport> DrinkApi for DrinkService<T> {
    fn search_drinks(&self, name: &str) -> Result<Vec<Drink>, ApiError> {
        let req = self.client.build_search(name)?;
        debug!(url = %req.url, "searching drinks");
        let drinks = self.client.parse_drink_list(self.transport.execute(&req)?)?;
        debug!(count = drinks.len(), "search returned");
        Ok(drinks)
    }

    fn drink(&self, id: &str) -> Result<Option<Drink>, ApiError> {
        let req = self.client.build_lookup(id)?;
        debug!(url = %req.url, "looking up drink");
        self.client.parse_drink(self.transport.execute(&req)?)
    }

    fn random_drink(&self) -> Result<Option<Drink>, ApiError> {
        let req = self.client.build_random()?;
        debug!(url = %req.url, "fetching random drink");
        self.client.parse_drink(self.transport.execute(&req)?)
    }

    fn drinks_by_category(&self, category: DrinkCategory) -> Result<Vec<Drink>, ApiError> {
        let req = self.client.build_filter(category)?;
        debug!(url = %req.url, %category, "filtering drinks");
        let drinks = self.client.parse_drink_list(self.transport.execute(&req)?)?;
        debug!(count = drinks.len(), "filter returned");
        Ok(drinks)
    }

    fn categories(&self) -> Result<Vec<String>, ApiError> {
        let req = self.client.build_categories()?;
        debug!(url = %req.url, "listing categories");
        self.client.parse_categories(self.transport.execute(&req)?)
    }
}
