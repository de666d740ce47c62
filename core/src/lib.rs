//! API client core for the cocktail recipe service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), so a mobile host can drive
//! the same client through the FFI crate. On top of that sit an optional
//! `ureq` transport and a view model that publishes drink screen state.
//!
//! # Design
//! - `DrinkClient` is stateless; it holds only `base_url`.
//! - Each endpoint is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `DrinkApi` is the injected seam between `DrinkViewModel` and the
//!   network; `DrinkService` implements it over any `Transport`.
//! - Features: `ureq` (blocking transport) and `view-model` (Tokio-based
//!   controller). The FFI crate builds with neither.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod service;
pub mod transport;
pub mod types;

#[cfg(feature = "view-model")]
pub mod debounce;
#[cfg(feature = "view-model")]
pub mod view_model;

pub use client::{encode_drinks, DrinkClient};
pub use config::DrinkConfig;
pub use endpoint::{Endpoint, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use service::{DrinkApi, DrinkService};
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{Drink, DrinkCategory, Ingredient};
#[cfg(feature = "view-model")]
pub use view_model::{DrinkViewModel, ViewState};
