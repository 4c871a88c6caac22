mod api;
mod client;
mod config;
mod credentials;
mod endpoints;
mod errors;
mod refresh;
mod session;
mod telemetry;

pub use api::{
    Account, ChartPoint, DailyVisits, Product, ProductInput, RegisterRequest, Shop, ShopStats,
    ShopUpdate, TokenPair, VisitAction,
};
pub use client::{ApiRequest, ApiResponse, StorefrontClient};
pub use config::Config;
pub use credentials::{CredentialStore, Credentials};
pub use endpoints::{EndpointClass, EndpointPolicy};
pub use errors::{Error, RefreshError};
pub use session::SessionSignal;

#[cfg(test)]
mod tests;
