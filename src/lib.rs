mod account;
mod client;
pub mod config;
pub mod errors;
pub mod request;
pub mod response;
pub mod session;
mod storefront;
pub mod telemetry;
pub mod token;
pub mod types;

pub use account::{AVATAR_ENDPOINT, LOGIN_ENDPOINT, PROFILE_ENDPOINT, REGISTER_ENDPOINT};
pub use client::{ApiClient, REFRESH_ENDPOINT};
pub use config::{Config, ConfigLocation, read_config};
pub use errors::Error;
pub use request::{FormPart, RequestBody, RequestOptions};
pub use response::ApiReply;
pub use session::SessionManager;
pub use storefront::ProductQuery;
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
