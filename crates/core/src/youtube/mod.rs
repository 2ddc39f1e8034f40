//! YouTube-backed implementations of the provider traits.

use reqwest::Client;

use crate::{config::Config, error::Result};

pub mod data_api;
pub mod iso_duration;
pub mod transcript;

pub use data_api::DataApi;
pub use transcript::CaptionClient;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP client shared by the Data API and caption clients.
pub fn http_client(config: &Config) -> Result<Client> {
    let client = Client::builder()
        .timeout(config.timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}
