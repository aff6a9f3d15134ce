use anyhow::Context;
use url::Url;

use crate::models::{ServiceKind, ServiceOffering};

/// Runtime configuration, loaded once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the booking/quote REST collaborator.
    pub api_url: Url,
    /// The service this wizard session books.
    pub offering: ServiceOffering,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_url = std::env::var("GALA_API_URL")
            .unwrap_or_else(|_| "http://localhost:4000".into());
        let api_url = Url::parse(&api_url).context("GALA_API_URL must be a valid URL")?;

        let service_id =
            std::env::var("GALA_SERVICE_ID").context("GALA_SERVICE_ID must be set")?;

        let kind_raw =
            std::env::var("GALA_SERVICE_TYPE").unwrap_or_else(|_| "EVENTCENTER".into());
        let kind: ServiceKind = kind_raw
            .parse()
            .map_err(|e: String| anyhow::anyhow!("GALA_SERVICE_TYPE: {e}"))?;

        let price = env_i64("GALA_SERVICE_PRICE", 0)?;
        let discount = env_i64("GALA_SERVICE_DISCOUNT", 0)?;

        Ok(Self {
            api_url,
            offering: ServiceOffering {
                id: service_id,
                kind,
                price,
                discount,
            },
        })
    }
}

fn env_i64(name: &str, default: i64) -> anyhow::Result<i64> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{name} must be a number")),
        Err(_) => Ok(default),
    }
}
