mod auth_api;
mod driver_api;
mod helpers;
mod quote_api;
mod rider_api;
mod trip_api;

use serde::Deserialize;

use crate::{api::API, config::Config, error::Error};

use helpers::{read_json, CallKind};

/// `API` implementation talking to the backend over HTTP.
#[derive(Clone, Debug)]
pub struct HttpClient {
    http: reqwest::Client,
    api_base: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Health {
    pub ok: bool,
    pub service: String,
}

impl HttpClient {
    #[tracing::instrument(name = "HttpClient::new", skip_all)]
    pub fn new(config: &Config) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// The health endpoint lives next to the `/api` prefix, not under it.
    #[tracing::instrument(skip(self))]
    pub async fn health(&self) -> Result<Health, Error> {
        let root = self.api_base.strip_suffix("/api").unwrap_or(&self.api_base);
        let res = self.http.get(format!("{}/health", root)).send().await?;

        read_json(res, CallKind::Other).await
    }
}

impl API for HttpClient {}
