use super::helpers::{read_json, CallKind};
use super::HttpClient;

use async_trait::async_trait;
use serde_json::json;

use crate::{api::AuthAPI, entities::AuthResponse, error::Error};

#[async_trait]
impl AuthAPI for HttpClient {
    #[tracing::instrument(skip(self, phone))]
    async fn register_rider(&self, name: String, phone: String) -> Result<AuthResponse, Error> {
        let res = self
            .http
            .post(self.url("/auth/rider/register"))
            .json(&json!({ "name": name, "phone": phone }))
            .send()
            .await?;

        read_json(res, CallKind::Registration).await
    }

    #[tracing::instrument(skip(self, phone))]
    async fn register_driver(
        &self,
        name: String,
        phone: String,
        vehicle_no: String,
    ) -> Result<AuthResponse, Error> {
        let res = self
            .http
            .post(self.url("/auth/driver/register"))
            .json(&json!({ "name": name, "phone": phone, "vehicle_no": vehicle_no }))
            .send()
            .await?;

        read_json(res, CallKind::Registration).await
    }

    #[tracing::instrument(skip_all)]
    async fn login(&self, phone: String) -> Result<AuthResponse, Error> {
        let res = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({ "phone": phone }))
            .send()
            .await?;

        read_json(res, CallKind::Login).await
    }
}
