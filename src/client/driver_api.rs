use super::helpers::{read_ack, read_json, CallKind};
use super::HttpClient;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::{
    api::DriverAPI,
    entities::{Coordinates, Driver, DriverStatus, Trip},
    error::Error,
};

#[async_trait]
impl DriverAPI for HttpClient {
    #[tracing::instrument(skip(self))]
    async fn find_driver(&self, id: Uuid) -> Result<Driver, Error> {
        let res = self.http.get(self.url(&format!("/drivers/{}", id))).send().await?;

        read_json(res, CallKind::Lookup).await
    }

    #[tracing::instrument(skip(self))]
    async fn driver_trips(&self, id: Uuid) -> Result<Vec<Trip>, Error> {
        let res = self
            .http
            .get(self.url(&format!("/drivers/{}/trips", id)))
            .send()
            .await?;

        read_json(res, CallKind::Other).await
    }

    #[tracing::instrument(skip(self))]
    async fn update_driver_location(&self, id: Uuid, location: Coordinates) -> Result<(), Error> {
        let res = self
            .http
            .put(self.url(&format!("/drivers/{}/location", id)))
            .json(&json!({ "latitude": location.lat, "longitude": location.lng }))
            .send()
            .await?;

        read_ack(res, CallKind::Other).await
    }

    #[tracing::instrument(skip(self))]
    async fn update_driver_status(&self, id: Uuid, status: DriverStatus) -> Result<(), Error> {
        let res = self
            .http
            .put(self.url(&format!("/drivers/{}/status", id)))
            .json(&json!({ "status": status }))
            .send()
            .await?;

        read_ack(res, CallKind::Other).await
    }
}
