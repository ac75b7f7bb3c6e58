use super::helpers::{read_json, CallKind};
use super::HttpClient;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    api::RiderAPI,
    entities::{Rider, Trip},
    error::Error,
};

#[async_trait]
impl RiderAPI for HttpClient {
    #[tracing::instrument(skip(self))]
    async fn find_rider(&self, id: Uuid) -> Result<Rider, Error> {
        let res = self.http.get(self.url(&format!("/riders/{}", id))).send().await?;

        read_json(res, CallKind::Lookup).await
    }

    #[tracing::instrument(skip(self))]
    async fn rider_trips(&self, id: Uuid) -> Result<Vec<Trip>, Error> {
        let res = self
            .http
            .get(self.url(&format!("/riders/{}/trips", id)))
            .send()
            .await?;

        read_json(res, CallKind::Other).await
    }
}
