use super::helpers::{read_ack, read_json, CallKind};
use super::HttpClient;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    api::TripAPI,
    entities::{Coordinates, Trip},
    error::Error,
};

#[derive(Serialize)]
struct RequestParams {
    rider_id: Uuid,
    pickup_latitude: f64,
    pickup_longitude: f64,
    dropoff_latitude: f64,
    dropoff_longitude: f64,
}

#[async_trait]
impl TripAPI for HttpClient {
    #[tracing::instrument(skip(self))]
    async fn request_trip(
        &self,
        rider_id: Uuid,
        pickup: Coordinates,
        dropoff: Coordinates,
    ) -> Result<Trip, Error> {
        let params = RequestParams {
            rider_id,
            pickup_latitude: pickup.lat,
            pickup_longitude: pickup.lng,
            dropoff_latitude: dropoff.lat,
            dropoff_longitude: dropoff.lng,
        };

        let res = self
            .http
            .post(self.url("/trips/request"))
            .json(&params)
            .send()
            .await?;

        read_json(res, CallKind::Other).await
    }

    #[tracing::instrument(skip(self))]
    async fn find_trip(&self, id: Uuid) -> Result<Trip, Error> {
        let res = self.http.get(self.url(&format!("/trips/{}", id))).send().await?;

        read_json(res, CallKind::Other).await
    }

    #[tracing::instrument(skip(self))]
    async fn start_trip(&self, id: Uuid) -> Result<(), Error> {
        let res = self
            .http
            .put(self.url(&format!("/trips/{}/start", id)))
            .send()
            .await?;

        read_ack(res, CallKind::Other).await
    }

    #[tracing::instrument(skip(self))]
    async fn complete_trip(&self, id: Uuid) -> Result<(), Error> {
        let res = self
            .http
            .put(self.url(&format!("/trips/{}/complete", id)))
            .send()
            .await?;

        read_ack(res, CallKind::Other).await
    }
}
