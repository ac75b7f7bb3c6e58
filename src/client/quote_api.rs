use super::helpers::{read_json, CallKind};
use super::HttpClient;

use async_trait::async_trait;

use crate::{
    api::QuoteAPI,
    entities::{Coordinates, FareQuote},
    error::Error,
};

#[async_trait]
impl QuoteAPI for HttpClient {
    #[tracing::instrument(skip(self))]
    async fn estimate_fare(
        &self,
        pickup: Coordinates,
        dropoff: Coordinates,
    ) -> Result<FareQuote, Error> {
        let res = self
            .http
            .get(self.url("/pricing/estimate"))
            .query(&[("pickup_lat", pickup.lat)])
            .query(&[("pickup_lon", pickup.lng)])
            .query(&[("dropoff_lat", dropoff.lat)])
            .query(&[("dropoff_lon", dropoff.lng)])
            .send()
            .await?;

        read_json(res, CallKind::Other).await
    }
}
