use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::{
    AuthResponse, Coordinates, Driver, DriverStatus, FareQuote, Rider, Trip,
};
use crate::error::Error;

#[async_trait]
pub trait AuthAPI {
    async fn register_rider(&self, name: String, phone: String) -> Result<AuthResponse, Error>;
    async fn register_driver(
        &self,
        name: String,
        phone: String,
        vehicle_no: String,
    ) -> Result<AuthResponse, Error>;
    async fn login(&self, phone: String) -> Result<AuthResponse, Error>;
}

#[async_trait]
pub trait QuoteAPI {
    async fn estimate_fare(
        &self,
        pickup: Coordinates,
        dropoff: Coordinates,
    ) -> Result<FareQuote, Error>;
}

#[async_trait]
pub trait TripAPI {
    async fn request_trip(
        &self,
        rider_id: Uuid,
        pickup: Coordinates,
        dropoff: Coordinates,
    ) -> Result<Trip, Error>;
    async fn find_trip(&self, id: Uuid) -> Result<Trip, Error>;
    async fn start_trip(&self, id: Uuid) -> Result<(), Error>;
    async fn complete_trip(&self, id: Uuid) -> Result<(), Error>;
}

#[async_trait]
pub trait RiderAPI {
    async fn find_rider(&self, id: Uuid) -> Result<Rider, Error>;
    async fn rider_trips(&self, id: Uuid) -> Result<Vec<Trip>, Error>;
}

#[async_trait]
pub trait DriverAPI {
    async fn find_driver(&self, id: Uuid) -> Result<Driver, Error>;
    async fn driver_trips(&self, id: Uuid) -> Result<Vec<Trip>, Error>;
    async fn update_driver_location(&self, id: Uuid, location: Coordinates) -> Result<(), Error>;
    async fn update_driver_status(&self, id: Uuid, status: DriverStatus) -> Result<(), Error>;
}

pub trait API: AuthAPI + QuoteAPI + TripAPI + RiderAPI + DriverAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
