#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use cabmatch::api::{AuthAPI, DriverAPI, DynAPI, QuoteAPI, RiderAPI, TripAPI, API};
use cabmatch::entities::{
    AuthResponse, Coordinates, Driver, DriverStatus, FareQuote, Rider, Trip, TripStatus, UserType,
};
use cabmatch::error::{not_found_error, upstream_error, Error};

pub const PICKUP: Coordinates = Coordinates::new(28.61, 77.21);
pub const DROPOFF: Coordinates = Coordinates::new(28.65, 77.23);

/// One scripted answer to `find_trip`.
#[derive(Clone, Copy, Debug)]
pub struct Step {
    pub status: Option<TripStatus>,
    pub delay: Duration,
}

impl Step {
    pub fn status(status: TripStatus) -> Self {
        Self {
            status: Some(status),
            delay: Duration::ZERO,
        }
    }

    pub fn failure() -> Self {
        Self {
            status: None,
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Default)]
pub struct Calls {
    pub estimate_fare: AtomicUsize,
    pub request_trip: AtomicUsize,
    pub find_trip: AtomicUsize,
    pub rider_trips: AtomicUsize,
    pub other: AtomicUsize,
}

impl Calls {
    pub fn total(&self) -> usize {
        self.estimate_fare.load(Ordering::SeqCst)
            + self.request_trip.load(Ordering::SeqCst)
            + self.find_trip.load(Ordering::SeqCst)
            + self.rider_trips.load(Ordering::SeqCst)
            + self.other.load(Ordering::SeqCst)
    }
}

/// In-memory backend. Each requested trip takes the next queued script;
/// the last step of a script repeats once the script runs out.
#[derive(Default)]
pub struct MockAPI {
    pub calls: Calls,
    pub fail_estimates: AtomicBool,
    pub fail_history: AtomicBool,
    scripts: Mutex<VecDeque<Vec<Step>>>,
    trips: Mutex<HashMap<Uuid, (Trip, VecDeque<Step>)>>,
    polled: Mutex<Vec<Uuid>>,
}

impl MockAPI {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_scripts(scripts: Vec<Vec<Step>>) -> Arc<Self> {
        let api = Self::default();
        *api.scripts.lock().unwrap() = scripts.into();
        Arc::new(api)
    }

    pub fn dyn_api(self: &Arc<Self>) -> DynAPI {
        self.clone()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn polled(&self) -> Vec<Uuid> {
        self.polled.lock().unwrap().clone()
    }
}

pub fn trip(rider_id: Uuid, status: TripStatus) -> Trip {
    Trip {
        id: Uuid::new_v4(),
        rider_id,
        status,
        pickup: PICKUP,
        dropoff: DROPOFF,
        driver_id: None,
        fare: None,
        distance_km: None,
        requested_at: Utc::now(),
        assigned_at: None,
        started_at: None,
        completed_at: None,
    }
}

fn observe(mut trip: Trip, status: TripStatus) -> Trip {
    trip.status = status;

    if status.rank() >= TripStatus::Assigned.rank() {
        trip.driver_id = Some(Uuid::nil());
    }

    if status == TripStatus::Completed {
        trip.fare = Some(98.4);
        trip.distance_km = Some(4.7);
    }

    trip
}

#[async_trait]
impl AuthAPI for MockAPI {
    async fn register_rider(&self, _name: String, _phone: String) -> Result<AuthResponse, Error> {
        self.calls.other.fetch_add(1, Ordering::SeqCst);
        Ok(AuthResponse {
            user_id: Uuid::new_v4(),
            user_type: UserType::Rider,
            token: "rider_token".into(),
        })
    }

    async fn register_driver(
        &self,
        _name: String,
        _phone: String,
        _vehicle_no: String,
    ) -> Result<AuthResponse, Error> {
        self.calls.other.fetch_add(1, Ordering::SeqCst);
        Ok(AuthResponse {
            user_id: Uuid::new_v4(),
            user_type: UserType::Driver,
            token: "driver_token".into(),
        })
    }

    async fn login(&self, _phone: String) -> Result<AuthResponse, Error> {
        self.calls.other.fetch_add(1, Ordering::SeqCst);
        Err(not_found_error())
    }
}

#[async_trait]
impl QuoteAPI for MockAPI {
    async fn estimate_fare(
        &self,
        pickup: Coordinates,
        dropoff: Coordinates,
    ) -> Result<FareQuote, Error> {
        self.calls.estimate_fare.fetch_add(1, Ordering::SeqCst);

        if self.fail_estimates.load(Ordering::SeqCst) {
            return Err(upstream_error(503));
        }

        let distance_km = ((dropoff.lat - pickup.lat).abs() + (dropoff.lng - pickup.lng).abs()) * 100.0;

        Ok(FareQuote {
            base_fare: 50.0,
            distance_km,
            per_km_rate: Some(15.0),
            surge_factor: 1.0,
            estimated_fare: 50.0 + 15.0 * distance_km,
        })
    }
}

#[async_trait]
impl TripAPI for MockAPI {
    async fn request_trip(
        &self,
        rider_id: Uuid,
        _pickup: Coordinates,
        _dropoff: Coordinates,
    ) -> Result<Trip, Error> {
        self.calls.request_trip.fetch_add(1, Ordering::SeqCst);

        let created = trip(rider_id, TripStatus::Requested);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| vec![Step::status(TripStatus::Requested)]);

        self.trips
            .lock()
            .unwrap()
            .insert(created.id, (created.clone(), script.into()));

        Ok(created)
    }

    async fn find_trip(&self, id: Uuid) -> Result<Trip, Error> {
        self.calls.find_trip.fetch_add(1, Ordering::SeqCst);
        self.polled.lock().unwrap().push(id);

        let (created, step) = {
            let mut trips = self.trips.lock().unwrap();
            let (created, script) = trips.get_mut(&id).ok_or_else(|| upstream_error(404))?;

            let step = if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().copied()
            };

            (created.clone(), step)
        };

        let step = step.unwrap_or(Step::status(created.status));

        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }

        match step.status {
            Some(status) => Ok(observe(created, status)),
            None => Err(upstream_error(502)),
        }
    }

    async fn start_trip(&self, _id: Uuid) -> Result<(), Error> {
        self.calls.other.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn complete_trip(&self, _id: Uuid) -> Result<(), Error> {
        self.calls.other.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl RiderAPI for MockAPI {
    async fn find_rider(&self, id: Uuid) -> Result<Rider, Error> {
        self.calls.other.fetch_add(1, Ordering::SeqCst);
        Ok(Rider {
            id,
            name: "Ravi".into(),
            phone: "9000000002".into(),
            created_at: Utc::now(),
        })
    }

    async fn rider_trips(&self, id: Uuid) -> Result<Vec<Trip>, Error> {
        self.calls.rider_trips.fetch_add(1, Ordering::SeqCst);

        if self.fail_history.load(Ordering::SeqCst) {
            return Err(upstream_error(500));
        }

        Ok(self
            .trips
            .lock()
            .unwrap()
            .values()
            .filter(|(trip, _)| trip.rider_id == id)
            .map(|(trip, _)| trip.clone())
            .collect())
    }
}

#[async_trait]
impl DriverAPI for MockAPI {
    async fn find_driver(&self, _id: Uuid) -> Result<Driver, Error> {
        self.calls.other.fetch_add(1, Ordering::SeqCst);
        Err(not_found_error())
    }

    async fn driver_trips(&self, _id: Uuid) -> Result<Vec<Trip>, Error> {
        self.calls.other.fetch_add(1, Ordering::SeqCst);
        Ok(vec![])
    }

    async fn update_driver_location(&self, _id: Uuid, _location: Coordinates) -> Result<(), Error> {
        self.calls.other.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_driver_status(&self, _id: Uuid, _status: DriverStatus) -> Result<(), Error> {
        self.calls.other.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl API for MockAPI {}
