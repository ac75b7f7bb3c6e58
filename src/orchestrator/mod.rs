//! Lifecycle of the rider's single active trip.
//!
//! `request()` validates the selected endpoints, creates the trip remotely and
//! hands it to a background poller. From then on the poller is the only
//! writer of the trip snapshot: every poll interval it reads the trip from
//! the server and publishes what it observed, in the order the polls were
//! issued, until the trip reaches a terminal status. That final observation
//! triggers exactly one refresh of the rider's trip history, and its outcome
//! is the last event emitted for the trip.

mod poller;

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::api::DynAPI;
use crate::config::PollConfig;
use crate::entities::{Coordinates, Trip, TripStatus};
use crate::error::{validation_error, Error};

use poller::Poller;

const EVENT_CAPACITY: usize = 1024;

/// What happened to the tracked trip, in the order it happened.
#[derive(Clone, Debug, PartialEq)]
pub enum TripEvent {
    Requested(Trip),
    Transitioned {
        from: TripStatus,
        to: TripStatus,
        trip: Trip,
    },
    PollFailed {
        trip_id: Uuid,
        error: Error,
    },
    Finished {
        trip_id: Uuid,
        status: TripStatus,
    },
    HistoryRefreshed {
        rider_id: Uuid,
        trips: Vec<Trip>,
    },
    /// The trip ended but its history could not be loaded. Nothing else
    /// follows for this trip.
    HistoryRefreshFailed {
        rider_id: Uuid,
        error: Error,
    },
    PollingExpired {
        trip_id: Uuid,
    },
}

/// Where a poller publishes. Shared with the orchestrator, which only reads
/// the snapshot.
#[derive(Clone)]
struct Outputs {
    snapshot: Arc<watch::Sender<Option<Trip>>>,
    history: Arc<watch::Sender<Vec<Trip>>>,
    events: async_channel::Sender<TripEvent>,
}

struct ActivePoll {
    trip_id: Uuid,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl Drop for ActivePoll {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

pub struct TripOrchestrator {
    api: DynAPI,
    config: PollConfig,
    outputs: Outputs,
    events: async_channel::Receiver<TripEvent>,
    active: Option<ActivePoll>,
}

impl TripOrchestrator {
    pub fn new(api: DynAPI, config: PollConfig) -> Self {
        let (snapshot, _) = watch::channel(None);
        let (history, _) = watch::channel(vec![]);
        let (events_tx, events_rx) = async_channel::bounded(EVENT_CAPACITY);

        Self {
            api,
            config,
            outputs: Outputs {
                snapshot: Arc::new(snapshot),
                history: Arc::new(history),
                events: events_tx,
            },
            events: events_rx,
            active: None,
        }
    }

    /// Requests a trip between the selected endpoints and starts following it.
    /// Missing endpoints fail validation before anything is sent.
    #[tracing::instrument(skip(self))]
    pub async fn request(
        &mut self,
        rider_id: Uuid,
        pickup: Option<Coordinates>,
        dropoff: Option<Coordinates>,
    ) -> Result<Trip, Error> {
        let (pickup, dropoff) = match (pickup, dropoff) {
            (Some(pickup), Some(dropoff)) => (pickup, dropoff),
            (None, _) => return Err(validation_error("Select a pickup location first.")),
            (_, None) => return Err(validation_error("Select a dropoff location first.")),
        };

        let trip = self.api.request_trip(rider_id, pickup, dropoff).await?;

        tracing::info!("trip {} requested", trip.id);

        self.follow(rider_id, trip.clone());

        Ok(trip)
    }

    /// Starts polling `trip`, replacing whatever was followed before. The
    /// previous poller is cancelled before the new one is spawned.
    #[tracing::instrument(skip(self, trip), fields(trip_id = %trip.id))]
    pub fn follow(&mut self, rider_id: Uuid, trip: Trip) {
        self.cancel();

        let token = CancellationToken::new();
        let trip_id = trip.id;

        let poller = Poller::new(
            self.api.clone(),
            self.config.clone(),
            rider_id,
            trip,
            token.clone(),
            self.outputs.clone(),
        );

        self.active = Some(ActivePoll {
            trip_id,
            token,
            task: tokio::spawn(poller.run()),
        });
    }

    /// Stops the active poller, if any. Nothing it has in flight is applied
    /// afterwards.
    pub fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!("cancelling poller for trip {}", active.trip_id);
            active.token.cancel();
        }
    }

    /// Cancels the active poller and waits for its task to end. Used when
    /// the owning view goes away, e.g. on logout.
    #[tracing::instrument(skip(self))]
    pub async fn shutdown(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.token.cancel();

            if let Err(err) = (&mut active.task).await {
                tracing::warn!("poller for trip {} ended abnormally: {}", active.trip_id, err);
            }
        }
    }

    /// Loads the rider's trip history outside of the polling loop, e.g. when
    /// a dashboard is first shown.
    #[tracing::instrument(skip(self))]
    pub async fn refresh_history(&self, rider_id: Uuid) -> Result<Vec<Trip>, Error> {
        let trips = self.api.rider_trips(rider_id).await?;
        self.outputs.history.send_replace(trips.clone());

        Ok(trips)
    }

    pub fn current(&self) -> Option<Trip> {
        self.outputs.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Trip>> {
        self.outputs.snapshot.subscribe()
    }

    pub fn history(&self) -> watch::Receiver<Vec<Trip>> {
        self.outputs.history.subscribe()
    }

    pub fn events(&self) -> async_channel::Receiver<TripEvent> {
        self.events.clone()
    }

    pub fn active_trip_id(&self) -> Option<Uuid> {
        self.active.as_ref().map(|active| active.trip_id)
    }

    pub fn is_polling(&self) -> bool {
        self.active
            .as_ref()
            .map(|active| !active.task.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for TripOrchestrator {
    fn drop(&mut self) {
        self.cancel();
    }
}
