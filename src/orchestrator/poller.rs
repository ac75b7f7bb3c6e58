use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{Outputs, TripEvent};
use crate::api::DynAPI;
use crate::config::PollConfig;
use crate::entities::Trip;
use crate::error::Error;

type Poll = BoxFuture<'static, (u64, Result<Trip, Error>)>;

#[derive(Debug, PartialEq)]
enum Applied {
    Yes,
    Terminal,
    Discarded,
    Cancelled,
}

/// Background task following one trip until it ends or is cancelled.
///
/// Polls are numbered as they are issued and may overlap when the server is
/// slower than the interval. A response is applied only if it is newer than
/// the last applied one and does not move the trip backwards, so a slow early
/// poll can never overwrite what a later poll already observed.
pub(super) struct Poller {
    api: DynAPI,
    config: PollConfig,
    rider_id: Uuid,
    trip_id: Uuid,
    current: Trip,
    token: CancellationToken,
    outputs: Outputs,
    issued: u64,
    applied: u64,
    failures: u32,
}

impl Poller {
    pub(super) fn new(
        api: DynAPI,
        config: PollConfig,
        rider_id: Uuid,
        trip: Trip,
        token: CancellationToken,
        outputs: Outputs,
    ) -> Self {
        Self {
            api,
            config,
            rider_id,
            trip_id: trip.id,
            current: trip,
            token,
            outputs,
            issued: 0,
            applied: 0,
            failures: 0,
        }
    }

    #[tracing::instrument(name = "Poller::run", skip(self), fields(trip_id = %self.trip_id))]
    pub(super) async fn run(mut self) {
        if !self.publish_initial() {
            return;
        }

        if self.current.is_terminal() {
            self.finish().await;
            return;
        }

        let started = Instant::now();
        let mut in_flight: FuturesUnordered<Poll> = FuturesUnordered::new();
        let mut next_tick = started + self.config.interval;

        loop {
            tokio::select! {
                biased;

                _ = self.token.cancelled() => {
                    tracing::debug!("poller cancelled with {} polls in flight", in_flight.len());
                    return;
                }

                Some((seq, result)) = in_flight.next(), if !in_flight.is_empty() => {
                    match result {
                        Ok(trip) => {
                            self.failures = 0;

                            match self.apply(seq, trip) {
                                Applied::Terminal => {
                                    drop(in_flight);
                                    self.finish().await;
                                    return;
                                }
                                Applied::Cancelled => return,
                                Applied::Yes | Applied::Discarded => {}
                            }
                        }
                        Err(error) => {
                            self.failures += 1;
                            tracing::warn!("poll #{} failed ({} in a row): {}", seq, self.failures, error);
                            self.emit(TripEvent::PollFailed { trip_id: self.trip_id, error });
                        }
                    }
                }

                _ = sleep_until(next_tick) => {
                    if self.token.is_cancelled() {
                        return;
                    }

                    if let Some(max_duration) = self.config.max_duration {
                        if started.elapsed() >= max_duration {
                            tracing::warn!("giving up on trip after {:?}", max_duration);
                            self.emit(TripEvent::PollingExpired { trip_id: self.trip_id });
                            return;
                        }
                    }

                    self.issued += 1;
                    in_flight.push(self.poll(self.issued));

                    next_tick = Instant::now() + self.config.delay_after(self.failures);
                }
            }
        }
    }

    fn poll(&self, seq: u64) -> Poll {
        let api = self.api.clone();
        let trip_id = self.trip_id;

        async move { (seq, api.find_trip(trip_id).await) }.boxed()
    }

    /// Replaces whatever an earlier poller left behind with the requested trip.
    fn publish_initial(&self) -> bool {
        let token = &self.token;
        let trip = &self.current;
        let events = &self.outputs.events;

        self.outputs.snapshot.send_if_modified(|slot| {
            if token.is_cancelled() {
                return false;
            }

            *slot = Some(trip.clone());
            emit(events, TripEvent::Requested(trip.clone()));

            true
        })
    }

    fn apply(&mut self, seq: u64, observed: Trip) -> Applied {
        if seq <= self.applied {
            tracing::debug!("discarding poll #{}, #{} already applied", seq, self.applied);
            return Applied::Discarded;
        }

        if observed.id != self.trip_id {
            tracing::warn!("discarding poll #{} for unexpected trip {}", seq, observed.id);
            return Applied::Discarded;
        }

        if self.current.would_regress_to(&observed) {
            tracing::warn!(
                "discarding poll #{}: {} would regress {}",
                seq,
                observed.status.name(),
                self.current.status.name()
            );
            return Applied::Discarded;
        }

        if !observed.is_consistent() {
            tracing::warn!("trip is {} but driver is {:?}", observed.status.name(), observed.driver_id);
        }

        let token = &self.token;
        let trip_id = self.trip_id;
        let from = self.current.status;
        let events = &self.outputs.events;

        let written = self.outputs.snapshot.send_if_modified(|slot| {
            if token.is_cancelled() {
                return false;
            }

            match slot {
                Some(shown) if shown.id == trip_id => {}
                _ => return false,
            }

            *slot = Some(observed.clone());

            if observed.status != from {
                emit(
                    events,
                    TripEvent::Transitioned {
                        from,
                        to: observed.status,
                        trip: observed.clone(),
                    },
                );
            }

            true
        });

        if !written {
            return Applied::Cancelled;
        }

        if observed.status != from {
            tracing::info!("trip {} -> {}", from.name(), observed.status.name());
        }

        self.applied = seq;
        self.current = observed;

        if self.current.is_terminal() {
            Applied::Terminal
        } else {
            Applied::Yes
        }
    }

    /// Runs once, after the terminal status has been applied.
    async fn finish(&self) {
        let status = self.current.status;
        self.emit(TripEvent::Finished {
            trip_id: self.trip_id,
            status,
        });

        tracing::info!("trip {} finished as {}, refreshing history", self.trip_id, status.name());

        match self.api.rider_trips(self.rider_id).await {
            Ok(trips) => {
                let token = &self.token;
                let events = &self.outputs.events;
                let rider_id = self.rider_id;

                self.outputs.history.send_if_modified(|history| {
                    if token.is_cancelled() {
                        return false;
                    }

                    *history = trips.clone();
                    emit(events, TripEvent::HistoryRefreshed { rider_id, trips });

                    true
                });
            }
            Err(error) => {
                tracing::warn!("history refresh failed: {}", error);
                self.emit(TripEvent::HistoryRefreshFailed {
                    rider_id: self.rider_id,
                    error,
                });
            }
        }
    }

    fn emit(&self, event: TripEvent) {
        if !self.token.is_cancelled() {
            emit(&self.outputs.events, event);
        }
    }
}

fn emit(events: &async_channel::Sender<TripEvent>, event: TripEvent) {
    if let Err(err) = events.try_send(event) {
        tracing::warn!("dropping trip event: {}", err);
    }
}
