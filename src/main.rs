use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use cabmatch::api::DynAPI;
use cabmatch::client::HttpClient;
use cabmatch::config::Config;
use cabmatch::entities::{Coordinates, DriverStatus, Profile, Session, Trip, UserType};
use cabmatch::error::{validation_error, Error};
use cabmatch::estimator::FareEstimator;
use cabmatch::orchestrator::{TripEvent, TripOrchestrator};
use cabmatch::session::{FileStorage, SessionStore};

#[derive(Parser, Debug)]
#[command(name = "cabmatch", about = "Ride-hailing client: book and follow trips from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the backend is reachable
    Health,
    /// Create a rider account and sign in with it
    RegisterRider {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
    },
    /// Create a driver account and sign in with it
    RegisterDriver {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        vehicle_no: String,
    },
    /// Sign in with an existing account
    Login {
        #[arg(long)]
        phone: String,
        /// Role used for messages when the account cannot be found
        #[arg(long, value_enum, default_value_t = Role::Rider)]
        role: Role,
    },
    Logout,
    /// Show the stored session
    Whoami,
    /// Estimate the fare between two "lat,lng" points
    Estimate {
        #[arg(allow_hyphen_values = true)]
        pickup: Coordinates,
        #[arg(allow_hyphen_values = true)]
        dropoff: Coordinates,
    },
    /// Request a trip and follow it until it ends
    Ride {
        #[arg(allow_hyphen_values = true)]
        pickup: Coordinates,
        #[arg(allow_hyphen_values = true)]
        dropoff: Coordinates,
    },
    /// List the signed-in user's trips
    Trips,
    /// Driver: change availability
    SetStatus {
        #[arg(value_enum)]
        status: StatusArg,
    },
    /// Driver: report the current position as "lat,lng"
    SetLocation {
        #[arg(allow_hyphen_values = true)]
        location: Coordinates,
    },
    /// Driver: mark an assigned trip as started
    StartTrip { trip_id: Uuid },
    /// Driver: mark an ongoing trip as completed
    CompleteTrip { trip_id: Uuid },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Role {
    Rider,
    Driver,
}

impl From<Role> for UserType {
    fn from(role: Role) -> Self {
        match role {
            Role::Rider => UserType::Rider,
            Role::Driver => UserType::Driver,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StatusArg {
    Offline,
    Available,
    OnTrip,
}

impl From<StatusArg> for DriverStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Offline => DriverStatus::Offline,
            StatusArg::Available => DriverStatus::Available,
            StatusArg::OnTrip => DriverStatus::OnTrip,
        }
    }
}

struct App {
    config: Config,
    client: HttpClient,
    api: DynAPI,
    sessions: SessionStore<FileStorage>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let app = match App::new() {
        Ok(app) => app,
        Err(err) => {
            eprintln!("cannot start: {}", err);
            return ExitCode::FAILURE;
        }
    };

    // messages for a failed command depend on who is asking
    let role = match &cli.command {
        Command::RegisterDriver { .. } => UserType::Driver,
        Command::Login { role, .. } => (*role).into(),
        _ => app.role(),
    };

    match app.run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!("command failed: {}", err);
            eprintln!("{}", err.user_message(role));
            ExitCode::FAILURE
        }
    }
}

impl App {
    fn new() -> Result<Self, Error> {
        let config = Config::load()?;
        let client = HttpClient::new(&config)?;
        let api: DynAPI = Arc::new(client.clone());
        let sessions = SessionStore::new(FileStorage::new(&config.session_dir));

        Ok(Self {
            config,
            client,
            api,
            sessions,
        })
    }

    fn role(&self) -> UserType {
        self.sessions
            .load()
            .ok()
            .flatten()
            .map(|session| session.user_type)
            .unwrap_or(UserType::Rider)
    }

    async fn run(&self, command: Command) -> Result<(), Error> {
        match command {
            Command::Health => {
                let health = self.client.health().await?;
                println!("{}: {}", health.service, if health.ok { "ok" } else { "degraded" });
            }
            Command::RegisterRider { name, phone } => {
                let auth = self.api.register_rider(name.clone(), phone.clone()).await?;
                let profile = Profile {
                    name: Some(name),
                    phone: Some(phone),
                    vehicle_no: None,
                };
                self.sign_in(Session::from_auth(auth, profile))?;
            }
            Command::RegisterDriver {
                name,
                phone,
                vehicle_no,
            } => {
                let auth = self
                    .api
                    .register_driver(name.clone(), phone.clone(), vehicle_no.clone())
                    .await?;
                let profile = Profile {
                    name: Some(name),
                    phone: Some(phone),
                    vehicle_no: Some(vehicle_no),
                };
                self.sign_in(Session::from_auth(auth, profile))?;
            }
            Command::Login { phone, .. } => {
                let auth = self.api.login(phone).await?;
                let profile = self.profile(auth.user_id, auth.user_type).await;
                self.sign_in(Session::from_auth(auth, profile))?;
            }
            Command::Logout => {
                self.sessions.clear()?;
                println!("signed out");
            }
            Command::Whoami => match self.sessions.load()? {
                Some(session) => println!(
                    "{} {} ({})",
                    session.user_type.name(),
                    session.name.as_deref().unwrap_or("unnamed"),
                    session.user_id
                ),
                None => println!("not signed in"),
            },
            Command::Estimate { pickup, dropoff } => {
                let mut estimator = FareEstimator::new(self.api.clone());

                if let Some(quote) = estimator.update(Some(pickup), Some(dropoff)).await? {
                    println!(
                        "{:.1} km, estimated fare {:.2} (base {:.2}, surge x{:.1})",
                        quote.distance_km, quote.estimated_fare, quote.base_fare, quote.surge_factor
                    );
                }
            }
            Command::Ride { pickup, dropoff } => {
                let session = self.rider_session()?;
                self.ride(session.user_id, pickup, dropoff).await?;
            }
            Command::Trips => {
                let session = self.signed_in()?;
                let trips = match session.user_type {
                    UserType::Rider => self.api.rider_trips(session.user_id).await?,
                    UserType::Driver => self.api.driver_trips(session.user_id).await?,
                };

                for trip in &trips {
                    print_trip(trip);
                }
            }
            Command::SetStatus { status } => {
                let session = self.driver_session()?;
                self.api
                    .update_driver_status(session.user_id, status.into())
                    .await?;

                let driver = self.api.find_driver(session.user_id).await?;
                if driver.is_available() {
                    println!("{} is taking trips", driver.name);
                } else {
                    println!("{} is {}", driver.name, driver.status.name());
                }
            }
            Command::SetLocation { location } => {
                let session = self.driver_session()?;
                self.api
                    .update_driver_location(session.user_id, location)
                    .await?;
            }
            Command::StartTrip { trip_id } => {
                self.driver_session()?;
                self.api.start_trip(trip_id).await?;
            }
            Command::CompleteTrip { trip_id } => {
                self.driver_session()?;
                self.api.complete_trip(trip_id).await?;
                print_trip(&self.api.find_trip(trip_id).await?);
            }
        }

        Ok(())
    }

    /// Estimates the fare, requests the trip and prints every transition
    /// until the history has been refreshed.
    async fn ride(&self, rider_id: Uuid, pickup: Coordinates, dropoff: Coordinates) -> Result<(), Error> {
        let mut estimator = FareEstimator::new(self.api.clone());

        if let Err(err) = estimator.update(Some(pickup), Some(dropoff)).await {
            eprintln!("no fare estimate: {}", err.user_message(UserType::Rider));
        } else if let Some((_, quote)) = estimator.last_quote() {
            println!("estimated fare {:.2}", quote.estimated_fare);
        }

        let mut orchestrator = TripOrchestrator::new(self.api.clone(), self.config.polling.clone());
        let events = orchestrator.events();

        orchestrator.request(rider_id, Some(pickup), Some(dropoff)).await?;

        while let Ok(event) = events.recv().await {
            match event {
                TripEvent::Requested(trip) => println!("trip {} requested", trip.id),
                TripEvent::Transitioned { from, to, trip } => {
                    println!("{} -> {}", from.name(), to.name());
                    if let Some(driver_id) = trip.driver_id {
                        tracing::debug!("driver {}", driver_id);
                    }
                }
                TripEvent::PollFailed { error, .. } => {
                    eprintln!("{}", error.user_message(UserType::Rider))
                }
                TripEvent::Finished { status, .. } => println!("trip {}", status.name()),
                TripEvent::HistoryRefreshed { trips, .. } => {
                    println!("{} trips in history", trips.len());
                    break;
                }
                TripEvent::HistoryRefreshFailed { error, .. } => {
                    eprintln!("trip history unavailable: {}", error.user_message(UserType::Rider));
                    break;
                }
                TripEvent::PollingExpired { trip_id } => {
                    eprintln!("stopped following trip {}", trip_id);
                    break;
                }
            }
        }

        orchestrator.shutdown().await;

        if let Some(trip) = orchestrator.current() {
            print_trip(&trip);
        }

        Ok(())
    }

    /// Best effort: a profile that cannot be fetched leaves the session
    /// without display fields.
    async fn profile(&self, user_id: Uuid, user_type: UserType) -> Profile {
        let profile = match user_type {
            UserType::Rider => self.api.find_rider(user_id).await.map(|rider| Profile {
                name: Some(rider.name),
                phone: Some(rider.phone),
                vehicle_no: None,
            }),
            UserType::Driver => self.api.find_driver(user_id).await.map(|driver| Profile {
                name: Some(driver.name),
                phone: Some(driver.phone),
                vehicle_no: Some(driver.vehicle_no),
            }),
        };

        profile.unwrap_or_else(|err| {
            tracing::warn!("profile lookup failed: {}", err);
            Profile::default()
        })
    }

    fn sign_in(&self, session: Session) -> Result<(), Error> {
        self.sessions.save(&session)?;
        println!("signed in as {} {}", session.user_type.name(), session.user_id);

        Ok(())
    }

    fn signed_in(&self) -> Result<Session, Error> {
        self.sessions
            .load()?
            .ok_or_else(|| validation_error("Log in first."))
    }

    fn rider_session(&self) -> Result<Session, Error> {
        let session = self.signed_in()?;

        if !session.is_rider() {
            return Err(validation_error("Log in as a rider first."));
        }

        Ok(session)
    }

    fn driver_session(&self) -> Result<Session, Error> {
        let session = self.signed_in()?;

        if !session.is_driver() {
            return Err(validation_error("Log in as a driver first."));
        }

        Ok(session)
    }
}

fn print_trip(trip: &Trip) {
    let fare = trip
        .fare
        .map(|fare| format!("{:.2}", fare))
        .unwrap_or_else(|| "-".into());

    println!(
        "{}  {:<9}  {} -> {}  fare {}",
        trip.id,
        trip.status.name(),
        String::from(trip.pickup),
        String::from(trip.dropoff),
        fare
    );
}

#[test]
fn negative_coordinates_are_positional_values() {
    let cli = Cli::try_parse_from(["cabmatch", "ride", "-33.9,151.2", "40.7,-74.0"]).unwrap();

    match cli.command {
        Command::Ride { pickup, dropoff } => {
            assert_eq!(pickup, Coordinates::new(-33.9, 151.2));
            assert_eq!(dropoff, Coordinates::new(40.7, -74.0));
        }
        other => panic!("parsed as {:?}", other),
    }

    let cli = Cli::try_parse_from(["cabmatch", "set-location", "-1.29,-36.82"]).unwrap();
    assert!(matches!(
        cli.command,
        Command::SetLocation { location } if location == Coordinates::new(-1.29, -36.82)
    ));
}
