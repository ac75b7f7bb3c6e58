mod driver;
mod location;
mod quote;
mod rider;
mod session;
mod trip;

pub use driver::{Driver, Status as DriverStatus};
pub use location::{Coordinates, GeoPoint};
pub use quote::{FareQuote, RoutePair};
pub use rider::Rider;
pub use session::{AuthResponse, Profile, Session, UserType};
pub use trip::{Status as TripStatus, Trip};
