use std::env;
use std::fmt::{self, Debug, Display};

use crate::entities::UserType;

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl Error {
    pub fn is_validation_error(&self) -> bool {
        self.code == 101
    }

    pub fn is_not_found_error(&self) -> bool {
        self.code == 102
    }

    pub fn is_conflict_error(&self) -> bool {
        self.code == 103
    }

    pub fn is_network_error(&self) -> bool {
        self.code == 3
    }

    pub fn is_serialization_error(&self) -> bool {
        self.code == 7
    }

    /// Text shown to the user for this error. Not-found and conflict
    /// messages depend on who was trying to sign in or register.
    pub fn user_message(&self, role: UserType) -> String {
        match self.code {
            101 => self.message.clone(),
            102 => match role {
                UserType::Rider => "No rider account uses this phone number. Register first.".into(),
                UserType::Driver => {
                    "No driver account uses this phone number. Register your vehicle first.".into()
                }
            },
            103 => match role {
                UserType::Rider => "This phone number is already registered. Log in instead.".into(),
                UserType::Driver => {
                    "This phone number already belongs to a driver. Log in instead.".into()
                }
            },
            _ => "Something went wrong. Check your connection and try again.".into(),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        config_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        network_error(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        serialization_error(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        storage_error(err)
    }
}

pub fn validation_error(message: impl Into<String>) -> Error {
    Error {
        code: 101,
        message: message.into(),
    }
}

pub fn not_found_error() -> Error {
    Error {
        code: 102,
        message: "not found".into(),
    }
}

pub fn conflict_error() -> Error {
    Error {
        code: 103,
        message: "already exists".into(),
    }
}

pub fn config_error<T: Debug>(err: T) -> Error {
    Error {
        code: 1,
        message: format!("configuration error: {:?}", err),
    }
}

pub fn network_error<T: Debug>(err: T) -> Error {
    Error {
        code: 3,
        message: format!("network error: {:?}", err),
    }
}

pub fn upstream_error(status: u16) -> Error {
    Error {
        code: 3,
        message: format!("upstream responded with status {}", status),
    }
}

pub fn serialization_error<T: Display>(err: T) -> Error {
    Error {
        code: 7,
        message: format!("serialization error: {}", err),
    }
}

pub fn storage_error<T: Debug>(err: T) -> Error {
    Error {
        code: 6,
        message: format!("storage error: {:?}", err),
    }
}

#[test]
fn user_message_is_role_specific() {
    let err = conflict_error();

    assert_ne!(
        err.user_message(UserType::Rider),
        err.user_message(UserType::Driver)
    );
    assert!(err.is_conflict_error());
}

#[test]
fn network_failures_collapse_to_generic_message() {
    let upstream = upstream_error(502);
    let transport = network_error("connection reset");

    assert!(upstream.is_network_error());
    assert!(transport.is_network_error());
    assert_eq!(
        upstream.user_message(UserType::Rider),
        transport.user_message(UserType::Driver)
    );
}

#[test]
fn validation_message_is_shown_verbatim() {
    let err = validation_error("select a dropoff location");

    assert!(err.is_validation_error());
    assert_eq!(err.user_message(UserType::Rider), "select a dropoff location");
}

#[test]
fn malformed_json_is_a_serialization_error() {
    let err: Error = serde_json::from_str::<UserType>("\"passenger\"").unwrap_err().into();

    assert!(err.is_serialization_error());
    assert!(!err.is_network_error());
}
