use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::error::{conflict_error, not_found_error, upstream_error, Error};

/// How a non-success status of a call is reported. Only logins, profile
/// lookups and registrations have distinguished failures.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CallKind {
    Login,
    Lookup,
    Registration,
    Other,
}

pub fn check_status(status: u16, kind: CallKind) -> Result<(), Error> {
    match (status, kind) {
        (200..=299, _) => Ok(()),
        (404, CallKind::Login | CallKind::Lookup) => Err(not_found_error()),
        (400 | 409, CallKind::Registration) => Err(conflict_error()),
        _ => Err(upstream_error(status)),
    }
}

#[tracing::instrument(skip(res), fields(url = %res.url()))]
pub async fn read_json<T: DeserializeOwned>(res: Response, kind: CallKind) -> Result<T, Error> {
    let status_code = res.status().as_u16();

    if let Err(err) = check_status(status_code, kind) {
        tracing::warn!("request failed with status {}", status_code);
        return Err(err);
    }

    Ok(res.json().await?)
}

#[tracing::instrument(skip(res), fields(url = %res.url()))]
pub async fn read_ack(res: Response, kind: CallKind) -> Result<(), Error> {
    let status_code = res.status().as_u16();

    if let Err(err) = check_status(status_code, kind) {
        tracing::warn!("request failed with status {}", status_code);
        return Err(err);
    }

    Ok(())
}

#[test]
fn only_login_and_lookup_distinguish_not_found() {
    assert!(check_status(404, CallKind::Login).unwrap_err().is_not_found_error());
    assert!(check_status(404, CallKind::Lookup).unwrap_err().is_not_found_error());
    assert!(check_status(404, CallKind::Other).unwrap_err().is_network_error());
}

#[test]
fn duplicate_registration_is_a_conflict() {
    assert!(check_status(400, CallKind::Registration).unwrap_err().is_conflict_error());
    assert!(check_status(409, CallKind::Registration).unwrap_err().is_conflict_error());
    assert!(check_status(400, CallKind::Other).unwrap_err().is_network_error());
    assert!(check_status(500, CallKind::Registration).unwrap_err().is_network_error());
}

#[test]
fn success_statuses_pass() {
    assert!(check_status(200, CallKind::Other).is_ok());
    assert!(check_status(201, CallKind::Registration).is_ok());
}
