mod common;

use std::sync::atomic::Ordering;

use tokio_test::assert_ok;

use cabmatch::entities::{Coordinates, RoutePair};
use cabmatch::estimator::FareEstimator;

use common::{MockAPI, DROPOFF, PICKUP};

#[tokio::test]
async fn nothing_is_estimated_until_both_endpoints_are_set() {
    let api = MockAPI::new();
    let mut estimator = FareEstimator::new(api.dyn_api());

    assert_eq!(assert_ok!(estimator.update(None, None).await), None);
    assert_eq!(assert_ok!(estimator.update(Some(PICKUP), None).await), None);
    assert_eq!(assert_ok!(estimator.update(None, Some(DROPOFF)).await), None);

    assert_eq!(MockAPI::count(&api.calls.estimate_fare), 0);
    assert!(estimator.last_quote().is_none());
    assert!(estimator.is_stale_for(Some(PICKUP), None));
}

#[tokio::test]
async fn unchanged_pair_is_not_estimated_twice() {
    let api = MockAPI::new();
    let mut estimator = FareEstimator::new(api.dyn_api());

    let first = assert_ok!(estimator.update(Some(PICKUP), Some(DROPOFF)).await).unwrap();
    let second = assert_ok!(estimator.update(Some(PICKUP), Some(DROPOFF)).await).unwrap();

    assert_eq!(first, second);
    assert_eq!(MockAPI::count(&api.calls.estimate_fare), 1);
    assert!(!estimator.is_stale_for(Some(PICKUP), Some(DROPOFF)));
    assert_eq!(
        estimator.quote_for(RoutePair::new(PICKUP, DROPOFF)),
        Some(&first)
    );
}

#[tokio::test]
async fn moving_either_endpoint_estimates_again() {
    let api = MockAPI::new();
    let mut estimator = FareEstimator::new(api.dyn_api());
    let elsewhere = Coordinates::new(28.70, 77.10);

    let original = assert_ok!(estimator.update(Some(PICKUP), Some(DROPOFF)).await).unwrap();
    let new_pickup = assert_ok!(estimator.update(Some(elsewhere), Some(DROPOFF)).await).unwrap();
    let new_dropoff = assert_ok!(estimator.update(Some(elsewhere), Some(PICKUP)).await).unwrap();

    assert_eq!(MockAPI::count(&api.calls.estimate_fare), 3);
    assert_ne!(original.estimated_fare, new_pickup.estimated_fare);
    assert_ne!(new_pickup.distance_km, new_dropoff.distance_km);
    assert!(estimator.is_stale_for(Some(PICKUP), Some(DROPOFF)));
}

#[tokio::test]
async fn failure_keeps_previous_quote_and_records_error() {
    let api = MockAPI::new();
    let mut estimator = FareEstimator::new(api.dyn_api());
    let elsewhere = Coordinates::new(28.70, 77.10);

    let quote = assert_ok!(estimator.update(Some(PICKUP), Some(DROPOFF)).await).unwrap();

    api.fail_estimates.store(true, Ordering::SeqCst);
    let err = estimator
        .update(Some(elsewhere), Some(DROPOFF))
        .await
        .unwrap_err();

    assert!(err.is_network_error());
    assert_eq!(estimator.error(), Some(&err));

    let (pair, kept) = estimator.last_quote().unwrap();
    assert_eq!(*pair, RoutePair::new(PICKUP, DROPOFF));
    assert_eq!(kept, &quote);

    // the failed pair is retried, and success clears the error
    api.fail_estimates.store(false, Ordering::SeqCst);
    assert_ok!(estimator.update(Some(elsewhere), Some(DROPOFF)).await);

    assert_eq!(MockAPI::count(&api.calls.estimate_fare), 3);
    assert_eq!(estimator.error(), None);
    assert!(!estimator.is_stale_for(Some(elsewhere), Some(DROPOFF)));
}
