mod common;

use common::{request, service};
use payment_service::domain::entity::Payment;
use payment_service::domain::error::ServiceError;
use payment_service::domain::status::RecordStatus;
use payment_service::repo::{RecordStore, UnitOfWork};
use rust_decimal_macros::dec;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn exactly_one_conflicting_transition_wins() {
    for _ in 0..50 {
        let svc = service::<Payment>(0.0);
        let id = svc
            .create(request(1, "a@b.com", dec!(9.99), "usd"))
            .await
            .unwrap()
            .id;

        let a = tokio::spawn({
            let svc = svc.clone();
            async move { svc.update_status(id, RecordStatus::Success).await }
        });
        let b = tokio::spawn({
            let svc = svc.clone();
            async move { svc.update_status(id, RecordStatus::Failure).await }
        });
        let (a, b) = (a.await.unwrap(), b.await.unwrap());

        let winner = match (&a, &b) {
            (Ok(()), Err(ServiceError::InvalidTransition { current, .. })) => {
                assert_eq!(*current, RecordStatus::Success);
                RecordStatus::Success
            }
            (Err(ServiceError::InvalidTransition { current, .. }), Ok(())) => {
                assert_eq!(*current, RecordStatus::Failure);
                RecordStatus::Failure
            }
            other => panic!("expected exactly one winner, got {other:?}"),
        };
        assert_eq!(svc.get_status(id).await.unwrap(), winner);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_concurrent_cancels_single_success() {
    let svc = service::<Payment>(0.0);
    let id = svc
        .create(request(1, "a@b.com", dec!(1), "usd"))
        .await
        .unwrap()
        .id;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let svc = svc.clone();
        handles.push(tokio::spawn(async move { svc.cancel(id).await }));
    }

    let mut ok = 0;
    let mut rejected = 0;
    for h in handles {
        match h.await.unwrap() {
            Ok(()) => ok += 1,
            Err(ServiceError::InvalidTransition { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(rejected, 15);
    assert_eq!(svc.get_status(id).await.unwrap(), RecordStatus::Canceled);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn update_and_cancel_race_on_same_record() {
    for _ in 0..50 {
        let svc = service::<Payment>(0.0);
        let id = svc
            .create(request(1, "a@b.com", dec!(1), "usd"))
            .await
            .unwrap()
            .id;

        let update = tokio::spawn({
            let svc = svc.clone();
            async move { svc.update_status(id, RecordStatus::Success).await }
        });
        let cancel = tokio::spawn({
            let svc = svc.clone();
            async move { svc.cancel(id).await }
        });
        let (update, cancel) = (update.await.unwrap(), cancel.await.unwrap());

        assert!(update.is_ok() ^ cancel.is_ok());
        let expected = if update.is_ok() {
            RecordStatus::Success
        } else {
            RecordStatus::Canceled
        };
        assert_eq!(svc.get_status(id).await.unwrap(), expected);
    }
}

#[tokio::test]
async fn different_records_do_not_block_each_other() {
    let svc = service::<Payment>(0.0);
    let first = svc
        .create(request(1, "a@b.com", dec!(1), "usd"))
        .await
        .unwrap()
        .id;
    let second = svc
        .create(request(1, "a@b.com", dec!(2), "usd"))
        .await
        .unwrap()
        .id;

    let mut held = svc.store.begin().await.unwrap();
    assert_eq!(
        held.conditional_update_status(first, RecordStatus::New, RecordStatus::Success)
            .await
            .unwrap(),
        1
    );

    tokio::time::timeout(
        Duration::from_secs(1),
        svc.update_status(second, RecordStatus::Failure),
    )
    .await
    .expect("unrelated record must not wait")
    .unwrap();

    held.commit().await.unwrap();
    assert_eq!(svc.get_status(first).await.unwrap(), RecordStatus::Success);
    assert_eq!(svc.get_status(second).await.unwrap(), RecordStatus::Failure);
}

#[tokio::test]
async fn deadline_mid_transaction_rolls_back() {
    let svc = service::<Payment>(0.0);
    let id = svc
        .create(request(1, "a@b.com", dec!(1), "usd"))
        .await
        .unwrap()
        .id;

    // Hold the row so the next transition blocks inside its unit of work.
    let mut held = svc.store.begin().await.unwrap();
    held.conditional_update_status(id, RecordStatus::New, RecordStatus::Success)
        .await
        .unwrap();

    let timed_out = tokio::time::timeout(
        Duration::from_millis(50),
        svc.update_status(id, RecordStatus::Failure),
    )
    .await;
    assert!(timed_out.is_err());

    held.rollback().await.unwrap();
    assert_eq!(svc.get_status(id).await.unwrap(), RecordStatus::New);

    // Nothing from the abandoned attempt survives and the row is free again.
    svc.update_status(id, RecordStatus::Failure).await.unwrap();
    assert_eq!(svc.get_status(id).await.unwrap(), RecordStatus::Failure);
}

#[tokio::test]
async fn blocked_writer_reports_winner_status() {
    let svc = service::<Payment>(0.0);
    let id = svc
        .create(request(1, "a@b.com", dec!(1), "usd"))
        .await
        .unwrap()
        .id;

    let mut held = svc.store.begin().await.unwrap();
    held.conditional_update_status(id, RecordStatus::New, RecordStatus::Success)
        .await
        .unwrap();

    let loser = tokio::spawn({
        let svc = svc.clone();
        async move { svc.update_status(id, RecordStatus::Failure).await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    held.commit().await.unwrap();

    let err = loser.await.unwrap().unwrap_err();
    assert_eq!(
        err.to_string(),
        "can't update from success status to failure status"
    );
    assert_eq!(svc.get_status(id).await.unwrap(), RecordStatus::Success);
}
