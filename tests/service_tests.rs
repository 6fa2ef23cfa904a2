//! Schedule service: persistence round trips and per-schedule serialization.

mod support;

use std::sync::Arc;

use slot_scheduler::config::SchedulingConfig;
use slot_scheduler::db::LocalRepository;
use slot_scheduler::models::{
    ErrorKind, Schedule, ScheduleStatus, SchedulingPolicy, SlotStatus,
};
use slot_scheduler::services::{ScheduleService, ServiceError};
use support::{fixed_clock, future_slot, hours, now};

fn service_with(policy: SchedulingPolicy) -> Arc<ScheduleService> {
    Arc::new(ScheduleService::new(
        Arc::new(LocalRepository::<Schedule>::new()),
        fixed_clock(),
        policy,
    ))
}

fn service() -> Arc<ScheduleService> {
    service_with(SchedulingPolicy::default())
}

async fn seed(service: &ScheduleService, id: i64) -> Schedule {
    service
        .create_schedule(
            id,
            now().date_naive(),
            vec![
                future_slot(1, SlotStatus::Available),
                future_slot(2, SlotStatus::Available),
            ],
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_concurrent_reservations_first_wins() {
    let service = service();
    seed(&service, 1).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move { service.reserve_slot(1, 1).await }));
    }

    let mut wins = 0;
    let mut losses = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => wins += 1,
            Err(err) => {
                assert_eq!(err.domain_kind(), Some(ErrorKind::NotAvailable));
                losses += 1;
            }
        }
    }
    assert_eq!(wins, 1);
    assert_eq!(losses, 7);

    let stored = service.get_schedule(1).await.unwrap();
    assert_eq!(stored.slot(1).unwrap().status(), SlotStatus::Reserved);
    assert_eq!(stored.slot(2).unwrap().status(), SlotStatus::Available);
}

#[tokio::test]
async fn test_full_lifecycle_is_persisted() {
    let service = service();
    seed(&service, 1).await;

    service.reserve_slot(1, 1).await.unwrap();
    service
        .reschedule_slot(1, 1, now() + hours(8), now() + hours(9), 60)
        .await
        .unwrap();
    service.cancel_slot(1, 1).await.unwrap();
    service.reopen_slot(1, 1).await.unwrap();
    service.block_slot(1, 2).await.unwrap();

    let stored = service.get_schedule(1).await.unwrap();
    let first = stored.slot(1).unwrap();
    assert_eq!(first.status(), SlotStatus::Available);
    assert_eq!(first.start_time(), now() + hours(8));
    assert_eq!(stored.slot(2).unwrap().status(), SlotStatus::Blocked);
}

#[tokio::test]
async fn test_recompute_status_is_stored() {
    let service = service();
    seed(&service, 1).await;
    service.block_slot(1, 1).await.unwrap();
    service.block_slot(1, 2).await.unwrap();

    assert_eq!(
        service.get_schedule(1).await.unwrap().status(),
        ScheduleStatus::Active
    );
    let recomputed = service.recompute_status(1).await.unwrap();
    assert_eq!(recomputed.status(), ScheduleStatus::Blocked);
    assert_eq!(
        service.get_schedule(1).await.unwrap().status(),
        ScheduleStatus::Blocked
    );
}

#[tokio::test]
async fn test_unknown_schedule_and_slot() {
    let service = service();
    let err = service.reserve_slot(42, 1).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, ServiceError::Repository(_)));

    seed(&service, 1).await;
    let err = service.reserve_slot(1, 99).await.unwrap_err();
    assert_eq!(err.domain_kind(), Some(ErrorKind::SlotNotFound));
}

#[tokio::test]
async fn test_factory_errors_store_nothing() {
    let service = service();
    let err = service
        .create_schedule(1, None, vec![future_slot(1, SlotStatus::Available)])
        .await
        .unwrap_err();
    assert_eq!(err.domain_kind(), Some(ErrorKind::ScheduleDateRequired));

    let err = service
        .block_schedule(1, now().date_naive(), vec![future_slot(1, SlotStatus::Reserved)])
        .await
        .unwrap_err();
    assert_eq!(err.domain_kind(), Some(ErrorKind::ScheduleReserved));

    assert!(service.list_schedules().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_and_delete() {
    let service = service();
    seed(&service, 2).await;
    seed(&service, 1).await;
    service
        .cancel_schedule(3, now().date_naive(), vec![future_slot(1, SlotStatus::Cancelled)])
        .await
        .unwrap();

    let ids: Vec<i64> = service
        .list_schedules()
        .await
        .unwrap()
        .iter()
        .map(|s| s.id().value())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);

    service.delete_schedule(2).await.unwrap();
    assert!(service.get_schedule(2).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_policy_from_config() {
    let config = SchedulingConfig::from_toml_str(
        "[policy]\nreject_past_timestamps_on_construct = true\nlegacy_duration_error_kind = true\n",
    )
    .unwrap();
    let service = ScheduleService::with_config(
        Arc::new(LocalRepository::<Schedule>::new()),
        fixed_clock(),
        &config,
    );

    let err = service
        .new_slot(1, now() - hours(2), now() - hours(1), SlotStatus::Available)
        .unwrap_err();
    assert_eq!(err.domain_kind(), Some(ErrorKind::InvalidSlot));

    let yesterday = now().date_naive().pred_opt().unwrap();
    let slot = service
        .new_slot(1, now() + hours(1), now() + hours(2), SlotStatus::Available)
        .unwrap();
    let err = service
        .create_schedule(1, yesterday, vec![slot.clone()])
        .await
        .unwrap_err();
    assert_eq!(err.domain_kind(), Some(ErrorKind::InvalidSchedule));

    service
        .create_schedule(1, now().date_naive(), vec![slot])
        .await
        .unwrap();
    service.reserve_slot(1, 1).await.unwrap();
    let err = service
        .reschedule_slot(1, 1, now() + hours(3), now() + hours(4), 0)
        .await
        .unwrap_err();
    assert_eq!(err.domain_kind(), Some(ErrorKind::NotAvailable));
}
