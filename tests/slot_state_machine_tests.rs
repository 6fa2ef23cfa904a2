//! Slot lifecycle tests: the transition table, expiry and construction rules.

mod support;

use chrono::Duration;
use proptest::prelude::*;
use slot_scheduler::models::{
    allowed_sources, transition, Clock, DomainResult, ErrorCategory, ErrorKind, FixedClock,
    SchedulingPolicy, Slot, SlotOperation, SlotStatus,
};
use support::{fixed_clock, future_slot, hours, now, slot_at};

fn run(slot: &mut Slot, operation: SlotOperation, clock: &FixedClock) -> DomainResult<()> {
    match operation {
        SlotOperation::Block => slot.block(clock),
        SlotOperation::Cancel => slot.cancel(clock),
        SlotOperation::Reserve => slot.reserve(clock),
        SlotOperation::Reopen => slot.reopen(clock),
        SlotOperation::Reschedule => {
            slot.reschedule(now() + hours(5), now() + hours(6), 60, clock)
        }
    }
}

/// Expected outcome for a live slot, written out per operation.
fn expected(status: SlotStatus, operation: SlotOperation) -> Result<SlotStatus, ErrorKind> {
    use SlotStatus::*;
    match operation {
        SlotOperation::Block => match status {
            Reserved | Cancelled | Rescheduled => Err(ErrorKind::BlockedConflict),
            _ => Ok(Blocked),
        },
        SlotOperation::Cancel => match status {
            Blocked | Available => Err(ErrorKind::BlockedConflict),
            _ => Ok(Cancelled),
        },
        SlotOperation::Reserve => match status {
            Available => Ok(Reserved),
            _ => Err(ErrorKind::NotAvailable),
        },
        SlotOperation::Reschedule => match status {
            Reserved => Ok(Rescheduled),
            _ => Err(ErrorKind::NotReserved),
        },
        SlotOperation::Reopen => match status {
            Cancelled | Blocked => Ok(Available),
            _ => Err(ErrorKind::BlockedConflict),
        },
    }
}

#[test]
fn test_every_live_transition_matches_table() {
    let clock = fixed_clock();
    for status in SlotStatus::ALL {
        for operation in SlotOperation::ALL {
            let mut slot = future_slot(1, status);
            let before = slot.clone();
            let outcome = run(&mut slot, operation, &clock);

            match expected(status, operation) {
                Ok(next) => {
                    assert!(outcome.is_ok(), "{operation} from {status} should succeed");
                    assert_eq!(slot.status(), next);
                }
                Err(kind) => {
                    let err = outcome.unwrap_err();
                    assert_eq!(err.kind(), kind, "{operation} from {status}");
                    assert_eq!(err.category(), ErrorCategory::InvalidState);
                    assert_eq!(slot, before, "failed {operation} must not mutate");
                }
            }
            assert_eq!(transition(status, operation), expected(status, operation));
        }
    }
}

#[test]
fn test_expired_slot_refuses_everything() {
    let clock = fixed_clock();
    for status in SlotStatus::ALL {
        for operation in SlotOperation::ALL {
            let mut slot = slot_at(1, -2, -1, status);
            let err = run(&mut slot, operation, &clock).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::SlotExpired);
            assert_eq!(err.category(), ErrorCategory::InvalidState);
            assert_eq!(slot.status(), status);
        }
    }
}

#[test]
fn test_allowed_sources_agree_with_transition() {
    for operation in SlotOperation::ALL {
        let sources = allowed_sources(operation);
        for status in SlotStatus::ALL {
            let allowed = transition(status, operation).is_ok();
            assert_eq!(sources.contains(&status), allowed);
            // expiry is ignored by `can`
            assert_eq!(slot_at(1, -2, -1, status).can(operation), allowed);
        }
    }
}

#[test]
fn test_reserve_then_reserve_again() {
    let clock = fixed_clock();
    let mut slot = slot_at(1, 1, 2, SlotStatus::Available);

    slot.reserve(&clock).unwrap();
    assert_eq!(slot.status(), SlotStatus::Reserved);

    let err = slot.reserve(&clock).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotAvailable);
}

#[test]
fn test_block_in_the_past_is_expired() {
    let clock = fixed_clock();
    let mut slot = slot_at(1, -2, -1, SlotStatus::Available);
    assert_eq!(slot.block(&clock).unwrap_err().kind(), ErrorKind::SlotExpired);
}

#[test]
fn test_block_twice_keeps_blocked() {
    let clock = fixed_clock();
    let mut slot = future_slot(1, SlotStatus::Available);
    slot.block(&clock).unwrap();
    slot.block(&clock).unwrap();
    assert_eq!(slot.status(), SlotStatus::Blocked);
}

#[test]
fn test_reschedule_moves_interval() {
    let clock = fixed_clock();
    let mut slot = slot_at(1, 1, 2, SlotStatus::Reserved);

    slot.reschedule(now() + hours(3), now() + hours(4), 60, &clock)
        .unwrap();
    assert_eq!(slot.status(), SlotStatus::Rescheduled);
    assert_eq!(slot.start_time(), now() + hours(3));
    assert_eq!(slot.end_time(), now() + hours(4));
}

#[test]
fn test_reschedule_bad_duration_in_any_state() {
    let clock = fixed_clock();
    for status in SlotStatus::ALL {
        let mut slot = slot_at(1, 1, 2, status);
        let err = slot
            .reschedule(now() + hours(3), now() + hours(4), -2, &clock)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDuration);
        assert_eq!(err.category(), ErrorCategory::InvalidArgument);
        assert_eq!(slot.start_time(), now() + hours(1));
    }
}

#[test]
fn test_reschedule_zero_duration_legacy_kind() {
    let clock = fixed_clock();
    let policy = SchedulingPolicy {
        legacy_duration_error_kind: true,
        ..SchedulingPolicy::default()
    };
    let mut slot = slot_at(1, 1, 2, SlotStatus::Reserved);
    let err = slot
        .reschedule_with_policy(now() + hours(3), now() + hours(4), 0, &policy, &clock)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotAvailable);
    assert_eq!(err.category(), ErrorCategory::InvalidArgument);
    assert_eq!(slot.status(), SlotStatus::Reserved);
}

#[test]
fn test_reschedule_inverted_interval() {
    let clock = fixed_clock();
    let mut slot = slot_at(1, 1, 2, SlotStatus::Reserved);
    let err = slot
        .reschedule(now() + hours(4), now() + hours(3), 60, &clock)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSlot);
    assert_eq!(slot.status(), SlotStatus::Reserved);
}

#[test]
fn test_expiry_boundary_is_exclusive() {
    let clock = fixed_clock();
    let mut slot = slot_at(1, -1, 0, SlotStatus::Available);
    slot.reserve(&clock).unwrap();

    clock.advance(Duration::seconds(1));
    assert!(slot.is_expired(clock.now()));
    assert_eq!(slot.cancel(&clock).unwrap_err().kind(), ErrorKind::SlotExpired);
}

#[test]
fn test_construction_rules() {
    let start = now() + hours(1);
    let end = now() + hours(2);

    assert_eq!(
        Slot::new(0, start, end, SlotStatus::Available).unwrap_err().kind(),
        ErrorKind::InvalidSlot
    );
    assert_eq!(
        Slot::new(-4, start, end, SlotStatus::Available).unwrap_err().kind(),
        ErrorKind::InvalidSlot
    );
    assert_eq!(
        Slot::new(1, end, start, SlotStatus::Available).unwrap_err().kind(),
        ErrorKind::InvalidSlot
    );
    // zero-length intervals are allowed
    assert!(Slot::new(1, start, start, SlotStatus::Blocked).is_ok());
    // past intervals are allowed without the strict policy
    assert!(Slot::new(1, now() - hours(3), now() - hours(2), SlotStatus::Available).is_ok());
}

#[test]
fn test_strict_policy_rejects_past_timestamps() {
    let strict = SchedulingPolicy::strict();
    let err = Slot::new_with_policy(
        1,
        now() - hours(1),
        now() + hours(1),
        SlotStatus::Available,
        &strict,
        now(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSlot);

    assert!(Slot::new_with_policy(
        1,
        now() + hours(1),
        now() + hours(2),
        SlotStatus::Available,
        &strict,
        now(),
    )
    .is_ok());
}

#[test]
fn test_builder_requires_every_field() {
    let err = Slot::builder()
        .id(1)
        .start_time(now())
        .status(SlotStatus::Available)
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSlot);

    let slot = Slot::builder()
        .id(1)
        .start_time(now())
        .end_time(now() + hours(1))
        .status(SlotStatus::Available)
        .build()
        .unwrap();
    assert_eq!(slot, Slot::new(1, now(), now() + hours(1), SlotStatus::Available).unwrap());
}

#[test]
fn test_json_shape_and_validation() {
    let slot = future_slot(3, SlotStatus::Cancelled);
    let json = serde_json::to_value(&slot).unwrap();
    assert_eq!(json["id"], 3);
    assert_eq!(json["status"], "CANCELLED");

    let back: Slot = serde_json::from_value(json.clone()).unwrap();
    assert_eq!(back, slot);

    let mut inverted = json;
    inverted["end_time"] = inverted["start_time"].clone();
    inverted["start_time"] = serde_json::json!("2099-01-01T00:00:00Z");
    assert!(serde_json::from_value::<Slot>(inverted).is_err());
}

proptest! {
    #[test]
    fn prop_reserve_succeeds_iff_available_and_live(
        start_min in -600i64..600,
        len_min in 0i64..240,
        status_idx in 0usize..5,
    ) {
        let clock = fixed_clock();
        let status = SlotStatus::ALL[status_idx];
        let start = now() + Duration::minutes(start_min);
        let end = start + Duration::minutes(len_min);
        let mut slot = Slot::new(1, start, end, status).unwrap();

        let live = end >= now();
        let outcome = slot.reserve(clock.as_ref());
        prop_assert_eq!(outcome.is_ok(), live && status == SlotStatus::Available);
        if !live {
            prop_assert_eq!(outcome.unwrap_err().kind(), ErrorKind::SlotExpired);
        }
    }

    #[test]
    fn prop_failed_operation_never_mutates(
        end_min in -120i64..120,
        status_idx in 0usize..5,
        op_idx in 0usize..5,
    ) {
        let clock = fixed_clock();
        let end = now() + Duration::minutes(end_min);
        let mut slot = Slot::new(1, end - Duration::minutes(30), end, SlotStatus::ALL[status_idx]).unwrap();
        let before = slot.clone();

        if run(&mut slot, SlotOperation::ALL[op_idx], &clock).is_err() {
            prop_assert_eq!(slot, before);
        }
    }
}
