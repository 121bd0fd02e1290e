//! Integration tests for the vesting engine against a live ledger.
//!
//! These tests walk the full escrow lifecycle: funding the engine's escrow
//! account, committing schedules against it, releasing along the linear
//! curve, and revoking mid-flight. Every timestamp is injected, so the
//! whole 4-hour vesting scenario runs in microseconds.

use chrono::{DateTime, Duration, Utc};

use nova_ledger::{AccountId, Ledger, VestingEngine, VestingError};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn acct(label: &str) -> AccountId {
    AccountId::derive("test", label)
}

/// A funded engine: the admin moves `escrow` into the engine's account up
/// front so schedules can be committed against it.
fn setup(escrow: u64) -> (Ledger, VestingEngine, AccountId, DateTime<Utc>) {
    let admin = acct("admin");
    let mut ledger = Ledger::new("NOVA Ledger Token", "NLT", 1_000_000, 0, 0, admin).unwrap();
    let engine = VestingEngine::new(&ledger, admin).unwrap();
    let now = Utc::now();
    ledger.transfer(admin, engine.engine_id(), escrow, now).unwrap();
    (ledger, engine, admin, now)
}

/// Escrow conservation: the running total must equal the outstanding sum
/// over non-revoked schedules.
fn assert_escrow_consistent(engine: &VestingEngine, beneficiaries: &[AccountId]) {
    let outstanding: u64 = beneficiaries
        .iter()
        .filter_map(|b| engine.schedule(b))
        .filter(|s| !s.revoked)
        .map(|s| s.total - s.released)
        .sum();
    assert_eq!(engine.escrow_total(), outstanding);
}

// ---------------------------------------------------------------------------
// Reference Scenarios
// ---------------------------------------------------------------------------

/// V=1000, cliff 7200s, duration 14400s, start = now+3600. At
/// start+10800 (75% of the duration elapsed, halfway through the
/// post-cliff window) the releasable amount is floor(1000*10800/14400)
/// = 750.
#[test]
fn halfway_post_cliff_release() {
    let (mut ledger, mut engine, admin, now) = setup(10_000);
    let bene = acct("bene");
    let start = now + Duration::seconds(3_600);

    engine
        .create_schedule(admin, &ledger, bene, 1_000, start, 7_200, 14_400, true, now)
        .unwrap();
    assert_eq!(engine.escrow_total(), 1_000);

    let t = now + Duration::seconds(3_600 + 10_800);
    assert_eq!(engine.releasable_amount(&bene, t), 750);

    let released = engine.release(bene, &mut ledger, t).unwrap();
    assert_eq!(released, 750);
    assert_eq!(engine.schedule(&bene).unwrap().released, 750);
    assert_eq!(engine.escrow_total(), 250);
    assert_eq!(ledger.balance_of(&bene), 750);
    assert_escrow_consistent(&engine, &[bene]);
}

/// Revoke a schedule with total=1000, released=750, at a point where 100
/// more is releasable: the beneficiary receives the 100 (released becomes
/// 850), the administrator receives the remaining 150, the escrow drops
/// to 0, and the schedule is terminally revoked.
#[test]
fn revoke_splits_vested_and_unvested() {
    let (mut ledger, mut engine, admin, now) = setup(10_000);
    let bene = acct("bene");
    let start = now + Duration::seconds(3_600);

    engine
        .create_schedule(admin, &ledger, bene, 1_000, start, 7_200, 14_400, true, now)
        .unwrap();

    // First release at 75% elapsed: 750 out.
    let t1 = start + Duration::seconds(10_800);
    engine.release(bene, &mut ledger, t1).unwrap();

    // Vested hits 850 at elapsed = 850 * 14400 / 1000 = 12240s.
    let t2 = start + Duration::seconds(12_240);
    assert_eq!(engine.releasable_amount(&bene, t2), 100);

    let admin_before = ledger.balance_of(&admin);
    let (released_now, refunded) = engine.revoke(admin, &mut ledger, bene, t2).unwrap();
    assert_eq!(released_now, 100);
    assert_eq!(refunded, 150);

    assert_eq!(ledger.balance_of(&bene), 850);
    assert_eq!(ledger.balance_of(&admin), admin_before + 150);
    assert_eq!(engine.escrow_total(), 0);

    let schedule = engine.schedule(&bene).unwrap();
    assert!(schedule.revoked);
    assert_eq!(schedule.released, 850);

    assert_eq!(
        engine.release(bene, &mut ledger, t2 + Duration::hours(10)),
        Err(VestingError::AlreadyRevoked(bene))
    );
}

// ---------------------------------------------------------------------------
// Monotonicity & Conservation
// ---------------------------------------------------------------------------

#[test]
fn releasable_is_monotonically_non_decreasing() {
    let (ledger, mut engine, admin, now) = setup(10_000);
    let bene = acct("bene");
    let start = now + Duration::seconds(60);
    engine
        .create_schedule(admin, &ledger, bene, 9_999, start, 1_000, 7_000, true, now)
        .unwrap();

    let mut previous = 0;
    for offset in (0..8_000).step_by(97) {
        let t = start + Duration::seconds(offset);
        let releasable = engine.releasable_amount(&bene, t);
        assert!(
            releasable >= previous,
            "releasable regressed at offset {offset}: {releasable} < {previous}"
        );
        previous = releasable;
    }
    // Past the duration, everything is claimable.
    assert_eq!(
        engine.releasable_amount(&bene, start + Duration::seconds(7_000)),
        9_999
    );
}

#[test]
fn zero_before_cliff_full_after_duration() {
    let (ledger, mut engine, admin, now) = setup(10_000);
    let bene = acct("bene");
    let start = now + Duration::seconds(10);
    engine
        .create_schedule(admin, &ledger, bene, 1_000, start, 500, 1_000, true, now)
        .unwrap();

    assert_eq!(engine.releasable_amount(&bene, start + Duration::seconds(499)), 0);
    // At the cliff exactly, the accrual since start becomes claimable.
    assert_eq!(engine.releasable_amount(&bene, start + Duration::seconds(500)), 500);
    assert_eq!(
        engine.releasable_amount(&bene, start + Duration::seconds(10_000)),
        1_000
    );
}

#[test]
fn escrow_drains_to_zero_across_mixed_endings() {
    let (mut ledger, mut engine, admin, now) = setup(10_000);
    let full = acct("full-release");
    let cut = acct("revoked-early");
    let start = now + Duration::seconds(1);
    let all = [full, cut];

    engine
        .create_schedule(admin, &ledger, full, 4_000, start, 100, 1_000, false, now)
        .unwrap();
    engine
        .create_schedule(admin, &ledger, cut, 6_000, start, 100, 1_000, true, now)
        .unwrap();
    assert_escrow_consistent(&engine, &all);
    assert_eq!(engine.escrow_total(), 10_000);

    // Partial progress on both.
    let mid = start + Duration::seconds(500);
    engine.release(full, &mut ledger, mid).unwrap();
    engine.release(cut, &mut ledger, mid).unwrap();
    assert_escrow_consistent(&engine, &all);

    // One runs to completion, one is cut short.
    let end = start + Duration::seconds(1_000);
    engine.release(full, &mut ledger, end).unwrap();
    engine.revoke(admin, &mut ledger, cut, mid + Duration::seconds(1)).unwrap();
    assert_escrow_consistent(&engine, &all);
    assert_eq!(engine.escrow_total(), 0);

    assert!(engine.schedule(&full).unwrap().is_complete());
    assert!(engine.schedule(&cut).unwrap().revoked);
    assert_eq!(ledger.balances_total(), ledger.total_supply());
}

// ---------------------------------------------------------------------------
// Lifecycle Edges
// ---------------------------------------------------------------------------

#[test]
fn completed_schedule_has_nothing_left() {
    let (mut ledger, mut engine, admin, now) = setup(10_000);
    let bene = acct("bene");
    let start = now + Duration::seconds(1);
    engine
        .create_schedule(admin, &ledger, bene, 1_000, start, 1, 10, true, now)
        .unwrap();

    let end = start + Duration::seconds(10);
    engine.release(bene, &mut ledger, end).unwrap();
    assert!(engine.schedule(&bene).unwrap().is_complete());
    assert_eq!(
        engine.release(bene, &mut ledger, end + Duration::days(1)),
        Err(VestingError::NothingReleasable(bene))
    );

    // Revoking a fully-released schedule moves nothing but still closes it.
    let (released_now, refunded) = engine.revoke(admin, &mut ledger, bene, end).unwrap();
    assert_eq!((released_now, refunded), (0, 0));
    assert!(engine.schedule(&bene).unwrap().revoked);
}

#[test]
fn frozen_beneficiary_blocks_release_without_losing_accrual() {
    let (mut ledger, mut engine, admin, now) = setup(10_000);
    let bene = acct("bene");
    let start = now + Duration::seconds(1);
    engine
        .create_schedule(admin, &ledger, bene, 1_000, start, 1, 10, true, now)
        .unwrap();

    ledger.freeze_account(admin, bene, now).unwrap();
    let t = start + Duration::seconds(5);
    assert!(matches!(
        engine.release(bene, &mut ledger, t),
        Err(VestingError::Ledger(nova_ledger::LedgerError::Frozen { .. }))
    ));
    // The accrual is intact; after the freeze lapses the full vested
    // amount comes out in one release.
    let thawed = now + Duration::seconds(nova_ledger::config::FREEZE_WINDOW_SECS + 1);
    let released = engine.release(bene, &mut ledger, thawed).unwrap();
    assert_eq!(released, 1_000);
}

#[test]
fn gate_rejected_revoke_leaves_no_trace() {
    let (mut ledger, mut engine, admin, now) = setup(10_000);
    let bene = acct("bene");
    let start = now + Duration::seconds(1);
    engine
        .create_schedule(admin, &ledger, bene, 1_000, start, 1, 10, true, now)
        .unwrap();

    // The refund leg pays the administrator, and the engine (not the
    // admin) is the transfer caller, so a frozen admin blocks it.
    ledger.freeze_account(admin, admin, now).unwrap();

    let t = start + Duration::seconds(5);
    assert_eq!(engine.releasable_amount(&bene, t), 500);
    assert!(matches!(
        engine.revoke(admin, &mut ledger, bene, t),
        Err(VestingError::Ledger(nova_ledger::LedgerError::Frozen { .. }))
    ));

    // Nothing moved and nothing settled: the release leg must not commit
    // when the refund leg cannot.
    assert_eq!(ledger.balance_of(&bene), 0);
    let schedule = engine.schedule(&bene).unwrap();
    assert_eq!(schedule.released, 0);
    assert!(!schedule.revoked);
    assert_eq!(engine.escrow_total(), 1_000);
    assert_eq!(ledger.balances_total(), ledger.total_supply());

    // Once the freeze lapses the same revoke goes through whole.
    let thawed = now + Duration::seconds(nova_ledger::config::FREEZE_WINDOW_SECS + 1);
    let (released_now, refunded) = engine.revoke(admin, &mut ledger, bene, thawed).unwrap();
    assert_eq!((released_now, refunded), (1_000, 0));
    assert!(engine.schedule(&bene).unwrap().revoked);
}

#[test]
fn revoke_authorization_and_preconditions() {
    let (mut ledger, mut engine, admin, now) = setup(10_000);
    let bene = acct("bene");
    let start = now + Duration::seconds(1);
    engine
        .create_schedule(admin, &ledger, bene, 1_000, start, 1, 10, true, now)
        .unwrap();

    assert!(matches!(
        engine.revoke(bene, &mut ledger, bene, now),
        Err(VestingError::Unauthorized(_))
    ));
    assert_eq!(
        engine.revoke(admin, &mut ledger, acct("stranger"), now),
        Err(VestingError::NoSchedule(acct("stranger")))
    );
}

#[test]
fn escrow_funding_gate_holds_over_time() {
    let (mut ledger, mut engine, admin, now) = setup(1_000);
    let start = now + Duration::seconds(1);
    engine
        .create_schedule(admin, &ledger, acct("a"), 1_000, start, 1, 10, true, now)
        .unwrap();

    // Fully committed: the next schedule needs fresh funding.
    assert!(matches!(
        engine.create_schedule(admin, &ledger, acct("b"), 1, start, 1, 10, true, now),
        Err(VestingError::InsufficientBacking { .. })
    ));
    ledger.transfer(admin, engine.engine_id(), 500, now).unwrap();
    engine
        .create_schedule(admin, &ledger, acct("b"), 500, start, 1, 10, true, now)
        .unwrap();
    assert_eq!(engine.escrow_total(), 1_500);
}
