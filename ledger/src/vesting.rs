//! # Linear Vesting Engine
//!
//! Releases previously escrowed balances to beneficiaries over time. The
//! engine holds no balance state of its own: it owns a dedicated escrow
//! account on the [`Ledger`] and instructs the ledger to move value out of
//! it on every release or revocation.
//!
//! One schedule per beneficiary, with the lifecycle
//! **None -> Active -> (Released\*) -> {Completed | Revoked}**. The vested
//! amount is a pure function of the schedule and a caller-supplied `now`:
//! nothing before the cliff, linear accrual from the start time over the
//! full duration, everything once the duration has elapsed. Releasable
//! amounts are therefore monotonically non-decreasing until someone
//! releases or the schedule is revoked.
//!
//! The running escrow total equals `sum(total - released)` over all
//! non-revoked schedules at every observation point, and every release or
//! revocation decrements it by exactly the amount moved out.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::AccountId;
use crate::config::MAX_VESTING_DURATION_SECS;
use crate::events::{EventLog, LedgerEvent};
use crate::ledger::{Ledger, LedgerError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during vesting operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VestingError {
    /// The caller lacks the administrator role required for this operation.
    #[error("caller {0:?} is not the vesting administrator")]
    Unauthorized(AccountId),

    /// The supplied ledger is not the asset this engine escrows.
    #[error("wrong ledger: engine escrows {expected:?}, got {got:?}")]
    WrongLedger {
        /// The escrowed asset's component account.
        expected: AccountId,
        /// The component account of the ledger actually supplied.
        got: AccountId,
    },

    /// The reserved null identifier is not a valid beneficiary.
    #[error("beneficiary cannot be the null account")]
    NullBeneficiary,

    /// Schedules must allocate a positive amount.
    #[error("vesting amount must be positive")]
    ZeroAmount,

    /// The start time is already in the past.
    #[error("start time {start} is before now ({now})")]
    StartInPast {
        /// The rejected start time.
        start: DateTime<Utc>,
        /// The current time supplied by the caller.
        now: DateTime<Utc>,
    },

    /// Cliff duration must be positive and no longer than the vesting
    /// duration.
    #[error("invalid cliff: {cliff_secs}s against a duration of {duration_secs}s")]
    InvalidCliff {
        /// The rejected cliff duration.
        cliff_secs: i64,
        /// The vesting duration it was checked against.
        duration_secs: i64,
    },

    /// Vesting duration must be positive.
    #[error("vesting duration must be positive")]
    ZeroDuration,

    /// Vesting duration above the 10-year bound.
    #[error("vesting duration {duration_secs}s exceeds the maximum of {max_secs}s")]
    DurationTooLong {
        /// The rejected duration.
        duration_secs: i64,
        /// The configured maximum.
        max_secs: i64,
    },

    /// The beneficiary already has a schedule.
    #[error("beneficiary {0:?} already has a vesting schedule")]
    DuplicateSchedule(AccountId),

    /// The engine's escrow account does not cover this allocation on top
    /// of everything already committed.
    #[error("insufficient escrow backing: need {required}, engine holds {available}")]
    InsufficientBacking {
        /// Outstanding commitments plus the new allocation.
        required: u64,
        /// The engine's current ledger balance.
        available: u64,
    },

    /// No schedule exists for the account.
    #[error("no vesting schedule for {0:?}")]
    NoSchedule(AccountId),

    /// The schedule was already revoked; revocation is terminal.
    #[error("schedule for {0:?} is revoked")]
    AlreadyRevoked(AccountId),

    /// The schedule was created non-revocable.
    #[error("schedule for {0:?} is not revocable")]
    NotRevocable(AccountId),

    /// Nothing has vested beyond what was already released.
    #[error("nothing releasable for {0:?}")]
    NothingReleasable(AccountId),

    /// The foreign-asset reclaim path cannot touch the escrowed asset.
    #[error("cannot reclaim the escrowed asset through the foreign-asset path")]
    ReclaimEscrowedAsset,

    /// Escrow arithmetic would overflow `u64`.
    #[error("escrow arithmetic overflow")]
    Overflow,

    /// A guarded operation was re-entered while already in progress.
    #[error("reentrant call rejected")]
    ReentrantCall,

    /// The underlying ledger rejected a movement.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

// ---------------------------------------------------------------------------
// VestingSchedule
// ---------------------------------------------------------------------------

/// A single beneficiary's vesting schedule.
///
/// Created once, mutated only by release and revoke, never deleted --
/// a revoked or completed schedule remains queryable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingSchedule {
    /// The account the allocation vests to.
    pub beneficiary: AccountId,
    /// Total allocated amount.
    pub total: u64,
    /// Amount released so far. Invariant: `released <= total`.
    pub released: u64,
    /// When linear accrual begins.
    pub start: DateTime<Utc>,
    /// Earliest time anything becomes releasable: `start + cliff`.
    pub cliff: DateTime<Utc>,
    /// Full vesting duration in seconds, measured from `start`.
    pub duration_secs: i64,
    /// Whether the administrator may revoke this schedule.
    pub revocable: bool,
    /// Terminal flag. Once set, no further vesting accrues.
    pub revoked: bool,
}

impl VestingSchedule {
    /// The amount vested at `now`, ignoring the cliff and revocation:
    /// zero before `start`, everything after `start + duration`, linear
    /// in between (integer division, truncating toward zero).
    pub fn vested_amount(&self, now: DateTime<Utc>) -> u64 {
        if now < self.start {
            return 0;
        }
        let elapsed = (now - self.start).num_seconds();
        if elapsed >= self.duration_secs {
            return self.total;
        }
        ((self.total as u128 * elapsed as u128) / self.duration_secs as u128) as u64
    }

    /// The amount releasable at `now`: zero before the cliff or after
    /// revocation, otherwise vested minus already released.
    pub fn releasable(&self, now: DateTime<Utc>) -> u64 {
        if self.revoked || now < self.cliff {
            return 0;
        }
        self.vested_amount(now).saturating_sub(self.released)
    }

    /// Returns `true` once the full allocation has been released.
    pub fn is_complete(&self) -> bool {
        self.released == self.total
    }

    /// The amount still held in escrow for this schedule.
    pub fn outstanding(&self) -> u64 {
        self.total - self.released
    }
}

// ---------------------------------------------------------------------------
// VestingEngine
// ---------------------------------------------------------------------------

/// Per-beneficiary linear vesting over a dedicated ledger escrow account.
///
/// Constructed against a single ledger identity; every operation that
/// touches balances takes the ledger by reference and rejects any ledger
/// whose component id differs from the one the engine was built for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VestingEngine {
    /// The engine's escrow account on the ledger.
    engine_id: AccountId,
    /// Component id of the ledger this engine escrows.
    asset: AccountId,
    /// The privileged administrator (schedule creation and revocation).
    admin: AccountId,
    /// One schedule per beneficiary.
    schedules: HashMap<AccountId, VestingSchedule>,
    /// Running total of `total - released` across non-revoked schedules.
    escrow_total: u64,
    /// Native currency accidentally sent to this component.
    native_balance: u64,
    /// Audit trail.
    events: EventLog,
    /// Mutual-exclusion guard for reentrancy-sensitive operations.
    #[serde(skip)]
    busy: bool,
}

impl VestingEngine {
    /// Creates an engine bound to the given ledger, with `admin` as the
    /// vesting administrator.
    ///
    /// The escrow account is derived from the ledger's component id, so an
    /// engine for a given asset always lands on the same escrow address.
    pub fn new(ledger: &Ledger, admin: AccountId) -> Result<Self, VestingError> {
        if admin.is_zero() {
            return Err(VestingError::NullBeneficiary);
        }
        let asset = ledger.component_id();
        Ok(Self {
            engine_id: AccountId::derive("vesting", &asset.to_hex()),
            asset,
            admin,
            schedules: HashMap::new(),
            escrow_total: 0,
            native_balance: 0,
            events: EventLog::new(),
            busy: false,
        })
    }

    /// Creates a vesting schedule for `beneficiary`.
    ///
    /// The engine's escrow balance on the ledger must cover this
    /// allocation on top of every outstanding one -- fund the escrow
    /// account first, then commit schedules against it.
    ///
    /// # Errors
    ///
    /// Any parameter violation: null beneficiary, zero
    /// amount, past start time, zero or inverted cliff, zero duration,
    /// duration over ten years, duplicate schedule, insufficient backing.
    #[allow(clippy::too_many_arguments)]
    pub fn create_schedule(
        &mut self,
        caller: AccountId,
        ledger: &Ledger,
        beneficiary: AccountId,
        total: u64,
        start: DateTime<Utc>,
        cliff_secs: i64,
        duration_secs: i64,
        revocable: bool,
        now: DateTime<Utc>,
    ) -> Result<(), VestingError> {
        self.require_admin(caller)?;
        self.require_asset(ledger)?;
        if beneficiary.is_zero() {
            return Err(VestingError::NullBeneficiary);
        }
        if total == 0 {
            return Err(VestingError::ZeroAmount);
        }
        if start < now {
            return Err(VestingError::StartInPast { start, now });
        }
        if duration_secs <= 0 {
            return Err(VestingError::ZeroDuration);
        }
        if cliff_secs <= 0 || cliff_secs > duration_secs {
            return Err(VestingError::InvalidCliff {
                cliff_secs,
                duration_secs,
            });
        }
        if duration_secs > MAX_VESTING_DURATION_SECS {
            return Err(VestingError::DurationTooLong {
                duration_secs,
                max_secs: MAX_VESTING_DURATION_SECS,
            });
        }
        if self.schedules.contains_key(&beneficiary) {
            return Err(VestingError::DuplicateSchedule(beneficiary));
        }
        let required = self
            .escrow_total
            .checked_add(total)
            .ok_or(VestingError::Overflow)?;
        let available = ledger.balance_of(&self.engine_id);
        if available < required {
            return Err(VestingError::InsufficientBacking {
                required,
                available,
            });
        }

        self.schedules.insert(
            beneficiary,
            VestingSchedule {
                beneficiary,
                total,
                released: 0,
                start,
                cliff: start + Duration::seconds(cliff_secs),
                duration_secs,
                revocable,
                revoked: false,
            },
        );
        self.escrow_total = required;
        self.events
            .record(LedgerEvent::ScheduleCreated { beneficiary, total });
        Ok(())
    }

    /// Releases everything currently releasable to the caller.
    ///
    /// The movement goes through the ledger's normal transfer path with
    /// the escrow account as sender, so the usual gates apply: a paused
    /// ledger or a blacklisted or frozen beneficiary blocks the release,
    /// and a venue beneficiary is taxed like any other recipient.
    ///
    /// Returns the amount released.
    pub fn release(
        &mut self,
        caller: AccountId,
        ledger: &mut Ledger,
        now: DateTime<Utc>,
    ) -> Result<u64, VestingError> {
        self.enter()?;
        let result = self.release_inner(caller, ledger, now);
        self.exit();
        result
    }

    fn release_inner(
        &mut self,
        caller: AccountId,
        ledger: &mut Ledger,
        now: DateTime<Utc>,
    ) -> Result<u64, VestingError> {
        self.require_asset(ledger)?;
        let schedule = self
            .schedules
            .get(&caller)
            .ok_or(VestingError::NoSchedule(caller))?;
        if schedule.revoked {
            return Err(VestingError::AlreadyRevoked(caller));
        }
        let amount = schedule.releasable(now);
        if amount == 0 {
            return Err(VestingError::NothingReleasable(caller));
        }

        // The ledger transfer is the only fallible step; bookkeeping
        // afterwards cannot fail, so a rejection leaves everything intact.
        ledger.transfer(self.engine_id, caller, amount, now)?;
        self.settle_release(caller, amount);
        Ok(amount)
    }

    /// Revokes `beneficiary`'s schedule. Administrator only; the schedule
    /// must be revocable and not already revoked.
    ///
    /// Anything currently releasable is first released to the beneficiary
    /// with the same bookkeeping as [`release`](Self::release); the
    /// unvested remainder is then refunded to the administrator, and the
    /// schedule is marked revoked. Terminal: no further releases.
    ///
    /// Both movements are gate-checked up front, so a rejection (for
    /// example a frozen administrator blocking the refund leg) fails the
    /// whole revoke before anything moves.
    ///
    /// Returns `(released_now, refunded)`.
    pub fn revoke(
        &mut self,
        caller: AccountId,
        ledger: &mut Ledger,
        beneficiary: AccountId,
        now: DateTime<Utc>,
    ) -> Result<(u64, u64), VestingError> {
        self.enter()?;
        let result = self.revoke_inner(caller, ledger, beneficiary, now);
        self.exit();
        result
    }

    fn revoke_inner(
        &mut self,
        caller: AccountId,
        ledger: &mut Ledger,
        beneficiary: AccountId,
        now: DateTime<Utc>,
    ) -> Result<(u64, u64), VestingError> {
        self.require_admin(caller)?;
        self.require_asset(ledger)?;
        let schedule = self
            .schedules
            .get(&beneficiary)
            .ok_or(VestingError::NoSchedule(beneficiary))?;
        if schedule.revoked {
            return Err(VestingError::AlreadyRevoked(beneficiary));
        }
        if !schedule.revocable {
            return Err(VestingError::NotRevocable(beneficiary));
        }

        // Two outbound legs: the final release to the beneficiary and the
        // unvested refund to the administrator. Pre-flight both against the
        // ledger's gates, plus their combined debit, before the first
        // mutation -- a revoke either completes or leaves no trace.
        let released_now = schedule.releasable(now);
        let remaining = schedule.outstanding() - released_now;
        if released_now > 0 {
            ledger.check_transfer(self.engine_id, self.engine_id, beneficiary, released_now, now)?;
        }
        if remaining > 0 {
            ledger.check_transfer(self.engine_id, self.engine_id, self.admin, remaining, now)?;
        }
        let available = ledger.balance_of(&self.engine_id);
        if available < released_now + remaining {
            return Err(VestingError::Ledger(LedgerError::InsufficientBalance {
                account: self.engine_id,
                available,
                requested: released_now + remaining,
            }));
        }

        // Both legs passed every gate against the same state; nothing below
        // can fail.
        if released_now > 0 {
            ledger.transfer(self.engine_id, beneficiary, released_now, now)?;
            self.settle_release(beneficiary, released_now);
        }
        if remaining > 0 {
            ledger.transfer(self.engine_id, self.admin, remaining, now)?;
            self.escrow_total -= remaining;
            self.events.record(LedgerEvent::RevocationRefund {
                beneficiary,
                amount: remaining,
            });
        }

        if let Some(schedule) = self.schedules.get_mut(&beneficiary) {
            schedule.revoked = true;
        }
        self.events
            .record(LedgerEvent::ScheduleRevoked { beneficiary });
        Ok((released_now, remaining))
    }

    /// Reclaims the engine's balance held in a foreign asset ledger,
    /// crediting the administrator there. Rejects the escrowed asset
    /// itself -- that balance backs outstanding schedules.
    pub fn reclaim_foreign(
        &mut self,
        caller: AccountId,
        foreign: &mut Ledger,
    ) -> Result<u64, VestingError> {
        self.require_admin(caller)?;
        if foreign.component_id() == self.asset {
            return Err(VestingError::ReclaimEscrowedAsset);
        }
        let amount = foreign.force_move(self.engine_id, self.admin)?;
        self.events.record(LedgerEvent::ForeignReclaimed {
            asset: foreign.component_id(),
            amount,
        });
        Ok(amount)
    }

    /// Records native currency accidentally sent to this component.
    pub fn deposit_native(&mut self, amount: u64) -> Result<(), VestingError> {
        self.native_balance = self
            .native_balance
            .checked_add(amount)
            .ok_or(VestingError::Overflow)?;
        Ok(())
    }

    /// Reclaims the accumulated native balance. Administrator only.
    pub fn reclaim_native(&mut self, caller: AccountId) -> Result<u64, VestingError> {
        self.require_admin(caller)?;
        if self.native_balance == 0 {
            return Err(VestingError::Ledger(LedgerError::NothingToReclaim));
        }
        let amount = std::mem::take(&mut self.native_balance);
        self.events.record(LedgerEvent::NativeReclaimed { amount });
        Ok(amount)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The engine's escrow account on the ledger. Fund this account before
    /// committing schedules.
    pub fn engine_id(&self) -> AccountId {
        self.engine_id
    }

    /// Component id of the escrowed asset.
    pub fn asset(&self) -> AccountId {
        self.asset
    }

    /// The vesting administrator.
    pub fn admin(&self) -> AccountId {
        self.admin
    }

    /// The beneficiary's schedule, if one exists (possibly revoked).
    pub fn schedule(&self, beneficiary: &AccountId) -> Option<&VestingSchedule> {
        self.schedules.get(beneficiary)
    }

    /// The amount `beneficiary` could release at `now`.
    pub fn releasable_amount(&self, beneficiary: &AccountId, now: DateTime<Utc>) -> u64 {
        self.schedules
            .get(beneficiary)
            .map(|s| s.releasable(now))
            .unwrap_or(0)
    }

    /// The running escrow total: `sum(total - released)` over non-revoked
    /// schedules.
    pub fn escrow_total(&self) -> u64 {
        self.escrow_total
    }

    /// The audit trail, oldest first.
    pub fn events(&self) -> &[LedgerEvent] {
        self.events.events()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn settle_release(&mut self, beneficiary: AccountId, amount: u64) {
        if let Some(schedule) = self.schedules.get_mut(&beneficiary) {
            schedule.released += amount;
        }
        self.escrow_total -= amount;
        self.events.record(LedgerEvent::TokensReleased {
            beneficiary,
            amount,
        });
    }

    fn require_admin(&self, caller: AccountId) -> Result<(), VestingError> {
        if caller != self.admin {
            return Err(VestingError::Unauthorized(caller));
        }
        Ok(())
    }

    fn require_asset(&self, ledger: &Ledger) -> Result<(), VestingError> {
        if ledger.component_id() != self.asset {
            return Err(VestingError::WrongLedger {
                expected: self.asset,
                got: ledger.component_id(),
            });
        }
        Ok(())
    }

    fn enter(&mut self) -> Result<(), VestingError> {
        if self.busy {
            return Err(VestingError::ReentrantCall);
        }
        self.busy = true;
        Ok(())
    }

    fn exit(&mut self) {
        self.busy = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(label: &str) -> AccountId {
        AccountId::derive("test", label)
    }

    fn schedule(total: u64, start: DateTime<Utc>, cliff_secs: i64, duration_secs: i64) -> VestingSchedule {
        VestingSchedule {
            beneficiary: acct("bene"),
            total,
            released: 0,
            start,
            cliff: start + Duration::seconds(cliff_secs),
            duration_secs,
            revocable: true,
            revoked: false,
        }
    }

    #[test]
    fn nothing_vests_before_start() {
        let start = Utc::now();
        let s = schedule(1_000, start, 100, 1_000);
        assert_eq!(s.vested_amount(start - Duration::seconds(1)), 0);
        assert_eq!(s.releasable(start - Duration::seconds(1)), 0);
    }

    #[test]
    fn nothing_releasable_before_cliff() {
        let start = Utc::now();
        let s = schedule(1_000, start, 100, 1_000);
        let t = start + Duration::seconds(99);
        // Vesting accrues from start, but the cliff withholds it.
        assert!(s.vested_amount(t) > 0);
        assert_eq!(s.releasable(t), 0);
        assert_eq!(s.releasable(start + Duration::seconds(100)), 100);
    }

    #[test]
    fn linear_accrual_truncates() {
        let start = Utc::now();
        let s = schedule(1_000, start, 1, 3);
        // floor(1000 * 1 / 3) = 333
        assert_eq!(s.vested_amount(start + Duration::seconds(1)), 333);
        assert_eq!(s.vested_amount(start + Duration::seconds(2)), 666);
        assert_eq!(s.vested_amount(start + Duration::seconds(3)), 1_000);
        assert_eq!(s.vested_amount(start + Duration::seconds(300)), 1_000);
    }

    #[test]
    fn revoked_schedule_releases_nothing() {
        let start = Utc::now();
        let mut s = schedule(1_000, start, 1, 10);
        s.revoked = true;
        assert_eq!(s.releasable(start + Duration::seconds(100)), 0);
    }

    fn setup() -> (Ledger, VestingEngine, AccountId, DateTime<Utc>) {
        let admin = acct("admin");
        let mut ledger = Ledger::new("NOVA Ledger Token", "NLT", 1_000_000, 0, 0, admin).unwrap();
        let engine = VestingEngine::new(&ledger, admin).unwrap();
        let now = Utc::now();
        // Fund the escrow account.
        ledger.transfer(admin, engine.engine_id(), 10_000, now).unwrap();
        (ledger, engine, admin, now)
    }

    #[test]
    fn create_schedule_commits_escrow() {
        let (ledger, mut engine, admin, now) = setup();
        engine
            .create_schedule(admin, &ledger, acct("bene"), 1_000, now, 100, 1_000, true, now)
            .unwrap();
        assert_eq!(engine.escrow_total(), 1_000);
        assert_eq!(engine.schedule(&acct("bene")).unwrap().total, 1_000);
    }

    #[test]
    fn create_schedule_parameter_validation() {
        let (ledger, mut engine, admin, now) = setup();
        let bene = acct("bene");

        assert!(matches!(
            engine.create_schedule(acct("mallory"), &ledger, bene, 1, now, 1, 2, true, now),
            Err(VestingError::Unauthorized(_))
        ));
        assert_eq!(
            engine.create_schedule(admin, &ledger, AccountId::ZERO, 1, now, 1, 2, true, now),
            Err(VestingError::NullBeneficiary)
        );
        assert_eq!(
            engine.create_schedule(admin, &ledger, bene, 0, now, 1, 2, true, now),
            Err(VestingError::ZeroAmount)
        );
        assert!(matches!(
            engine.create_schedule(
                admin,
                &ledger,
                bene,
                1,
                now - Duration::seconds(1),
                1,
                2,
                true,
                now
            ),
            Err(VestingError::StartInPast { .. })
        ));
        assert!(matches!(
            engine.create_schedule(admin, &ledger, bene, 1, now, 0, 2, true, now),
            Err(VestingError::InvalidCliff { .. })
        ));
        assert!(matches!(
            engine.create_schedule(admin, &ledger, bene, 1, now, 3, 2, true, now),
            Err(VestingError::InvalidCliff { .. })
        ));
        assert!(matches!(
            engine.create_schedule(admin, &ledger, bene, 1, now, 1, 0, true, now),
            Err(VestingError::ZeroDuration)
        ));
        assert!(matches!(
            engine.create_schedule(
                admin,
                &ledger,
                bene,
                1,
                now,
                1,
                MAX_VESTING_DURATION_SECS + 1,
                true,
                now
            ),
            Err(VestingError::DurationTooLong { .. })
        ));
        // Backing: escrow holds 10_000.
        assert!(matches!(
            engine.create_schedule(admin, &ledger, bene, 10_001, now, 1, 2, true, now),
            Err(VestingError::InsufficientBacking { .. })
        ));

        engine
            .create_schedule(admin, &ledger, bene, 1_000, now, 1, 2, true, now)
            .unwrap();
        assert_eq!(
            engine.create_schedule(admin, &ledger, bene, 1, now, 1, 2, true, now),
            Err(VestingError::DuplicateSchedule(bene))
        );
    }

    #[test]
    fn backing_accounts_for_prior_schedules() {
        let (ledger, mut engine, admin, now) = setup();
        engine
            .create_schedule(admin, &ledger, acct("a"), 6_000, now, 1, 10, true, now)
            .unwrap();
        // 6_000 committed out of 10_000: a further 5_000 does not fit.
        assert!(matches!(
            engine.create_schedule(admin, &ledger, acct("b"), 5_000, now, 1, 10, true, now),
            Err(VestingError::InsufficientBacking {
                required: 11_000,
                available: 10_000,
            })
        ));
        engine
            .create_schedule(admin, &ledger, acct("b"), 4_000, now, 1, 10, true, now)
            .unwrap();
        assert_eq!(engine.escrow_total(), 10_000);
    }

    #[test]
    fn release_moves_value_and_updates_escrow() {
        let (mut ledger, mut engine, admin, now) = setup();
        let bene = acct("bene");
        engine
            .create_schedule(admin, &ledger, bene, 1_000, now, 10, 100, true, now)
            .unwrap();

        // Before the cliff: nothing releasable.
        assert_eq!(
            engine.release(bene, &mut ledger, now + Duration::seconds(5)),
            Err(VestingError::NothingReleasable(bene))
        );

        let t = now + Duration::seconds(50);
        let released = engine.release(bene, &mut ledger, t).unwrap();
        assert_eq!(released, 500);
        assert_eq!(ledger.balance_of(&bene), 500);
        assert_eq!(engine.escrow_total(), 500);
        assert_eq!(engine.schedule(&bene).unwrap().released, 500);

        // Releasing again with nothing newly vested fails.
        assert_eq!(
            engine.release(bene, &mut ledger, t),
            Err(VestingError::NothingReleasable(bene))
        );
    }

    #[test]
    fn release_without_schedule_rejected() {
        let (mut ledger, mut engine, _, now) = setup();
        assert_eq!(
            engine.release(acct("stranger"), &mut ledger, now),
            Err(VestingError::NoSchedule(acct("stranger")))
        );
    }

    #[test]
    fn wrong_ledger_rejected() {
        let (mut ledger, mut engine, admin, now) = setup();
        let mut other = Ledger::new("Other", "OTH", 1, 0, 0, admin).unwrap();
        assert!(matches!(
            engine.release(acct("bene"), &mut other, now),
            Err(VestingError::WrongLedger { .. })
        ));
        assert!(matches!(
            engine.create_schedule(admin, &other, acct("bene"), 1, now, 1, 2, true, now),
            Err(VestingError::WrongLedger { .. })
        ));
        // The escrowed asset cannot leave through the foreign reclaim path.
        assert_eq!(
            engine.reclaim_foreign(admin, &mut ledger),
            Err(VestingError::ReclaimEscrowedAsset)
        );
    }

    #[test]
    fn revoke_splits_between_beneficiary_and_admin() {
        let (mut ledger, mut engine, admin, now) = setup();
        let bene = acct("bene");
        engine
            .create_schedule(admin, &ledger, bene, 1_000, now, 10, 100, true, now)
            .unwrap();
        let admin_before = ledger.balance_of(&admin);

        let t = now + Duration::seconds(40);
        let (released_now, refunded) = engine.revoke(admin, &mut ledger, bene, t).unwrap();
        assert_eq!(released_now, 400);
        assert_eq!(refunded, 600);
        assert_eq!(ledger.balance_of(&bene), 400);
        assert_eq!(ledger.balance_of(&admin), admin_before + 600);
        assert_eq!(engine.escrow_total(), 0);

        let schedule = engine.schedule(&bene).unwrap();
        assert!(schedule.revoked);
        assert_eq!(schedule.released, 400);

        // Terminal: further releases and revokes fail.
        assert_eq!(
            engine.release(bene, &mut ledger, t + Duration::seconds(50)),
            Err(VestingError::AlreadyRevoked(bene))
        );
        assert_eq!(
            engine.revoke(admin, &mut ledger, bene, t),
            Err(VestingError::AlreadyRevoked(bene))
        );
    }

    #[test]
    fn non_revocable_schedule_stays() {
        let (mut ledger, mut engine, admin, now) = setup();
        let bene = acct("bene");
        engine
            .create_schedule(admin, &ledger, bene, 1_000, now, 1, 10, false, now)
            .unwrap();
        assert_eq!(
            engine.revoke(admin, &mut ledger, bene, now),
            Err(VestingError::NotRevocable(bene))
        );
    }

    #[test]
    fn paused_ledger_blocks_release_atomically() {
        let (mut ledger, mut engine, admin, now) = setup();
        let bene = acct("bene");
        engine
            .create_schedule(admin, &ledger, bene, 1_000, now, 1, 10, true, now)
            .unwrap();
        ledger.pause(admin).unwrap();

        let t = now + Duration::seconds(5);
        assert_eq!(
            engine.release(bene, &mut ledger, t),
            Err(VestingError::Ledger(LedgerError::Paused))
        );
        // Nothing settled: escrow and schedule untouched.
        assert_eq!(engine.escrow_total(), 1_000);
        assert_eq!(engine.schedule(&bene).unwrap().released, 0);
    }

    #[test]
    fn reclaim_foreign_asset() {
        let (_ledger, mut engine, admin, now) = setup();
        let other_admin = acct("other-admin");
        let mut other = Ledger::new("Other", "OTH", 5_000, 0, 0, other_admin).unwrap();
        other
            .transfer(other_admin, engine.engine_id(), 1_200, now)
            .unwrap();

        let reclaimed = engine.reclaim_foreign(admin, &mut other).unwrap();
        assert_eq!(reclaimed, 1_200);
        assert_eq!(other.balance_of(&admin), 1_200);
    }

    #[test]
    fn native_reclaim() {
        let (_, mut engine, admin, _) = setup();
        engine.deposit_native(99).unwrap();
        assert_eq!(engine.reclaim_native(admin).unwrap(), 99);
        assert!(engine.reclaim_native(admin).is_err());
    }

    #[test]
    fn engine_serialization_roundtrip() {
        let (ledger, mut engine, admin, now) = setup();
        engine
            .create_schedule(admin, &ledger, acct("bene"), 1_000, now, 1, 10, true, now)
            .unwrap();
        let json = serde_json::to_string(&engine).expect("serialize");
        let back: VestingEngine = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.escrow_total(), 1_000);
        assert_eq!(back.schedule(&acct("bene")), engine.schedule(&acct("bene")));
    }
}
