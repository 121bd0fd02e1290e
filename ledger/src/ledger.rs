//! # Token Ledger
//!
//! The single-asset balance ledger and its transfer state machine. Every
//! transfer runs the same gauntlet in one atomic operation:
//!
//! 1. global pause gate,
//! 2. blacklist gate on both endpoints,
//! 3. freeze gate on both endpoints (the administrator bypasses this for
//!    recovery work),
//! 4. tax assessment via the owned [`TaxPolicy`],
//! 5. balance movement, with the deduction routed to the tax wallet.
//!
//! All checks precede the first balance mutation, so a failed transfer
//! leaves no observable trace. Total supply always equals the sum of all
//! balances -- mint and burn move both sides together.
//!
//! The ledger owns its [`AccessRegistry`] and [`TaxPolicy`] outright and is
//! the only component allowed to mutate them; every configuration setter
//! is proxied through the administrator check here. No ambient globals,
//! no clocks: time-sensitive operations take `now` from the caller.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access::{AccessError, AccessRegistry, ListingStatus};
use crate::account::AccountId;
use crate::config::MAX_BATCH_SIZE;
use crate::events::{EventLog, LedgerEvent};
use crate::tax::{TaxError, TaxPolicy};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during ledger operations.
///
/// Every failure is reported before the first balance mutation; a returned
/// error means nothing changed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The caller lacks the administrator role required for this operation.
    #[error("caller {0:?} is not the administrator")]
    Unauthorized(AccountId),

    /// Transfers are globally paused.
    #[error("transfers are paused")]
    Paused,

    /// A transfer endpoint is blacklisted.
    #[error("account {0:?} is blacklisted")]
    Blacklisted(AccountId),

    /// A transfer endpoint is inside an open freeze window.
    #[error("account {account:?} is frozen until {until}")]
    Frozen {
        /// The frozen endpoint.
        account: AccountId,
        /// When the freeze lapses.
        until: DateTime<Utc>,
    },

    /// The reserved null identifier was used where a concrete account is
    /// required.
    #[error("the null account is not a valid endpoint")]
    NullAccount,

    /// Zero-amount operations are rejected; they are always caller bugs.
    #[error("zero-amount operations are not permitted")]
    ZeroAmount,

    /// Insufficient balance for the requested movement.
    #[error("insufficient balance: {account:?} has {available}, requested {requested}")]
    InsufficientBalance {
        /// The account being debited.
        account: AccountId,
        /// Its current balance.
        available: u64,
        /// The amount requested.
        requested: u64,
    },

    /// Insufficient allowance for a delegated movement.
    #[error(
        "insufficient allowance: {spender:?} may spend {available} of {owner:?}, requested {requested}"
    )]
    InsufficientAllowance {
        /// The balance owner.
        owner: AccountId,
        /// The delegated spender.
        spender: AccountId,
        /// The remaining allowance.
        available: u64,
        /// The amount requested.
        requested: u64,
    },

    /// Supply arithmetic would overflow `u64`.
    #[error("supply overflow: operation of {amount} would exceed u64::MAX")]
    SupplyOverflow {
        /// The amount that caused the overflow.
        amount: u64,
    },

    /// Batch arrays differ in length.
    #[error("batch length mismatch: {recipients} recipients, {amounts} amounts")]
    BatchLengthMismatch {
        /// Number of recipients supplied.
        recipients: usize,
        /// Number of amounts supplied.
        amounts: usize,
    },

    /// Batch size outside `1..=MAX_BATCH_SIZE`.
    #[error("batch size {size} outside 1..={max}")]
    BatchSizeOutOfBounds {
        /// The rejected batch size.
        size: usize,
        /// The configured maximum.
        max: usize,
    },

    /// Burning is restricted to the administrator while open burn is off.
    #[error("burning is not open: caller {0:?} is not the administrator")]
    BurnNotOpen(AccountId),

    /// Nothing to move on a reclaim path.
    #[error("nothing to reclaim")]
    NothingToReclaim,

    /// A guarded operation was re-entered while already in progress.
    #[error("reentrant call rejected")]
    ReentrantCall,

    /// A tax-policy mutation or assessment failed.
    #[error(transparent)]
    Tax(#[from] TaxError),

    /// An access-control mutation failed.
    #[error(transparent)]
    Access(#[from] AccessError),
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// The policy-gated single-asset ledger.
///
/// Balances live in a `HashMap<AccountId, u64>`; accounts are created
/// implicitly on first credit and never destroyed. All monetary arithmetic
/// is checked -- wrapping arithmetic and money do not mix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    /// Display name of the asset.
    name: String,
    /// Ticker symbol.
    symbol: String,
    /// The ledger's own component account, BLAKE3-derived from name and
    /// symbol. Value accidentally sent here is recoverable by the admin.
    component_id: AccountId,
    /// The privileged administrator.
    admin: AccountId,
    /// Per-account balances. Absent means zero.
    balances: HashMap<AccountId, u64>,
    /// Sum of all balances, maintained on every mutation.
    total_supply: u64,
    /// Delegated spending limits: owner -> spender -> remaining.
    allowances: HashMap<AccountId, HashMap<AccountId, u64>>,
    /// When set, any holder may burn their own balance (or an allowance).
    open_burn: bool,
    /// Blacklist/whitelist/freeze/pause state.
    access: AccessRegistry,
    /// Tax rates, venue set, and tax wallet.
    tax: TaxPolicy,
    /// Native currency accidentally sent to this component.
    native_balance: u64,
    /// Audit trail.
    events: EventLog,
    /// Mutual-exclusion guard for reentrancy-sensitive operations.
    #[serde(skip)]
    busy: bool,
}

impl Ledger {
    /// Creates a ledger with the full initial supply minted to the
    /// deployer, who becomes the administrator.
    ///
    /// Tax starts enabled iff either initial rate is non-zero; the tax
    /// wallet starts unset.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NullAccount`] for a null administrator and
    /// [`TaxError::RateTooHigh`] for rates above the bound.
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        initial_supply: u64,
        buy_tax_bps: u64,
        sell_tax_bps: u64,
        admin: AccountId,
    ) -> Result<Self, LedgerError> {
        if admin.is_zero() {
            return Err(LedgerError::NullAccount);
        }
        let name = name.into();
        let symbol = symbol.into();
        let tax = TaxPolicy::new(buy_tax_bps, sell_tax_bps)?;
        let component_id = AccountId::derive("ledger", &format!("{name}:{symbol}"));

        let mut ledger = Self {
            name,
            symbol,
            component_id,
            admin,
            balances: HashMap::new(),
            total_supply: 0,
            allowances: HashMap::new(),
            open_burn: false,
            access: AccessRegistry::new(),
            tax,
            native_balance: 0,
            events: EventLog::new(),
            busy: false,
        };
        if initial_supply > 0 {
            ledger.credit(admin, initial_supply)?;
            ledger.total_supply = initial_supply;
            ledger.events.record(LedgerEvent::Minted {
                to: admin,
                amount: initial_supply,
            });
        }
        Ok(ledger)
    }

    // -----------------------------------------------------------------------
    // Transfer surface
    // -----------------------------------------------------------------------

    /// Transfers `amount` from the caller to `to`, applying the full gate
    /// and tax protocol.
    pub fn transfer(
        &mut self,
        caller: AccountId,
        to: AccountId,
        amount: u64,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        self.execute_transfer(caller, caller, to, amount, now)
    }

    /// Grants `spender` the right to move up to `amount` of the caller's
    /// balance. Overwrites any previous allowance.
    pub fn approve(
        &mut self,
        caller: AccountId,
        spender: AccountId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if spender.is_zero() {
            return Err(LedgerError::NullAccount);
        }
        self.allowances.entry(caller).or_default().insert(spender, amount);
        Ok(())
    }

    /// Returns the remaining allowance `spender` holds on `owner`.
    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> u64 {
        self.allowances
            .get(owner)
            .and_then(|m| m.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Transfers `amount` from `from` to `to` on the strength of an
    /// allowance granted to the caller. The allowance is consumed only
    /// after the transfer succeeds, so a failure leaves it intact.
    pub fn transfer_from(
        &mut self,
        caller: AccountId,
        from: AccountId,
        to: AccountId,
        amount: u64,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let available = self.allowance(&from, &caller);
        if available < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: from,
                spender: caller,
                available,
                requested: amount,
            });
        }
        self.execute_transfer(caller, from, to, amount, now)?;
        self.spend_allowance(from, caller, amount);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Supply surface
    // -----------------------------------------------------------------------

    /// Mints `amount` to `to`. Administrator only; works while paused.
    pub fn mint(
        &mut self,
        caller: AccountId,
        to: AccountId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        self.require_admin(caller)?;
        if to.is_zero() {
            return Err(LedgerError::NullAccount);
        }
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow { amount })?;
        self.credit(to, amount)?;
        self.total_supply = new_supply;
        self.events.record(LedgerEvent::Minted { to, amount });
        Ok(())
    }

    /// Burns `amount` of the caller's own balance.
    ///
    /// Permitted for the administrator at any time. Other holders may
    /// burn only while open burn is enabled, and not while paused.
    pub fn burn(&mut self, caller: AccountId, amount: u64) -> Result<(), LedgerError> {
        self.check_burn_permission(caller)?;
        self.burn_balance(caller, amount)
    }

    /// Burns `amount` out of `holder`'s balance on the strength of an
    /// allowance. The administrator burns without an allowance.
    pub fn burn_from(
        &mut self,
        caller: AccountId,
        holder: AccountId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        self.check_burn_permission(caller)?;
        if caller != self.admin {
            let available = self.allowance(&holder, &caller);
            if available < amount {
                return Err(LedgerError::InsufficientAllowance {
                    owner: holder,
                    spender: caller,
                    available,
                    requested: amount,
                });
            }
            self.burn_balance(holder, amount)?;
            self.spend_allowance(holder, caller, amount);
            Ok(())
        } else {
            self.burn_balance(holder, amount)
        }
    }

    /// Opens or closes burning to all holders. Administrator only.
    pub fn set_open_burn(&mut self, caller: AccountId, enabled: bool) -> Result<(), LedgerError> {
        self.require_admin(caller)?;
        self.open_burn = enabled;
        self.events.record(LedgerEvent::OpenBurnChanged { enabled });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Batch transfers
    // -----------------------------------------------------------------------

    /// Distributes per-recipient amounts from the administrator's balance.
    ///
    /// Tax is not applied on this privileged path. Recipients currently
    /// blacklisted are silently skipped -- a poisoned recipient list must
    /// not sink an entire airdrop -- while every other leg is credited.
    /// The sender must cover the full batch sum up front, including legs
    /// that end up skipped.
    pub fn multi_transfer(
        &mut self,
        caller: AccountId,
        recipients: &[AccountId],
        amounts: &[u64],
    ) -> Result<(), LedgerError> {
        self.enter()?;
        let result = self.multi_transfer_inner(caller, recipients, amounts);
        self.exit();
        result
    }

    /// Distributes the same amount to every recipient. Same semantics as
    /// [`multi_transfer`](Self::multi_transfer).
    pub fn multi_transfer_equal(
        &mut self,
        caller: AccountId,
        recipients: &[AccountId],
        amount: u64,
    ) -> Result<(), LedgerError> {
        let amounts = vec![amount; recipients.len()];
        self.multi_transfer(caller, recipients, &amounts)
    }

    fn multi_transfer_inner(
        &mut self,
        caller: AccountId,
        recipients: &[AccountId],
        amounts: &[u64],
    ) -> Result<(), LedgerError> {
        self.require_admin(caller)?;
        if self.access.is_paused() {
            return Err(LedgerError::Paused);
        }
        if recipients.len() != amounts.len() {
            return Err(LedgerError::BatchLengthMismatch {
                recipients: recipients.len(),
                amounts: amounts.len(),
            });
        }
        if recipients.is_empty() || recipients.len() > MAX_BATCH_SIZE {
            return Err(LedgerError::BatchSizeOutOfBounds {
                size: recipients.len(),
                max: MAX_BATCH_SIZE,
            });
        }

        let mut total: u64 = 0;
        for (recipient, amount) in recipients.iter().zip(amounts) {
            if recipient.is_zero() {
                return Err(LedgerError::NullAccount);
            }
            if *amount == 0 {
                return Err(LedgerError::ZeroAmount);
            }
            total = total
                .checked_add(*amount)
                .ok_or(LedgerError::SupplyOverflow { amount: *amount })?;
        }
        let available = self.balance_of(&caller);
        if available < total {
            return Err(LedgerError::InsufficientBalance {
                account: caller,
                available,
                requested: total,
            });
        }

        for (recipient, amount) in recipients.iter().zip(amounts) {
            if self.access.is_blacklisted(recipient) {
                tracing::warn!(
                    target: "nova_ledger::audit",
                    recipient = %recipient,
                    amount,
                    "batch leg skipped: recipient blacklisted"
                );
                continue;
            }
            self.debit(caller, *amount)?;
            self.credit(*recipient, *amount)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Freeze & recovery
    // -----------------------------------------------------------------------

    /// Freezes `target` for the standard 24-hour window. Administrator
    /// only; fails if the account is already frozen.
    pub fn freeze_account(
        &mut self,
        caller: AccountId,
        target: AccountId,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, LedgerError> {
        self.require_admin(caller)?;
        let until = self.access.freeze(target, now)?;
        self.events.record(LedgerEvent::AccountFrozen {
            account: target,
            until,
        });
        Ok(until)
    }

    /// Recovers the entire balance of a currently-frozen account to the
    /// administrator, then clears the freeze. Fails if the account is not
    /// frozen at `now`. Works while paused.
    ///
    /// Returns the amount recovered (possibly zero).
    pub fn recover(
        &mut self,
        caller: AccountId,
        target: AccountId,
        now: DateTime<Utc>,
    ) -> Result<u64, LedgerError> {
        self.enter()?;
        let result = self.recover_inner(caller, target, now);
        self.exit();
        result
    }

    fn recover_inner(
        &mut self,
        caller: AccountId,
        target: AccountId,
        now: DateTime<Utc>,
    ) -> Result<u64, LedgerError> {
        self.require_admin(caller)?;
        if !self.access.is_frozen(&target, now) {
            return Err(LedgerError::Access(AccessError::NotFrozen(target)));
        }
        let amount = self.balance_of(&target);
        if amount > 0 {
            self.debit(target, amount)?;
            self.credit(self.admin, amount)?;
        }
        self.access.clear_freeze(&target);
        self.events.record(LedgerEvent::AccountRecovered {
            account: target,
            amount,
        });
        Ok(amount)
    }

    // -----------------------------------------------------------------------
    // Pause
    // -----------------------------------------------------------------------

    /// Pauses all transfer-shaped operations. Administrator only.
    pub fn pause(&mut self, caller: AccountId) -> Result<(), LedgerError> {
        self.require_admin(caller)?;
        self.access.set_paused(true);
        self.events.record(LedgerEvent::Paused);
        Ok(())
    }

    /// Resumes transfers. Administrator only.
    pub fn unpause(&mut self, caller: AccountId) -> Result<(), LedgerError> {
        self.require_admin(caller)?;
        self.access.set_paused(false);
        self.events.record(LedgerEvent::Unpaused);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Policy setters (administrator proxies)
    // -----------------------------------------------------------------------

    /// Sets the sell-side tax rate.
    pub fn set_sell_tax_bps(&mut self, caller: AccountId, bps: u64) -> Result<(), LedgerError> {
        self.require_admin(caller)?;
        self.tax.set_sell_bps(bps)?;
        self.events.record(LedgerEvent::SellTaxChanged { bps });
        Ok(())
    }

    /// Sets the buy-side tax rate.
    pub fn set_buy_tax_bps(&mut self, caller: AccountId, bps: u64) -> Result<(), LedgerError> {
        self.require_admin(caller)?;
        self.tax.set_buy_bps(bps)?;
        self.events.record(LedgerEvent::BuyTaxChanged { bps });
        Ok(())
    }

    /// Enables or disables tax collection.
    pub fn set_tax_enabled(&mut self, caller: AccountId, enabled: bool) -> Result<(), LedgerError> {
        self.require_admin(caller)?;
        self.tax.set_enabled(enabled);
        self.events.record(LedgerEvent::TaxEnabledChanged { enabled });
        Ok(())
    }

    /// Sets the tax-collection wallet.
    pub fn set_tax_wallet(&mut self, caller: AccountId, wallet: AccountId) -> Result<(), LedgerError> {
        self.require_admin(caller)?;
        self.tax.set_tax_wallet(wallet)?;
        self.events.record(LedgerEvent::TaxWalletChanged { wallet });
        Ok(())
    }

    /// Classifies or declassifies an AMM venue.
    pub fn set_venue(
        &mut self,
        caller: AccountId,
        venue: AccountId,
        is_venue: bool,
    ) -> Result<(), LedgerError> {
        self.require_admin(caller)?;
        self.tax.set_venue(venue, is_venue)?;
        self.events.record(LedgerEvent::VenueClassified { venue, is_venue });
        Ok(())
    }

    /// Adds or removes a whitelist entry.
    pub fn set_whitelisted(
        &mut self,
        caller: AccountId,
        account: AccountId,
        whitelisted: bool,
    ) -> Result<(), LedgerError> {
        self.require_admin(caller)?;
        let status = self.access.set_whitelisted(account, whitelisted)?;
        self.events.record(LedgerEvent::ListingChanged { account, status });
        Ok(())
    }

    /// Adds or removes a blacklist entry.
    pub fn set_blacklisted(
        &mut self,
        caller: AccountId,
        account: AccountId,
        blacklisted: bool,
    ) -> Result<(), LedgerError> {
        self.require_admin(caller)?;
        let status = self.access.set_blacklisted(account, blacklisted)?;
        self.events.record(LedgerEvent::ListingChanged { account, status });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reclaim surface
    // -----------------------------------------------------------------------

    /// Reclaims units of this asset accidentally sent to the ledger's own
    /// component account. Administrator only; fails when there is nothing
    /// to move.
    pub fn reclaim_stray_balance(&mut self, caller: AccountId) -> Result<u64, LedgerError> {
        self.require_admin(caller)?;
        let amount = self.balance_of(&self.component_id);
        if amount == 0 {
            return Err(LedgerError::NothingToReclaim);
        }
        self.debit(self.component_id, amount)?;
        self.credit(self.admin, amount)?;
        self.events.record(LedgerEvent::StrayReclaimed { amount });
        Ok(amount)
    }

    /// Reclaims this component's balance held in a foreign asset ledger,
    /// crediting this ledger's administrator there. Administrator only.
    pub fn reclaim_foreign(
        &mut self,
        caller: AccountId,
        foreign: &mut Ledger,
    ) -> Result<u64, LedgerError> {
        self.require_admin(caller)?;
        let amount = foreign.force_move(self.component_id, self.admin)?;
        self.events.record(LedgerEvent::ForeignReclaimed {
            asset: foreign.component_id,
            amount,
        });
        Ok(amount)
    }

    /// Records native currency accidentally sent to this component.
    pub fn deposit_native(&mut self, amount: u64) -> Result<(), LedgerError> {
        self.native_balance = self
            .native_balance
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow { amount })?;
        Ok(())
    }

    /// Reclaims the accumulated native balance. Administrator only.
    pub fn reclaim_native(&mut self, caller: AccountId) -> Result<u64, LedgerError> {
        self.require_admin(caller)?;
        if self.native_balance == 0 {
            return Err(LedgerError::NothingToReclaim);
        }
        let amount = std::mem::take(&mut self.native_balance);
        self.events.record(LedgerEvent::NativeReclaimed { amount });
        Ok(amount)
    }

    /// Moves a component account's entire balance to `to`, bypassing the
    /// transfer gates. Only reachable from the reclaim paths.
    pub(crate) fn force_move(&mut self, from: AccountId, to: AccountId) -> Result<u64, LedgerError> {
        let amount = self.balance_of(&from);
        if amount == 0 {
            return Err(LedgerError::NothingToReclaim);
        }
        self.debit(from, amount)?;
        self.credit(to, amount)?;
        Ok(amount)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Returns the balance of an account (zero for unknown accounts).
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Returns the total supply.
    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Returns the sum of all balances. Equal to [`total_supply`]
    /// (conservation invariant); exposed so callers and tests can observe
    /// the invariant directly.
    ///
    /// [`total_supply`]: Self::total_supply
    pub fn balances_total(&self) -> u64 {
        self.balances.values().sum()
    }

    /// Returns the display name of the asset.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the ticker symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the ledger's own component account.
    pub fn component_id(&self) -> AccountId {
        self.component_id
    }

    /// Returns the administrator.
    pub fn admin(&self) -> AccountId {
        self.admin
    }

    /// Returns `true` while open burn is enabled.
    pub fn open_burn(&self) -> bool {
        self.open_burn
    }

    /// Returns the accumulated native balance.
    pub fn native_balance(&self) -> u64 {
        self.native_balance
    }

    /// Read-only view of the access registry.
    pub fn access(&self) -> &AccessRegistry {
        &self.access
    }

    /// Read-only view of the tax policy.
    pub fn tax(&self) -> &TaxPolicy {
        &self.tax
    }

    /// Returns the account's listing status.
    pub fn listing_status(&self, account: &AccountId) -> ListingStatus {
        self.access.listing_status(account)
    }

    /// Returns `true` if the account is frozen at `now`.
    pub fn is_frozen(&self, account: &AccountId, now: DateTime<Utc>) -> bool {
        self.access.is_frozen(account, now)
    }

    /// Returns `true` while transfers are paused.
    pub fn is_paused(&self) -> bool {
        self.access.is_paused()
    }

    /// The audit trail, oldest first.
    pub fn events(&self) -> &[LedgerEvent] {
        self.events.events()
    }

    // -----------------------------------------------------------------------
    // Core transfer algorithm
    // -----------------------------------------------------------------------

    /// The transfer state machine. Every check happens before the first
    /// mutation; the three balance writes at the end cannot fail for any
    /// state that passed the checks.
    fn execute_transfer(
        &mut self,
        caller: AccountId,
        from: AccountId,
        to: AccountId,
        amount: u64,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let deduction = self.check_transfer(caller, from, to, amount, now)?;
        // Atomic movement. The checks already verified the wallet exists
        // whenever a deduction is owed.
        self.debit(from, amount)?;
        self.credit(to, amount - deduction)?;
        if deduction > 0 {
            if let Some(wallet) = self.tax.tax_wallet() {
                self.credit(wallet, deduction)?;
            }
        }
        Ok(())
    }

    /// Runs every transfer gate without mutating anything, returning the
    /// deduction the transfer would owe. A caller that needs to move value
    /// in several legs atomically pre-flights each leg with this before
    /// touching a balance.
    pub(crate) fn check_transfer(
        &self,
        caller: AccountId,
        from: AccountId,
        to: AccountId,
        amount: u64,
        now: DateTime<Utc>,
    ) -> Result<u64, LedgerError> {
        if to.is_zero() || from.is_zero() {
            return Err(LedgerError::NullAccount);
        }
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        // 1. Pause gate.
        if self.access.is_paused() {
            return Err(LedgerError::Paused);
        }
        // 2. Blacklist gate, both endpoints.
        for endpoint in [&from, &to] {
            if self.access.is_blacklisted(endpoint) {
                return Err(LedgerError::Blacklisted(*endpoint));
            }
        }
        // 3. Freeze gate, both endpoints. The administrator bypasses this
        //    so recovery can move value out of a quarantined account.
        if caller != self.admin {
            for endpoint in [&from, &to] {
                if self.access.is_frozen(endpoint, now) {
                    let until = self
                        .access
                        .freeze_expiry(endpoint)
                        .unwrap_or(now);
                    return Err(LedgerError::Frozen {
                        account: *endpoint,
                        until,
                    });
                }
            }
        }
        // 4. Tax assessment. Whitelisting either endpoint exempts the leg.
        let exempt = self.access.is_whitelisted(&from) || self.access.is_whitelisted(&to);
        let deduction = self.tax.assess(&from, &to, amount, exempt);
        if deduction > 0 && self.tax.tax_wallet().is_none() {
            return Err(LedgerError::Tax(TaxError::TaxWalletUnset { owed: deduction }));
        }
        // 5. Balance pre-check.
        let available = self.balance_of(&from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: from,
                available,
                requested: amount,
            });
        }
        Ok(deduction)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn require_admin(&self, caller: AccountId) -> Result<(), LedgerError> {
        if caller != self.admin {
            return Err(LedgerError::Unauthorized(caller));
        }
        Ok(())
    }

    fn check_burn_permission(&self, caller: AccountId) -> Result<(), LedgerError> {
        if caller == self.admin {
            return Ok(());
        }
        if !self.open_burn {
            return Err(LedgerError::BurnNotOpen(caller));
        }
        if self.access.is_paused() {
            return Err(LedgerError::Paused);
        }
        Ok(())
    }

    fn burn_balance(&mut self, holder: AccountId, amount: u64) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        self.debit(holder, amount)?;
        // The debit cannot have succeeded unless supply covers it.
        self.total_supply -= amount;
        self.events.record(LedgerEvent::Burned {
            from: holder,
            amount,
        });
        Ok(())
    }

    fn credit(&mut self, account: AccountId, amount: u64) -> Result<(), LedgerError> {
        let balance = self.balances.entry(account).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow { amount })?;
        Ok(())
    }

    fn debit(&mut self, account: AccountId, amount: u64) -> Result<(), LedgerError> {
        let available = self.balance_of(&account);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account,
                available,
                requested: amount,
            });
        }
        if let Some(balance) = self.balances.get_mut(&account) {
            *balance -= amount;
        }
        Ok(())
    }

    fn spend_allowance(&mut self, owner: AccountId, spender: AccountId, amount: u64) {
        if let Some(per_spender) = self.allowances.get_mut(&owner) {
            if let Some(remaining) = per_spender.get_mut(&spender) {
                *remaining = remaining.saturating_sub(amount);
            }
        }
    }

    fn enter(&mut self) -> Result<(), LedgerError> {
        if self.busy {
            return Err(LedgerError::ReentrantCall);
        }
        self.busy = true;
        Ok(())
    }

    fn exit(&mut self) {
        self.busy = false;
    }
}
