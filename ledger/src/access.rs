//! # Access Control Registry
//!
//! Holds the policy state that gates every transfer: per-account listing
//! status (blacklist/whitelist), per-account freeze expiries, and the
//! global pause flag.
//!
//! Blacklist and whitelist are mutually exclusive. Rather than two
//! booleans and a runtime check, an account has a single tagged
//! [`ListingStatus`] -- the contradictory state is unrepresentable, and
//! the setters still fail loudly when asked to flip an account straight
//! from one list to the other without clearing it first.
//!
//! The registry never consults a clock of its own. "Frozen" is a pure
//! function of a stored expiry and a caller-supplied `now`, so the same
//! logic is deterministically testable with arbitrary timestamps.
//!
//! Authorization is not this module's job: the [`Ledger`](crate::ledger::Ledger)
//! owns the registry and gates every mutator behind its admin check.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::AccountId;
use crate::config::FREEZE_WINDOW_SECS;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during access-control mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    /// Tried to blacklist an account that is currently whitelisted.
    #[error("cannot blacklist a whitelisted account: {0:?}")]
    BlacklistWhileWhitelisted(AccountId),

    /// Tried to whitelist an account that is currently blacklisted.
    #[error("cannot whitelist a blacklisted account: {0:?}")]
    WhitelistWhileBlacklisted(AccountId),

    /// Tried to freeze an account whose freeze window is still open.
    #[error("account {account:?} is already frozen until {until}")]
    AlreadyFrozen {
        /// The account that was targeted.
        account: AccountId,
        /// When the existing freeze lapses.
        until: DateTime<Utc>,
    },

    /// Tried a recovery on an account that is not currently frozen.
    #[error("account {0:?} is not frozen")]
    NotFrozen(AccountId),
}

// ---------------------------------------------------------------------------
// ListingStatus
// ---------------------------------------------------------------------------

/// An account's position on the blacklist/whitelist axis.
///
/// A single tagged status instead of two independent flags: the invariant
/// "never both" holds by construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingStatus {
    /// Neither listed nor exempt. The default for every account.
    #[default]
    Clear,
    /// Exempt from tax on both legs of a transfer.
    Whitelisted,
    /// Barred from sending or receiving value.
    Blacklisted,
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingStatus::Clear => write!(f, "clear"),
            ListingStatus::Whitelisted => write!(f, "whitelisted"),
            ListingStatus::Blacklisted => write!(f, "blacklisted"),
        }
    }
}

// ---------------------------------------------------------------------------
// AccessRegistry
// ---------------------------------------------------------------------------

/// Blacklist/whitelist, freeze, and pause state for the whole ledger.
///
/// Accounts are created implicitly on first reference; an account absent
/// from the maps is `Clear` and unfrozen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessRegistry {
    /// Listing status per account. Absent means `Clear`.
    listings: HashMap<AccountId, ListingStatus>,
    /// Freeze expiry per account. An entry in the past is equivalent to
    /// no entry; stale entries are overwritten by the next freeze.
    freezes: HashMap<AccountId, DateTime<Utc>>,
    /// Global pause. When set, no value moves.
    paused: bool,
}

impl AccessRegistry {
    /// Creates an empty registry: nobody listed, nobody frozen, unpaused.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the account's listing status.
    pub fn listing_status(&self, account: &AccountId) -> ListingStatus {
        self.listings.get(account).copied().unwrap_or_default()
    }

    /// Returns `true` if the account is blacklisted.
    pub fn is_blacklisted(&self, account: &AccountId) -> bool {
        self.listing_status(account) == ListingStatus::Blacklisted
    }

    /// Returns `true` if the account is whitelisted.
    pub fn is_whitelisted(&self, account: &AccountId) -> bool {
        self.listing_status(account) == ListingStatus::Whitelisted
    }

    /// Adds the account to, or removes it from, the whitelist.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::WhitelistWhileBlacklisted`] when asked to
    /// whitelist an account that is currently blacklisted. Clear the
    /// blacklist entry first.
    pub fn set_whitelisted(
        &mut self,
        account: AccountId,
        whitelisted: bool,
    ) -> Result<ListingStatus, AccessError> {
        let current = self.listing_status(&account);
        let next = match (current, whitelisted) {
            (ListingStatus::Blacklisted, true) => {
                return Err(AccessError::WhitelistWhileBlacklisted(account));
            }
            (_, true) => ListingStatus::Whitelisted,
            (ListingStatus::Whitelisted, false) => ListingStatus::Clear,
            // Removing from the whitelist leaves a blacklisted account alone.
            (other, false) => other,
        };
        self.store_listing(account, next);
        Ok(next)
    }

    /// Adds the account to, or removes it from, the blacklist.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::BlacklistWhileWhitelisted`] when asked to
    /// blacklist an account that is currently whitelisted.
    pub fn set_blacklisted(
        &mut self,
        account: AccountId,
        blacklisted: bool,
    ) -> Result<ListingStatus, AccessError> {
        let current = self.listing_status(&account);
        let next = match (current, blacklisted) {
            (ListingStatus::Whitelisted, true) => {
                return Err(AccessError::BlacklistWhileWhitelisted(account));
            }
            (_, true) => ListingStatus::Blacklisted,
            (ListingStatus::Blacklisted, false) => ListingStatus::Clear,
            (other, false) => other,
        };
        self.store_listing(account, next);
        Ok(next)
    }

    /// Freezes the account for the standard 24-hour window.
    ///
    /// Returns the expiry timestamp of the new freeze.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::AlreadyFrozen`] if a freeze window is still
    /// open for this account.
    pub fn freeze(
        &mut self,
        account: AccountId,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, AccessError> {
        if let Some(until) = self.freezes.get(&account) {
            if *until > now {
                return Err(AccessError::AlreadyFrozen {
                    account,
                    until: *until,
                });
            }
        }
        let until = now + Duration::seconds(FREEZE_WINDOW_SECS);
        self.freezes.insert(account, until);
        Ok(until)
    }

    /// Clears any freeze on the account, open or lapsed.
    pub fn clear_freeze(&mut self, account: &AccountId) {
        self.freezes.remove(account);
    }

    /// Returns `true` if the account's freeze window is open at `now`.
    pub fn is_frozen(&self, account: &AccountId, now: DateTime<Utc>) -> bool {
        self.freezes.get(account).is_some_and(|until| *until > now)
    }

    /// Returns the freeze expiry, if one is recorded (possibly lapsed).
    pub fn freeze_expiry(&self, account: &AccountId) -> Option<DateTime<Utc>> {
        self.freezes.get(account).copied()
    }

    /// Sets the global pause flag. Idempotent.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Returns the global pause flag.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stores a listing, dropping `Clear` entries to keep the map sparse.
    fn store_listing(&mut self, account: AccountId, status: ListingStatus) {
        match status {
            ListingStatus::Clear => {
                self.listings.remove(&account);
            }
            other => {
                self.listings.insert(account, other);
            }
        }
    }
}
