//! # Audit Events
//!
//! Every state mutation in the ledger or the vesting engine records a
//! [`LedgerEvent`]. Events are advisory audit signals for off-system
//! consumers -- no internal logic ever reads them back.
//!
//! Each component owns its own [`EventLog`], a bounded window over the
//! most recent mutations. Recording an event also emits a `tracing` line,
//! so a host that wires up a subscriber gets the complete audit trail
//! regardless of the window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::access::ListingStatus;
use crate::account::AccountId;
use crate::config::MAX_EVENT_LOG;

/// An observable notification of a completed state mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// New supply minted to an account.
    Minted { to: AccountId, amount: u64 },
    /// Supply burned out of an account.
    Burned { from: AccountId, amount: u64 },
    /// The tax-collection wallet changed.
    TaxWalletChanged { wallet: AccountId },
    /// Tax collection was enabled or disabled.
    TaxEnabledChanged { enabled: bool },
    /// The sell-side tax rate changed.
    SellTaxChanged { bps: u64 },
    /// The buy-side tax rate changed.
    BuyTaxChanged { bps: u64 },
    /// An account was classified or declassified as an AMM venue.
    VenueClassified { venue: AccountId, is_venue: bool },
    /// An account's blacklist/whitelist status changed.
    ListingChanged {
        account: AccountId,
        status: ListingStatus,
    },
    /// An account was frozen until the given expiry.
    AccountFrozen {
        account: AccountId,
        until: DateTime<Utc>,
    },
    /// A frozen account's balance was recovered by the administrator.
    AccountRecovered { account: AccountId, amount: u64 },
    /// Open burning was enabled or disabled.
    OpenBurnChanged { enabled: bool },
    /// All transfers paused.
    Paused,
    /// Transfers resumed.
    Unpaused,
    /// A vesting schedule was created.
    ScheduleCreated { beneficiary: AccountId, total: u64 },
    /// Vested tokens were released to a beneficiary.
    TokensReleased { beneficiary: AccountId, amount: u64 },
    /// The unvested remainder was refunded to the administrator on revoke.
    RevocationRefund { beneficiary: AccountId, amount: u64 },
    /// A vesting schedule was revoked.
    ScheduleRevoked { beneficiary: AccountId },
    /// A stray balance of this asset on the component account was reclaimed.
    StrayReclaimed { amount: u64 },
    /// A balance held in a foreign asset ledger was reclaimed.
    ForeignReclaimed { asset: AccountId, amount: u64 },
    /// Accidentally received native currency was reclaimed.
    NativeReclaimed { amount: u64 },
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerEvent::Minted { to, amount } => write!(f, "minted {amount} to {to:?}"),
            LedgerEvent::Burned { from, amount } => write!(f, "burned {amount} from {from:?}"),
            LedgerEvent::TaxWalletChanged { wallet } => write!(f, "tax wallet -> {wallet:?}"),
            LedgerEvent::TaxEnabledChanged { enabled } => write!(f, "tax enabled -> {enabled}"),
            LedgerEvent::SellTaxChanged { bps } => write!(f, "sell tax -> {bps} bps"),
            LedgerEvent::BuyTaxChanged { bps } => write!(f, "buy tax -> {bps} bps"),
            LedgerEvent::VenueClassified { venue, is_venue } => {
                write!(f, "venue {venue:?} -> {is_venue}")
            }
            LedgerEvent::ListingChanged { account, status } => {
                write!(f, "listing {account:?} -> {status}")
            }
            LedgerEvent::AccountFrozen { account, until } => {
                write!(f, "froze {account:?} until {until}")
            }
            LedgerEvent::AccountRecovered { account, amount } => {
                write!(f, "recovered {amount} from {account:?}")
            }
            LedgerEvent::OpenBurnChanged { enabled } => write!(f, "open burn -> {enabled}"),
            LedgerEvent::Paused => write!(f, "paused"),
            LedgerEvent::Unpaused => write!(f, "unpaused"),
            LedgerEvent::ScheduleCreated { beneficiary, total } => {
                write!(f, "schedule created for {beneficiary:?}, total {total}")
            }
            LedgerEvent::TokensReleased {
                beneficiary,
                amount,
            } => write!(f, "released {amount} to {beneficiary:?}"),
            LedgerEvent::RevocationRefund {
                beneficiary,
                amount,
            } => write!(f, "revocation refund of {amount} ({beneficiary:?})"),
            LedgerEvent::ScheduleRevoked { beneficiary } => {
                write!(f, "schedule revoked for {beneficiary:?}")
            }
            LedgerEvent::StrayReclaimed { amount } => write!(f, "stray balance {amount} reclaimed"),
            LedgerEvent::ForeignReclaimed { asset, amount } => {
                write!(f, "foreign balance {amount} of {asset:?} reclaimed")
            }
            LedgerEvent::NativeReclaimed { amount } => write!(f, "native {amount} reclaimed"),
        }
    }
}

/// Event sink owned by a single component.
///
/// Retains the most recent [`MAX_EVENT_LOG`] events; older entries are
/// dropped. The tracing audit channel sees every event regardless, so the
/// retained window is for in-state inspection, not durability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<LedgerEvent>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event and emits it on the tracing audit channel,
    /// dropping the oldest retained event when the log is full.
    pub fn record(&mut self, event: LedgerEvent) {
        tracing::info!(target: "nova_ledger::audit", %event, "state change");
        if self.events.len() == MAX_EVENT_LOG {
            self.events.remove(0);
        }
        self.events.push(event);
    }

    /// The retained events, oldest first.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Number of events recorded.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
