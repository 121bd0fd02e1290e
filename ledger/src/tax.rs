//! # Tax Policy
//!
//! Pure configuration holder for the transfer tax: the buy-side and
//! sell-side rates (basis points), the enable flag, the tax-collection
//! wallet, and the set of counterparties classified as automated-market-
//! maker venues.
//!
//! The assessment itself ([`TaxPolicy::assess`]) is a pure function of the
//! policy and the transfer endpoints, so the transfer algorithm receives
//! its deduction without the policy ever touching balances.
//!
//! ## Venue precedence
//!
//! A venue-to-venue transfer is taxed only on the origin venue's buy-side
//! rate; the destination's sell-side rate never applies within the same
//! call. This precedence is part of the observable economics of the
//! ledger and must not be reordered.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::AccountId;
use crate::config::{BPS_BASE, MAX_TAX_BPS};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during tax-policy mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxError {
    /// A rate setter was handed a value above the maximum bound.
    #[error("tax rate {bps} bps exceeds the maximum of {max} bps")]
    RateTooHigh {
        /// The rejected rate.
        bps: u64,
        /// The configured maximum.
        max: u64,
    },

    /// The reserved null identifier was passed where a concrete tax
    /// wallet is required.
    #[error("tax wallet cannot be the null account")]
    NullTaxWallet,

    /// The reserved null identifier was passed where a concrete venue is
    /// required.
    #[error("venue cannot be the null account")]
    NullVenue,

    /// A deduction is owed but no tax wallet is configured.
    #[error("tax of {owed} owed but no tax wallet is configured")]
    TaxWalletUnset {
        /// The deduction that could not be routed.
        owed: u64,
    },
}

// ---------------------------------------------------------------------------
// TaxPolicy
// ---------------------------------------------------------------------------

/// Transfer-tax configuration and venue classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxPolicy {
    /// Sell-side rate in basis points, applied when the destination is a
    /// venue. Bounded by [`MAX_TAX_BPS`].
    sell_bps: u64,
    /// Buy-side rate in basis points, applied when the origin is a venue.
    buy_bps: u64,
    /// Master switch. When off, every assessment is zero.
    enabled: bool,
    /// Destination for all deducted tax. `None` until configured; a
    /// transfer that owes tax fails while this is unset.
    tax_wallet: Option<AccountId>,
    /// Accounts classified as AMM venues.
    venues: HashSet<AccountId>,
}

impl TaxPolicy {
    /// Creates a policy with the given initial rates.
    ///
    /// Tax starts enabled iff either rate is non-zero. The tax wallet
    /// starts unset and must be configured before any deduction is owed.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::RateTooHigh`] if either rate exceeds the bound.
    pub fn new(buy_bps: u64, sell_bps: u64) -> Result<Self, TaxError> {
        check_rate(buy_bps)?;
        check_rate(sell_bps)?;
        Ok(Self {
            sell_bps,
            buy_bps,
            enabled: buy_bps > 0 || sell_bps > 0,
            tax_wallet: None,
            venues: HashSet::new(),
        })
    }

    /// Sets the sell-side rate.
    pub fn set_sell_bps(&mut self, bps: u64) -> Result<(), TaxError> {
        check_rate(bps)?;
        self.sell_bps = bps;
        Ok(())
    }

    /// Sets the buy-side rate.
    pub fn set_buy_bps(&mut self, bps: u64) -> Result<(), TaxError> {
        check_rate(bps)?;
        self.buy_bps = bps;
        Ok(())
    }

    /// Enables or disables tax collection.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Sets the tax-collection wallet.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::NullTaxWallet`] for the reserved null account.
    pub fn set_tax_wallet(&mut self, wallet: AccountId) -> Result<(), TaxError> {
        if wallet.is_zero() {
            return Err(TaxError::NullTaxWallet);
        }
        self.tax_wallet = Some(wallet);
        Ok(())
    }

    /// Classifies or declassifies an account as an AMM venue.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::NullVenue`] for the reserved null account.
    pub fn set_venue(&mut self, venue: AccountId, is_venue: bool) -> Result<(), TaxError> {
        if venue.is_zero() {
            return Err(TaxError::NullVenue);
        }
        if is_venue {
            self.venues.insert(venue);
        } else {
            self.venues.remove(&venue);
        }
        Ok(())
    }

    /// Returns the sell-side rate in basis points.
    pub fn sell_bps(&self) -> u64 {
        self.sell_bps
    }

    /// Returns the buy-side rate in basis points.
    pub fn buy_bps(&self) -> u64 {
        self.buy_bps
    }

    /// Returns `true` if tax collection is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the configured tax wallet, if any.
    pub fn tax_wallet(&self) -> Option<AccountId> {
        self.tax_wallet
    }

    /// Returns `true` if the account is classified as a venue.
    pub fn is_venue(&self, account: &AccountId) -> bool {
        self.venues.contains(account)
    }

    /// Computes the deduction for a transfer of `amount` from `from` to
    /// `to`.
    ///
    /// Zero when tax is disabled or the caller marks the transfer exempt
    /// (either endpoint whitelisted). Otherwise the origin venue's
    /// buy-side rate applies first; failing that, the destination venue's
    /// sell-side rate; failing that, zero.
    pub fn assess(&self, from: &AccountId, to: &AccountId, amount: u64, exempt: bool) -> u64 {
        if !self.enabled || exempt {
            return 0;
        }
        if self.is_venue(from) && self.buy_bps > 0 {
            bps_of(amount, self.buy_bps)
        } else if self.is_venue(to) && self.sell_bps > 0 {
            bps_of(amount, self.sell_bps)
        } else {
            0
        }
    }
}

/// `floor(amount * bps / 10_000)`, widened to `u128` so the product
/// cannot overflow for any `u64` amount.
fn bps_of(amount: u64, bps: u64) -> u64 {
    ((amount as u128 * bps as u128) / BPS_BASE as u128) as u64
}

fn check_rate(bps: u64) -> Result<(), TaxError> {
    if bps > MAX_TAX_BPS {
        return Err(TaxError::RateTooHigh {
            bps,
            max: MAX_TAX_BPS,
        });
    }
    Ok(())
}
