// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # NOVA Ledger — Policy-Gated Value Ledger & Vesting Engine
//!
//! A fungible-balance accounting engine whose transfers are mediated by a
//! tax policy and an access-control layer, paired with a linear vesting
//! engine that releases escrowed balances to beneficiaries over time.
//!
//! The hard parts live in two places:
//!
//! - **The transfer state machine** ([`ledger`]): tax deduction,
//!   blacklist/freeze/pause gating, and whitelist exemptions applied in a
//!   single atomic operation. Either everything moves or nothing does.
//! - **The vesting engine** ([`vesting`]): monotonically non-decreasing
//!   releasable amounts derived from elapsed time, with exact conservation
//!   of the escrowed total across partial releases and revocation.
//!
//! ## Architecture
//!
//! Leaf-first, each module owned by exactly one mutator:
//!
//! - **config** — every constant in one place. No ambient magic numbers.
//! - **account** — opaque 32-byte account identifiers, BLAKE3-derived for
//!   component accounts.
//! - **access** — blacklist/whitelist/freeze/pause registry. A single
//!   tagged listing status makes "blacklisted AND whitelisted" a state
//!   that cannot be constructed, not one we check for.
//! - **tax** — rates, venue set, tax wallet. Assessment is a pure
//!   function; the policy never touches a balance.
//! - **ledger** — balances and total supply. The only component that
//!   mutates either, and the authorization gate for every configuration
//!   setter.
//! - **vesting** — per-beneficiary schedules over a dedicated ledger
//!   escrow account. Holds schedule state, never balance state.
//! - **events** — advisory audit notifications. Written on every
//!   mutation, read by nothing internal.
//!
//! ## Design Philosophy
//!
//! 1. All monetary arithmetic is checked — wrapping arithmetic and money
//!    do not mix.
//! 2. Time is an argument, not an ambient. Every freeze check and vesting
//!    computation takes `now` from the caller, so any timestamp is
//!    testable.
//! 3. State transitions are explicit and every failure precedes the first
//!    mutation.
//! 4. If it touches money, it has tests. Plural.

pub mod access;
pub mod account;
pub mod config;
pub mod events;
pub mod ledger;
pub mod tax;
pub mod vesting;

pub use access::{AccessError, AccessRegistry, ListingStatus};
pub use account::AccountId;
pub use events::{EventLog, LedgerEvent};
pub use ledger::{Ledger, LedgerError};
pub use tax::{TaxError, TaxPolicy};
pub use vesting::{VestingEngine, VestingError, VestingSchedule};
