//! # Ledger Configuration & Constants
//!
//! Every magic number in the ledger lives here. If you're hardcoding a
//! constant somewhere else, you're doing it wrong and you owe the team
//! coffee.
//!
//! These values are part of the observable economics of the ledger.
//! Changing them after launch changes tax revenue and vesting timelines,
//! so choose wisely.

// ---------------------------------------------------------------------------
// Tax Parameters
// ---------------------------------------------------------------------------

/// The basis-point precision base. Tax rates are expressed in hundredths
/// of a percent: a rate of 250 means `250 / 10_000 = 2.5%`.
pub const BPS_BASE: u64 = 10_000;

/// Maximum configurable tax rate, buy-side or sell-side: 2_500 bps = 25%.
/// Rates above this are rejected at the setter, not clamped.
pub const MAX_TAX_BPS: u64 = 2_500;

// ---------------------------------------------------------------------------
// Access Control
// ---------------------------------------------------------------------------

/// Length of the account freeze window in seconds: 24 hours.
///
/// A frozen account can neither send nor receive value until the window
/// lapses or the administrator recovers the balance, which also clears
/// the freeze early.
pub const FREEZE_WINDOW_SECS: i64 = 24 * 60 * 60;

// ---------------------------------------------------------------------------
// Batch Transfers
// ---------------------------------------------------------------------------

/// Maximum number of recipients in a single batch transfer.
///
/// Keeps a single administrative distribution bounded. Larger airdrops
/// are split into multiple batches by the caller.
pub const MAX_BATCH_SIZE: usize = 200;

// ---------------------------------------------------------------------------
// Vesting Parameters
// ---------------------------------------------------------------------------

/// Maximum vesting duration: 10 years in seconds (ignoring leap days;
/// a schedule a few hours shy of a decade is close enough).
pub const MAX_VESTING_DURATION_SECS: i64 = 10 * 365 * 24 * 60 * 60;

// ---------------------------------------------------------------------------
// Audit Events
// ---------------------------------------------------------------------------

/// Maximum number of audit events retained per component log.
///
/// Events are advisory and every one is also emitted on the tracing audit
/// channel at record time, so the retained window is a convenience for
/// inspection, not the system of record. Once full, the oldest events are
/// dropped; this keeps persisted state from growing linearly with
/// operation count.
pub const MAX_EVENT_LOG: usize = 4_096;

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// Default number of decimal places for display formatting. 8 is the
/// NOVA-native standard.
pub const DEFAULT_DECIMALS: u8 = 8;
