//! # CLI Interface
//!
//! Defines the command-line argument structure for `nova-ledger` using
//! `clap` derive. Every stateful subcommand takes a `--state` path to the
//! JSON ledger file; accounts are passed as 64-digit hex identifiers.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use nova_ledger::AccountId;

/// NOVA ledger operations CLI.
///
/// Manages a policy-gated token ledger persisted as a JSON state file:
/// balances, transfer taxation, whitelist/blacklist/freeze gating, and
/// global pause.
#[derive(Parser, Debug)]
#[command(
    name = "nova-ledger",
    about = "NOVA policy-gated token ledger",
    version,
    propagate_version = true
)]
pub struct NovaLedgerCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Emit logs as JSON lines instead of pretty-printed text.
    #[arg(long, global = true)]
    pub log_json: bool,
}

/// Top-level subcommands for the `nova-ledger` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a fresh ledger state file and generate an admin account.
    Init(InitArgs),
    /// Print a summary of the ledger state.
    Status(StateArgs),
    /// Print one account's balance.
    Balance(BalanceArgs),
    /// Move tokens between accounts (tax and gating rules apply).
    Transfer(TransferArgs),
    /// Mint new tokens to an account (administrator operation).
    Mint(MintArgs),
    /// Freeze an account for the 24-hour window (administrator operation).
    Freeze(FreezeArgs),
    /// Pause all transfer activity (administrator operation).
    Pause(StateArgs),
    /// Resume transfer activity (administrator operation).
    Unpause(StateArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments shared by subcommands that only need the state file.
#[derive(Parser, Debug)]
pub struct StateArgs {
    /// Path to the JSON ledger state file.
    #[arg(long, short = 's', env = "NOVA_LEDGER_STATE", default_value = "ledger.json")]
    pub state: PathBuf,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Path to write the new JSON ledger state file.
    #[arg(long, short = 's', env = "NOVA_LEDGER_STATE", default_value = "ledger.json")]
    pub state: PathBuf,

    /// Display name of the asset.
    #[arg(long, default_value = "NOVA Ledger Token")]
    pub name: String,

    /// Ticker symbol.
    #[arg(long, default_value = "NLT")]
    pub symbol: String,

    /// Initial supply, minted to the generated admin account.
    #[arg(long, default_value_t = 1_000_000_000)]
    pub supply: u64,

    /// Buy-side tax rate in basis points (venue is the sender).
    #[arg(long, default_value_t = 0)]
    pub buy_tax_bps: u64,

    /// Sell-side tax rate in basis points (venue is the recipient).
    #[arg(long, default_value_t = 0)]
    pub sell_tax_bps: u64,
}

/// Arguments for the `balance` subcommand.
#[derive(Parser, Debug)]
pub struct BalanceArgs {
    #[command(flatten)]
    pub state: StateArgs,

    /// Hex-encoded account identifier to query.
    pub account: AccountId,
}

/// Arguments for the `transfer` subcommand.
#[derive(Parser, Debug)]
pub struct TransferArgs {
    #[command(flatten)]
    pub state: StateArgs,

    /// Hex-encoded sender account.
    #[arg(long)]
    pub from: AccountId,

    /// Hex-encoded recipient account.
    #[arg(long)]
    pub to: AccountId,

    /// Amount to move, in base units.
    #[arg(long)]
    pub amount: u64,
}

/// Arguments for the `mint` subcommand.
#[derive(Parser, Debug)]
pub struct MintArgs {
    #[command(flatten)]
    pub state: StateArgs,

    /// Hex-encoded recipient account.
    #[arg(long)]
    pub to: AccountId,

    /// Amount to mint, in base units.
    #[arg(long)]
    pub amount: u64,
}

/// Arguments for the `freeze` subcommand.
#[derive(Parser, Debug)]
pub struct FreezeArgs {
    #[command(flatten)]
    pub state: StateArgs,

    /// Hex-encoded account to freeze.
    pub account: AccountId,
}
