// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # NOVA Ledger CLI
//!
//! Entry point for the `nova-ledger` binary. Parses CLI arguments,
//! initializes logging, and applies one ledger operation against a JSON
//! state file per invocation, supplying the wall clock as the operation
//! timestamp.
//!
//! - `init`     — create a state file and generate an admin account
//! - `status`   — print a summary of the ledger state
//! - `balance`  — print one account's balance
//! - `transfer` — move tokens (tax and gating rules apply)
//! - `mint`     — mint new tokens (administrator)
//! - `freeze`   — freeze an account for 24 hours (administrator)
//! - `pause`    — halt all transfer activity (administrator)
//! - `unpause`  — resume transfer activity (administrator)
//! - `version`  — print build version information

mod cli;
mod logging;
mod store;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;

use nova_ledger::{AccountId, Ledger};

use cli::{Commands, NovaLedgerCli};
use logging::LogFormat;
use store::{LedgerState, Store};

fn main() -> Result<()> {
    let cli = NovaLedgerCli::parse();
    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    logging::init_logging("nova_ledger=info,nova_ledger_cli=info", format);

    match cli.command {
        Commands::Init(args) => init_ledger(args),
        Commands::Status(args) => show_status(args),
        Commands::Balance(args) => show_balance(args),
        Commands::Transfer(args) => transfer(args),
        Commands::Mint(args) => mint(args),
        Commands::Freeze(args) => freeze(args),
        Commands::Pause(args) => set_paused(args, true),
        Commands::Unpause(args) => set_paused(args, false),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Creates a fresh ledger state file, minting the initial supply to a
/// newly generated admin account.
fn init_ledger(args: cli::InitArgs) -> Result<()> {
    let admin = AccountId::random();
    let ledger = Ledger::new(
        args.name,
        args.symbol,
        args.supply,
        args.buy_tax_bps,
        args.sell_tax_bps,
        admin,
    )
    .context("failed to construct ledger")?;

    tracing::info!(
        symbol = ledger.symbol(),
        supply = ledger.total_supply(),
        state = %args.state.display(),
        "initializing ledger"
    );

    let component = ledger.component_id();
    Store::create(
        &args.state,
        LedgerState {
            ledger,
            vesting: None,
        },
    )?;

    println!("Ledger initialized.");
    println!("  State file   : {}", args.state.display());
    println!("  Component id : {}", component);
    println!("  Admin account: {}", admin);
    println!();
    println!("Keep the admin account id safe: it is the only identity that");
    println!("can mint, freeze, pause, or change tax policy.");
    Ok(())
}

/// Prints a JSON summary of the ledger state to stdout.
fn show_status(args: cli::StateArgs) -> Result<()> {
    let store = Store::open(&args.state)?;
    let summary = store.read(|s| {
        serde_json::json!({
            "name": s.ledger.name(),
            "symbol": s.ledger.symbol(),
            "component_id": s.ledger.component_id(),
            "admin": s.ledger.admin(),
            "total_supply": s.ledger.total_supply(),
            "paused": s.ledger.is_paused(),
            "open_burn": s.ledger.open_burn(),
            "tax": s.ledger.tax(),
            "vesting": s.vesting.as_ref().map(|v| serde_json::json!({
                "engine_id": v.engine_id(),
                "escrow_total": v.escrow_total(),
            })),
        })
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn show_balance(args: cli::BalanceArgs) -> Result<()> {
    let store = Store::open(&args.state.state)?;
    let balance = store.read(|s| s.ledger.balance_of(&args.account));
    println!("{balance}");
    Ok(())
}

fn transfer(args: cli::TransferArgs) -> Result<()> {
    let store = Store::open(&args.state.state)?;
    store.mutate(|s| {
        s.ledger
            .transfer(args.from, args.to, args.amount, Utc::now())
            .context("transfer rejected")
    })?;
    println!("transferred {} to {}", args.amount, args.to);
    Ok(())
}

fn mint(args: cli::MintArgs) -> Result<()> {
    let store = Store::open(&args.state.state)?;
    store.mutate(|s| {
        let admin = s.ledger.admin();
        s.ledger
            .mint(admin, args.to, args.amount)
            .context("mint rejected")
    })?;
    println!("minted {} to {}", args.amount, args.to);
    Ok(())
}

fn freeze(args: cli::FreezeArgs) -> Result<()> {
    let store = Store::open(&args.state.state)?;
    let until = store.mutate(|s| {
        let admin = s.ledger.admin();
        s.ledger
            .freeze_account(admin, args.account, Utc::now())
            .context("freeze rejected")
    })?;
    println!("frozen {} until {}", args.account, until.to_rfc3339());
    Ok(())
}

fn set_paused(args: cli::StateArgs, paused: bool) -> Result<()> {
    let store = Store::open(&args.state)?;
    store.mutate(|s| {
        let admin = s.ledger.admin();
        if paused {
            s.ledger.pause(admin).context("pause rejected")
        } else {
            s.ledger.unpause(admin).context("unpause rejected")
        }
    })?;
    println!("ledger {}", if paused { "paused" } else { "unpaused" });
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("nova-ledger {}", env!("CARGO_PKG_VERSION"));
}
