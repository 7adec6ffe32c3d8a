//! league-admin: headless administration runner for the league portal.
//!
//! Usage:
//!   league-admin --db league.db migrate
//!   league-admin --db league.db create-player --uid 7 --name "E. Example" --position center --draft-season 12
//!   league-admin --db league.db grant-tpe --player 1 --amount 50 --task welfare
//!   league-admin --db league.db balance --uid 7
//!   league-admin --db league.db transfer --actor 7 --name "Trade settlement" --to 8:150000 --to 9:150000
//!   league-admin --db league.db set-status --actor 1 --id 3 --action approve
//!   league-admin --db league.db set-status --actor 1 --group <uuid> --action revert
//!   league-admin --db league.db weekly-reset
//!   league-admin --db league.db season-rollover

use anyhow::{bail, Context, Result};
use leaguedesk_core::attributes::Position;
use leaguedesk_core::auth::{Capability, RoleTable};
use leaguedesk_core::bank::{StatusAction, TransactionLine, TransactionType, TxTarget};
use leaguedesk_core::config::EconomyConfig;
use leaguedesk_core::LeaguePortal;
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = flag_value(&args, "--db").unwrap_or(":memory:");

    // First positional argument is the command; every flag takes a value.
    let mut command = "help";
    let mut i = 1;
    while i < args.len() {
        if args[i].starts_with("--") {
            i += 2;
            continue;
        }
        command = &args[i];
        break;
    }

    let config = match flag_value(&args, "--config") {
        Some(path) => EconomyConfig::load(Path::new(path))?,
        None => EconomyConfig::default(),
    };

    // The operator identity runs with every capability; role data for
    // real users lives outside this tool.
    let actor: i64 = parse_flag(&args, "--actor", 0)?;
    let mut roles = RoleTable::new();
    roles
        .grant(actor, Capability::ApproveTransactions)
        .grant(actor, Capability::ManageLedger)
        .grant(actor, Capability::ManagePlayers);

    let mut portal = LeaguePortal::open(db, config, roles)?;
    log::debug!("portal open on {db}, acting as {actor}");

    match command {
        "migrate" => {
            // LeaguePortal::open already migrated; this exists so the
            // first run has an explicit command.
            println!("schema up to date: {db}");
        }
        "show-config" => {
            println!("{}", serde_json::to_string_pretty(portal.config())?);
        }
        "create-player" => {
            let uid: i64 = require_flag(&args, "--uid")?;
            let name = flag_value(&args, "--name").context("--name is required")?;
            let position = Position::parse(flag_value(&args, "--position").unwrap_or("center"))
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            let draft_season: i64 = require_flag(&args, "--draft-season")?;
            let player_id = portal
                .store_mut()
                .create_player(uid, name, position, draft_season)?;
            println!("created player {player_id} for user {uid}");
        }
        "grant-tpe" => {
            let player: i64 = require_flag(&args, "--player")?;
            let amount: i64 = require_flag(&args, "--amount")?;
            let task = flag_value(&args, "--task").unwrap_or("admin_grant");
            portal
                .store_mut()
                .grant_tpe(player, amount, task, "administrative grant")?;
            println!("granted {amount} TPE to player {player}");
        }
        "balance" => {
            let uid: i64 = require_flag(&args, "--uid")?;
            println!("balance for {uid}: {}", portal.balance_of(uid)?);
        }
        "statement" => {
            let uid: i64 = require_flag(&args, "--uid")?;
            for line in portal.store().account_statement(uid)? {
                println!(
                    "#{:<5} {:>12}  {:<10} {:<9} {}",
                    line.id,
                    line.amount,
                    line.kind.as_str(),
                    line.status.as_str(),
                    line.description
                );
            }
        }
        "transfer" => {
            let name = flag_value(&args, "--name").unwrap_or("transfer");
            let lines = recipient_lines(&args)?;
            let group =
                portal.create_transaction_group(actor, TransactionType::Transfer, name, &lines)?;
            println!(
                "group {} submitted with {} line(s)",
                group.group_id,
                group.lines.len()
            );
        }
        "set-status" => {
            let action = match flag_value(&args, "--action") {
                Some("approve") => StatusAction::Approve,
                Some("deny") => StatusAction::Deny,
                Some("revert") => StatusAction::Revert,
                other => bail!("--action must be approve|deny|revert, got {other:?}"),
            };
            let target = if let Some(id) = flag_value(&args, "--id") {
                TxTarget::Id(id.parse().context("--id must be numeric")?)
            } else if let Some(group) = flag_value(&args, "--group") {
                TxTarget::Group(group.to_string())
            } else {
                bail!("set-status needs --id or --group");
            };
            let status = portal.set_transaction_status(actor, &target, action)?;
            println!("now {}", status.as_str());
        }
        "weekly-reset" => {
            let n = portal.store_mut().reset_weekly_flags()?;
            println!("cleared weekly flags on {n} player(s)");
        }
        "season-rollover" => {
            let n = portal.store_mut().season_rollover()?;
            println!("reset seasonal counters on {n} player(s)");
        }
        _ => {
            println!("commands: migrate | show-config | create-player | grant-tpe | balance");
            println!("          statement | transfer | set-status | weekly-reset | season-rollover");
        }
    }

    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> Result<T> {
    match flag_value(args, flag) {
        Some(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid value for {flag}: {raw}")),
        None => Ok(default),
    }
}

fn require_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Result<T> {
    let raw = flag_value(args, flag).with_context(|| format!("{flag} is required"))?;
    raw.parse()
        .map_err(|_| anyhow::anyhow!("invalid value for {flag}: {raw}"))
}

/// Parse repeated `--to uid:amount` recipient flags.
fn recipient_lines(args: &[String]) -> Result<Vec<TransactionLine>> {
    let mut lines = Vec::new();
    for w in args.windows(2) {
        if w[0] != "--to" {
            continue;
        }
        let (uid, amount) = w[1]
            .split_once(':')
            .with_context(|| format!("--to must be uid:amount, got {}", w[1]))?;
        lines.push(TransactionLine {
            uid: uid.parse().context("--to uid must be numeric")?,
            amount: amount.parse().context("--to amount must be numeric")?,
            description: "transfer".to_string(),
        });
    }
    if lines.is_empty() {
        bail!("transfer needs at least one --to uid:amount");
    }
    Ok(lines)
}
