//! dmap command line interface
//!
//! Reads and writes a local sled-backed dmap ledger. Every command prints
//! JSON on stdout.

mod ledger;
mod settings;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use dmap_cid::{
    cid_for_content, hash_algorithm, prepare_cid, unpack_cid, HashAlgorithm, RAW_CODEC,
};
use dmap_core::walk;
use dmap_types::{Cost, CostSchedule, Entry, Receipt, Word, Zone};
use ledger::{parse_word, Ledger};
use serde_json::{json, Value};
use settings::AppConfig;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "dmap")]
#[command(about = "dmap ledger command line interface", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ledger directory, overrides the configured data_dir
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Log filter, overrides the configured log_level
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Ledger(LedgerCommands),
    /// CID packing
    Cid {
        #[command(subcommand)]
        action: CidCommands,
    },
}

#[derive(Subcommand)]
enum LedgerCommands {
    /// Read the entry under (zone, key)
    Get {
        zone: Zone,
        /// `0x`-prefixed 32-byte hex or a label of up to 31 bytes
        key: String,
    },
    /// Write an entry under the caller's zone
    Set {
        #[arg(long)]
        caller: Zone,
        key: String,
        meta: String,
        data: String,
    },
    /// Show the root entry
    Root,
    /// Resolve a path such as `:free.alice`
    Walk { path: String },
    /// Freezone operations
    Free {
        #[command(subcommand)]
        action: FreeCommands,
    },
}

#[derive(Subcommand)]
enum FreeCommands {
    /// Claim an untaken name
    Take {
        #[arg(long)]
        caller: Zone,
        name: String,
    },
    /// Hand a name to another zone
    Give {
        #[arg(long)]
        caller: Zone,
        name: String,
        recipient: Zone,
    },
    /// Write the freezone entry of a controlled name
    Set {
        #[arg(long)]
        caller: Zone,
        name: String,
        /// Raw meta word; ignored with --cid
        #[arg(required_unless_present = "cid")]
        meta: Option<String>,
        /// Raw data word; ignored with --cid
        #[arg(required_unless_present = "cid")]
        data: Option<String>,
        /// Store a CID instead of raw words
        #[arg(long, conflicts_with_all = ["meta", "data"])]
        cid: Option<String>,
        /// Lock the entry (only with --cid)
        #[arg(long, requires = "cid")]
        lock: bool,
    },
    /// Show the controller of a name
    Owner { name: String },
}

#[derive(Subcommand)]
enum CidCommands {
    /// Pack a CID into (meta, data)
    Pack {
        cid: String,
        #[arg(long)]
        lock: bool,
    },
    /// Unpack (meta, data) into a CID
    Unpack { meta: String, data: String },
    /// Build the CIDv1 of a file's content
    Hash {
        file: PathBuf,
        /// Multicodec of the content
        #[arg(long, default_value_t = RAW_CODEC)]
        codec: u64,
        /// sha2-256, sha2-512, sha3-256, keccak-256 or blake2b-160
        #[arg(long, default_value = "sha2-256")]
        algorithm: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    init_logging(&config.log_level);

    let output = match cli.command {
        Commands::Cid { action } => handle_cid_commands(action)?,
        Commands::Ledger(command) => {
            let ledger = Ledger::open(&config)?;
            let output = handle_ledger_command(command, &ledger, &config.cost)?;
            ledger.flush()?;
            output
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn handle_ledger_command(
    cmd: LedgerCommands,
    ledger: &Ledger,
    schedule: &CostSchedule,
) -> Result<Value> {
    match cmd {
        LedgerCommands::Get { zone, key } => {
            let (entry, cost) = ledger.dmap.get_metered(&zone, &parse_word(&key)?)?;
            let mut json = entry_json(&entry);
            json["cost"] = cost_json(&cost, schedule)?;
            Ok(json)
        }
        LedgerCommands::Set {
            caller,
            key,
            meta,
            data,
        } => {
            let receipt = ledger.set_entry(
                &caller,
                &parse_word(&key)?,
                parse_word(&meta)?,
                parse_word(&data)?,
            )?;
            receipt_json(&receipt, schedule)
        }
        LedgerCommands::Root => {
            let root = ledger.dmap.root()?;
            let mut json = entry_json(&root);
            json["zone"] = json!(Zone::from_pointer(&root.data));
            Ok(json)
        }
        LedgerCommands::Walk { path } => {
            let trace = walk(ledger.dmap.as_ref(), &path)?;
            Ok(Value::Array(trace.iter().map(entry_json).collect()))
        }
        LedgerCommands::Free { action } => handle_free_commands(action, ledger, schedule),
    }
}

fn handle_free_commands(
    cmd: FreeCommands,
    ledger: &Ledger,
    schedule: &CostSchedule,
) -> Result<Value> {
    let freezone = &ledger.freezone;
    match cmd {
        FreeCommands::Take { caller, name } => {
            receipt_json(&freezone.take(&caller, &parse_word(&name)?)?, schedule)
        }
        FreeCommands::Give {
            caller,
            name,
            recipient,
        } => receipt_json(
            &freezone.give(&caller, &parse_word(&name)?, &recipient)?,
            schedule,
        ),
        FreeCommands::Set {
            caller,
            name,
            meta,
            data,
            cid,
            lock,
        } => {
            let (meta, data) = match (cid, meta, data) {
                (Some(cid), _, _) => prepare_cid(&cid, lock)?,
                (None, Some(meta), Some(data)) => (parse_word(&meta)?, parse_word(&data)?),
                _ => return Err(anyhow!("either --cid or both meta and data are required")),
            };
            receipt_json(
                &freezone.set(&caller, &parse_word(&name)?, meta, data)?,
                schedule,
            )
        }
        FreeCommands::Owner { name } => {
            let name = parse_word(&name)?;
            Ok(json!({
                "name": name,
                "controller": freezone.controller(&name)?,
            }))
        }
    }
}

fn handle_cid_commands(cmd: CidCommands) -> Result<Value> {
    match cmd {
        CidCommands::Pack { cid, lock } => {
            let (meta, data) = prepare_cid(&cid, lock)?;
            Ok(json!({ "meta": meta, "data": data }))
        }
        CidCommands::Unpack { meta, data } => {
            let meta = Word::from_hex(&meta)?;
            let cid = unpack_cid(&meta, &Word::from_hex(&data)?)?;
            Ok(json!({
                "cid": cid,
                "algorithm": hash_algorithm(&meta).map(|a| a.to_string()),
            }))
        }
        CidCommands::Hash {
            file,
            codec,
            algorithm,
        } => {
            let algorithm = HashAlgorithm::from_name(&algorithm)
                .ok_or_else(|| anyhow!("unknown hash algorithm {algorithm:?}"))?;
            let content =
                fs::read(&file).with_context(|| format!("failed to read {}", file.display()))?;
            let cid = cid_for_content(codec, algorithm, &content)?;
            Ok(json!({ "cid": cid, "algorithm": algorithm.to_string() }))
        }
    }
}

fn entry_json(entry: &Entry) -> Value {
    json!({
        "meta": entry.meta,
        "data": entry.data,
        "locked": entry.is_locked(),
    })
}

fn receipt_json(receipt: &Receipt, schedule: &CostSchedule) -> Result<Value> {
    let mut json = serde_json::to_value(receipt)?;
    json["units"] = json!(receipt.cost.units(schedule));
    Ok(json)
}

fn cost_json(cost: &Cost, schedule: &CostSchedule) -> Result<Value> {
    let mut json = serde_json::to_value(cost)?;
    json["units"] = json!(cost.units(schedule));
    Ok(json)
}
