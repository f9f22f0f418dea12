use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use quotedesk::api::LineInput;
use quotedesk::model::{ClientStatus, Discount, DiscountKind, DocumentKind};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "quotedesk", bin_name = "quotedesk", version)]
#[command(about = "Quotes, clients and products kept as JSON documents, with backups", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (overrides QUOTEDESK_HOME and the config file)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub root: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true, help_heading = "Options")]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load or save a whole document as JSON
    #[command(display_order = 1)]
    Doc {
        #[command(subcommand)]
        action: DocCommands,
    },

    /// Create, list, prune, archive or restore snapshots
    #[command(alias = "backups", display_order = 2)]
    Backup {
        #[command(subcommand)]
        action: BackupCommands,
    },

    /// Take snapshots on a schedule until stopped
    #[command(display_order = 3)]
    Watch {
        /// Stop after this many seconds (default: until Ctrl-C or SIGTERM)
        #[arg(long = "for", value_name = "SECS")]
        duration: Option<u64>,
    },

    /// Manage the client list
    #[command(display_order = 10)]
    Clients {
        #[command(subcommand)]
        action: Option<ClientCommands>,
    },

    /// Manage the product catalog
    #[command(display_order = 11)]
    Products {
        #[command(subcommand)]
        action: Option<ProductCommands>,
    },

    /// Create, list, show, export or remove quotes
    #[command(display_order = 12)]
    Quotes {
        #[command(subcommand)]
        action: Option<QuoteCommands>,
    },

    /// Totals, client segments and best sellers
    #[command(display_order = 13)]
    Dashboard {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask the sales assistant
    #[command(display_order = 14)]
    Ask {
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },

    /// Show or change document settings (currency, company profile, backups)
    #[command(display_order = 20)]
    Settings {
        #[command(subcommand)]
        action: Option<SettingsCommands>,
    },

    /// Get or set application configuration
    #[command(display_order = 21)]
    Config {
        /// Configuration key (data-root, snapshot-retention, startup-delay)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Create the data directory and default settings
    #[command(display_order = 22)]
    Init,
}

#[derive(Subcommand, Debug)]
pub enum DocCommands {
    /// Print a document (defaults if it does not exist)
    Load {
        /// quotes, products, clients, settings or analytics
        kind: DocumentKind,
    },

    /// Replace a document with JSON from a file or stdin
    Save {
        /// quotes, products, clients, settings or analytics
        kind: DocumentKind,

        /// Read from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum BackupCommands {
    /// Snapshot all documents now
    Create {
        /// Print `{success, path}` as JSON
        #[arg(long)]
        json: bool,
    },

    /// List snapshots, newest first
    #[command(alias = "ls")]
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete all but the newest snapshots
    Prune {
        /// How many snapshots to keep
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        keep: u64,
    },

    /// Write a snapshot as a .tar.gz archive
    Archive {
        name: String,

        /// Output file (default: reports/<name>.tar.gz)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Replace current documents with a snapshot's copies
    Restore { name: String },
}

#[derive(Subcommand, Debug)]
pub enum ClientCommands {
    /// List clients
    #[command(alias = "ls")]
    List,

    /// Add a client
    Add {
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        /// vip, standard or new
        #[arg(long, default_value = "new")]
        status: ClientStatus,
    },

    /// Change fields of a client
    Update {
        /// Client id (or a unique prefix of it)
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        status: Option<ClientStatus>,
    },

    /// Remove a client
    #[command(alias = "rm")]
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// List products
    #[command(alias = "ls")]
    List,

    /// Add a product
    Add {
        code: String,
        description: String,
        #[arg(long)]
        price: f64,
        /// Mark as a service rather than goods
        #[arg(long)]
        service: bool,
    },

    /// Change fields of a product
    Update {
        /// Product id (or a unique prefix of it)
        id: String,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        service: Option<bool>,
    },

    /// Remove a product
    #[command(alias = "rm")]
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
pub enum QuoteCommands {
    /// List saved quotes
    #[command(alias = "ls")]
    List,

    /// Show one quote
    Show { id: String },

    /// Price and save a new quote
    Create {
        #[arg(long)]
        client: String,
        #[arg(long, default_value = "")]
        number: String,
        /// Defaults to the settings' currency
        #[arg(long)]
        currency: Option<String>,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "")]
        notes: String,
        /// CODE:QTY[:PRICE[:DESCRIPTION]], repeatable
        #[arg(long = "item", required = true, value_parser = parse_item)]
        items: Vec<LineInput>,
        /// 10% or 25 (fixed), optionally followed by :DESCRIPTION
        #[arg(long = "discount", value_parser = parse_discount)]
        discounts: Vec<Discount>,
    },

    /// Export a quote as text into reports/
    Export { id: String },

    /// Remove a quote
    #[command(alias = "rm")]
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Print the settings
    Show {
        #[arg(long)]
        json: bool,
    },

    /// Set one key (e.g. default-currency, company.name, backup.interval)
    Set { key: String, value: String },
}

fn parse_number(what: &str, raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| format!("{} '{}' is not a number", what, raw))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{} '{}' is not a number", what, raw))
    }
}

pub fn parse_item(raw: &str) -> Result<LineInput, String> {
    let mut parts = raw.splitn(4, ':');
    let code = parts.next().unwrap_or_default().trim();
    if code.is_empty() {
        return Err("item needs a code, as CODE:QTY[:PRICE[:DESCRIPTION]]".to_string());
    }
    let quantity = match parts.next() {
        Some(qty) => parse_number("quantity", qty)?,
        None => return Err(format!("item '{}' needs a quantity, as {}:QTY", raw, code)),
    };
    let unit_price = parts
        .next()
        .filter(|p| !p.trim().is_empty())
        .map(|p| parse_number("price", p))
        .transpose()?;
    let description = parts
        .next()
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    Ok(LineInput {
        code: code.to_string(),
        quantity,
        unit_price,
        description,
        is_service: None,
    })
}

pub fn parse_discount(raw: &str) -> Result<Discount, String> {
    let (amount, description) = match raw.split_once(':') {
        Some((amount, description)) => (amount.trim(), description.trim().to_string()),
        None => (raw.trim(), String::new()),
    };
    let (kind, number) = match amount.strip_suffix('%') {
        Some(number) => (DiscountKind::Percent, number),
        None => (DiscountKind::Fixed, amount),
    };
    Ok(Discount {
        description,
        kind,
        value: parse_number("discount", number)?,
    })
}
