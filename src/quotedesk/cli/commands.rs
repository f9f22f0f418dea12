use super::print::{
    print_messages, render_clients, render_config, render_dashboard, render_products, render_quote,
    render_quotes, render_settings, render_snapshots,
};
use super::setup::{
    BackupCommands, Cli, ClientCommands, Commands, DocCommands, ProductCommands, QuoteCommands,
    SettingsCommands,
};
use clap::Parser;
use quotedesk::api::{
    ClientInput, ClientUpdate, CmdResult, ConfigAction, ProductInput, ProductUpdate,
    QuoteDeskApi, QuoteDraft,
};
use quotedesk::commands::backups::{CreateReply, ListReply};
use quotedesk::config::{self, AppConfig, CONFIG_DIR_ENV, DATA_ROOT_ENV};
use quotedesk::error::{QuoteDeskError, Result};
use quotedesk::logging;
use quotedesk::model::{DocumentKind, Settings};
use quotedesk::paths::DataPaths;
use quotedesk::schedule::{BackupPolicy, Watcher};
use quotedesk::store::fs::FileStore;
use signal_hook::consts::{SIGINT, SIGTERM};
use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

struct AppContext {
    api: QuoteDeskApi<FileStore>,
    config: AppConfig,
}

impl AppContext {
    fn settings(&self) -> Result<Settings> {
        let result = self.api.show_settings()?;
        Ok(result.settings.unwrap_or_default())
    }

    fn policy(&self, settings: &Settings) -> BackupPolicy {
        BackupPolicy::from_settings(
            &settings.backup,
            Duration::from_secs(self.config.startup_delay_secs),
        )
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let config_dir = config::config_dir(env_path(CONFIG_DIR_ENV))?;
    let config = AppConfig::load(&config_dir)?;
    let root = config::resolve_data_root(cli.root.clone(), env_path(DATA_ROOT_ENV), &config)?;
    debug!(root = %root.display(), config_dir = %config_dir.display(), "context");

    let paths = DataPaths::new(root);
    let api = QuoteDeskApi::new(FileStore::new(paths.clone()), paths, config_dir);
    api.ensure_directories()?;
    Ok(AppContext { api, config })
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let ctx = init_context(&cli)?;

    match cli.command {
        None => handle_dashboard(&ctx, false),
        Some(Commands::Doc { action }) => match action {
            DocCommands::Load { kind } => handle_doc_load(&ctx, kind),
            DocCommands::Save { kind, file } => handle_doc_save(&ctx, kind, file),
        },
        Some(Commands::Backup { action }) => match action {
            BackupCommands::Create { json } => handle_backup_create(&ctx, json),
            BackupCommands::List { json } => handle_backup_list(&ctx, json),
            BackupCommands::Prune { keep } => {
                let keep = usize::try_from(keep)
                    .map_err(|_| QuoteDeskError::Api(format!("keep value {} is too large", keep)))?;
                let result = ctx.api.prune_backups(keep)?;
                print_messages(&result.messages);
                Ok(())
            }
            BackupCommands::Archive { name, out } => {
                let result = ctx.api.archive_backup(&name, out)?;
                print_messages(&result.messages);
                Ok(())
            }
            BackupCommands::Restore { name } => {
                let result = ctx.api.restore_backup(&name)?;
                print_messages(&result.messages);
                Ok(())
            }
        },
        Some(Commands::Watch { duration }) => handle_watch(&ctx, duration),
        Some(Commands::Clients { action }) => handle_clients(&ctx, action),
        Some(Commands::Products { action }) => handle_products(&ctx, action),
        Some(Commands::Quotes { action }) => handle_quotes(&ctx, action),
        Some(Commands::Dashboard { json }) => handle_dashboard(&ctx, json),
        Some(Commands::Ask { prompt }) => {
            let result = ctx.api.ask(&prompt.join(" "));
            if let Some(answer) = result.answer {
                println!("[{}] {}", answer.intent, answer.text);
            }
            Ok(())
        }
        Some(Commands::Settings { action }) => handle_settings(&ctx, action),
        Some(Commands::Config { key, value }) => handle_config(&ctx, key, value),
        Some(Commands::Init) => {
            let result = ctx.api.init()?;
            print_messages(&result.messages);
            Ok(())
        }
    }
}

/// Called after commands that changed a document. A failed automatic
/// snapshot is reported but does not fail the command that triggered it.
fn after_mutation(ctx: &AppContext) {
    let outcome = ctx
        .settings()
        .and_then(|settings| ctx.api.auto_backup(&ctx.policy(&settings), ctx.config.snapshot_retention));
    match outcome {
        Ok(result) => print_messages(&result.messages),
        Err(e) => warn!(error = %e, "automatic snapshot failed"),
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_doc_load(ctx: &AppContext, kind: DocumentKind) -> Result<()> {
    let result = ctx.api.load_document(kind)?;
    print_messages(&result.messages);
    if let Some(document) = &result.document {
        print_json(document)?;
    }
    Ok(())
}

fn handle_doc_save(ctx: &AppContext, kind: DocumentKind, file: Option<PathBuf>) -> Result<()> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(&path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let result = ctx.api.save_document(kind, &raw)?;
    print_messages(&result.messages);
    if result.saved != Some(true) {
        return Err(QuoteDeskError::Store(format!("{} was not saved", kind)));
    }
    after_mutation(ctx);
    Ok(())
}

fn handle_backup_create(ctx: &AppContext, json: bool) -> Result<()> {
    let outcome = ctx.api.create_backup(ctx.config.snapshot_retention);
    if json {
        print_json(&CreateReply::from_outcome(&outcome))?;
        outcome?;
        return Ok(());
    }
    print_messages(&outcome?.messages);
    Ok(())
}

fn handle_backup_list(ctx: &AppContext, json: bool) -> Result<()> {
    let outcome = ctx.api.list_backups();
    if json {
        print_json(&ListReply::from_outcome(&outcome))?;
        outcome?;
        return Ok(());
    }
    let result = outcome?;
    print!("{}", render_snapshots(&result.snapshots));
    print_messages(&result.messages);
    Ok(())
}

fn handle_watch(ctx: &AppContext, duration: Option<u64>) -> Result<()> {
    let settings = ctx.settings()?;
    let policy = ctx.policy(&settings);
    if !policy.enabled {
        println!("Automatic snapshots are off (backup.auto); only start and stop snapshots will be taken.");
    }

    let stop = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        if let Err(e) = signal_hook::flag::register(signal, Arc::clone(&stop)) {
            warn!("could not register signal {}: {}", signal, e);
        }
    }
    if let Some(secs) = duration {
        let flag = Arc::clone(&stop);
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            flag.store(true, Ordering::SeqCst);
        });
    }

    let watcher = Watcher::new(
        ctx.api.paths().clone(),
        policy,
        ctx.config.snapshot_retention,
    );
    let summary = watcher.run(&stop);

    println!(
        "Took {} snapshot(s), {} failed, {} pruned",
        summary.taken.len(),
        summary.failed,
        summary.pruned
    );
    for name in &summary.taken {
        println!("  {}", name);
    }
    Ok(())
}

fn finish(ctx: &AppContext, result: &CmdResult) {
    print_messages(&result.messages);
    after_mutation(ctx);
}

fn handle_clients(ctx: &AppContext, action: Option<ClientCommands>) -> Result<()> {
    match action.unwrap_or(ClientCommands::List) {
        ClientCommands::List => {
            let result = ctx.api.list_clients()?;
            print!("{}", render_clients(&result.clients));
            print_messages(&result.messages);
        }
        ClientCommands::Add {
            name,
            email,
            phone,
            status,
        } => {
            let result = ctx.api.add_client(ClientInput {
                name,
                email,
                phone,
                status,
            })?;
            finish(ctx, &result);
        }
        ClientCommands::Update {
            id,
            name,
            email,
            phone,
            status,
        } => {
            let result = ctx.api.update_client(
                &id,
                ClientUpdate {
                    name,
                    email,
                    phone,
                    status,
                },
            )?;
            finish(ctx, &result);
        }
        ClientCommands::Remove { id } => {
            let result = ctx.api.remove_client(&id)?;
            finish(ctx, &result);
        }
    }
    Ok(())
}

fn handle_products(ctx: &AppContext, action: Option<ProductCommands>) -> Result<()> {
    match action.unwrap_or(ProductCommands::List) {
        ProductCommands::List => {
            let currency = ctx.settings()?.default_currency;
            let result = ctx.api.list_products()?;
            print!("{}", render_products(&result.products, &currency));
            print_messages(&result.messages);
        }
        ProductCommands::Add {
            code,
            description,
            price,
            service,
        } => {
            let result = ctx.api.add_product(ProductInput {
                code,
                description,
                unit_price: price,
                is_service: service,
            })?;
            finish(ctx, &result);
        }
        ProductCommands::Update {
            id,
            code,
            description,
            price,
            service,
        } => {
            let result = ctx.api.update_product(
                &id,
                ProductUpdate {
                    code,
                    description,
                    unit_price: price,
                    is_service: service,
                },
            )?;
            finish(ctx, &result);
        }
        ProductCommands::Remove { id } => {
            let result = ctx.api.remove_product(&id)?;
            finish(ctx, &result);
        }
    }
    Ok(())
}

fn handle_quotes(ctx: &AppContext, action: Option<QuoteCommands>) -> Result<()> {
    match action.unwrap_or(QuoteCommands::List) {
        QuoteCommands::List => {
            let result = ctx.api.list_quotes()?;
            print!("{}", render_quotes(&result.quotes));
            print_messages(&result.messages);
        }
        QuoteCommands::Show { id } => {
            let result = ctx.api.show_quote(&id)?;
            for quote in &result.quotes {
                print!("{}", render_quote(quote));
            }
            print_messages(&result.messages);
        }
        QuoteCommands::Create {
            client,
            number,
            currency,
            date,
            notes,
            items,
            discounts,
        } => {
            let result = ctx.api.create_quote(QuoteDraft {
                client_name: client,
                quote_number: number,
                currency,
                date,
                notes,
                items,
                discounts,
            })?;
            for quote in &result.quotes {
                print!("{}", render_quote(quote));
            }
            finish(ctx, &result);
        }
        QuoteCommands::Export { id } => {
            let result = ctx.api.export_quote(&id)?;
            print_messages(&result.messages);
        }
        QuoteCommands::Remove { id } => {
            let result = ctx.api.remove_quote(&id)?;
            finish(ctx, &result);
        }
    }
    Ok(())
}

fn handle_dashboard(ctx: &AppContext, json: bool) -> Result<()> {
    let result = ctx.api.dashboard()?;
    if let Some(dashboard) = &result.dashboard {
        if json {
            print_json(dashboard)?;
        } else {
            print!("{}", render_dashboard(dashboard));
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_settings(ctx: &AppContext, action: Option<SettingsCommands>) -> Result<()> {
    match action.unwrap_or(SettingsCommands::Show { json: false }) {
        SettingsCommands::Show { json } => {
            let result = ctx.api.show_settings()?;
            if let Some(settings) = &result.settings {
                if json {
                    print_json(settings)?;
                } else {
                    print!("{}", render_settings(settings));
                }
            }
            print_messages(&result.messages);
        }
        SettingsCommands::Set { key, value } => {
            let result = ctx.api.set_setting(&key, &value)?;
            finish(ctx, &result);
        }
    }
    Ok(())
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key.clone(), value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };

    let result = ctx.api.config(action)?;
    if key.is_none() {
        if let Some(config) = &result.config {
            print!("{}", render_config(config));
        }
    }
    print_messages(&result.messages);
    if result.has_errors() {
        return Err(QuoteDeskError::Api("configuration unchanged".to_string()));
    }
    Ok(())
}
