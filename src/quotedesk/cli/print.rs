use chrono::{DateTime, Utc};
use colored::Colorize;
use quotedesk::api::{CmdMessage, Dashboard, MessageLevel};
use quotedesk::backup::SnapshotInfo;
use quotedesk::commands::quotes::display_number;
use quotedesk::commands::settings;
use quotedesk::config::{AppConfig, KEYS as CONFIG_KEYS};
use quotedesk::model::{Client, Product, Quote, Settings};
use quotedesk::quote::{format_amount, line_total, QuoteTotals};
use std::fmt::Write as _;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const TIME_WIDTH: usize = 16;
const NAME_WIDTH: usize = 28;
const ID_WIDTH: usize = 8;

/// Info and success go to stdout; warnings and errors to stderr so that
/// `doc load` output stays valid JSON.
pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => eprintln!("{}", message.content.yellow()),
            MessageLevel::Error => eprintln!("{}", message.content.red()),
        }
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    if s.width() <= max_width {
        return s.to_string();
    }
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

/// Truncate or pad to exactly `width` columns.
fn cell(s: &str, width: usize) -> String {
    let shown = truncate_to_width(s, width);
    let padding = width.saturating_sub(shown.width());
    format!("{}{}", shown, " ".repeat(padding))
}

fn short_id(id: &str) -> &str {
    id.get(..ID_WIDTH).unwrap_or(id)
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    match bytes {
        b if b >= MIB => format!("{:.1} MiB", b as f64 / MIB as f64),
        b if b >= KIB => format!("{:.1} KiB", b as f64 / KIB as f64),
        b => format!("{} B", b),
    }
}

pub(super) fn render_snapshots(snapshots: &[SnapshotInfo]) -> String {
    let mut out = String::new();
    for snapshot in snapshots {
        let _ = writeln!(
            out,
            "{}  {:>10}  {}",
            cell(&snapshot.name, NAME_WIDTH),
            format_size(snapshot.size),
            format_time_ago(snapshot.date).dimmed()
        );
    }
    out
}

pub(super) fn render_clients(clients: &[Client]) -> String {
    if clients.is_empty() {
        return "No clients yet.\n".to_string();
    }
    let mut out = String::new();
    for client in clients {
        let contact = if client.email.is_empty() {
            client.phone.as_str()
        } else {
            client.email.as_str()
        };
        let status = match client.status.label() {
            "VIP" => "VIP".yellow().to_string(),
            other => other.normal().to_string(),
        };
        let _ = writeln!(
            out,
            "{}  {}  {}  {:<8}  {:>4} quotes  {:>12}",
            short_id(&client.id).dimmed(),
            cell(&client.name, NAME_WIDTH),
            cell(contact, 24),
            status,
            client.quotes_count,
            format!("{:.2}", client.total_value)
        );
    }
    out
}

pub(super) fn render_products(products: &[Product], currency: &str) -> String {
    if products.is_empty() {
        return "No products yet.\n".to_string();
    }
    let mut out = String::new();
    for product in products {
        let kind = if product.is_service { "service" } else { "goods" };
        let _ = writeln!(
            out,
            "{}  {}  {}  {:>12}  {:<7}  {:>4} sold",
            short_id(&product.id).dimmed(),
            cell(&product.code, 10),
            cell(&product.description, NAME_WIDTH),
            format_amount(product.unit_price, currency),
            kind,
            product.sales_count
        );
    }
    out
}

pub(super) fn render_quotes(quotes: &[Quote]) -> String {
    if quotes.is_empty() {
        return "No quotes saved yet.\n".to_string();
    }
    let mut out = String::new();
    for quote in quotes {
        let _ = writeln!(
            out,
            "{}  {}  {}  {}  {:>12}",
            short_id(&quote.id).dimmed(),
            cell(display_number(quote), 10),
            quote.meta.date,
            cell(&quote.meta.client_name, NAME_WIDTH),
            format_amount(quote.total, &quote.meta.currency)
        );
    }
    out
}

pub(super) fn render_quote(quote: &Quote) -> String {
    let currency = quote.meta.currency.as_str();
    let totals = QuoteTotals::of(quote);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} {}",
        display_number(quote).yellow(),
        quote.meta.client_name.bold()
    );
    let _ = writeln!(out, "{}  {}", quote.meta.date, quote.id.dimmed());
    let _ = writeln!(out, "--------------------------------");
    for item in &quote.items {
        let _ = writeln!(
            out,
            "{:>3}. {}  {}  {:>6} x {:>10}  {:>12}",
            item.id,
            cell(&item.code, 10),
            cell(&item.description, NAME_WIDTH),
            item.quantity,
            format_amount(item.unit_price, currency),
            format_amount(line_total(item), currency)
        );
    }
    let _ = writeln!(out, "--------------------------------");
    let _ = writeln!(out, "Subtotal  {}", format_amount(totals.subtotal, currency));
    if totals.discount > 0.0 {
        let _ = writeln!(out, "Discounts -{}", format_amount(totals.discount, currency));
    }
    let _ = writeln!(out, "Total     {}", format_amount(totals.total, currency).bold());
    if !quote.meta.notes.is_empty() {
        let _ = writeln!(out, "\n{}", quote.meta.notes);
    }
    out
}

pub(super) fn render_dashboard(dash: &Dashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Quotes          {}", dash.total_quotes);
    let _ = writeln!(out, "Revenue         {}", format_amount(dash.revenue, &dash.currency));
    let _ = writeln!(out, "Clients         {}", dash.active_clients);
    let _ = writeln!(
        out,
        "  VIP {} · Standard {} · New {}",
        dash.segments.vip, dash.segments.standard, dash.segments.new
    );
    let _ = writeln!(out, "Products        {}", dash.product_count);
    if !dash.top_products.is_empty() {
        let _ = writeln!(out, "\nBest sellers");
        for (i, product) in dash.top_products.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {}  {}  {:>4}",
                i + 1,
                cell(&product.code, 10),
                cell(&product.description, NAME_WIDTH),
                product.sales_count
            );
        }
    }
    out
}

pub(super) fn render_settings(current: &Settings) -> String {
    let mut out = String::new();
    for key in settings::KEYS {
        if let Some(value) = settings::get(current, key) {
            let _ = writeln!(out, "{} = {}", key, value);
        }
    }
    out
}

pub(super) fn render_config(config: &AppConfig) -> String {
    let mut out = String::new();
    for key in CONFIG_KEYS {
        if let Some(value) = config.get(key) {
            let _ = writeln!(out, "{} = {}", key, value);
        }
    }
    out
}
