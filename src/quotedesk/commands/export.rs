use super::helpers::{find_by_id, load_or_default};
use super::{CmdMessage, CmdResult};
use crate::error::{QuoteDeskError, Result};
use crate::model::{CompanyProfile, DiscountKind, DocumentKind, Quote, Settings};
use crate::paths::DataPaths;
use crate::quote::{discount_amount, format_amount, line_total, QuoteTotals};
use crate::store::DocumentStore;
use std::fmt::Write as _;
use std::fs;
use tracing::info;
use unicode_width::UnicodeWidthStr;

const RULE_WIDTH: usize = 64;
const DESCRIPTION_WIDTH: usize = 28;

/// Write the quote as plain text into `reports/`, named by [`file_name`].
pub fn run<S: DocumentStore>(store: &S, paths: &DataPaths, id: &str) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let quotes: Vec<Quote> = load_or_default(store, DocumentKind::Quotes, &mut result)?;
    let settings: Settings = load_or_default(store, DocumentKind::Settings, &mut result)?;
    let pos = find_by_id(&quotes, id, |q| q.id.as_str(), "quote")?;
    let quote = &quotes[pos];

    let reports = paths.reports_dir();
    fs::create_dir_all(&reports).map_err(QuoteDeskError::Io)?;
    let out = reports.join(file_name(quote));
    fs::write(&out, render(quote, &settings.company)).map_err(QuoteDeskError::Io)?;

    info!(quote = %quote.id, path = %out.display(), "exported");
    result.add_message(CmdMessage::success(format!("Exported to {}", out.display())));
    Ok(result.with_paths(vec![out]))
}

/// `offer_<number>_<id>.txt`, or `offer_<id>.txt` for an unnumbered quote, where
/// `<id>` is the first block of the quote id. Re-exporting a quote replaces
/// its own file and never another quote's.
pub fn file_name(quote: &Quote) -> String {
    let number = sanitize_filename(&quote.meta.quote_number);
    let id = sanitize_filename(quote.id.split('-').next().unwrap_or(&quote.id));
    match (number.is_empty(), id.is_empty()) {
        (true, true) => "offer_new.txt".to_string(),
        (true, false) => format!("offer_{}.txt", id),
        (false, true) => format!("offer_{}.txt", number),
        (false, false) => format!("offer_{}_{}.txt", number, id),
    }
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_matches('_')
        .to_string()
}

fn pad_to(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(c);
        used += w;
    }
    let fill = width.saturating_sub(out.width());
    out.push_str(&" ".repeat(fill));
    out
}

pub fn render(quote: &Quote, company: &CompanyProfile) -> String {
    let currency = quote.meta.currency.as_str();
    let totals = QuoteTotals::of(quote);
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    // Writing into a String cannot fail.
    if !company.name.is_empty() {
        let _ = writeln!(out, "{}", company.name);
        for line in [&company.address, &company.vat, &company.phone, &company.email] {
            if !line.is_empty() {
                let _ = writeln!(out, "{}", line);
            }
        }
        let _ = writeln!(out);
    }

    let number = if quote.meta.quote_number.is_empty() {
        "-"
    } else {
        quote.meta.quote_number.as_str()
    };
    let _ = writeln!(out, "OFFER {}", number);
    let _ = writeln!(out, "Date:   {}", quote.meta.date.format("%d/%m/%Y"));
    let _ = writeln!(out, "Client: {}", quote.meta.client_name);
    let _ = writeln!(out, "{}", rule);

    for item in &quote.items {
        let kind = if item.is_service { "S" } else { "P" };
        let _ = writeln!(
            out,
            "{} {:<8} {} {:>6} x {:>10} = {:>10}",
            kind,
            item.code,
            pad_to(&item.description, DESCRIPTION_WIDTH),
            item.quantity,
            format_amount(item.unit_price, currency),
            format_amount(line_total(item), currency)
        );
    }
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "{:>50} {:>13}", "Subtotal", format_amount(totals.subtotal, currency));

    for discount in &quote.discounts {
        let label = match discount.kind {
            DiscountKind::Percent => format!("{} ({}%)", discount.description, discount.value),
            DiscountKind::Fixed => discount.description.clone(),
        };
        let _ = writeln!(
            out,
            "{:>50} {:>13}",
            label.trim(),
            format!("-{}", format_amount(discount_amount(discount, totals.subtotal), currency))
        );
    }
    let _ = writeln!(out, "{:>50} {:>13}", "TOTAL", format_amount(totals.total, currency));

    if !quote.meta.notes.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Notes: {}", quote.meta.notes);
    }
    out
}
