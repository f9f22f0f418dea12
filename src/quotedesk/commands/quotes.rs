use super::helpers::{find_by_id, load_for_update, load_or_default};
use super::products::{find_by_code, record_sale};
use super::{CmdMessage, CmdResult};
use crate::error::{QuoteDeskError, Result};
use crate::model::{
    new_id, Client, Discount, DocumentKind, LineItem, Product, Quote, QuoteMeta, Settings,
};
use crate::quote::{self, format_amount};
use crate::store::DocumentStore;
use crate::validation::validate_quote;
use chrono::{NaiveDate, Utc};

/// A quote line as typed by the user. Missing price or description are taken
/// from the catalog entry with the same code.
#[derive(Debug, Clone, Default)]
pub struct LineInput {
    pub code: String,
    pub quantity: f64,
    pub unit_price: Option<f64>,
    pub description: Option<String>,
    pub is_service: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct QuoteDraft {
    pub client_name: String,
    pub quote_number: String,
    /// Defaults to the settings' currency.
    pub currency: Option<String>,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
    pub notes: String,
    pub items: Vec<LineInput>,
    pub discounts: Vec<Discount>,
}

pub fn list<S: DocumentStore>(store: &S) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let quotes: Vec<Quote> = load_or_default(store, DocumentKind::Quotes, &mut result)?;
    Ok(result.with_quotes(quotes))
}

pub fn show<S: DocumentStore>(store: &S, id: &str) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let quotes: Vec<Quote> = load_or_default(store, DocumentKind::Quotes, &mut result)?;
    let pos = find_by_id(&quotes, id, |q| q.id.as_str(), "quote")?;
    Ok(result.with_quotes(vec![quotes[pos].clone()]))
}

fn build_items(lines: &[LineInput], catalog: &[Product]) -> Result<Vec<LineItem>> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let code = line.code.trim();
            let known = find_by_code(catalog, code);
            let description = line
                .description
                .clone()
                .or_else(|| known.map(|p| p.description.clone()))
                .ok_or_else(|| {
                    QuoteDeskError::Api(format!(
                        "Item {} is not in the catalog; give it a description",
                        code
                    ))
                })?;
            let unit_price = line
                .unit_price
                .or_else(|| known.map(|p| p.unit_price))
                .ok_or_else(|| {
                    QuoteDeskError::Api(format!("Item {} is not in the catalog; give it a price", code))
                })?;
            Ok(LineItem {
                id: i as u32 + 1,
                code: code.to_string(),
                description,
                unit_price,
                quantity: line.quantity,
                is_service: line
                    .is_service
                    .or_else(|| known.map(|p| p.is_service))
                    .unwrap_or(false),
            })
        })
        .collect()
}

/// Price and save a new quote, then count its lines against the product
/// catalog and its total against the client with the same name.
pub fn create<S: DocumentStore>(store: &S, draft: QuoteDraft) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    if draft.client_name.trim().is_empty() {
        return Err(QuoteDeskError::Api("Client name is required".to_string()));
    }
    if draft.items.is_empty() {
        return Err(QuoteDeskError::Api("Add at least one item".to_string()));
    }

    let settings: Settings = load_or_default(store, DocumentKind::Settings, &mut result)?;
    let mut products: Vec<Product> = load_for_update(store, DocumentKind::Products)?;
    let items = build_items(&draft.items, &products)?;

    let meta = QuoteMeta {
        client_name: draft.client_name.trim().to_string(),
        quote_number: draft.quote_number.trim().to_string(),
        date: draft.date.unwrap_or_else(|| Utc::now().date_naive()),
        currency: draft
            .currency
            .unwrap_or(settings.default_currency)
            .trim()
            .to_uppercase(),
        notes: draft.notes,
    };
    let total = quote::total(&items, &draft.discounts);
    let new_quote = Quote {
        id: new_id(),
        meta,
        items,
        discounts: draft.discounts,
        total,
        saved_at: Utc::now(),
    };
    validate_quote(&new_quote)?;

    let mut quotes: Vec<Quote> = load_for_update(store, DocumentKind::Quotes)?;
    quotes.push(new_quote.clone());
    store.write(DocumentKind::Quotes, &quotes)?;

    for item in &new_quote.items {
        record_sale(&mut products, item);
    }
    store.write(DocumentKind::Products, &products)?;

    let mut clients: Vec<Client> = load_for_update(store, DocumentKind::Clients)?;
    if let Some(client) = clients
        .iter_mut()
        .find(|c| c.name.eq_ignore_ascii_case(&new_quote.meta.client_name))
    {
        client.quotes_count += 1;
        client.total_value += new_quote.total;
        store.write(DocumentKind::Clients, &clients)?;
    } else {
        result.add_message(CmdMessage::info(format!(
            "{} is not in the client list",
            new_quote.meta.client_name
        )));
    }

    result.add_message(CmdMessage::success(format!(
        "Quote saved for {}: {}",
        new_quote.meta.client_name,
        format_amount(new_quote.total, &new_quote.meta.currency)
    )));
    Ok(result.with_quotes(vec![new_quote]))
}

pub fn remove<S: DocumentStore>(store: &S, id: &str) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut quotes: Vec<Quote> = load_for_update(store, DocumentKind::Quotes)?;
    let pos = find_by_id(&quotes, id, |q| q.id.as_str(), "quote")?;

    let removed = quotes.remove(pos);
    store.write(DocumentKind::Quotes, &quotes)?;
    result.add_message(CmdMessage::success(format!(
        "Quote removed: {}",
        display_number(&removed)
    )));
    Ok(result.with_quotes(vec![removed]))
}

/// The quote number, or the first block of the id for unnumbered quotes.
pub fn display_number(quote: &Quote) -> &str {
    if quote.meta.quote_number.is_empty() {
        quote.id.split('-').next().unwrap_or(&quote.id)
    } else {
        &quote.meta.quote_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{clients, products};
    use crate::model::DiscountKind;
    use crate::store::memory::InMemoryStore;

    fn line(code: &str, qty: f64, price: Option<f64>) -> LineInput {
        LineInput {
            code: code.into(),
            quantity: qty,
            unit_price: price,
            description: price.map(|_| format!("{} item", code)),
            is_service: None,
        }
    }

    fn draft(client: &str, items: Vec<LineInput>) -> QuoteDraft {
        QuoteDraft {
            client_name: client.into(),
            items,
            ..QuoteDraft::default()
        }
    }

    #[test]
    fn create_computes_total_and_defaults_currency() {
        let store = InMemoryStore::new();
        let mut d = draft("Acme", vec![line("A", 2.0, Some(50.0)), line("B", 1.0, Some(20.0))]);
        d.discounts = vec![Discount {
            description: "loyalty".into(),
            kind: DiscountKind::Percent,
            value: 10.0,
        }];

        let created = create(&store, d).unwrap();
        let quote = &created.quotes[0];
        assert_eq!(quote.total, 108.0);
        assert_eq!(quote.meta.currency, "EUR");
        assert_eq!(quote.items[1].id, 2);
        assert_eq!(list(&store).unwrap().quotes.len(), 1);
    }

    #[test]
    fn catalog_fills_missing_price_and_counts_sales() {
        let store = InMemoryStore::new();
        products::add(
            &store,
            products::ProductInput {
                code: "W-1".into(),
                description: "Widget".into(),
                unit_price: 10.0,
                is_service: false,
            },
        )
        .unwrap();

        let created = create(&store, draft("Acme", vec![line("w-1", 3.0, None)])).unwrap();
        assert_eq!(created.quotes[0].items[0].description, "Widget");
        assert_eq!(created.quotes[0].total, 30.0);

        let catalog = products::list(&store).unwrap().products;
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].sales_count, 1);
    }

    #[test]
    fn unknown_code_is_added_to_catalog() {
        let store = InMemoryStore::new();
        create(&store, draft("Acme", vec![line("NEW", 1.0, Some(5.0))])).unwrap();
        let catalog = products::list(&store).unwrap().products;
        assert_eq!(catalog[0].code, "NEW");
        assert_eq!(catalog[0].sales_count, 1);
    }

    #[test]
    fn unknown_code_without_price_is_an_error() {
        let store = InMemoryStore::new();
        assert!(create(&store, draft("Acme", vec![line("X", 1.0, None)])).is_err());
        assert!(store.raw(DocumentKind::Quotes).is_none());
    }

    #[test]
    fn matching_client_accumulates_totals() {
        let store = InMemoryStore::new();
        clients::add(
            &store,
            clients::ClientInput {
                name: "Acme".into(),
                ..clients::ClientInput::default()
            },
        )
        .unwrap();

        create(&store, draft("acme", vec![line("A", 1.0, Some(100.0))])).unwrap();
        create(&store, draft("ACME", vec![line("A", 1.0, Some(50.0))])).unwrap();

        let client = &clients::list(&store).unwrap().clients[0];
        assert_eq!(client.quotes_count, 2);
        assert_eq!(client.total_value, 150.0);
    }

    #[test]
    fn client_name_and_items_are_required() {
        let store = InMemoryStore::new();
        assert!(create(&store, draft(" ", vec![line("A", 1.0, Some(1.0))])).is_err());
        assert!(create(&store, draft("Acme", vec![])).is_err());
    }

    #[test]
    fn show_and_remove() {
        let store = InMemoryStore::new();
        let id = create(&store, draft("Acme", vec![line("A", 1.0, Some(1.0))]))
            .unwrap()
            .quotes[0]
            .id
            .clone();

        assert_eq!(show(&store, &id).unwrap().quotes[0].id, id);
        remove(&store, &id).unwrap();
        assert!(matches!(show(&store, &id), Err(QuoteDeskError::NotFound(_))));
    }
}
