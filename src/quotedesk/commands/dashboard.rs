use super::helpers::load_or_default;
use super::CmdResult;
use crate::error::Result;
use crate::model::{Client, ClientStatus, DocumentKind, Product, Quote, Settings};
use crate::store::DocumentStore;
use serde::Serialize;

const TOP_PRODUCTS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Segments {
    pub vip: usize,
    pub standard: usize,
    pub new: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub code: String,
    pub description: String,
    pub sales_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total_quotes: usize,
    /// Sum of quote totals, regardless of each quote's currency.
    pub revenue: f64,
    pub currency: String,
    pub active_clients: usize,
    pub segments: Segments,
    pub top_products: Vec<TopProduct>,
    pub product_count: usize,
}

pub fn compute(quotes: &[Quote], clients: &[Client], products: &[Product], currency: &str) -> Dashboard {
    let mut segments = Segments::default();
    for client in clients {
        match client.status {
            ClientStatus::Vip => segments.vip += 1,
            ClientStatus::Standard => segments.standard += 1,
            ClientStatus::New => segments.new += 1,
        }
    }

    let mut ranked: Vec<&Product> = products.iter().filter(|p| p.sales_count > 0).collect();
    ranked.sort_by(|a, b| b.sales_count.cmp(&a.sales_count).then_with(|| a.code.cmp(&b.code)));

    Dashboard {
        total_quotes: quotes.len(),
        revenue: quotes.iter().map(|q| q.total).sum(),
        currency: currency.to_string(),
        active_clients: clients.len(),
        segments,
        top_products: ranked
            .into_iter()
            .take(TOP_PRODUCTS)
            .map(|p| TopProduct {
                code: p.code.clone(),
                description: p.description.clone(),
                sales_count: p.sales_count,
            })
            .collect(),
        product_count: products.len(),
    }
}

pub fn run<S: DocumentStore>(store: &S) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let quotes: Vec<Quote> = load_or_default(store, DocumentKind::Quotes, &mut result)?;
    let clients: Vec<Client> = load_or_default(store, DocumentKind::Clients, &mut result)?;
    let products: Vec<Product> = load_or_default(store, DocumentKind::Products, &mut result)?;
    let settings: Settings = load_or_default(store, DocumentKind::Settings, &mut result)?;

    result.dashboard = Some(compute(&quotes, &clients, &products, &settings.default_currency));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::quotes::{self, LineInput, QuoteDraft};
    use crate::store::memory::InMemoryStore;

    fn product(code: &str, sales: u32) -> Product {
        let mut p = Product::new(code, code, 1.0);
        p.sales_count = sales;
        p
    }

    #[test]
    fn empty_store_gives_zeroes() {
        let store = InMemoryStore::new();
        let dash = run(&store).unwrap().dashboard.unwrap();
        assert_eq!(dash.total_quotes, 0);
        assert_eq!(dash.revenue, 0.0);
        assert_eq!(dash.currency, "EUR");
        assert!(dash.top_products.is_empty());
    }

    #[test]
    fn segments_count_statuses() {
        let mut vip = Client::new("A");
        vip.status = ClientStatus::Vip;
        let clients = vec![vip, Client::new("B"), Client::new("C")];
        let dash = compute(&[], &clients, &[], "EUR");
        assert_eq!(dash.segments, Segments { vip: 1, standard: 0, new: 2 });
        assert_eq!(dash.active_clients, 3);
    }

    #[test]
    fn top_products_are_ranked_and_capped() {
        let products: Vec<Product> = (0..8).map(|i| product(&format!("P{}", i), i)).collect();
        let dash = compute(&[], &[], &products, "EUR");
        let codes: Vec<_> = dash.top_products.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["P7", "P6", "P5", "P4", "P3"]);
        assert_eq!(dash.product_count, 8);
    }

    #[test]
    fn revenue_sums_quote_totals() {
        let store = InMemoryStore::new();
        for price in [100.0, 250.0] {
            quotes::create(
                &store,
                QuoteDraft {
                    client_name: "Acme".into(),
                    items: vec![LineInput {
                        code: "A".into(),
                        quantity: 1.0,
                        unit_price: Some(price),
                        description: Some("Thing".into()),
                        is_service: None,
                    }],
                    ..QuoteDraft::default()
                },
            )
            .unwrap();
        }
        let dash = run(&store).unwrap().dashboard.unwrap();
        assert_eq!(dash.total_quotes, 2);
        assert_eq!(dash.revenue, 350.0);
        assert_eq!(dash.top_products[0].sales_count, 2);
    }
}
