use super::helpers::{find_by_id, load_for_update, load_or_default};
use super::{CmdMessage, CmdResult};
use crate::error::{QuoteDeskError, Result};
use crate::model::{DocumentKind, LineItem, Product};
use crate::store::DocumentStore;
use crate::validation::validate_product;

#[derive(Debug, Clone, Default)]
pub struct ProductInput {
    pub code: String,
    pub description: String,
    pub unit_price: f64,
    pub is_service: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub code: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<f64>,
    pub is_service: Option<bool>,
}

pub fn find_by_code<'a>(products: &'a [Product], code: &str) -> Option<&'a Product> {
    products.iter().find(|p| p.code.eq_ignore_ascii_case(code.trim()))
}

/// Count a quote line against the catalog: bump the matching product's
/// `salesCount`, or add the product with a count of one.
pub fn record_sale(products: &mut Vec<Product>, item: &LineItem) {
    if let Some(product) = products
        .iter_mut()
        .find(|p| p.code.eq_ignore_ascii_case(item.code.trim()))
    {
        product.sales_count += 1;
        return;
    }
    let mut product = Product::new(item.code.trim(), item.description.trim(), item.unit_price);
    product.is_service = item.is_service;
    product.sales_count = 1;
    products.push(product);
}

pub fn list<S: DocumentStore>(store: &S) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let products: Vec<Product> = load_or_default(store, DocumentKind::Products, &mut result)?;
    Ok(result.with_products(products))
}

pub fn add<S: DocumentStore>(store: &S, input: ProductInput) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut products: Vec<Product> = load_for_update(store, DocumentKind::Products)?;

    if find_by_code(&products, &input.code).is_some() {
        return Err(QuoteDeskError::Api(format!(
            "A product with code '{}' already exists",
            input.code.trim()
        )));
    }

    let mut product = Product::new(input.code.trim(), input.description.trim(), input.unit_price);
    product.is_service = input.is_service;
    validate_product(&product)?;

    products.push(product.clone());
    store.write(DocumentKind::Products, &products)?;

    result.add_message(CmdMessage::success(format!("Product added: {}", product.code)));
    Ok(result.with_products(vec![product]))
}

pub fn update<S: DocumentStore>(store: &S, id: &str, update: ProductUpdate) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut products: Vec<Product> = load_for_update(store, DocumentKind::Products)?;
    let pos = find_by_id(&products, id, |p| p.id.as_str(), "product")?;

    if let Some(code) = &update.code {
        let clash = products
            .iter()
            .enumerate()
            .any(|(i, p)| i != pos && p.code.eq_ignore_ascii_case(code.trim()));
        if clash {
            return Err(QuoteDeskError::Api(format!(
                "A product with code '{}' already exists",
                code.trim()
            )));
        }
    }

    let product = &mut products[pos];
    if let Some(code) = update.code {
        product.code = code.trim().to_string();
    }
    if let Some(description) = update.description {
        product.description = description.trim().to_string();
    }
    if let Some(price) = update.unit_price {
        product.unit_price = price;
    }
    if let Some(is_service) = update.is_service {
        product.is_service = is_service;
    }
    validate_product(product)?;
    let updated = product.clone();

    store.write(DocumentKind::Products, &products)?;
    result.add_message(CmdMessage::success(format!("Product updated: {}", updated.code)));
    Ok(result.with_products(vec![updated]))
}

pub fn remove<S: DocumentStore>(store: &S, id: &str) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut products: Vec<Product> = load_for_update(store, DocumentKind::Products)?;
    let pos = find_by_id(&products, id, |p| p.id.as_str(), "product")?;

    let removed = products.remove(pos);
    store.write(DocumentKind::Products, &products)?;
    result.add_message(CmdMessage::success(format!("Product removed: {}", removed.code)));
    Ok(result.with_products(vec![removed]))
}
