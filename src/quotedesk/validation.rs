//! # Boundary Validation
//!
//! Payloads that come from outside the process (stdin, files handed to
//! `doc save`) are parsed into the typed schema before they reach the store.
//! Entities reject unknown keys, so a payload smuggling `__proto__` or
//! `constructor` fails to deserialize rather than being filtered by a list.
//!
//! After parsing, the semantic checks below run. They are the same rules the
//! quoting commands enforce when building entities themselves.

use crate::model::{Client, DocumentKind, Product, Quote, Settings};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

/// Keys that must never appear in free-form documents.
const RESERVED_KEYS: [&str; 3] = ["__proto__", "constructor", "prototype"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{document} must be {expected}")]
    WrongShape {
        document: DocumentKind,
        expected: &'static str,
    },

    #[error("{document} does not match the expected schema: {message}")]
    Malformed {
        document: DocumentKind,
        message: String,
    },

    #[error("{field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl ValidationError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// A validated document, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentPayload {
    Quotes(Vec<Quote>),
    Products(Vec<Product>),
    Clients(Vec<Client>),
    Settings(Settings),
    Analytics(Map<String, Value>),
}

impl DocumentPayload {
    pub fn kind(&self) -> DocumentKind {
        match self {
            DocumentPayload::Quotes(_) => DocumentKind::Quotes,
            DocumentPayload::Products(_) => DocumentKind::Products,
            DocumentPayload::Clients(_) => DocumentKind::Clients,
            DocumentPayload::Settings(_) => DocumentKind::Settings,
            DocumentPayload::Analytics(_) => DocumentKind::Analytics,
        }
    }
}

/// Parse and validate untrusted JSON text for `kind`.
pub fn parse_document(kind: DocumentKind, raw: &str) -> Result<DocumentPayload, ValidationError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| ValidationError::Malformed {
        document: kind,
        message: e.to_string(),
    })?;

    match kind {
        DocumentKind::Quotes => {
            let quotes: Vec<Quote> = typed_list(kind, value)?;
            unique_ids(kind, quotes.iter().map(|q| q.id.as_str()))?;
            quotes.iter().try_for_each(validate_quote)?;
            Ok(DocumentPayload::Quotes(quotes))
        }
        DocumentKind::Products => {
            let products: Vec<Product> = typed_list(kind, value)?;
            unique_ids(kind, products.iter().map(|p| p.id.as_str()))?;
            products.iter().try_for_each(validate_product)?;
            Ok(DocumentPayload::Products(products))
        }
        DocumentKind::Clients => {
            let clients: Vec<Client> = typed_list(kind, value)?;
            unique_ids(kind, clients.iter().map(|c| c.id.as_str()))?;
            clients.iter().try_for_each(validate_client)?;
            Ok(DocumentPayload::Clients(clients))
        }
        DocumentKind::Settings => {
            if !value.is_object() {
                return Err(ValidationError::WrongShape {
                    document: kind,
                    expected: "an object",
                });
            }
            let settings: Settings = typed(kind, value)?;
            validate_settings(&settings)?;
            Ok(DocumentPayload::Settings(settings))
        }
        DocumentKind::Analytics => match value {
            Value::Object(map) => {
                reject_reserved_keys("analytics", &map)?;
                Ok(DocumentPayload::Analytics(map))
            }
            _ => Err(ValidationError::WrongShape {
                document: kind,
                expected: "an object",
            }),
        },
    }
}

fn typed<T: DeserializeOwned>(kind: DocumentKind, value: Value) -> Result<T, ValidationError> {
    serde_json::from_value(value).map_err(|e| ValidationError::Malformed {
        document: kind,
        message: e.to_string(),
    })
}

fn typed_list<T: DeserializeOwned>(
    kind: DocumentKind,
    value: Value,
) -> Result<Vec<T>, ValidationError> {
    if !value.is_array() {
        return Err(ValidationError::WrongShape {
            document: kind,
            expected: "an array",
        });
    }
    typed(kind, value)
}

fn unique_ids<'a>(
    kind: DocumentKind,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(ValidationError::invalid(format!("{}.id", kind), "must not be empty"));
        }
        if !seen.insert(id) {
            return Err(ValidationError::invalid(
                format!("{}.id", kind),
                format!("duplicate id '{}'", id),
            ));
        }
    }
    Ok(())
}

fn reject_reserved_keys(field: &str, map: &Map<String, Value>) -> Result<(), ValidationError> {
    for (key, value) in map {
        if RESERVED_KEYS.contains(&key.as_str()) {
            return Err(ValidationError::invalid(
                field,
                format!("reserved key '{}'", key),
            ));
        }
        if let Value::Object(inner) = value {
            reject_reserved_keys(&format!("{}.{}", field, key), inner)?;
        }
    }
    Ok(())
}

fn check_amount(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::invalid(field, "must be a non-negative number"));
    }
    Ok(())
}

pub fn validate_currency(code: &str) -> Result<(), ValidationError> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(ValidationError::invalid(
            "currency",
            format!("'{}' is not a three-letter currency code", code),
        ))
    }
}

/// `local@domain.tld`, no whitespace, exactly one `@`.
pub fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

pub fn validate_quote(quote: &Quote) -> Result<(), ValidationError> {
    if quote.meta.client_name.trim().is_empty() {
        return Err(ValidationError::invalid("meta.clientName", "is required"));
    }
    validate_currency(&quote.meta.currency)?;
    for item in &quote.items {
        if item.code.trim().is_empty() || item.description.trim().is_empty() {
            return Err(ValidationError::invalid(
                format!("items[{}]", item.id),
                "code and description are required",
            ));
        }
        check_amount(&format!("items[{}].unitPrice", item.id), item.unit_price)?;
        if !item.quantity.is_finite() || item.quantity <= 0.0 {
            return Err(ValidationError::invalid(
                format!("items[{}].quantity", item.id),
                "must be positive",
            ));
        }
    }
    for (i, discount) in quote.discounts.iter().enumerate() {
        check_amount(&format!("discounts[{}].value", i), discount.value)?;
    }
    check_amount("total", quote.total)
}

pub fn validate_product(product: &Product) -> Result<(), ValidationError> {
    if product.code.trim().is_empty() || product.description.trim().is_empty() {
        return Err(ValidationError::invalid(
            format!("product {}", product.id),
            "code and description are required",
        ));
    }
    check_amount("unitPrice", product.unit_price)
}

pub fn validate_client(client: &Client) -> Result<(), ValidationError> {
    if client.name.trim().is_empty() {
        return Err(ValidationError::invalid("name", "is required"));
    }
    if !client.email.is_empty() && !is_plausible_email(&client.email) {
        return Err(ValidationError::invalid(
            "email",
            format!("'{}' is not a valid address", client.email),
        ));
    }
    check_amount("totalValue", client.total_value)
}

pub fn validate_settings(settings: &Settings) -> Result<(), ValidationError> {
    validate_currency(&settings.default_currency)?;
    if settings.backup.interval == 0 {
        return Err(ValidationError::invalid(
            "backup.interval",
            "must be at least one hour",
        ));
    }
    if !settings.company.email.is_empty() && !is_plausible_email(&settings.company.email) {
        return Err(ValidationError::invalid("company.email", "is not a valid address"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT: &str =
        r#"{"id":"c1","name":"Acme","email":"ops@acme.it","status":"vip","createdAt":"2025-01-01T00:00:00Z"}"#;

    #[test]
    fn accepts_a_valid_client_list() {
        let payload = parse_document(DocumentKind::Clients, &format!("[{}]", CLIENT)).unwrap();
        match payload {
            DocumentPayload::Clients(clients) => assert_eq!(clients[0].name, "Acme"),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn list_documents_must_be_arrays() {
        let err = parse_document(DocumentKind::Clients, CLIENT).unwrap_err();
        assert!(matches!(err, ValidationError::WrongShape { expected: "an array", .. }));
    }

    #[test]
    fn settings_must_be_an_object() {
        let err = parse_document(DocumentKind::Settings, "[]").unwrap_err();
        assert!(matches!(err, ValidationError::WrongShape { .. }));
    }

    #[test]
    fn proto_key_is_rejected_by_schema() {
        let raw = r#"{"__proto__":{"polluted":true},"defaultCurrency":"EUR","language":"it","theme":"light"}"#;
        let err = parse_document(DocumentKind::Settings, raw).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed { .. }));
    }

    #[test]
    fn reserved_keys_rejected_in_analytics() {
        let raw = r#"{"views":{"constructor":1}}"#;
        let err = parse_document(DocumentKind::Analytics, raw).unwrap_err();
        assert!(matches!(err, ValidationError::Invalid { .. }));
        assert!(parse_document(DocumentKind::Analytics, r#"{"views":{"daily":1}}"#).is_ok());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let raw = format!("[{},{}]", CLIENT, CLIENT);
        let err = parse_document(DocumentKind::Clients, &raw).unwrap_err();
        assert!(err.to_string().contains("duplicate id"));
    }

    #[test]
    fn not_json_is_malformed() {
        let err = parse_document(DocumentKind::Quotes, "{oops").unwrap_err();
        assert!(matches!(err, ValidationError::Malformed { .. }));
    }

    #[test]
    fn email_plausibility() {
        assert!(is_plausible_email("a@b.it"));
        assert!(!is_plausible_email("a@b"));
        assert!(!is_plausible_email("a b@c.it"));
        assert!(!is_plausible_email("@c.it"));
        assert!(!is_plausible_email("a@@c.it"));
        assert!(!is_plausible_email("a@.it"));
    }

    #[test]
    fn currency_codes() {
        assert!(validate_currency("EUR").is_ok());
        assert!(validate_currency("eur").is_err());
        assert!(validate_currency("EURO").is_err());
    }

    #[test]
    fn quote_needs_positive_quantities() {
        let raw = r#"[{"id":"q1","meta":{"clientName":"Acme","date":"2025-03-01","currency":"EUR"},
            "items":[{"id":1,"code":"A","description":"Widget","unitPrice":10,"quantity":0}],
            "total":0,"savedAt":"2025-03-01T10:00:00Z"}]"#;
        let err = parse_document(DocumentKind::Quotes, raw).unwrap_err();
        assert!(err.to_string().contains("quantity"));
    }
}
