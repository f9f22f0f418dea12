//! # Documents and Entities
//!
//! The store persists one JSON file per [`DocumentKind`]. It never looks inside
//! them: the types below exist for the boundary (validation) and the command
//! layer, which is where quotes, clients and products get their meaning.
//!
//! Keys are camelCase on disk so files stay compatible with what the quoting
//! front end has always written. That front end also wrote numeric ids and
//! catalog entries without `createdAt`; both are accepted on read.
//!
//! ```text
//! quotes.json    [Quote]      append-only list of saved quotes
//! products.json  [Product]    product/service catalog
//! clients.json   [Client]     client catalog
//! settings.json  Settings     singleton
//! analytics.json {..}         free-form, managed but never interpreted
//! ```
//!
//! Every entity rejects unknown keys when deserialized. That is what makes
//! untrusted input safe at the boundary: a payload carrying `__proto__` or
//! `constructor` simply fails to parse.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The managed documents, each stored as `<root>/<name>.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Quotes,
    Products,
    Clients,
    Settings,
    Analytics,
}

impl DocumentKind {
    /// Every managed document, in snapshot order.
    pub const ALL: [DocumentKind; 5] = [
        DocumentKind::Quotes,
        DocumentKind::Products,
        DocumentKind::Clients,
        DocumentKind::Settings,
        DocumentKind::Analytics,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DocumentKind::Quotes => "quotes",
            DocumentKind::Products => "products",
            DocumentKind::Clients => "clients",
            DocumentKind::Settings => "settings",
            DocumentKind::Analytics => "analytics",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.name())
    }

    /// List documents default to `[]`, singletons to an object.
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            DocumentKind::Quotes | DocumentKind::Products | DocumentKind::Clients
        )
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentKind::ALL
            .iter()
            .find(|kind| kind.name() == s.trim().to_lowercase())
            .copied()
            .ok_or_else(|| {
                format!(
                    "unknown document '{}' (expected quotes, products, clients, settings or analytics)",
                    s
                )
            })
    }
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Entity ids are kept as strings; a numeric id is read as its decimal text.
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

// --- Quotes ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QuoteMeta {
    pub client_name: String,
    #[serde(default)]
    pub quote_number: String,
    pub date: NaiveDate,
    pub currency: String,
    #[serde(default)]
    pub notes: String,
}

impl QuoteMeta {
    pub fn new(client_name: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            quote_number: String::new(),
            date: Utc::now().date_naive(),
            currency: currency.into(),
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LineItem {
    pub id: u32,
    pub code: String,
    pub description: String,
    pub unit_price: f64,
    pub quantity: f64,
    #[serde(default)]
    pub is_service: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    Percent,
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Discount {
    #[serde(default)]
    pub description: String,
    pub kind: DiscountKind,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Quote {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub meta: QuoteMeta,
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub discounts: Vec<Discount>,
    pub total: f64,
    pub saved_at: DateTime<Utc>,
}

// --- Catalogs ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Product {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub code: String,
    pub description: String,
    pub unit_price: f64,
    #[serde(default)]
    pub is_service: bool,
    #[serde(default)]
    pub sales_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn new(code: impl Into<String>, description: impl Into<String>, unit_price: f64) -> Self {
        Self {
            id: new_id(),
            code: code.into(),
            description: description.into(),
            unit_price,
            is_service: false,
            sales_count: 0,
            created_at: Some(Utc::now()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Vip,
    Standard,
    #[default]
    New,
}

impl ClientStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ClientStatus::Vip => "VIP",
            ClientStatus::Standard => "Standard",
            ClientStatus::New => "New",
        }
    }
}

impl FromStr for ClientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vip" => Ok(ClientStatus::Vip),
            "standard" => Ok(ClientStatus::Standard),
            "new" => Ok(ClientStatus::New),
            other => Err(format!(
                "unknown client status '{}' (expected vip, standard or new)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Client {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub status: ClientStatus,
    #[serde(default)]
    pub total_value: f64,
    #[serde(default)]
    pub quotes_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Client {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            email: String::new(),
            phone: String::new(),
            status: ClientStatus::New,
            total_value: 0.0,
            quotes_count: 0,
            created_at: Some(Utc::now()),
        }
    }
}

// --- Settings ---

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub vat: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub sound: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            sound: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BackupSettings {
    pub auto_backup: bool,
    /// Hours between automatic snapshots.
    pub interval: u32,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            auto_backup: true,
            interval: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Settings {
    pub default_currency: String,
    pub language: String,
    pub theme: String,
    #[serde(default)]
    pub company: CompanyProfile,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub backup: BackupSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_currency: "EUR".to_string(),
            language: "it".to_string(),
            theme: "light".to_string(),
            company: CompanyProfile::default(),
            notifications: NotificationSettings::default(),
            backup: BackupSettings::default(),
        }
    }
}
