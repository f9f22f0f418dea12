use super::helpers::{load_for_update, load_or_default};
use super::{CmdMessage, CmdResult};
use crate::error::{QuoteDeskError, Result};
use crate::model::{DocumentKind, Settings};
use crate::store::DocumentStore;
use crate::validation::validate_settings;

pub const KEYS: [&str; 12] = [
    "default-currency",
    "language",
    "theme",
    "company.name",
    "company.address",
    "company.vat",
    "company.phone",
    "company.email",
    "notifications.enabled",
    "notifications.sound",
    "backup.auto",
    "backup.interval",
];

pub fn show<S: DocumentStore>(store: &S) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let settings: Settings = load_or_default(store, DocumentKind::Settings, &mut result)?;
    Ok(result.with_settings(settings))
}

pub fn get(settings: &Settings, key: &str) -> Option<String> {
    let value = match key {
        "default-currency" => settings.default_currency.clone(),
        "language" => settings.language.clone(),
        "theme" => settings.theme.clone(),
        "company.name" => settings.company.name.clone(),
        "company.address" => settings.company.address.clone(),
        "company.vat" => settings.company.vat.clone(),
        "company.phone" => settings.company.phone.clone(),
        "company.email" => settings.company.email.clone(),
        "notifications.enabled" => settings.notifications.enabled.to_string(),
        "notifications.sound" => settings.notifications.sound.to_string(),
        "backup.auto" => settings.backup.auto_backup.to_string(),
        "backup.interval" => settings.backup.interval.to_string(),
        _ => return None,
    };
    Some(value)
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(QuoteDeskError::Api(format!("{} expects true or false, got '{}'", key, value))),
    }
}

fn apply(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    let text = value.trim().to_string();
    match key {
        "default-currency" => settings.default_currency = text.to_uppercase(),
        "language" => settings.language = text,
        "theme" => settings.theme = text,
        "company.name" => settings.company.name = text,
        "company.address" => settings.company.address = text,
        "company.vat" => settings.company.vat = text,
        "company.phone" => settings.company.phone = text,
        "company.email" => settings.company.email = text,
        "notifications.enabled" => settings.notifications.enabled = parse_bool(key, value)?,
        "notifications.sound" => settings.notifications.sound = parse_bool(key, value)?,
        "backup.auto" => settings.backup.auto_backup = parse_bool(key, value)?,
        "backup.interval" => {
            settings.backup.interval = text.parse().map_err(|_| {
                QuoteDeskError::Api(format!("backup.interval expects whole hours, got '{}'", value))
            })?
        }
        other => {
            return Err(QuoteDeskError::Api(format!(
                "Unknown settings key: {} (known: {})",
                other,
                KEYS.join(", ")
            )))
        }
    }
    Ok(())
}

pub fn set<S: DocumentStore>(store: &S, key: &str, value: &str) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut settings: Settings = load_for_update(store, DocumentKind::Settings)?;
    apply(&mut settings, key, value)?;
    validate_settings(&settings)?;
    store.write(DocumentKind::Settings, &settings)?;

    let shown = get(&settings, key).unwrap_or_else(|| value.to_string());
    result.add_message(CmdMessage::success(format!("{} set to {}", key, shown)));
    Ok(result.with_settings(settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn show_on_fresh_store_is_default() {
        let store = InMemoryStore::new();
        assert_eq!(show(&store).unwrap().settings, Some(Settings::default()));
    }

    #[test]
    fn set_persists_and_normalizes_currency() {
        let store = InMemoryStore::new();
        set(&store, "default-currency", "usd").unwrap();
        set(&store, "backup.auto", "off").unwrap();

        let settings = show(&store).unwrap().settings.unwrap();
        assert_eq!(settings.default_currency, "USD");
        assert!(!settings.backup.auto_backup);
        assert_eq!(settings.language, "it");
    }

    #[test]
    fn invalid_values_are_not_saved() {
        let store = InMemoryStore::new();
        assert!(set(&store, "backup.interval", "0").is_err());
        assert!(set(&store, "backup.interval", "daily").is_err());
        assert!(set(&store, "company.email", "not-an-email").is_err());
        assert!(set(&store, "default-currency", "euro").is_err());
        assert!(set(&store, "font", "serif").is_err());
        assert!(store.raw(DocumentKind::Settings).is_none());
    }

    #[test]
    fn every_key_can_be_read() {
        let settings = Settings::default();
        for key in KEYS {
            assert!(get(&settings, key).is_some(), "missing getter for {}", key);
        }
    }
}
