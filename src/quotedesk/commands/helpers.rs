use super::{CmdMessage, CmdResult};
use crate::error::{QuoteDeskError, Result};
use crate::model::DocumentKind;
use crate::store::DocumentStore;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Shortest id prefix accepted in place of a full id.
const MIN_ID_PREFIX: usize = 4;

/// Read a document for display, falling back to `T::default()` when it is
/// missing.
///
/// A document that cannot be used (bad JSON, wrong shape, unreadable file)
/// also yields the default, with a warning attached to `result`. Commands that
/// write the document back must use [`load_for_update`] instead.
pub fn load_or_default<S, T>(store: &S, kind: DocumentKind, result: &mut CmdResult) -> Result<T>
where
    S: DocumentStore,
    T: DeserializeOwned + Default,
{
    match store.read(kind) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Ok(T::default()),
        Err(QuoteDeskError::CorruptData { path, source }) => {
            let problem = if source.is_data() {
                "does not match the expected shape"
            } else {
                "is not valid JSON"
            };
            warn!(path = %path.display(), error = %source, "unusable document, using defaults");
            result.add_message(CmdMessage::warning(format!(
                "{} {} ({}); showing defaults. Changes to it are refused until it is fixed or restored",
                path.display(),
                problem,
                source
            )));
            Ok(T::default())
        }
        Err(QuoteDeskError::Io(e)) => {
            let path = store.document_path(kind);
            warn!(path = %path.display(), error = %e, "unreadable document, using defaults");
            result.add_message(CmdMessage::warning(format!(
                "{} could not be read ({}); showing defaults",
                path.display(),
                e
            )));
            Ok(T::default())
        }
        Err(e) => Err(e),
    }
}

/// Read a document that is about to be modified and written back.
///
/// Only a missing document becomes the default. Anything unreadable is an
/// error, so a write never replaces content that could not be loaded.
pub fn load_for_update<S, T>(store: &S, kind: DocumentKind) -> Result<T>
where
    S: DocumentStore,
    T: DeserializeOwned + Default,
{
    Ok(store.read(kind)?.unwrap_or_default())
}

/// Position of the entity whose id equals `id`, or starts with it.
pub fn find_by_id<T>(items: &[T], id: &str, id_of: impl Fn(&T) -> &str, what: &str) -> Result<usize> {
    if let Some(pos) = items.iter().position(|item| id_of(item) == id) {
        return Ok(pos);
    }
    if id.len() >= MIN_ID_PREFIX {
        let matches: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| id_of(item).starts_with(id))
            .map(|(i, _)| i)
            .collect();
        match matches.as_slice() {
            [only] => return Ok(*only),
            [] => {}
            _ => {
                return Err(QuoteDeskError::Api(format!(
                    "{} id prefix '{}' is ambiguous",
                    what, id
                )))
            }
        }
    }
    Err(QuoteDeskError::NotFound(format!("{} {}", what, id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Settings;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn missing_document_yields_default_silently() {
        let store = InMemoryStore::new();
        let mut result = CmdResult::default();
        let settings: Settings = load_or_default(&store, DocumentKind::Settings, &mut result).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(result.messages.is_empty());
    }

    #[test]
    fn corrupt_document_yields_default_with_warning() {
        let store = InMemoryStore::new();
        store.insert_raw(DocumentKind::Quotes, "[{");
        let mut result = CmdResult::default();
        let quotes: Vec<serde_json::Value> =
            load_or_default(&store, DocumentKind::Quotes, &mut result).unwrap();
        assert!(quotes.is_empty());
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].level, crate::commands::MessageLevel::Warning);
    }

    #[test]
    fn wrong_shape_is_told_apart_from_bad_json() {
        let store = InMemoryStore::new();
        store.insert_raw(DocumentKind::Settings, r#"{"defaultCurrency": 7}"#);
        let mut result = CmdResult::default();
        let _: Settings = load_or_default(&store, DocumentKind::Settings, &mut result).unwrap();
        assert!(result.messages[0].content.contains("expected shape"));
    }

    #[test]
    fn update_load_refuses_unusable_document() {
        let store = InMemoryStore::new();
        let missing: Vec<serde_json::Value> = load_for_update(&store, DocumentKind::Quotes).unwrap();
        assert!(missing.is_empty());

        store.insert_raw(DocumentKind::Quotes, "[{");
        let corrupt: Result<Vec<serde_json::Value>> = load_for_update(&store, DocumentKind::Quotes);
        assert!(matches!(corrupt, Err(QuoteDeskError::CorruptData { .. })));
    }

    #[test]
    fn ids_match_exactly_or_by_unique_prefix() {
        let ids = vec!["abcd-1111".to_string(), "abcd-2222".to_string(), "ef".to_string()];
        fn id_of(s: &String) -> &str { s.as_str() }
        assert_eq!(find_by_id(&ids, "ef", id_of, "client").unwrap(), 2);
        assert_eq!(find_by_id(&ids, "abcd-2", id_of, "client").unwrap(), 1);
        assert!(matches!(
            find_by_id(&ids, "abcd", id_of, "client"),
            Err(QuoteDeskError::Api(_))
        ));
        assert!(matches!(
            find_by_id(&ids, "e", id_of, "client"),
            Err(QuoteDeskError::NotFound(_))
        ));
    }
}
