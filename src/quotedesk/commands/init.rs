use super::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{DocumentKind, Settings};
use crate::store::DocumentStore;

/// Create the data root and write default settings if there are none yet.
/// Existing documents are never touched.
pub fn run<S: DocumentStore>(store: &S) -> Result<CmdResult> {
    store.ensure_directories()?;
    let mut result = CmdResult::default();

    let settings_path = store.document_path(DocumentKind::Settings);
    let root = settings_path
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    // Unreadable settings count as present: init must not overwrite them.
    let existing = store.read::<serde_json::Value>(DocumentKind::Settings);
    if matches!(existing, Ok(None)) {
        store.write(DocumentKind::Settings, &Settings::default())?;
        result.add_message(CmdMessage::info("Wrote default settings"));
    }

    result.add_message(CmdMessage::success(format!("Initialized quotedesk data at {}", root)));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn writes_default_settings_once() {
        let store = InMemoryStore::new();
        run(&store).unwrap();
        let settings: Settings = store.read(DocumentKind::Settings).unwrap().unwrap();
        assert_eq!(settings, Settings::default());

        let again = run(&store).unwrap();
        assert_eq!(again.messages.len(), 1);
        assert!(store.rolling_backup(DocumentKind::Settings).is_none());
    }

    #[test]
    fn leaves_corrupt_settings_alone() {
        let store = InMemoryStore::new();
        store.insert_raw(DocumentKind::Settings, "{broken");
        run(&store).unwrap();
        assert_eq!(store.raw(DocumentKind::Settings).unwrap(), "{broken");
    }
}
