//! Whole-document load and save, the front end's basic contract.
//!
//! `load` never fails for a missing, corrupt or unreadable file; it answers with the
//! document's default. `save` validates first and reports whether the bytes
//! reached the disk.

use super::helpers::load_or_default;
use super::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{DocumentKind, Settings};
use crate::store::DocumentStore;
use crate::validation::{parse_document, DocumentPayload};
use serde_json::{Map, Value};
use tracing::error;

pub fn load<S: DocumentStore>(store: &S, kind: DocumentKind) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let document = if kind.is_list() {
        Value::Array(load_or_default::<_, Vec<Value>>(store, kind, &mut result)?)
    } else if kind == DocumentKind::Settings {
        let settings: Settings = load_or_default(store, kind, &mut result)?;
        serde_json::to_value(settings)?
    } else {
        Value::Object(load_or_default::<_, Map<String, Value>>(store, kind, &mut result)?)
    };
    result.document = Some(document);
    Ok(result)
}

/// Validate `raw` as a `kind` document and replace the stored one with it.
///
/// Invalid input is an error. A failed write is not: it comes back as
/// `saved == Some(false)` with an error message.
pub fn save<S: DocumentStore>(store: &S, kind: DocumentKind, raw: &str) -> Result<CmdResult> {
    let payload = parse_document(kind, raw)?;
    let written = match &payload {
        DocumentPayload::Quotes(quotes) => store.write(kind, quotes),
        DocumentPayload::Products(products) => store.write(kind, products),
        DocumentPayload::Clients(clients) => store.write(kind, clients),
        DocumentPayload::Settings(settings) => store.write(kind, settings),
        DocumentPayload::Analytics(map) => store.write(kind, map),
    };

    let mut result = CmdResult::default();
    match written {
        Ok(()) => {
            result.saved = Some(true);
            result.add_message(CmdMessage::success(format!(
                "Saved {}",
                store.document_path(kind).display()
            )));
        }
        Err(e) => {
            error!(document = %kind, error = %e, "save failed");
            result.saved = Some(false);
            result.add_message(CmdMessage::error(format!("Could not save {}: {}", kind, e)));
        }
    }
    Ok(result)
}
