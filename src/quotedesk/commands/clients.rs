use super::helpers::{find_by_id, load_for_update, load_or_default};
use super::{CmdMessage, CmdResult};
use crate::error::{QuoteDeskError, Result};
use crate::model::{Client, ClientStatus, DocumentKind};
use crate::store::DocumentStore;
use crate::validation::validate_client;

#[derive(Debug, Clone, Default)]
pub struct ClientInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: ClientStatus,
}

/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default)]
pub struct ClientUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<ClientStatus>,
}

pub fn list<S: DocumentStore>(store: &S) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let clients: Vec<Client> = load_or_default(store, DocumentKind::Clients, &mut result)?;
    Ok(result.with_clients(clients))
}

pub fn add<S: DocumentStore>(store: &S, input: ClientInput) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut clients: Vec<Client> = load_for_update(store, DocumentKind::Clients)?;

    let name = input.name.trim().to_string();
    if clients.iter().any(|c| c.name.eq_ignore_ascii_case(&name)) {
        return Err(QuoteDeskError::Api(format!("A client named '{}' already exists", name)));
    }

    let mut client = Client::new(name);
    client.email = input.email.trim().to_string();
    client.phone = input.phone.trim().to_string();
    client.status = input.status;
    validate_client(&client)?;

    clients.push(client.clone());
    store.write(DocumentKind::Clients, &clients)?;

    result.add_message(CmdMessage::success(format!("Client added: {}", client.name)));
    Ok(result.with_clients(vec![client]))
}

pub fn update<S: DocumentStore>(store: &S, id: &str, update: ClientUpdate) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut clients: Vec<Client> = load_for_update(store, DocumentKind::Clients)?;
    let pos = find_by_id(&clients, id, |c| c.id.as_str(), "client")?;

    if let Some(name) = &update.name {
        let name = name.trim();
        let taken = clients
            .iter()
            .enumerate()
            .any(|(i, c)| i != pos && c.name.eq_ignore_ascii_case(name));
        if taken {
            return Err(QuoteDeskError::Api(format!("A client named '{}' already exists", name)));
        }
    }

    let client = &mut clients[pos];
    if let Some(name) = update.name {
        client.name = name.trim().to_string();
    }
    if let Some(email) = update.email {
        client.email = email.trim().to_string();
    }
    if let Some(phone) = update.phone {
        client.phone = phone.trim().to_string();
    }
    if let Some(status) = update.status {
        client.status = status;
    }
    validate_client(client)?;
    let updated = client.clone();

    store.write(DocumentKind::Clients, &clients)?;
    result.add_message(CmdMessage::success(format!("Client updated: {}", updated.name)));
    Ok(result.with_clients(vec![updated]))
}

pub fn remove<S: DocumentStore>(store: &S, id: &str) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut clients: Vec<Client> = load_for_update(store, DocumentKind::Clients)?;
    let pos = find_by_id(&clients, id, |c| c.id.as_str(), "client")?;

    let removed = clients.remove(pos);
    store.write(DocumentKind::Clients, &clients)?;
    result.add_message(CmdMessage::success(format!("Client removed: {}", removed.name)));
    Ok(result.with_clients(vec![removed]))
}
