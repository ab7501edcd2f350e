//! Synchronous persistence operations over the redb store.
//!
//! Handlers call these inside `tokio::task::spawn_blocking`; redb
//! transactions are blocking and must stay off the async runtime.

use redb::{Database, ReadableTable};

use crate::db::tables;
use crate::error::{AppError, Result};
use crate::models::{UserRecord, WasteRecord};

/// Insert a new user, enforcing email uniqueness
///
/// Returns `Conflict` if the email is already registered. The user row and
/// the email index are written in one transaction.
pub fn insert_user(db: &Database, id: &str, record: &UserRecord) -> Result<()> {
    let write_txn = db.begin_write()?;
    {
        let mut by_email = write_txn.open_table(tables::USERS_BY_EMAIL)?;
        if by_email.get(record.email.as_str())?.is_some() {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }
        by_email.insert(record.email.as_str(), id)?;
        drop(by_email);

        let mut users = write_txn.open_table(tables::USERS)?;
        let bytes = bincode::serialize(record)?;
        users.insert(id, bytes.as_slice())?;
    }
    write_txn.commit()?;

    Ok(())
}

/// Look up a user by (lowercased) email
pub fn find_user_by_email(db: &Database, email: &str) -> Result<Option<(String, UserRecord)>> {
    let read_txn = db.begin_read()?;
    let by_email = read_txn.open_table(tables::USERS_BY_EMAIL)?;

    let id = match by_email.get(email)? {
        Some(guard) => guard.value().to_string(),
        None => return Ok(None),
    };

    let users = read_txn.open_table(tables::USERS)?;
    let record = users
        .get(id.as_str())?
        .map(|b| bincode::deserialize::<UserRecord>(b.value()))
        .transpose()?;

    Ok(record.map(|r| (id, r)))
}

/// Look up a user by id
pub fn get_user(db: &Database, id: &str) -> Result<Option<UserRecord>> {
    let read_txn = db.begin_read()?;
    let users = read_txn.open_table(tables::USERS)?;

    let record = users
        .get(id)?
        .map(|b| bincode::deserialize::<UserRecord>(b.value()))
        .transpose()?;

    Ok(record)
}

/// Insert a waste record and append it to the owner's index
///
/// Records are insert-only; nothing here updates or deletes.
pub fn insert_waste_record(db: &Database, record: &WasteRecord) -> Result<()> {
    let write_txn = db.begin_write()?;
    {
        let mut records = write_txn.open_table(tables::WASTE_RECORDS)?;
        let bytes = bincode::serialize(record)?;
        records.insert(record.id.as_str(), bytes.as_slice())?;
        drop(records);

        let mut user_waste = write_txn.open_table(tables::USER_WASTE)?;
        let mut ids: Vec<String> = user_waste
            .get(record.user_id.as_str())?
            .map(|b| bincode::deserialize(b.value()))
            .transpose()?
            .unwrap_or_default();
        ids.push(record.id.clone());
        let ids_bytes = bincode::serialize(&ids)?;
        user_waste.insert(record.user_id.as_str(), ids_bytes.as_slice())?;
    }
    write_txn.commit()?;

    Ok(())
}

/// Load all waste records owned by a user, newest first
pub fn records_for_user(db: &Database, user_id: &str) -> Result<Vec<WasteRecord>> {
    let read_txn = db.begin_read()?;
    let user_waste = read_txn.open_table(tables::USER_WASTE)?;

    let ids: Vec<String> = user_waste
        .get(user_id)?
        .map(|b| bincode::deserialize(b.value()))
        .transpose()?
        .unwrap_or_default();

    let records_table = read_txn.open_table(tables::WASTE_RECORDS)?;
    let mut records = Vec::with_capacity(ids.len());
    for id in &ids {
        if let Some(bytes) = records_table.get(id.as_str())? {
            records.push(bincode::deserialize::<WasteRecord>(bytes.value())?);
        }
    }

    // Stable sort keeps insertion order for same-second records
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(records)
}
