use redb::TableDefinition;

/// Users table: user_id (UUID string) -> UserRecord (serialized)
pub const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Email index: lowercased email -> user_id
/// Enforces email uniqueness at registration time.
pub const USERS_BY_EMAIL: TableDefinition<&str, &str> = TableDefinition::new("users_by_email");

/// Waste records table: record_id (UUID string) -> WasteRecord (serialized)
pub const WASTE_RECORDS: TableDefinition<&str, &[u8]> = TableDefinition::new("waste_records");

/// Per-user record index: user_id -> Vec<record_id>
/// Used for history pagination and dashboard aggregation.
pub const USER_WASTE: TableDefinition<&str, &[u8]> = TableDefinition::new("user_waste");
