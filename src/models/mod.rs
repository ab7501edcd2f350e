pub mod user;
pub mod waste;

pub use user::{User, UserRecord};
pub use waste::{BinColor, InputType, Source, WasteRecord, WasteRecordResponse, WasteType};
