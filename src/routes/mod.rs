pub mod auth;
pub mod dashboard;
pub mod health;
pub mod waste;

pub use auth::{login_user, me, register_user};
pub use dashboard::{dashboard_analytics, dashboard_summary};
pub use health::health_check;
pub use waste::{classify_image, classify_text, create_waste, waste_history};

use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

/// Build the uniform `{success, data, message}` success envelope
pub fn envelope<T: Serialize>(data: T, message: &str) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": data,
        "message": message,
    }))
}
