/// Suggestion returned when an item is not covered by the rule table
pub const DEFAULT_SUGGESTION: &str = "Dispose according to local waste guidelines";

/// Confidence reported for rule-table hits (rule-based results are treated as certain)
pub const RULE_CONFIDENCE: u8 = 100;

/// Confidence assumed when the AI reply omits the field or it is non-numeric
pub const AI_DEFAULT_CONFIDENCE: u8 = 70;

/// Generic item names the AI adapter refuses to accept
/// The model is instructed to name the specific item; these indicate it did not.
pub const BANNED_ITEM_NAMES: [&str; 3] = ["item", "object", "waste"];

/// Minimum plausible size of a synthesized audio payload (bytes)
/// Anything smaller is an error page or truncated response, not MP3 audio.
pub const MIN_AUDIO_BYTES: usize = 1000;

/// Prefix and extension of generated audio artifacts
pub const AUDIO_FILE_PREFIX: &str = "tts_";
pub const AUDIO_FILE_EXT: &str = ".mp3";

/// Maximum accepted image upload size (5MB)
pub const MAX_UPLOAD_SIZE_BYTES: usize = 5_242_880;

/// Default page size for waste history, and the hard cap a client may request
pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const MAX_HISTORY_LIMIT: usize = 100;

// =============================================================================
// Error Messages
// =============================================================================

/// Error message for an empty or whitespace-only item name
pub const ERR_EMPTY_ITEM_NAME: &str = "Item name cannot be empty";

/// Error message for missing registration/login fields
pub const ERR_MISSING_FIELDS: &str = "Required fields are missing";

/// Error message returned for bad login credentials
/// Deliberately identical for unknown email and wrong password.
pub const ERR_BAD_CREDENTIALS: &str = "Email or password is wrong";

/// Error message for requests without a usable bearer token
pub const ERR_ACCESS_DENIED: &str = "Access denied";
