//! Database schema definitions
//!
//! Constants for table and column names used with rusqlite. The tables
//! themselves are created by the SQL files under `migrations/`.

/// Profiles table schema
pub mod profiles {
    /// Table name
    pub const TABLE: &str = "profiles";
    /// Primary key column; its order is the candidate pool fetch order
    pub const ID: &str = "id";
    /// Wallet address (identity key) column
    pub const WALLET_ADDRESS: &str = "wallet_address";
    /// Gender column, used by the pool filter
    pub const GENDER: &str = "gender";
    /// Age column, used by the pool filter
    pub const AGE: &str = "age";
    /// Soft-deactivation flag column
    pub const IS_ACTIVE: &str = "is_active";
    /// Creation timestamp column
    pub const CREATED_AT: &str = "created_at";
    /// Last activity timestamp column
    pub const LAST_ACTIVE: &str = "last_active";
    /// Full profile as a JSON document
    pub const DOCUMENT: &str = "document";
}

/// Match interactions table schema
pub mod match_interactions {
    /// Table name
    pub const TABLE: &str = "match_interactions";
    /// Primary key column
    pub const ID: &str = "id";
    /// Sender wallet address column
    pub const SENDER: &str = "sender";
    /// Recipient wallet address column
    pub const RECIPIENT: &str = "recipient";
    /// Interaction type column (message, view_profile)
    pub const INTERACTION_TYPE: &str = "interaction_type";
    /// Message medium column (text, audio, video)
    pub const MESSAGE_KIND: &str = "message_kind";
    /// Inline message content column
    pub const CONTENT: &str = "content";
    /// Message media URL column
    pub const URL: &str = "url";
    /// Event timestamp column
    pub const CREATED_AT: &str = "created_at";
}
