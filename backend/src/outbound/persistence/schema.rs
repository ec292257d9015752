//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name (3 to 32 characters).
        display_name -> Varchar,
        /// One of `student`, `teacher`, `parent`, `admin`.
        role -> Varchar,
        /// Issued code, either `<n><letters>` or `ERR-<millis>`.
        registration_code -> Varchar,
        /// Registration timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Single-row counter backing the sequence allocator.
    registration_sequence (id) {
        /// Always `1`.
        id -> Int2,
        /// Ordinal handed out most recently.
        last_ordinal -> Int8,
    }
}
