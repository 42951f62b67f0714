//! Strongly-typed migration name wrapper.

use crate::newtype_string::define_validated_string;

fn is_valid_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

define_validated_string! {
    /// Identifier segment of a migration file name (`create_users` in
    /// `2024-03-01-09-30-ab12c_create_users.sql`).
    ///
    /// Used both for display and as the key for compiled-in migration code.
    pub struct MigrationName;
    check = is_valid_name;
    error = InvalidMigrationName;
}
