//! ec-core - Core library for Echelon
//!
//! This crate provides the value types shared by every Echelon component:
//! migration versions and names, run direction, project configuration, and
//! the core error type.

pub mod config;
pub mod direction;
pub mod error;
pub mod migration_name;
mod newtype_string;
pub mod version;

pub use config::{Config, DatabaseConfig, DbType};
pub use direction::Direction;
pub use error::{CoreError, CoreResult};
pub use migration_name::MigrationName;
pub use version::Version;
