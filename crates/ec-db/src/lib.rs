//! ec-db - Execution gateway for Echelon
//!
//! This crate provides the [`Gateway`] trait migrations and the version
//! ledger execute SQL through, the per-engine [`EngineAdapter`] seam beneath
//! it, a memoizing registry of named databases, and the DuckDB adapter.

pub mod duckdb;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod registry;
pub mod value;

pub use duckdb::DuckDbAdapter;
pub use engine::EngineAdapter;
pub use error::{DbError, DbResult};
pub use gateway::{Executor, Gateway};
pub use registry::{AdapterFactory, ConfigAdapterFactory, Databases};
pub use value::{Row, Value};
