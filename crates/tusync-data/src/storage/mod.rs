//! PostgreSQL 저장 계층.

pub mod db;
pub mod ledger;
pub mod roster;
pub mod upsert;

pub use db::{connect, run_migrations};
pub use ledger::{SyncLedger, SyncRecord, SyncStatus};
pub use upsert::{batch_upsert, replace_members};
