//! # OrionDB
//!
//! A single-table, disk-backed storage engine with:
//! - Fixed-layout rows persisted in fixed-size pages
//! - A B-tree page organization with O(log N) insert and lookup
//! - Ordered full-table scans over linked leaves
//! - Durability across process restarts (full-page writes, flush on close)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Shell / Statement                        │
//! │            (line parsing, meta-commands — thin glue)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Insert(Row) / Select
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Table (Tree)                            │
//! │        (find leaf, sorted insert, splits, root at 0)         │
//! └──────────┬─────────────────────────────────┬────────────────┘
//!            │                                 │
//!            ▼                                 ▼
//!     ┌─────────────┐                   ┌─────────────┐
//!     │ Node Layout │                   │   Cursor    │
//!     │ (page bytes)│                   │  (Scan)     │
//!     └──────┬──────┘                   └──────┬──────┘
//!            │                                 │
//!            └──────────────┬──────────────────┘
//!                           ▼
//!                    ┌─────────────┐
//!                    │    Pager    │
//!                    │ (page cache │
//!                    │  + file)    │
//!                    └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod row;
pub mod pager;
pub mod btree;
pub mod statement;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use btree::{Scan, Table};
pub use config::{Config, FlushStrategy};
pub use error::{OrionError, Result};
pub use row::Row;
pub use statement::Statement;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of OrionDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
