//! # Quotedesk Architecture
//!
//! Quotedesk keeps the data of a small quoting business (clients, products,
//! quotes, settings) as plain JSON documents in one directory, with a rolling
//! `.backup` of every document and timestamped snapshots of all of them.
//!
//! It is a library with a CLI client, not the other way round.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Returns structured Result types                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Catalogs, quotes, settings, snapshots, dashboard         │
//! │  - Turns missing/corrupt documents into defaults + warnings │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/, backup.rs)                          │
//! │  - DocumentStore trait: FileStore, InMemoryStore            │
//! │  - Snapshots: copy every document into backups/<timestamp>/ │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes Rust arguments and returns
//! `Result<CmdResult>`. It never prints and never exits. Diagnostics go
//! through `tracing`; the binary decides where they end up (see [`logging`]).
//!
//! ## Testing
//!
//! Command logic is tested against [`store::memory::InMemoryStore`]. The file
//! store, snapshots and the watch loop are tested against temp directories.
//! The binary has integration tests under `tests/`.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic for each command
//! - [`store`]: Document storage abstraction and implementations
//! - [`backup`]: Snapshot create/list/prune/archive/restore
//! - [`schedule`]: When snapshots are due; the blocking watch loop
//! - [`validation`]: Typed checks for documents entering from outside
//! - [`model`]: Entity types and [`model::DocumentKind`]
//! - [`quote`]: Quote totals and amount formatting
//! - [`assistant`]: Keyword-matched canned answers
//! - [`config`]: Application configuration and data root resolution
//! - [`paths`]: File locations under the data root
//! - [`logging`]: `tracing` subscriber setup
//! - [`error`]: Error types
//! - `cli`: Argument parsing and printing for the binary (not part of the lib API)

pub mod api;
pub mod assistant;
pub mod backup;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod paths;
pub mod quote;
pub mod schedule;
pub mod store;
pub mod validation;
