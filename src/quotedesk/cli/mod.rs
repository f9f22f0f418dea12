//! # CLI Layer
//!
//! One client of the quotedesk library. It is the only place that parses
//! arguments, writes to stdout/stderr and decides exit codes.
//!
//! - `setup`: clap definitions and the small value parsers for items and discounts
//! - `commands`: builds the [`AppContext`](commands) and dispatches to `QuoteDeskApi`
//! - `print`: turns `CmdResult` contents into terminal text
//!
//! Tests here cover argument parsing and rendering. Business rules are tested
//! in the command layer; the binary end to end under `tests/`.

mod commands;
mod print;
mod setup;

pub use commands::run;
