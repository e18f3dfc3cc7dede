//! wflint core library.
//!
//! Static linter for GitHub Actions workflow files. A fixed set of naming,
//! pinning and action-hygiene rules is applied to each workflow, and the
//! findings are reduced to a severity for CI exit codes.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `discover`: Expansion of inputs into workflow files.
//! - `checks`: The rule battery applied to one workflow document.
//! - `reference`: Parsing and classification of `uses:` references.
//! - `registry`: Existence and latest-commit lookups for actions.
//! - `lint`: Runner, severity aggregation and exit codes.
//! - `models`: Findings, reports and the workflow schema.
//! - `output`: Human/JSON printers.
//! - `utils`: Supporting helpers.
pub mod checks;
pub mod cli;
pub mod config;
pub mod discover;
pub mod lint;
pub mod models;
pub mod output;
pub mod reference;
pub mod registry;
pub mod utils;
