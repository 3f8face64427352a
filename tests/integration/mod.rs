//! Integration tests for the Storyloom story pipeline

mod analyzer_flow;
mod branching_flow;
mod cli_run;
mod config_loading;
mod export_files;
mod gateway_backoff;
mod refinement_loop;
mod test_utils;

pub use test_utils::*;
