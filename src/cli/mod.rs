// src/cli/mod.rs
//
// Command-line interface module

mod args;
mod output;

pub use args::{print_presets, Args, Command, DomainArg, OutputFormat};
pub use output::{format_json, format_report, format_summary};
