//! CLI argument parsing

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{DomainPreset, DomainSettings};
use crate::detection::Domain;

#[derive(Parser, Debug)]
#[command(name = "threatcheckr", version)]
#[command(about = "Explainable threat scoring for images, URLs and files")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Domain settings JSON, replacing the built-in preset
    #[arg(long, env = "THREATCHECKR_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Run analyzers one after another instead of in parallel
    #[arg(long, global = true)]
    pub sequential: bool,

    /// Print every signal, not only the notable ones
    #[arg(long, global = true)]
    pub show_signals: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Check images for manipulation or synthetic generation
    Image {
        /// Image files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Check URLs for phishing
    Url {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Check files for ransomware encryption
    File {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List built-in presets and exit
    Presets,
    /// Print a preset's settings as JSON, as a starting point for --config
    DumpConfig {
        #[arg(value_enum)]
        domain: DomainArg,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainArg {
    Image,
    Url,
    File,
}

impl From<DomainArg> for Domain {
    fn from(arg: DomainArg) -> Self {
        match arg {
            DomainArg::Image => Domain::Image,
            DomainArg::Url => Domain::Url,
            DomainArg::File => Domain::File,
        }
    }
}

impl Command {
    /// Domain scanned by this command, if it scans at all
    pub fn domain(&self) -> Option<Domain> {
        match self {
            Command::Image { .. } => Some(Domain::Image),
            Command::Url { .. } => Some(Domain::Url),
            Command::File { .. } => Some(Domain::File),
            Command::Presets | Command::DumpConfig { .. } => None,
        }
    }
}

impl Args {
    /// `log` filter matching the verbosity flags
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

/// Print available presets
pub fn print_presets() {
    println!("Available domain presets:\n");

    for preset in DomainPreset::all() {
        let settings = DomainSettings::from_preset(preset);
        println!("  {} - {}", preset.name(), preset.description());
        let weights: Vec<_> = settings
            .weights
            .iter()
            .map(|e| format!("{}:{:.2}", e.analyzer.name(), e.weight))
            .collect();
        println!("    Weights: {}", weights.join(", "));
        let bands: Vec<_> = settings
            .thresholds
            .iter()
            .map(|b| format!("{:.2}", b.lower))
            .collect();
        println!("    Band boundaries: {}", bands.join(" / "));
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_command() {
        let args = Args::try_parse_from(["threatcheckr", "url", "example.com", "--format", "json"]).unwrap();
        assert_eq!(args.format, OutputFormat::Json);
        assert!(matches!(&args.command, Command::Url { urls } if urls == &["example.com"]));
        assert_eq!(args.command.domain(), Some(Domain::Url));
    }

    #[test]
    fn test_verbosity() {
        let args = Args::try_parse_from(["threatcheckr", "-vv", "file", "a.bin"]).unwrap();
        assert_eq!(args.log_level(), log::LevelFilter::Debug);
        assert!(!args.sequential);
    }

    #[test]
    fn test_paths_required() {
        assert!(Args::try_parse_from(["threatcheckr", "image"]).is_err());
    }

    #[test]
    fn test_dump_config() {
        let args = Args::try_parse_from(["threatcheckr", "dump-config", "file"]).unwrap();
        assert!(matches!(args.command, Command::DumpConfig { domain: DomainArg::File }));
        assert_eq!(args.command.domain(), None);
    }
}
