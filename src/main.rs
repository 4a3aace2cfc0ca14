// src/main.rs
use anyhow::{bail, Context, Result};
use clap::Parser;
use colorful::Colorful;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use threatcheckr::cli::{self, Args, Command, OutputFormat};
use threatcheckr::config::{DomainPreset, DomainSettings};
use threatcheckr::core::{Artifact, DomainConfig};
use threatcheckr::detection::{DetectionReport, Domain};
use threatcheckr::history::{ReportSink, ScanLedger};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff"];

/// One thing to scan, as named on the command line
enum Target {
    Url(String),
    Path(PathBuf),
}

impl Target {
    fn label(&self) -> String {
        match self {
            Target::Url(url) => url.clone(),
            Target::Path(path) => path.display().to_string(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level().to_string()))
        .init();

    let domain = match &args.command {
        Command::Presets => {
            cli::print_presets();
            return Ok(());
        }
        Command::DumpConfig { domain } => {
            let settings = DomainSettings::from_preset(DomainPreset::for_domain((*domain).into()));
            println!("{}", settings.to_json()?);
            return Ok(());
        }
        command => match command.domain() {
            Some(domain) => domain,
            None => return Ok(()),
        },
    };

    let config = load_config(domain, &args)?;
    log::info!("using '{}' configuration", config.name());

    let targets = collect_targets(&args.command)?;
    if targets.is_empty() {
        println!("{}", "Nothing to analyze!".red());
        return Ok(());
    }

    let progress = if args.format == OutputFormat::Text && targets.len() > 1 {
        println!("Found {} item(s)\n", targets.len());
        let bar = ProgressBar::new(targets.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")?.progress_chars("=> "),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let results: Vec<(String, Result<DetectionReport>)> = targets
        .par_iter()
        .progress_with(progress.clone())
        .map(|target| (target.label(), scan(target, domain, &config)))
        .collect();
    progress.finish_and_clear();

    let mut ledger = ScanLedger::new();
    let mut reports = Vec::new();
    let mut failures = 0;

    for (label, result) in results {
        match result {
            Ok(report) => {
                ledger.record(&report);
                if args.format == OutputFormat::Text {
                    println!("{}", cli::format_report(&report, args.show_signals));
                }
                reports.push(report);
            }
            Err(err) => {
                failures += 1;
                eprintln!("{} {}: {:#}", "✗".red(), label, err);
            }
        }
    }

    match args.format {
        OutputFormat::Json if reports.len() == 1 => println!("{}", cli::format_json(&reports[0])?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Text if reports.len() + failures > 1 => {
            println!("{}", cli::format_summary(&reports, failures))
        }
        OutputFormat::Text => {}
    }

    log::info!(
        "{} report(s), average confidence {:.1}%",
        ledger.total(),
        ledger.average_confidence()
    );

    Ok(())
}

/// `--config`, else `<config dir>/threatcheckr/<domain>.json` when present,
/// else the built-in preset
fn load_config(domain: Domain, args: &Args) -> Result<DomainConfig> {
    let path = args.config.clone().or_else(|| {
        dirs::config_dir()
            .map(|dir| dir.join("threatcheckr").join(format!("{}.json", domain.name())))
            .filter(|path| path.is_file())
    });

    let mut settings = match &path {
        Some(path) => {
            log::debug!("loading settings from {}", path.display());
            DomainSettings::from_json_file(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?
        }
        None => DomainSettings::from_preset(DomainPreset::for_domain(domain)),
    };

    if settings.domain != domain {
        bail!(
            "configuration is for the {} domain, but {} was requested",
            settings.domain.name(),
            domain.name()
        );
    }
    if args.sequential {
        settings.parallel = false;
    }

    DomainConfig::from_settings(settings, None).context("invalid configuration")
}

fn collect_targets(command: &Command) -> Result<Vec<Target>> {
    match command {
        Command::Url { urls } => Ok(urls.iter().cloned().map(Target::Url).collect()),
        Command::Image { paths } => collect_files(paths, Some(IMAGE_EXTENSIONS)),
        Command::File { paths } => collect_files(paths, None),
        Command::Presets | Command::DumpConfig { .. } => Ok(Vec::new()),
    }
}

fn collect_files(paths: &[PathBuf], extensions: Option<&[&str]>) -> Result<Vec<Target>> {
    let mut files = Vec::new();
    let wanted = |path: &Path| match extensions {
        Some(extensions) => path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| extensions.contains(&ext.to_lowercase().as_str())),
        None => true,
    };

    for path in paths {
        if path.is_file() {
            // explicitly named files are always analyzed
            files.push(Target::Path(path.clone()));
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                if wanted(entry.path()) {
                    files.push(Target::Path(entry.path().to_path_buf()));
                }
            }
        } else {
            bail!("{} does not exist", path.display());
        }
    }

    Ok(files)
}

fn scan(target: &Target, domain: Domain, config: &DomainConfig) -> Result<DetectionReport> {
    let artifact = match target {
        Target::Url(url) => Artifact::url(url.as_str()),
        Target::Path(path) => {
            let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            match domain {
                Domain::Image => Artifact::image(bytes, filename),
                Domain::File | Domain::Url => Artifact::file(bytes, filename),
            }
        }
    };

    Ok(config.detect(&artifact)?)
}
