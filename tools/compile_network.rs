// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Network Compilation Tool

Compiles every projection of the gesture recognition network described by
`spikeconv.toml` and prints a per-layer summary. With `--output`, writes all
projection descriptors and population grid sizes as JSON for the simulation
runtime.

Usage:
  cargo run --bin compile_network -- [--config spikeconv.toml] [--templates templates.json] [--output network.json]
*/

use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use spikeconv::config::{
    apply_cli_overrides, apply_environment_overrides, load_config, ConfigError, SpikeconvConfig,
};
use spikeconv::connectivity::{JsonTemplateStore, TemplateStore};
use spikeconv::network::{build_network, CompiledNetwork};
use spikeconv::observability::{init_console_logging, parse_debug_flags};

/// Compile the connectivity of a convolutional spiking gesture network
#[derive(Parser, Debug)]
#[command(name = "compile_network", version, author, long_about = None)]
struct Args {
    /// Configuration file (default: search for spikeconv.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Template JSON file; overrides recognition.template_file
    #[arg(short, long)]
    templates: Option<PathBuf>,

    /// Write projection descriptors to this JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum rows per descriptor (0 = unbounded); overrides export.chunk_size
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Enable debug logging for a crate ("all" for every crate); repeatable
    #[arg(long = "debug", value_name = "CRATE")]
    debug: Vec<String>,

    /// Write logs into a timestamped run folder under this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn load(args: &Args) -> Result<SpikeconvConfig> {
    let mut cli = HashMap::new();
    if let Some(path) = &args.templates {
        cli.insert("template_file".to_string(), path.display().to_string());
    }
    if let Some(chunk_size) = args.chunk_size {
        cli.insert("chunk_size".to_string(), chunk_size.to_string());
    }

    match load_config(args.config.as_deref(), Some(&cli)) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) if args.config.is_none() => {
            let mut config = SpikeconvConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, &cli);
            Ok(config)
        }
        Err(e) => Err(e).context("Failed to load configuration"),
    }
}

fn print_summary(network: &CompiledNetwork) {
    println!(
        "{:<18} {:<22} {:>9} {:>12} {:>12}",
        "pre", "post", "grid", "excitatory", "inhibitory"
    );
    for projection in &network.projections {
        let connections = &projection.connectivity.connections;
        println!(
            "{:<18} {:<22} {:>9} {:>12} {:>12}",
            projection.pre,
            projection.post,
            projection.connectivity.output.to_string(),
            connections.excitatory().len(),
            connections.inhibitory().len()
        );
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load(&args)?;

    let mut debug_flags = parse_debug_flags(&args.debug);
    if config.system.debug {
        debug_flags.enable_all();
    }

    #[cfg(feature = "file-logging")]
    let _log_guard = match &args.log_dir {
        Some(dir) => Some(spikeconv::observability::init_logging(
            &debug_flags,
            &config.system.log_level,
            dir,
            spikeconv::observability::Retention::default(),
        )?),
        None => {
            init_console_logging(&debug_flags, &config.system.log_level)?;
            None
        }
    };
    #[cfg(not(feature = "file-logging"))]
    {
        if args.log_dir.is_some() {
            eprintln!("Warning: built without the file-logging feature; --log-dir ignored");
        }
        init_console_logging(&debug_flags, &config.system.log_level)?;
    }

    println!("spikeconv network compiler v{}", spikeconv::connectivity::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let store = match &config.recognition.template_file {
        Some(path) => Some(
            JsonTemplateStore::open(path)
                .with_context(|| format!("Failed to open templates: {}", path.display()))?,
        ),
        None => {
            info!(target: "spikeconv::network", "No template file configured; skipping recognition layers");
            None
        }
    };

    let network = build_network(
        &config,
        store.as_ref().map(|s| s as &dyn TemplateStore),
    )
    .context("Failed to compile network")?;

    print_summary(&network);
    println!();
    println!(
        "{} projections, {} connections",
        network.projections.len(),
        network.total_connections()
    );

    if let Some(path) = &args.output {
        let descriptors = network.descriptors(config.export.delay, config.export.chunk_size);
        let count = descriptors.len();
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let document = serde_json::json!({
            "version": spikeconv::connectivity::VERSION,
            "delay": config.export.delay,
            "populations": network.populations(),
            "projections": descriptors,
        });
        serde_json::to_writer_pretty(BufWriter::new(file), &document)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {} descriptors to {}", count, path.display());
    }

    Ok(())
}
