/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Main executable for xrd-rs

use clap::Parser;
use env_logger::Env;
use std::io;
use xrd_rs::cli::{self, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG takes precedence over --verbose
    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    log::info!("xrd-rs v{}", xrd_rs::VERSION);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli::run(&cli, &mut out)?;

    Ok(())
}
