#![deny(missing_debug_implementations, unused_must_use)]
#![warn(missing_copy_implementations)]

use c8core::key::NUMBER_OF_KEYS;
use c8int::{Chip8Interpreter, TerminalBell};
use clap::Parser;
use log::{info, LevelFilter};
use miette::IntoDiagnostic;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::str::FromStr;

#[derive(Parser, Debug)]
struct Args {
    rom_path: String,
    #[arg(short = 't', long = "ticks", default_value_t = 1000)]
    ticks: u64,
    /// Hex digit of a key held down for the whole run. May be repeated.
    #[arg(short = 'k', long = "keys", value_parser = parse_key)]
    keys: Vec<u8>,
    #[arg(long = "seed")]
    seed: Option<u64>,
    #[arg(long = "log", value_parser = <LevelFilter as FromStr>::from_str, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

fn parse_key(s: &str) -> Result<u8, String> {
    u8::from_str_radix(s, 16)
        .ok()
        .filter(|&key| key < NUMBER_OF_KEYS)
        .ok_or_else(|| format!("`{}` is not a key between 0 and F", s))
}

fn main() -> miette::Result<()> {
    let Args {
        rom_path,
        ticks,
        keys,
        seed,
        log_level,
    } = Args::parse();

    TermLogger::init(
        log_level,
        ConfigBuilder::new()
            .add_filter_allow_str("c8core")
            .add_filter_allow_str("c8int")
            .build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .into_diagnostic()?;

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .context_lines(1)
                .build(),
        )
    }))
    .into_diagnostic()?;

    let mut int = Chip8Interpreter::new_from_file(&rom_path, seed)?
        .holding(keys)
        .with_buzzer(TerminalBell::stdout());
    let summary = int.run(ticks)?;
    info!(
        "Ran {} ticks: {} frames drawn, {} beeps{}.",
        summary.ticks,
        summary.frames,
        summary.beeps,
        if summary.stalled { ", stalled on a key wait" } else { "" }
    );

    print!("{}", int.display());
    Ok(())
}
