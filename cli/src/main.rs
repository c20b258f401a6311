use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use sweep_core::{GameConfig, GameSession};

use crate::command::Command;

mod command;
mod render;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Board width in cells
    #[arg(long, default_value_t = 16)]
    width: u16,

    /// Board height in cells
    #[arg(long, default_value_t = 16)]
    height: u16,

    /// Number of mines, clamped to fit the board
    #[arg(short, long, default_value_t = 32)]
    mines: u32,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print the final grid as JSON when quitting
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.verbose.tracing_level_filter())
        .with_writer(io::stderr)
        .init();

    let config = GameConfig::clamped((args.width, args.height), args.mines);
    if config.size() != (args.width, args.height) || config.mines() != args.mines {
        log::warn!(
            "Requested {}x{} with {} mines, playing {}x{} with {} mines",
            args.width,
            args.height,
            args.mines,
            config.width(),
            config.height(),
            config.mines()
        );
    }
    let seed = args.seed.unwrap_or_else(rand::random);
    log::debug!("seed: {seed}");

    let mut session = GameSession::seeded(config, seed).context("Could not start game")?;
    let mut stdout = io::stdout().lock();
    render::draw(&mut stdout, &session)?;

    for line in io::stdin().lock().lines() {
        let line = line.context("Could not read command")?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                writeln!(stdout, "{err:#}")?;
                continue;
            }
        };
        log::debug!("command: {command:?}");

        match command {
            Command::Reveal(coords) => {
                if !session.on_reveal(coords).has_update() {
                    writeln!(stdout, "Nothing to reveal at {coords:?}")?;
                }
            }
            Command::Flag(coords) => {
                if !session.on_flag(coords).has_update() {
                    writeln!(stdout, "Cannot flag {coords:?}")?;
                }
            }
            Command::NewGame => session.restart().context("Could not start new game")?,
            Command::Quit => break,
        }
        render::draw(&mut stdout, &session)?;
    }

    if args.json {
        serde_json::to_writer_pretty(&mut stdout, session.grid())
            .context("Could not write grid as JSON")?;
        writeln!(stdout)?;
    }
    Ok(())
}
