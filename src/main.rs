//! Blockout
//!
//! Command-line front end for the 3D stacking puzzle core. Plays a seeded
//! autoplay game headless, lists the shape catalog, or replays a game in an
//! interactive 3D viewer.

mod demo;
mod visualization;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::prelude::*;

use blockout::geometry::orientations;
use blockout::grid::format_grid;
use blockout::pieces::format_piece;
use blockout::{Piece, PieceSet, Size3};
use demo::DemoConfig;

/// Plays and inspects a 3D falling-block puzzle.
#[derive(Parser)]
#[command(name = "blockout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    game: GameArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug)]
struct GameArgs {
    /// Well width.
    #[arg(long, global = true, default_value_t = 5)]
    size_x: usize,

    /// Well depth.
    #[arg(long, global = true, default_value_t = 5)]
    size_y: usize,

    /// Well height (falling axis).
    #[arg(long, global = true, default_value_t = 10)]
    size_z: usize,

    /// Piece set to draw from.
    #[arg(long, global = true, value_enum, default_value_t = SetArg::Basic)]
    set: SetArg,

    /// Seed for the piece sequence.
    #[arg(long, global = true, default_value_t = 1)]
    seed: u32,

    /// Maximum number of pieces to play.
    #[arg(long, global = true, default_value_t = 200)]
    pieces: usize,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SetArg {
    Basic,
    Flat,
    Extended,
}

impl From<SetArg> for PieceSet {
    fn from(set: SetArg) -> Self {
        match set {
            SetArg::Basic => PieceSet::Basic,
            SetArg::Flat => PieceSet::Flat,
            SetArg::Extended => PieceSet::Extended,
        }
    }
}

impl GameArgs {
    fn demo_config(&self) -> DemoConfig {
        DemoConfig {
            size: Size3::new(self.size_x, self.size_y, self.size_z),
            set: self.set.into(),
            seed: self.seed,
            pieces: self.pieces,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Play an autoplay game without graphics and print the final well.
    Play,
    /// List every shape of the selected set.
    Shapes,
    /// Replay an autoplay game in an interactive 3D viewer.
    Display,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::filter::LevelFilter::from_level(level))
        .init();
    info!("Logging initialized at level: {}", level);

    let config = cli.game.demo_config();
    match cli.command {
        Some(Command::Play) => run_play(&config),
        Some(Command::Shapes) => {
            run_shapes(config.set);
            Ok(())
        }
        Some(Command::Display) | None => run_display(&config),
    }
}

/// Plays a game headless and prints the settled well.
fn run_play(config: &DemoConfig) -> Result<()> {
    let (board, stats) = demo::run(config, |_, _| {})?;

    print!("{}", format_grid(board.grid(), board.top()));
    println!(
        "{} pieces placed, {} planes removed{}",
        stats.pieces_placed,
        stats.planes_removed,
        if stats.game_over { ", game over" } else { "" }
    );
    Ok(())
}

/// Prints each shape of a set with its distinct orientation count.
fn run_shapes(set: PieceSet) {
    for index in 0..set.piece_count() {
        let piece = Piece::build(set, index);
        println!(
            "{:?} {} (shape {}, {} cubes, {} orientations):",
            set,
            index,
            piece.shape(),
            piece.cube_count(),
            orientations(&piece).len()
        );
        println!("{}", format_piece(&piece));
    }
}

/// Plays a game, keeping a snapshot per piece, and opens the viewer.
fn run_display(config: &DemoConfig) -> Result<()> {
    let snapshots = demo::run_with_snapshots(config)?;
    println!("Recorded {} snapshots", snapshots.len());
    println!("Controls: Left/Right navigate, Up/Down spread planes, R reset");
    visualization::display(snapshots);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_describe_minimum_well() {
        let cli = Cli::parse_from(["blockout", "play"]);
        let config = cli.game.demo_config();
        assert_eq!(config.size, blockout::MINIMUM_SIZE);
        assert_eq!(config.set, PieceSet::Basic);
        assert!(matches!(cli.command, Some(Command::Play)));
    }

    #[test]
    fn test_global_game_args_after_subcommand() {
        let cli = Cli::parse_from(["blockout", "shapes", "--set", "extended", "--size-z", "14"]);
        let config = cli.game.demo_config();
        assert_eq!(config.set, PieceSet::Extended);
        assert_eq!(config.size.z, 14);
    }
}
