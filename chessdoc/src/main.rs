//! chessdoc: render FEN positions and annotated PGN games from the terminal.
//!
//! `chessdoc fen <FILE>` prints the board of one position. `chessdoc pgn
//! <FILE>` prints one game of a PGN text, as plain text or as the JSON
//! render tree, and can replay navigation commands against it. `-` reads
//! standard input.
//!
//! Defaults come from the `CHESSDOC_*` environment variables (see
//! [`viewer::config`]); command-line flags override them.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use chess::pgn::{parse_game_with_options, PgnError};
use chess::FenError;
use viewer::{
    render_fen, render_game, BoardView, GameView, NavigationCommand, Navigator, RenderConfig,
    SymbolSet,
};

mod input;
mod text;

use input::Source;

#[derive(Parser)]
#[command(name = "chessdoc", about = "Render chess positions and annotated games")]
struct Cli {
    #[command(flatten)]
    render: RenderArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Diagram and notation options shared by every subcommand.
#[derive(Args)]
struct RenderArgs {
    /// Diagram square size in pixels, clamped to 12..=64.
    #[arg(long, global = true)]
    square_size: Option<u32>,

    /// Show rank and file labels around diagrams.
    #[arg(long, global = true)]
    coordinates: bool,

    /// Draw diagrams from Black's side.
    #[arg(long, global = true)]
    flip: bool,

    /// Piece symbols: `native`, `figurines` or six letters such as `(KDTLSB)`.
    #[arg(long, global = true)]
    symbols: Option<SymbolSet>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the diagram of a FEN position.
    Fen {
        /// File holding the FEN text, or `-` for standard input.
        input: PathBuf,

        /// Print the diagram as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print a game from a PGN text.
    Pgn {
        /// File holding the PGN text, or `-` for standard input.
        input: PathBuf,

        /// Zero-based index of the game to show.
        #[arg(long, default_value_t = 0)]
        game: usize,

        /// Leave the result out of the move text.
        #[arg(long)]
        hide_result: bool,

        /// Print the render tree as JSON.
        #[arg(long)]
        json: bool,

        /// Comma-separated navigation commands to replay, e.g.
        /// `select=1,next,next,prev,deselect`.
        #[arg(long)]
        navigate: Option<String>,
    },
}

/// One replayed navigation command.
#[derive(Serialize)]
struct NavigationStep {
    command: String,
    changed: bool,
    selected: Option<String>,
    board: Option<BoardView>,
}

#[derive(Serialize)]
struct PgnOutput<'a> {
    game: &'a GameView,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    navigation: Vec<NavigationStep>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = RenderConfig::from_env();
    apply_render_args(&mut config, &cli.render);

    match cli.command {
        Commands::Fen { input, json } => {
            let source = Source::from(input);
            let text = source.read()?;
            let board = render_fen(text.trim(), &config.board_options())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&board)?);
            } else {
                print!("{}", board.to_text());
            }
        }
        Commands::Pgn {
            input,
            game,
            hide_result,
            json,
            navigate,
        } => {
            config.game = game;
            config.hide_result |= hide_result;

            let source = Source::from(input);
            let text = source.read()?;
            let document = parse_game_with_options(&text, config.game, config.parser_options())?
                .with_context(|| format!("{} has no game with index {}", source, config.game))?;
            tracing::info!(
                source = %source,
                game = config.game,
                plies = document.tree.ply_count(),
                "rendering game"
            );

            let view = render_game(&document, &config);
            let navigation = match &navigate {
                Some(commands) => replay(&view, &config, commands)?,
                None => Vec::new(),
            };

            if json {
                let output = PgnOutput {
                    game: &view,
                    navigation,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print!("{}", text::game_to_text(&view));
                for step in &navigation {
                    println!("> {}: {}", step.command, step.selected.as_deref().unwrap_or("-"));
                    if let Some(board) = &step.board {
                        print!("{}", board.to_text());
                    }
                }
            }
        }
    }

    Ok(())
}

fn apply_render_args(config: &mut RenderConfig, args: &RenderArgs) {
    if let Some(size) = args.square_size {
        config.square_size = size;
        config.navigation_square_size = size;
    }
    if args.coordinates {
        config.show_coordinates = true;
        config.navigation_coordinates = true;
    }
    config.flip |= args.flip;
    if let Some(symbols) = args.symbols {
        config.symbols = symbols;
    }
}

/// Replay `commands` against a fresh navigator for `view`.
fn replay(
    view: &GameView,
    config: &RenderConfig,
    commands: &str,
) -> anyhow::Result<Vec<NavigationStep>> {
    let mut navigator = Navigator::for_game(view, config.navigation_board_options());
    let mut steps = Vec::new();

    for raw in commands.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let command = NavigationCommand::parse(raw, &view.move_list)?;
        let changed = navigator.apply(command);
        let selected = navigator
            .selected()
            .and_then(|node| view.move_list.get(node))
            .map(|entry| entry.label.clone());
        steps.push(NavigationStep {
            command: raw.to_string(),
            changed,
            selected,
            board: navigator.surface().board.clone(),
        });
    }

    Ok(steps)
}

/// Print `err` to stderr, with the full diagnostic for parse failures.
fn report(err: &anyhow::Error) {
    if let Some(pgn) = err.downcast_ref::<PgnError>() {
        eprintln!("error: {}", pgn.kind);
        eprintln!("  game:   {}", pgn.document);
        eprintln!("  offset: {}", pgn.offset);
        eprintln!("  near:   {}", pgn.excerpt);
    } else if let Some(fen) = err.downcast_ref::<FenError>() {
        eprintln!("error: invalid FEN: {}", fen.kind);
        eprintln!("  offset: {}", fen.offset);
    } else {
        eprintln!("error: {:#}", err);
    }
}
