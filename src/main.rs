//! Styledown - Command Line Entry Point
//!
//! Renders markdown files through the styled render tree, checks that each
//! editable block reconstructs to its own source, and prints stylesheets.

use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use styledown::config::{
    get_config_file_path, load_config, load_stylesheet, save_config, startup_stylesheet, Settings,
    StockStylesheet,
};
use styledown::coordinator::EditSession;
use styledown::patch::source_range;
use styledown::render::{render_source, BlockContent, BlockIndex, RenderTree};
use styledown::{MarkdownDocument, Result, StyleSheet};

/// Application name constant.
const APP_NAME: &str = "Styledown";

/// Longest block summary printed by `render`, in characters.
const SUMMARY_WIDTH: usize = 60;

#[derive(Debug, Parser)]
#[command(name = "styledown", version, about = "Styled markdown rendering and round-trip checks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the render tree of a markdown file as an outline
    Render {
        file: PathBuf,
        /// Stylesheet JSON to render with instead of the configured one
        #[arg(long)]
        stylesheet: Option<PathBuf>,
        /// Use the stock dark mode stylesheet
        #[arg(long, conflicts_with = "stylesheet")]
        dark: bool,
    },
    /// Check that every editable block reconstructs to its source text
    Check { file: PathBuf },
    /// Print a stock stylesheet as JSON
    Stylesheet {
        #[arg(long)]
        dark: bool,
    },
    /// Show the saved settings, or change and save them
    Config {
        /// Stock stylesheet used when no custom one is set
        #[arg(long, value_enum)]
        sheet: Option<SheetChoice>,
        /// Quiet period before a source edit re-renders, in milliseconds
        #[arg(long)]
        debounce_ms: Option<u64>,
        /// Stylesheet JSON to load at start
        #[arg(long)]
        stylesheet_path: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SheetChoice {
    Default,
    Dark,
}

impl From<SheetChoice> for StockStylesheet {
    fn from(choice: SheetChoice) -> Self {
        match choice {
            SheetChoice::Default => StockStylesheet::Default,
            SheetChoice::Dark => StockStylesheet::DarkMode,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = load_config();
    info!("Starting {}", APP_NAME);

    match run(cli.command, &settings) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, settings: &Settings) -> Result<ExitCode> {
    match command {
        Command::Render {
            file,
            stylesheet,
            dark,
        } => {
            let sheet = match stylesheet {
                Some(path) => load_stylesheet(&path)?,
                None if dark => StyleSheet::dark_mode(),
                None => startup_stylesheet(settings),
            };
            let document = MarkdownDocument::open(&file)?;
            let tree = render_source(&document.source_text, &sheet, &settings.markdown, 1);
            print_outline(&tree, tree.roots(), 0);
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { file } => {
            let document = MarkdownDocument::open(&file)?;
            let sheet = startup_stylesheet(settings);
            let tree = render_source(&document.source_text, &sheet, &settings.markdown, 1);
            let mismatches = check_round_trip(&document.source_text, &tree);
            if mismatches == 0 {
                println!("{}: every block round-trips", document.display_name());
                Ok(ExitCode::SUCCESS)
            } else {
                println!("{}: {} block(s) differ", document.display_name(), mismatches);
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Stylesheet { dark } => {
            let sheet = if dark {
                StyleSheet::dark_mode()
            } else {
                StyleSheet::default_sheet()
            };
            println!("{}", sheet.to_json_pretty()?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Config {
            sheet,
            debounce_ms,
            stylesheet_path,
        } => {
            let changed = sheet.is_some() || debounce_ms.is_some() || stylesheet_path.is_some();
            let updated = apply_config_changes(settings, sheet, debounce_ms, stylesheet_path);
            if changed {
                save_config(&updated)?;
                println!("Saved to {}", get_config_file_path()?.display());
            }
            println!("{}", serde_json::to_string_pretty(&updated)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn apply_config_changes(
    settings: &Settings,
    sheet: Option<SheetChoice>,
    debounce_ms: Option<u64>,
    stylesheet_path: Option<PathBuf>,
) -> Settings {
    let mut updated = settings.clone();
    if let Some(sheet) = sheet {
        updated.stylesheet = sheet.into();
    }
    if let Some(ms) = debounce_ms {
        updated.rerender_debounce_ms = ms;
    }
    if stylesheet_path.is_some() {
        updated.stylesheet_path = stylesheet_path;
    }
    updated.sanitize();
    updated
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

fn print_outline(tree: &RenderTree, level: &[BlockIndex], depth: usize) {
    for block in level.iter().filter_map(|i| tree.get(*i)) {
        let summary = match &block.content {
            BlockContent::Inline(_) | BlockContent::Code { .. } => {
                summarize(&block.text().unwrap_or_default())
            }
            BlockContent::ListItem { marker, .. } => marker.clone(),
            BlockContent::Image { source, .. } => source.clone(),
            BlockContent::Table { header, rows } => {
                format!("{} columns, {} rows", header.len(), rows.len())
            }
            BlockContent::Children(_) | BlockContent::ThematicBreak => String::new(),
        };
        println!(
            "{}{} [{}] {}",
            "  ".repeat(depth),
            block.element_type,
            block.position,
            summary
        );
        print_outline(tree, block.children(), depth + 1);
    }
}

fn summarize(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > SUMMARY_WIDTH || text.contains('\n') {
        let cut: String = line.chars().take(SUMMARY_WIDTH).collect();
        format!("{:?}…", cut)
    } else {
        format!("{:?}", line)
    }
}

/// Rebuild each editable block and table cell and compare it with the
/// source it was rendered from. Returns the number of mismatches.
fn check_round_trip(source: &str, tree: &RenderTree) -> usize {
    let mut ids = Vec::new();
    for index in tree.preorder() {
        let Some(block) = tree.get(index) else {
            continue;
        };
        if block.is_editable() {
            ids.push((block.id.clone(), block.position));
        }
        if let BlockContent::Table { header, rows } = &block.content {
            for cell in header.iter().chain(rows.iter().flatten()) {
                ids.push((cell.id.clone(), cell.position));
            }
        }
    }

    let mut mismatches = 0;
    for (id, position) in ids {
        let Some(session) = EditSession::open(tree, &id, false) else {
            continue;
        };
        let original = source_range(source, &position).and_then(|r| source.get(r));
        let rebuilt = session.markdown();
        if original == Some(rebuilt.as_str()) {
            println!("ok      {} [{}]", session.element_type, position);
        } else {
            warn!("{} does not round-trip", id);
            println!("differs {} [{}]", session.element_type, position);
            println!("  source: {:?}", original.unwrap_or_default());
            println!("  markup: {:?}", rebuilt);
            mismatches += 1;
        }
    }
    mismatches
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_changes_are_sanitized() {
        let updated = apply_config_changes(
            &Settings::default(),
            Some(SheetChoice::Dark),
            Some(60_000),
            None,
        );
        assert_eq!(updated.stylesheet, StockStylesheet::DarkMode);
        assert_eq!(updated.rerender_debounce_ms, Settings::MAX_DEBOUNCE_MS);
        assert_eq!(updated.stylesheet_path, None);
    }

    #[test]
    fn test_config_without_changes_keeps_settings() {
        let settings = Settings {
            rerender_debounce_ms: 50,
            ..Settings::default()
        };
        assert_eq!(apply_config_changes(&settings, None, None, None), settings);
    }

    #[test]
    fn test_cli_parses_config_flags() {
        let cli = Cli::parse_from(["styledown", "config", "--sheet", "dark", "--debounce-ms", "120"]);
        assert!(matches!(
            cli.command,
            Command::Config {
                sheet: Some(SheetChoice::Dark),
                debounce_ms: Some(120),
                stylesheet_path: None,
            }
        ));
    }
}
