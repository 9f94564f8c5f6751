//! UtiliCraft Markdown command line
//!
//! Entry point for the binary. Handles CLI argument parsing, logging
//! initialization, and drives one editor session over a markdown file.

use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use utilicraft_markdown::config::Config;
use utilicraft_markdown::document::Document;
use utilicraft_markdown::error::ParserError;
use utilicraft_markdown::file_handler::{read_markdown, FileWatcher, WatchEvent, WatcherConfig};
use utilicraft_markdown::markdown::{load_parser, CmarkParser, DirectorySink, MarkdownParser};
use utilicraft_markdown::utils::path::is_markdown;
use utilicraft_markdown::theme::{
    JsonFileStore, MemoryStore, RootElement, ThemeState, ThemeSynchronizer, TopLevel,
};
use utilicraft_markdown::{MarkdownEditor, Message, Outcome};

/// Application name for logging
const APP_NAME: &str = "utilicraft-markdown";

/// Parsed command line flags
#[derive(Debug, Default)]
struct Flags {
    /// Markdown file to render
    file: Option<PathBuf>,

    /// Export directory; stdout when absent
    output_dir: Option<PathBuf>,

    /// Skip the primary parser
    force_fallback: bool,

    /// Include a table of contents in exports
    include_toc: bool,

    /// Re-render on every change of the file
    watch: bool,
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let flags = parse_args();
    let Some(file) = flags.file.clone() else {
        eprintln!("Error: no input file");
        eprintln!("Use --help for usage information");
        std::process::exit(1);
    };

    log::info!("Starting {} {}", APP_NAME, env!("CARGO_PKG_VERSION"));
    if !is_markdown(&file) {
        log::warn!("{} does not look like a markdown file", file.display());
    }

    let mut config = Config::load().unwrap_or_else(|e| {
        log::warn!("Using default configuration: {}", e);
        Config::default()
    });
    config.render.force_fallback |= flags.force_fallback;
    config.export.include_toc |= flags.include_toc;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let parser = runtime.block_on(load_parser(async {
        Ok::<Arc<dyn MarkdownParser>, ParserError>(Arc::new(CmarkParser::new()))
    }));

    let output_dir = flags.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let mut editor = MarkdownEditor::new(
        &config,
        parser,
        theme_synchronizer(&config),
        Box::new(DirectorySink::new(output_dir)),
    );

    let text = read_markdown(&file).with_context(|| format!("reading {}", file.display()))?;
    editor = editor.with_document(Document::from_file(file.clone(), &text));
    emit(&mut editor, &flags);

    if flags.watch {
        watch(&mut editor, &flags, file)?;
    }

    Ok(())
}

/// Initialize the logging system
fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,utilicraft_markdown=debug");
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();
}

/// Theme state for the session
///
/// Honors a saved preference but keeps every change in memory; a one-shot
/// render never writes to the data directory.
fn theme_synchronizer(config: &Config) -> ThemeSynchronizer {
    let saved = JsonFileStore::open_default()
        .and_then(|disk| MemoryStore::snapshot(&disk, &[config.theme.storage_key.as_str()]));
    let store = saved.unwrap_or_else(|e| {
        log::debug!("No saved theme preference: {}", e);
        MemoryStore::new()
    });

    ThemeSynchronizer::new(
        &config.theme,
        Box::new(store),
        Box::new(None::<ThemeState>),
        Box::new(TopLevel),
        Box::new(RootElement::new()),
    )
}

/// Print the preview or export it, depending on flags
fn emit(editor: &mut MarkdownEditor, flags: &Flags) {
    if flags.output_dir.is_none() {
        println!("{}", editor.preview().html());
        return;
    }

    match editor.update(Message::ExportHtml) {
        Outcome::Exported { path, .. } => println!("{}", path.display()),
        Outcome::Warning(warning) => eprintln!("Warning: {}", warning),
        _ => {}
    }
}

/// Re-render on every change until the file goes away
fn watch(editor: &mut MarkdownEditor, flags: &Flags, file: PathBuf) -> anyhow::Result<()> {
    let watcher = FileWatcher::new(&file, WatcherConfig::default())
        .with_context(|| format!("watching {}", file.display()))?;
    log::info!("Watching {} for changes", watcher.path().display());

    while let Some(event) = watcher.next_event() {
        match event {
            WatchEvent::Changed(path) => match read_markdown(&path) {
                Ok(text) => {
                    let outcome = editor.update(Message::Input(text));
                    log::debug!("Re-rendered {}: {:?}", path.display(), outcome);
                    emit(editor, flags);
                }
                Err(e) => log::warn!("Could not re-read {}: {}", path.display(), e),
            },
            WatchEvent::Removed(path) => {
                log::info!("{} was removed, stopping", path.display());
                break;
            }
            WatchEvent::Error(e) => log::error!("File watcher error: {}", e),
        }
    }

    Ok(())
}

/// Parse command line arguments
fn parse_args() -> Flags {
    let args: Vec<String> = std::env::args().collect();
    let mut flags = Flags::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-o" | "--output" => {
                if i + 1 < args.len() {
                    flags.output_dir = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --output requires a directory argument");
                    std::process::exit(1);
                }
            }
            "--fallback" => flags.force_fallback = true,
            "--toc" => flags.include_toc = true,
            "-w" | "--watch" => flags.watch = true,
            arg if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                eprintln!("Use --help for usage information");
                std::process::exit(1);
            }
            _ => {
                if flags.file.is_some() {
                    eprintln!("Error: only one input file is supported");
                    std::process::exit(1);
                }
                flags.file = Some(PathBuf::from(&args[i]));
            }
        }
        i += 1;
    }

    flags
}

/// Print help message
fn print_help() {
    println!(
        r#"UtiliCraft Markdown - render and export markdown

USAGE:
    utilicraft-markdown [OPTIONS] FILE

OPTIONS:
    -h, --help          Show this help message
    -v, --version       Show version information
    -o, --output DIR    Export a standalone HTML file into DIR
        --fallback      Use the built-in fallback renderer
        --toc           Include a table of contents in the export
    -w, --watch         Re-render whenever FILE changes

EXAMPLES:
    utilicraft-markdown notes.md                Print the rendered preview
    utilicraft-markdown -o out notes.md         Write out/notes.html
    utilicraft-markdown -w -o out notes.md      Re-export on every save
"#
    );
}

/// Print version information
fn print_version() {
    println!("{} {}", APP_NAME, env!("CARGO_PKG_VERSION"));
}
