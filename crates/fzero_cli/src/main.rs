use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser};
use fzero_core::core_api::{Engine, Session};
use fzero_core::layout::SRAM_SIZE;
use fzero_core::save::DecodeOptions;
use fzero_render::{
    JsonRenderOptions, TextRenderOptions, render_json_with_options, render_text_with_options,
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const STDIN_PATH: &str = "-";
/// Exit status after a user interrupt.
const EXIT_INTERRUPTED: i32 = 2;

/// F-Zero SRAM save viewer and merger
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// SRAM save file to read. `-` reads standard input
    #[arg(value_name = "INPUT_FILE", default_value = STDIN_PATH)]
    input: PathBuf,
    /// More log output (-v info, -vv debug). RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
    /// Fail on league checksum mismatches instead of warning
    #[arg(long)]
    strict: bool,
    /// Also list blank record slots
    #[arg(long = "show-hidden")]
    show_hidden: bool,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
    /// Merge the best records and unlocks of another save into the input
    #[arg(long = "merge", value_name = "FILE")]
    merge: Vec<PathBuf>,
    /// Write the resulting 2048-byte image to FILE
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    if let Err(e) = ctrlc::set_handler(|| {
        error!("Aborting");
        process::exit(EXIT_INTERRUPTED);
    }) {
        warn!("Could not install interrupt handler: {e}");
    }
    debug!("{cli:?}");

    let engine = Engine::with_options(DecodeOptions {
        strict_checksums: cli.strict,
    });

    let mut session = open_session(&engine, &cli.input);
    if !cli.merge.is_empty() {
        let others: Vec<Session> = cli
            .merge
            .iter()
            .map(|path| open_session(&engine, path))
            .collect();
        let refs: Vec<&Session> = others.iter().collect();
        session.merge_from(&refs);
        info!("Merged {} save(s) into {}", others.len(), display_path(&cli.input));
    }

    if let Some(out_path) = cli.output.as_ref() {
        fs::write(out_path, session.to_bytes()).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", out_path.display());
            process::exit(1);
        });
    }

    if cli.json {
        let json = render_json_with_options(
            &session,
            JsonRenderOptions {
                show_hidden: cli.show_hidden,
            },
        );
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        println!("{rendered}");
        return;
    }

    if let Some(out_path) = cli.output.as_ref() {
        println!("Wrote save to {}", out_path.display());
        return;
    }

    print!(
        "{}",
        render_text_with_options(
            &session,
            TextRenderOptions {
                show_hidden: cli.show_hidden,
            },
        )
    );
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn open_session(engine: &Engine, path: &Path) -> Session {
    let bytes = read_image(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", display_path(path));
        process::exit(1);
    });
    debug!("Read {} bytes from {}", bytes.len(), display_path(path));

    engine.open_bytes(bytes).unwrap_or_else(|e| {
        eprintln!("Error parsing save file: {}", display_path(path));
        eprintln!("  {e}");
        process::exit(1);
    })
}

fn read_image(path: &Path) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(SRAM_SIZE);
    if path.as_os_str() == STDIN_PATH {
        io::stdin()
            .lock()
            .take(SRAM_SIZE as u64)
            .read_to_end(&mut bytes)?;
    } else {
        File::open(path)?
            .take(SRAM_SIZE as u64)
            .read_to_end(&mut bytes)?;
    }
    Ok(bytes)
}

fn display_path(path: &Path) -> String {
    if path.as_os_str() == STDIN_PATH {
        "<stdin>".to_string()
    } else {
        path.display().to_string()
    }
}
