//! Mustachio CLI
//!
//! Usage:
//!   mustachio [OPTIONS] <TEMPLATE>
//!
//! Options:
//!   -c, --context <FILE>   Context data file, `-` for stdin
//!   -p, --partial <FILE>   Partial template, registered under its file stem
//!   -f, --format <FORMAT>  Context format: json, yaml or toml
//!   --config <FILE>        Engine configuration (TOML format)
//!   -h, --help             Print help

use std::collections::HashMap;
use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mustachio::{DataFormat, EngineConfig, Library, LibraryError, Template, Value};

#[derive(Parser)]
#[command(name = "mustachio")]
#[command(about = "Render Mustache templates")]
struct Cli {
    /// Template file to render
    template: PathBuf,

    /// Context data file, `-` for stdin (reads stdin if not provided)
    #[arg(short, long)]
    context: Option<PathBuf>,

    /// Partial template files, registered under their file stem
    #[arg(short, long = "partial")]
    partials: Vec<PathBuf>,

    /// Engine configuration file (TOML format)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Context data format (guessed from the file extension if not provided)
    #[arg(short, long, value_enum)]
    format: Option<DataFormat>,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mustachio=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match EngineConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let mut library = match Library::with_config(&config) {
        Ok(library) => library,
        Err(e) => {
            eprintln!("Error in config: {}", e);
            std::process::exit(1);
        }
    };

    for path in &cli.partials {
        if let Err(e) = library.register_file(path) {
            report_library_error(path, &e);
            std::process::exit(1);
        }
    }

    let source = match fs::read_to_string(&cli.template) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", cli.template.display(), e);
            std::process::exit(1);
        }
    };
    let template = match Template::with_content_types(&source, library.content_types()) {
        Ok(template) => template,
        Err(e) => {
            eprint!("{}", e.format(&source, &cli.template.display().to_string()));
            std::process::exit(1);
        }
    };

    // The template can include itself, e.g. to render recursive data
    if let Some(stem) = cli.template.file_stem() {
        library.register(stem.to_string_lossy(), template.clone());
    }

    let data = match load_context(cli.context.as_deref(), cli.format) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Error loading context: {}", e);
            std::process::exit(1);
        }
    };

    let output = template.render_with(&data, &library);
    let mut stdout = io::stdout().lock();
    if let Err(e) = stdout.write_all(output.as_bytes()).and_then(|()| stdout.flush()) {
        eprintln!("Error writing output: {}", e);
        std::process::exit(1);
    }
}

fn report_library_error(path: &Path, error: &LibraryError) {
    match error {
        LibraryError::Parse { source: err, .. } => match fs::read_to_string(path) {
            Ok(source) => eprint!("{}", err.format(&source, &path.display().to_string())),
            Err(_) => eprintln!("Error: {}", error),
        },
        LibraryError::Io { .. } => eprintln!("Error: {}", error),
    }
}

/// Read the context from `path`, or stdin when it is `-` or absent
fn load_context(path: Option<&Path>, format: Option<DataFormat>) -> Result<Value, mustachio::DataError> {
    let text = match path {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)?,
        None if io::stdin().is_terminal() => return Ok(Value::Map(HashMap::new())),
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let format = format
        .or_else(|| path.and_then(DataFormat::from_path))
        .unwrap_or(DataFormat::Yaml);

    if text.trim().is_empty() {
        return Ok(Value::Map(HashMap::new()));
    }
    Value::from_str_as(&text, format)
}
