use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use clap::{Parser, Subcommand};
use notemark::{Config, Dialect, notes};
use tracing_subscriber::EnvFilter;

/// Config picked up from the working directory when `--config` is not given
const DEFAULT_CONFIG_FILE: &str = "notemark.toml";

#[derive(Parser)]
#[command(name = "notemark", version)]
#[command(about = "Render Markdown study notes to HTML")]
struct Cli {
    /// Config file (defaults to ./notemark.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a Markdown file (or stdin) to HTML
    Render {
        /// Input Markdown file (reads stdin when omitted)
        input: Option<PathBuf>,

        /// Output HTML file (writes stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the configured dialect
        #[arg(long, value_enum)]
        dialect: Option<Dialect>,

        /// Wrap the fragment in a complete HTML page
        #[arg(long)]
        standalone: bool,

        /// Page title for --standalone (defaults to the input file name)
        #[arg(long, requires = "standalone")]
        title: Option<String>,
    },

    /// Print the blocks a Markdown file segments into
    Blocks {
        /// Input Markdown file (reads stdin when omitted)
        input: Option<PathBuf>,
    },

    /// Write one HTML page per note from a JSON notes export
    Notes {
        /// JSON export: an array of notes or an object with a "notes" array
        export: PathBuf,

        /// Directory to write pages into
        #[arg(short, long)]
        output: PathBuf,

        /// Only export notes for this subject id
        #[arg(long)]
        subject: Option<String>,
    },

    /// Print the default config file
    Config,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "notemark=debug" } else { "notemark=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Render {
            input,
            output,
            dialect,
            standalone,
            title,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(dialect) = dialect {
                config.render.dialect = dialect;
            }

            let markdown = read_input(input.as_deref())?;
            let mut html = notemark::render_with_config(markdown.as_str(), &config);
            if standalone {
                let title = title
                    .or_else(|| {
                        input
                            .as_deref()
                            .and_then(Path::file_stem)
                            .map(|stem| stem.to_string_lossy().into_owned())
                    })
                    .unwrap_or_else(|| "Notes".to_string());
                html = notemark::standalone_page(&title, &html);
            }

            match output {
                Some(path) => {
                    fs::write(&path, html)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Created {}", path.display());
                }
                None => println!("{}", html),
            }
        }

        Command::Blocks { input } => {
            let markdown = read_input(input.as_deref())?;
            for block in notemark::parse(&markdown) {
                println!("{:?}", block);
            }
        }

        Command::Notes {
            export,
            output,
            subject,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let all = notes::load_export(&export)?;
            let selected = notes::select(&all, subject.as_deref());
            let pages = notes::export_pages(&selected, &config);

            fs::create_dir_all(&output)
                .with_context(|| format!("failed to create {}", output.display()))?;
            for page in &pages {
                let path = output.join(&page.file_name);
                fs::write(&path, &page.html)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tracing::debug!(path = %path.display(), "wrote note page");
            }
            let index = output.join("index.html");
            fs::write(&index, notes::index_page(&pages))
                .with_context(|| format!("failed to write {}", index.display()))?;

            println!("Exported {} notes to {}", pages.len(), output.display());
        }

        Command::Config => print!("{}", Config::template()),
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => {
            ensure!(path.exists(), "config file {} not found", path.display());
            path
        }
        None => Path::new(DEFAULT_CONFIG_FILE),
    };
    Ok(Config::load(path)?)
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut markdown = String::new();
            io::stdin()
                .read_to_string(&mut markdown)
                .context("failed to read stdin")?;
            Ok(markdown)
        }
    }
}
