//! Sift CLI - Turn a project directory into a single LLM prompt document.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use serde::Serialize;
use sift::builder::{Sift, Summary};
use sift::config::Config;
use sift::errors::{exit_code, SiftError};
use sift::logging::init_tracing;
use sift::output::{write_document, OutputError};
use sift::tree::{format_number, render_tree};

#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Turn a project directory into a single LLM prompt document")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble the prompt document, write it and report its token count
    Generate {
        /// Root directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output file (overwritten)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the document to stdout instead of a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,

        /// Model profile for token counting
        #[arg(long)]
        model: Option<String>,

        /// Config file (defaults to .sift.toml in the root)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print a JSON summary
        #[arg(long)]
        json: bool,
    },

    /// Display the directory structure
    Tree {
        /// Root directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Config file (defaults to .sift.toml in the root)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output line records as JSON
        #[arg(long)]
        json: bool,
    },

    /// List relevant files with their classification
    Files {
        /// Root directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Config file (defaults to .sift.toml in the root)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Count tokens of the assembled document without writing it
    Tokens {
        /// Root directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Model profile for token counting
        #[arg(long)]
        model: Option<String>,

        /// Config file (defaults to .sift.toml in the root)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let json_output = json_flag(&cli.command);

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("warning: logging disabled: {e}");
    }

    let result = match cli.command {
        Commands::Generate {
            path,
            output,
            stdout,
            model,
            config,
            json,
        } => run_generate(path, output, stdout, model, config, json),
        Commands::Tree { path, config, json } => run_tree(path, config, json),
        Commands::Files { path, config, json } => run_files(path, config, json),
        Commands::Tokens {
            path,
            model,
            config,
            json,
        } => run_tokens(path, model, config, json),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "sift", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        if json_output {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
            }

            let payload = ErrorOutput {
                error: e.to_string(),
            };

            let json = serde_json::to_string(&payload)
                .unwrap_or_else(|_| "{\"error\":\"serialization failed\"}".to_string());
            eprintln!("{json}");
        } else {
            eprintln!("error: {}", e);
        }
        std::process::exit(exit_code(&e));
    }
}

fn json_flag(cmd: &Commands) -> bool {
    match cmd {
        Commands::Generate { json, .. } => *json,
        Commands::Tree { json, .. } => *json,
        Commands::Files { json, .. } => *json,
        Commands::Tokens { json, .. } => *json,
        Commands::Completions { .. } => false,
    }
}

/// Explicit `--config` wins; otherwise look for `.sift.toml` in the root.
fn load_config(root: &Path, explicit: Option<&Path>) -> Result<Config, SiftError> {
    match explicit {
        Some(path) => Ok(Config::load(path)?),
        None => Ok(Config::discover(root)),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), SiftError> {
    let json = serde_json::to_string_pretty(value).map_err(OutputError::from)?;
    println!("{json}");
    Ok(())
}

// --- Generate command ---

fn run_generate(
    path: PathBuf,
    output: Option<PathBuf>,
    stdout: bool,
    model: Option<String>,
    config: Option<PathBuf>,
    json: bool,
) -> Result<(), SiftError> {
    let config = load_config(&path, config.as_deref())?;
    let model = model.unwrap_or_else(|| config.model().to_string());

    let output = output.unwrap_or_else(|| config.output_path());
    let mut rules = config.filter_rules();
    if !stdout {
        rules = rules.exclude_file(&output);
    }

    let result = Sift::new(&path).rules(rules).model(model).build()?;

    if stdout {
        let mut out = std::io::stdout().lock();
        out.write_all(result.document.as_bytes())?;
        out.flush()?;
        eprintln!("Token Count: {}", result.token_count);
        return Ok(());
    }

    write_document(&output, &result.document)?;

    if json {
        #[derive(Serialize)]
        struct Output {
            output: String,
            #[serde(flatten)]
            summary: Summary,
        }

        print_json(&Output {
            output: output.display().to_string(),
            summary: result.summary(),
        })?;
    } else {
        println!("Token Count: {}", result.token_count);
        println!("Project information saved to '{}'.", output.display());
    }

    Ok(())
}

// --- Tree command ---

fn run_tree(path: PathBuf, config: Option<PathBuf>, json: bool) -> Result<(), SiftError> {
    let config = load_config(&path, config.as_deref())?;
    let tree = Sift::new(&path).rules(config.filter_rules()).tree()?;

    if json {
        print_json(&tree)?;
    } else {
        print!("{}", render_tree(&tree));
    }

    Ok(())
}

// --- Files command ---

fn run_files(path: PathBuf, config: Option<PathBuf>, json: bool) -> Result<(), SiftError> {
    let config = load_config(&path, config.as_deref())?;
    let files = Sift::new(&path).rules(config.filter_rules()).files()?;

    if json {
        #[derive(Serialize)]
        struct FileInfo {
            path: String,
            depth: usize,
            classification: sift::Classification,
        }

        #[derive(Serialize)]
        struct Output {
            files: Vec<FileInfo>,
        }

        let files = files
            .into_iter()
            .map(|f| FileInfo {
                path: f.relative.display().to_string(),
                depth: f.depth,
                classification: f.classification,
            })
            .collect();

        print_json(&Output { files })?;
    } else {
        let stdout = std::io::stdout();
        let mut out = std::io::BufWriter::new(stdout.lock());
        for file in &files {
            writeln!(out, "{:<12} {}", file.classification, file.relative.display())?;
        }
        out.flush()?;
    }

    Ok(())
}

// --- Tokens command ---

fn run_tokens(
    path: PathBuf,
    model: Option<String>,
    config: Option<PathBuf>,
    json: bool,
) -> Result<(), SiftError> {
    let config = load_config(&path, config.as_deref())?;
    let model = model.unwrap_or_else(|| config.model().to_string());

    let rules = config.filter_rules().exclude_file(&config.output_path());
    let result = Sift::new(&path).rules(rules).model(model).build()?;

    let sections = result.section_tokens();

    if json {
        #[derive(Serialize)]
        struct Output {
            #[serde(flatten)]
            summary: Summary,
            sections: Vec<SectionInfo>,
        }

        #[derive(Serialize)]
        struct SectionInfo {
            name: String,
            tokens: usize,
        }

        print_json(&Output {
            summary: result.summary(),
            sections: sections
                .into_iter()
                .map(|(name, tokens)| SectionInfo { name, tokens })
                .collect(),
        })?;
    } else {
        let stdout = std::io::stdout();
        let mut out = std::io::BufWriter::new(stdout.lock());
        for (name, tokens) in &sections {
            writeln!(out, "{}: {} tokens", name, format_number(*tokens))?;
        }
        writeln!(
            out,
            "Total: {} tokens ({}, {})",
            format_number(result.token_count),
            result.model,
            result.encoding
        )?;
        out.flush()?;
    }

    Ok(())
}
