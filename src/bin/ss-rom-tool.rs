//! Sensible Soccer ROM team-data tool
//!
//! A command-line interface for decoding, validating and updating the
//! team-data section of a Mega Drive cartridge image.
//!
//! ## Commands
//!
//! - `decode` — dump a ROM's team data as JSON
//! - `validate` — check a candidate JSON document against a ROM's structure
//! - `update` — re-embed an edited JSON document into a ROM

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use ss_rom_teams::{decode, update, validate, RomError, TeamsDoc};

/// Sensible Soccer ROM team-data tool
#[derive(Parser)]
#[command(name = "ss-rom-tool")]
#[command(about = "Reader/writer for Sensible Soccer-style ROM team data", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a ROM's team data to JSON
    Decode {
        /// Path to the ROM image
        rom: PathBuf,
        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
    /// Validate a candidate JSON document against a ROM's structure
    Validate {
        /// Path to the ROM image
        rom: PathBuf,
        /// Path to the candidate JSON document
        doc: PathBuf,
    },
    /// Re-embed an edited JSON document into a ROM
    Update {
        /// Path to the source ROM image
        rom: PathBuf,
        /// Path to the edited JSON document
        doc: PathBuf,
        /// Path to write the modified ROM to
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Output format for the `decode` command
#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Serialize)]
struct DecodeReport {
    national: usize,
    club: usize,
    custom: usize,
    edition: Option<String>,
    discrepancies: usize,
    position_mismatches: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Decode { rom, output } => cmd_decode(&rom, output),
        Commands::Validate { rom, doc } => cmd_validate(&rom, &doc),
        Commands::Update { rom, doc, output } => cmd_update(&rom, &doc, &output),
    }
}

fn read_rom(path: &std::path::Path) -> Result<Vec<u8>, ExitCode> {
    std::fs::read(path).map_err(|e| {
        eprintln!("error reading ROM {}: {e}", path.display());
        ExitCode::FAILURE
    })
}

fn read_doc(path: &std::path::Path) -> Result<TeamsDoc, ExitCode> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        eprintln!("error reading document {}: {e}", path.display());
        ExitCode::FAILURE
    })?;
    serde_json::from_str(&text).map_err(|e| {
        eprintln!("error parsing document {}: {e}", path.display());
        ExitCode::FAILURE
    })
}

fn report_rom_error(err: &RomError) {
    eprintln!("error: {err}");
}

fn cmd_decode(rom_path: &std::path::Path, output: OutputFormat) -> ExitCode {
    let rom = match read_rom(rom_path) {
        Ok(r) => r,
        Err(code) => return code,
    };

    let doc = match decode(&rom) {
        Ok(doc) => doc,
        Err(e) => {
            report_rom_error(&e);
            return ExitCode::FAILURE;
        }
    };

    match output {
        OutputFormat::Json => {
            let summary = DecodeReport {
                national: doc.national.len(),
                club: doc.club.len(),
                custom: doc.custom.len(),
                edition: doc.edition.map(|e| format!("{e:?}")),
                discrepancies: doc.discrepancies.len(),
                position_mismatches: doc.position_mismatches.len(),
            };
            match serde_json::to_string(&summary) {
                Ok(s) => println!("{s}"),
                Err(e) => {
                    eprintln!("error serializing summary: {e}");
                    return ExitCode::FAILURE;
                }
            }
        }
        OutputFormat::Pretty => match serde_json::to_string_pretty(&doc) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("error serializing document: {e}");
                return ExitCode::FAILURE;
            }
        },
    }

    ExitCode::SUCCESS
}

fn cmd_validate(rom_path: &std::path::Path, doc_path: &std::path::Path) -> ExitCode {
    let rom = match read_rom(rom_path) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let doc = match read_doc(doc_path) {
        Ok(d) => d,
        Err(code) => return code,
    };

    let report = match validate(&rom, &doc) {
        Ok(r) => r,
        Err(e) => {
            report_rom_error(&e);
            return ExitCode::FAILURE;
        }
    };

    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    for error in &report.errors {
        println!("error: {error}");
    }

    if report.is_ok() {
        println!("OK ({} warning(s))", report.warnings.len());
        ExitCode::SUCCESS
    } else {
        println!("FAILED ({} error(s))", report.errors.len());
        ExitCode::FAILURE
    }
}

fn cmd_update(rom_path: &std::path::Path, doc_path: &std::path::Path, output_path: &std::path::Path) -> ExitCode {
    let rom = match read_rom(rom_path) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let doc = match read_doc(doc_path) {
        Ok(d) => d,
        Err(code) => return code,
    };

    let new_rom = match update(&rom, &doc) {
        Ok(r) => r,
        Err(e) => {
            report_rom_error(&e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = std::fs::write(output_path, &new_rom) {
        eprintln!("error writing {}: {e}", output_path.display());
        return ExitCode::FAILURE;
    }

    println!("wrote {} bytes to {}", new_rom.len(), output_path.display());
    ExitCode::SUCCESS
}
