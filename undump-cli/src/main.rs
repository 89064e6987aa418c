use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use tabled::{Table, Tabled};
use undump_core::{unhexdump, Arch, Encoding, Format, Options, ScalarType};

/// Hexdump reversal and scalar type inspection CLI
#[derive(Parser)]
#[command(
    name = "undump",
    about = "Parse hexdump/od output back into raw bytes and inspect per-architecture type tables",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reconstruct the raw bytes from a hexdump/od text dump
    Unhexdump {
        /// Path to the dump file, or `-` for stdin
        path: PathBuf,

        /// Tool flavor the dump came from (od, hexdump)
        #[arg(long)]
        format: Option<Format>,

        /// Numeric base / word size token (e.g. octal_bytes, hex_ints)
        #[arg(long)]
        encoding: Option<Encoding>,

        /// Maximum bytes decoded per line
        #[arg(long, default_value_t = 16)]
        segment: usize,

        /// Architecture whose byte order drives multi-byte word expansion
        #[arg(long)]
        arch: Option<Arch>,

        /// Write the bytes here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// List the scalar type table of an architecture
    Types {
        /// Architecture identifier (e.g. x86-64, arm64-be, mips)
        arch: Arch,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Tabled, Serialize)]
struct TypeRow {
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Type")]
    resolves_to: &'static str,
    #[tabled(rename = "Size")]
    size: u32,
    #[tabled(rename = "Order")]
    order: String,
    #[tabled(rename = "Kind")]
    kind: &'static str,
}

impl TypeRow {
    fn new(name: &'static str, ty: &ScalarType) -> Self {
        TypeRow {
            name,
            resolves_to: ty.name,
            size: ty.size,
            order: ty.endian.to_string(),
            kind: if ty.float {
                "float"
            } else if ty.signed {
                "signed"
            } else {
                "unsigned"
            },
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Unhexdump {
            path,
            format,
            encoding,
            segment,
            arch,
            output,
        } => {
            let mut options = Options {
                format,
                encoding,
                segment,
                word_type: None,
            };
            if let Some(arch) = arch {
                options.word_type =
                    ScalarType::unsigned(options.resolved_word_size(), arch.endianness());
            }

            let bytes = if path.as_os_str() == "-" {
                unhexdump(io::stdin().lock(), &options)?
            } else {
                let file = File::open(&path)
                    .with_context(|| format!("cannot open {}", path.display()))?;
                unhexdump(BufReader::new(file), &options)?
            };
            log::info!("decoded {} bytes from {}", bytes.len(), path.display());

            match output {
                Some(out_path) => std::fs::write(&out_path, &bytes)
                    .with_context(|| format!("cannot write {}", out_path.display()))?,
                None => io::stdout().write_all(&bytes)?,
            }
        }

        Command::Types { arch, json } => {
            let table = arch.table();
            let rows: Vec<TypeRow> = table
                .names()
                .into_iter()
                .map(|name| Ok(TypeRow::new(name, table.get(name)?)))
                .collect::<undump_core::Result<_>>()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                let header = format!(
                    "{arch}: {}-bit addresses, {}-endian",
                    table.address_size() * 8,
                    table.endianness()
                );
                println!("{}", header.bold());
                println!("{}", Table::new(rows));
            }
        }
    }

    Ok(())
}
