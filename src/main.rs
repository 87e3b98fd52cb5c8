use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueHint};
use env_logger::{try_init_from_env, Env, DEFAULT_FILTER_ENV};
use log::info;

use uvm::{assemble, run, Config, MemoryRange, WriteDecoding};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Assembles a source file into a binary program and an instruction log.
  Assemble {
    /// The assembly source
    #[arg(long, alias = "source_file", value_hint = ValueHint::FilePath)]
    source_file: PathBuf,
    /// Where to write the binary program
    #[arg(long, alias = "binary_file", value_hint = ValueHint::FilePath)]
    binary_file: PathBuf,
    /// Where to write the instruction log
    #[arg(long, alias = "log_file", value_hint = ValueHint::FilePath)]
    log_file: PathBuf,
  },
  /// Runs a binary program and records a range of memory.
  Run {
    /// The binary program
    #[arg(long, alias = "binary_file", value_hint = ValueHint::FilePath)]
    binary_file: PathBuf,
    /// Where to write the memory snapshot
    #[arg(long, alias = "result_file", value_hint = ValueHint::FilePath)]
    result_file: PathBuf,
    /// Addresses to record, as `start:end`
    #[arg(long, alias = "memory_range")]
    memory_range: MemoryRange,
    /// How `WRITE` finds its source cell: `raw` for compatibility with existing binaries,
    /// `shifted` to use the operand as written in the assembly
    #[arg(long, env = "UVM_WRITE_DECODING", default_value_t = WriteDecoding::Raw)]
    write_decoding: WriteDecoding,
  },
}

/// Where a file is written before it is moved into place.
fn staging_path(path: &Path) -> PathBuf {
  let mut name = path.file_name().unwrap_or_default().to_os_string();
  name.push(".partial");
  path.with_file_name(name)
}

/// Writes every file or, if any write fails, none of them.
fn write_all_or_nothing(files: &[(&Path, &[u8])]) -> Result<()> {
  let mut staged: Vec<PathBuf> = Vec::with_capacity(files.len());

  for (path, contents) in files {
    let staging = staging_path(path);
    if let Err(e) = fs::write(&staging, contents) {
      for partial in &staged {
        let _ = fs::remove_file(partial);
      }
      return Err(e).with_context(|| format!("Failed to write {}", path.display()));
    }
    staged.push(staging);
  }

  for ((path, _), staging) in files.iter().zip(&staged) {
    fs::rename(staging, path)
      .with_context(|| format!("Failed to write {}", path.display()))?;
  }
  Ok(())
}

fn main() -> Result<()> {
  let _ = try_init_from_env(Env::default().filter_or(DEFAULT_FILTER_ENV, "info"));

  match Cli::parse().command {

    Command::Assemble { source_file, binary_file, log_file } => {
      let text = fs::read_to_string(&source_file)
        .with_context(|| format!("Failed to read {}", source_file.display()))?;
      let assembly = assemble(&text)
        .with_context(|| format!("Failed to assemble {}", source_file.display()))?;
      let log = serde_json::to_string_pretty(assembly.log())?;

      write_all_or_nothing(&[
        (binary_file.as_path(), assembly.to_bytes().as_slice()),
        (log_file.as_path(), log.as_bytes())
      ])?;

      info!("Wrote {} instructions to {}.", assembly.len(), binary_file.display());
      println!("Contents of the binary file:");
      println!("{}", assembly.hex_dump());
    }

    Command::Run { binary_file, result_file, memory_range, write_decoding } => {
      let bytes = fs::read(&binary_file)
        .with_context(|| format!("Failed to read {}", binary_file.display()))?;
      let dump = run(&bytes, memory_range, Config::with_write_decoding(write_decoding))
        .with_context(|| format!("Failed to run {}", binary_file.display()))?;

      let result = serde_json::to_string_pretty(&dump)?;
      write_all_or_nothing(&[(result_file.as_path(), result.as_bytes())])?;

      info!("Wrote memory {} to {}.", memory_range, result_file.display());
      println!("{}", dump);
    }

  }

  Ok(())
}
