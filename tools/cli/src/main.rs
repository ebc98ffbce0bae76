//! SealBox CLI - seal and open password-protected containers.
//!
//! Containers are written as JSON. Inputs and outputs default to
//! stdin/stdout so the tool can sit in a pipeline.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use sealbox_common::SensitiveBytes;
use sealbox_container::{Container, ContainerConfig, ContainerRecord};
use sealbox_crypto::{CalibrationParams, Calibrator};

#[derive(Parser)]
#[command(name = "sealbox")]
#[command(about = "SealBox - Password-protected data containers")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file into a container.
    Seal {
        /// Plaintext file, or "-" for stdin.
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Container output file (default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Upper bound on the calibrated iteration count.
        #[arg(long)]
        max_iterations: Option<u32>,

        /// Write indented JSON.
        #[arg(long)]
        pretty: bool,

        /// Password (prompted for when not set).
        #[arg(long, env = "SEALBOX_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Decrypt a container.
    Open {
        /// Container file, or "-" for stdin.
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Plaintext output file (default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Password (prompted for when not set).
        #[arg(long, env = "SEALBOX_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Show container parameters without decrypting.
    Inspect {
        /// Container file, or "-" for stdin.
        #[arg(short, long, default_value = "-")]
        input: PathBuf,
    },

    /// Run the iteration-count calibrator.
    Calibrate {
        /// Number of draws.
        #[arg(short, long, default_value_t = 5)]
        samples: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = log_filter(cli.verbose, std::env::var("RUST_LOG").ok().as_deref());

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Seal {
            input,
            output,
            max_iterations,
            pretty,
            password,
        } => cmd_seal(&input, output.as_deref(), max_iterations, pretty, password),

        Commands::Open {
            input,
            output,
            password,
        } => cmd_open(&input, output.as_deref(), password),

        Commands::Inspect { input } => cmd_inspect(&input),

        Commands::Calibrate { samples } => cmd_calibrate(samples),
    }
}

/// Build the log filter from `RUST_LOG` directives, falling back to the
/// `--verbose` level when they are absent or invalid.
fn log_filter(verbose: bool, directives: Option<&str>) -> EnvFilter {
    let level = if verbose { "debug" } else { "info" };

    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(level))
}

/// Prompt for password securely.
fn prompt_password(prompt: &str) -> Result<SensitiveBytes> {
    let password = rpassword::prompt_password(prompt).context("Failed to read password")?;
    Ok(SensitiveBytes::new(password.into_bytes()))
}

/// Use the supplied password or prompt for one.
fn resolve_password(supplied: Option<String>, confirm: bool) -> Result<SensitiveBytes> {
    if let Some(password) = supplied {
        return Ok(SensitiveBytes::new(password.into_bytes()));
    }

    let password = prompt_password("Enter password: ")?;
    if confirm {
        let again = prompt_password("Confirm password: ")?;
        if password.as_bytes() != again.as_bytes() {
            anyhow::bail!("Passwords do not match");
        }
    }
    Ok(password)
}

/// Read a file, or stdin for "-".
fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Write to a file, or stdout when no path is given.
fn write_output(path: Option<&Path>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data).context("Failed to write stdout")?;
            stdout.flush().context("Failed to flush stdout")
        }
    }
}

fn read_record(path: &Path) -> Result<ContainerRecord> {
    let bytes = read_input(path)?;
    let json = String::from_utf8(bytes).context("Container is not valid UTF-8")?;
    ContainerRecord::from_json(&json).context("Failed to parse container")
}

/// Seal a plaintext file.
fn cmd_seal(
    input: &Path,
    output: Option<&Path>,
    max_iterations: Option<u32>,
    pretty: bool,
    password: Option<String>,
) -> Result<()> {
    let plaintext = SensitiveBytes::new(read_input(input)?);
    let password = resolve_password(password, true)?;

    let config = match max_iterations {
        Some(max) => ContainerConfig::bounded(max),
        None => ContainerConfig::default(),
    };
    let engine = Container::from_config(&config);

    let record = engine
        .seal(plaintext.as_bytes(), password.as_bytes())
        .context("Failed to seal container")?;
    let mut json = if pretty {
        record.to_json_pretty()?
    } else {
        record.to_json()?
    };
    json.push('\n');

    write_output(output, json.as_bytes())?;
    info!(
        iterations = record.derive_info().iterations(),
        bytes = plaintext.len(),
        "Container sealed"
    );
    Ok(())
}

/// Open a container file.
fn cmd_open(input: &Path, output: Option<&Path>, password: Option<String>) -> Result<()> {
    let record = read_record(input)?;
    let password = resolve_password(password, false)?;

    let plaintext = SensitiveBytes::new(
        Container::new()
            .open(&record, password.as_bytes())
            .context("Failed to open container")?,
    );

    write_output(output, plaintext.as_bytes())?;
    info!(bytes = plaintext.len(), "Container opened");
    Ok(())
}

/// Show container parameters.
fn cmd_inspect(input: &Path) -> Result<()> {
    let record = read_record(input)?;
    let decoded = record.decode().context("Container failed validation")?;

    println!("Container:");
    println!("  Version: {}", decoded.version);
    println!("  Iterations: {}", decoded.iterations);
    println!("  Salt: {}", record.derive_info().salt());
    println!("  IV: {}", record.encryption_info().iv());
    println!("  Payload: {} bytes", decoded.payload.len());
    println!("  Digest: {}", record.contained_data().digest());

    Ok(())
}

/// Print calibrated iteration counts.
fn cmd_calibrate(samples: u32) -> Result<()> {
    let calibrator = Calibrator::new(CalibrationParams::standard());

    for i in 1..=samples {
        println!("  Sample {}: {} iterations", i, calibrator.calibrate());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_seal() {
        let cli = Cli::try_parse_from([
            "sealbox",
            "seal",
            "--input",
            "notes.txt",
            "--max-iterations",
            "50000",
            "--pretty",
        ])
        .unwrap();

        match cli.command {
            Commands::Seal {
                input,
                max_iterations,
                pretty,
                ..
            } => {
                assert_eq!(input, PathBuf::from("notes.txt"));
                assert_eq!(max_iterations, Some(50_000));
                assert!(pretty);
            }
            _ => panic!("expected seal command"),
        }
    }

    #[test]
    fn test_log_filter_defaults_to_verbosity() {
        assert!(log_filter(false, None).to_string().eq_ignore_ascii_case("info"));
        assert!(log_filter(true, None).to_string().eq_ignore_ascii_case("debug"));
    }

    #[test]
    fn test_log_filter_honours_directives() {
        let filter = log_filter(false, Some("sealbox_container=trace"));
        assert!(filter.to_string().contains("sealbox_container"));
    }

    #[test]
    fn test_log_filter_ignores_invalid_directives() {
        let filter = log_filter(true, Some("sealbox_container=loud"));
        assert!(filter.to_string().eq_ignore_ascii_case("debug"));
    }

    #[test]
    fn test_file_io_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");

        write_output(Some(&path), b"payload").unwrap();
        assert_eq!(read_input(&path).unwrap(), b"payload");
    }

    #[test]
    fn test_read_record_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("box.json");

        let engine = Container::from_config(&ContainerConfig::bounded(8192));
        let json = engine.seal_to_json(b"secret", b"pw").unwrap();
        fs::write(&path, json).unwrap();

        let record = read_record(&path).unwrap();
        assert_eq!(engine.open(&record, b"pw").unwrap(), b"secret");
    }

    #[test]
    fn test_read_record_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("box.json");
        fs::write(&path, "{}").unwrap();

        assert!(read_record(&path).is_err());
    }

    #[test]
    fn test_supplied_password_is_used() {
        let password = resolve_password(Some("hunter2".to_string()), true).unwrap();
        assert_eq!(password.as_bytes(), b"hunter2");
    }
}
