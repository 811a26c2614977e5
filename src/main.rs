//! courseload CLI - Validate and upload lesson-content CSV files
//!
//! # Main Commands
//!
//! ```bash
//! courseload validate lessons.csv --kind lessons   # Check required columns
//! courseload upload lessons.csv --kind lessons     # Validated upload with fallback
//! courseload serve                                 # Start intake server (port 3000)
//! ```
//!
//! # Utility Commands
//!
//! ```bash
//! courseload preview input.csv                     # Show header + sample rows
//! courseload normalize input.csv --to pipe         # Rewrite delimiter convention
//! courseload contracts                             # Show column contracts per kind
//! ```

use clap::{Parser, Subcommand};
use courseload::{
    build_preview, normalize, normalized_file_name, validate_content, DelimiterFormat,
    IntakeConfig, RawFile, UploadKind, Uploader,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "courseload")]
#[command(about = "Validate and bulk-upload lesson content CSV files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a file against an upload kind's column contract
    Validate {
        /// Input CSV file
        input: PathBuf,

        /// Upload kind (lessons, concepts, examples, exercises,
        /// general_exercises, check_markers, scheme_of_work)
        #[arg(short, long)]
        kind: String,

        /// Write the validation report as JSON (default: human-readable to stderr)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show header row and a bounded sample of data rows
    Preview {
        /// Input CSV file
        input: PathBuf,

        /// Maximum sample rows
        #[arg(long, default_value = "10")]
        rows: usize,

        /// Output file for the preview JSON (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rewrite a file into the other delimiter convention
    Normalize {
        /// Input CSV file
        input: PathBuf,

        /// Target format: comma or pipe
        #[arg(long)]
        to: String,

        /// Output file (default: alongside the input, with a format suffix)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validated upload with automatic alternate-format fallback
    Upload {
        /// Input CSV file
        input: PathBuf,

        /// Upload kind
        #[arg(short, long)]
        kind: String,

        /// Platform API base URL (default: COURSELOAD_API_URL)
        #[arg(long)]
        api_url: Option<String>,

        /// Write the full outcome as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the required-column contracts for every upload kind
    Contracts,

    /// Start the HTTP intake server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Platform API base URL (default: COURSELOAD_API_URL)
        #[arg(long)]
        api_url: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate {
            input,
            kind,
            output,
        } => cmd_validate(&input, &kind, output.as_deref()),

        Commands::Preview {
            input,
            rows,
            output,
        } => cmd_preview(&input, rows, output.as_deref()),

        Commands::Normalize { input, to, output } => {
            cmd_normalize(&input, &to, output.as_deref())
        }

        Commands::Upload {
            input,
            kind,
            api_url,
            output,
        } => cmd_upload(&input, &kind, api_url, output.as_deref()).await,

        Commands::Contracts => cmd_contracts(),

        Commands::Serve { port, api_url } => cmd_serve(port, api_url).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn read_content(input: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let bytes = fs::read(input)?;
    let (content, encoding) = courseload::decode_bytes(&bytes)?;
    eprintln!("   Encoding: {}", encoding);
    Ok(content)
}

fn cmd_validate(
    input: &Path,
    kind: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let kind = UploadKind::from_str(kind)?;
    eprintln!("Validating {} file: {}", kind, input.display());

    let content = read_content(input)?;
    let report = validate_content(&content, kind);

    eprintln!("   Format: {}", report.format);
    eprintln!("   Data rows: {}", report.row_count);

    if let Some(path) = output {
        write_output(&serde_json::to_string_pretty(&report)?, Some(path))?;
    }

    if report.is_valid {
        eprintln!("Valid: all {} required columns present", kind.required_columns().len());
        Ok(())
    } else {
        for err in &report.errors {
            eprintln!("   - {}", err);
        }
        eprintln!("Invalid: {} error(s)", report.errors.len());
        std::process::exit(1);
    }
}

fn cmd_preview(
    input: &Path,
    rows: usize,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Previewing: {}", input.display());

    let content = read_content(input)?;
    let preview = build_preview(&content, rows);

    eprintln!("   Format: {}", preview.format);
    eprintln!("   Columns: {}", preview.headers.join(", "));
    eprintln!(
        "   Rows: {} total, {} sampled",
        preview.total_row_count,
        preview.sample_rows.len()
    );

    let json = serde_json::to_string_pretty(&preview)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_normalize(
    input: &Path,
    to: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let target = match to.trim().to_lowercase().as_str() {
        "comma" => DelimiterFormat::Comma,
        "pipe" => DelimiterFormat::Pipe,
        other => return Err(format!("Unknown format '{}'. Expected comma or pipe", other).into()),
    };

    eprintln!("Normalizing {} to {} format", input.display(), target);

    let content = read_content(input)?;
    let normalized = normalize(&content, target);

    let out_path = match output {
        Some(p) => p.to_path_buf(),
        None => {
            let name = input
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("normalized.csv");
            input.with_file_name(normalized_file_name(name, target))
        }
    };

    fs::write(&out_path, normalized)?;
    eprintln!("Written to: {}", out_path.display());

    Ok(())
}

async fn cmd_upload(
    input: &Path,
    kind: &str,
    api_url: Option<String>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let kind = UploadKind::from_str(kind)?;
    let uploader = match api_url {
        Some(url) => Uploader::with_api_url(url),
        None => Uploader::from_env()?,
    };

    eprintln!("Uploading {} file: {}", kind, input.display());
    eprintln!("   Endpoint: {}", uploader.config().endpoint(kind.endpoint_path()));

    let file = RawFile::from_path(input)?;

    let outcome = uploader.upload(kind, &file).await;

    if let Some(path) = output {
        write_output(&serde_json::to_string_pretty(&outcome)?, Some(path))?;
    }

    let tried: Vec<String> = outcome.tried_formats.iter().map(|f| f.to_string()).collect();

    if outcome.success {
        eprintln!("Upload succeeded (tried: {})", tried.join(", "));
        Ok(())
    } else {
        if let Some(ref error) = outcome.error {
            eprintln!("   {}", error);
        }
        if tried.is_empty() {
            eprintln!("Upload rejected before any network attempt");
        } else {
            eprintln!("Upload failed (tried: {})", tried.join(", "));
        }
        std::process::exit(1);
    }
}

fn cmd_contracts() -> Result<(), Box<dyn std::error::Error>> {
    for kind in UploadKind::ALL {
        println!("{} ({} -> {})", kind, kind.field_name(), kind.endpoint_path());
        println!("   columns: {}", kind.required_columns().join(", "));
        println!();
    }
    Ok(())
}

async fn cmd_serve(
    port: u16,
    api_url: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let uploader = match api_url {
        Some(url) => Uploader::with_api_url(url),
        None => Uploader::new(IntakeConfig::from_env()?, courseload::HttpTransport::new()),
    };

    courseload::server::start_server(port, uploader).await
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
