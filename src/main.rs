use clap::{Parser, Subcommand};
use color_eyre::eyre::{WrapErr, eyre};
use media_stamper::auth::password_digest;
use media_stamper::staging::processed_path;
use media_stamper::utils::list_media_files;
use media_stamper::{MediaKind, MediaStamper, MetadataRecord, WriteMode};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Stamp photos and videos with a fixed metadata fingerprint.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Stamp a file, or every media file in a folder.
    Stamp(StampArgs),
    /// Print the BLAKE3 digest of a password, as stored in the user file.
    HashPassword { password: String },
}

#[derive(Debug, clap::Args)]
struct StampArgs {
    /// File or folder to stamp
    input: PathBuf,

    /// Where staged uploads and processed files are written
    #[arg(short, long, env = "MEDIA_STAMPER_OUTPUT_DIR", default_value = "processed")]
    output_dir: PathBuf,

    /// JSON file with the record to write instead of the bundled one
    #[arg(short, long, env = "MEDIA_STAMPER_RECORD")]
    record: Option<PathBuf>,

    /// Path to the exiftool executable
    #[arg(long, env = "MEDIA_STAMPER_EXIFTOOL")]
    exiftool: Option<PathBuf>,

    /// Path to the ffmpeg executable
    #[arg(long, env = "MEDIA_STAMPER_FFMPEG")]
    ffmpeg: Option<PathBuf>,

    /// Remux videos through ffmpeg before stamping
    #[arg(long, env = "MEDIA_STAMPER_REMUX")]
    remux: bool,

    /// Write the record's orientation instead of keeping the source's
    #[arg(long, env = "MEDIA_STAMPER_NO_PRESERVE_ORIENTATION")]
    no_preserve_orientation: bool,

    /// Ceiling for each exiftool run
    #[arg(long, env = "MEDIA_STAMPER_TIMEOUT_SECS", default_value_t = 120)]
    timeout_secs: u64,

    /// Owner name used in staged upload names
    #[arg(long, env = "MEDIA_STAMPER_OWNER", default_value = "cli")]
    owner: String,

    /// Print the exiftool command for each file and exit
    #[arg(long)]
    dry_run: bool,

    /// Include hidden files when stamping a folder
    #[arg(long)]
    include_hidden: bool,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match Cli::parse().command {
        Command::Stamp(args) => stamp(args).await,
        Command::HashPassword { password } => {
            println!("{}", password_digest(&password).to_hex());
            Ok(())
        }
    }
}

async fn stamp(args: StampArgs) -> color_eyre::Result<()> {
    let record = args
        .record
        .as_deref()
        .map(MetadataRecord::from_json_file)
        .transpose()
        .wrap_err("loading record")?;
    let stamper = MediaStamper::builder()
        .maybe_exiftool_path(args.exiftool.clone())
        .maybe_ffmpeg_path(args.ffmpeg.clone())
        .tool_timeout(Duration::from_secs(args.timeout_secs))
        .preserve_orientation(!args.no_preserve_orientation)
        .remux_video(args.remux)
        .maybe_record(record)
        .build()?;

    let files = if args.input.is_dir() {
        list_media_files(&args.input, args.include_hidden)?
    } else if args.input.is_file() {
        vec![args.input.clone()]
    } else {
        return Err(eyre!("{} does not exist", args.input.display()));
    };
    info!("Found {} media files.", files.len());

    if args.dry_run {
        for file in &files {
            let kind = MediaKind::detect(file)?;
            let destination = processed_path(&args.output_dir, file);
            let plan = stamper.preview_plan(kind, file, &destination, WriteMode::NewPath, None);
            println!("{}", plan.display());
        }
        return Ok(());
    }

    let uploads_dir = args.output_dir.join("uploads");
    for file in &files {
        let bytes = match tokio::fs::read(file).await {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(file = %file.display(), %error, "skipping unreadable file");
                continue;
            }
        };
        let name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let report = stamper
            .stamp_upload(&uploads_dir, &args.output_dir, &args.owner, &name, &bytes)
            .await
            .wrap_err_with(|| format!("staging {}", file.display()))?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
