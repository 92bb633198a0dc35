//! cropshot: capture a window, crop it, and hand the crop to OCR
//!
//! Drives a [`CaptureSession`] from the command line. `replay` feeds a JSON
//! script of viewport and pointer events through the same selection path a
//! GUI would use, which makes the whole pipeline scriptable without one.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cropshot_core::{
    CaptureError, CaptureSession,
    capture::{WindowMatcher, create_window_enumerator},
    model::{CropBox, WindowHandle},
    util::detect::detect_platform,
};

mod script;

use script::ReplayScript;

#[derive(Parser)]
#[command(name = "cropshot", version)]
#[command(about = "Capture a window, crop it, and hand the crop to OCR")]
struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List capturable windows
    ListWindows {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Capture a window, optionally crop it and run OCR
    Capture {
        /// Window title: regex, substring or fuzzy match
        #[arg(long)]
        title: String,
        /// Output PNG path
        #[arg(short, long)]
        out: PathBuf,
        /// Crop in image pixels as left,top,right,bottom
        #[arg(long)]
        crop: Option<CropBox>,
        /// Run OCR on the (cropped) capture and print the text
        #[arg(long)]
        ocr: bool,
        /// Tesseract language pack(s), e.g. eng+deu
        #[arg(long, default_value = "eng")]
        lang: String,
    },
    /// Capture a window and replay a scripted crop selection on it
    Replay {
        /// Window title: regex, substring or fuzzy match
        #[arg(long)]
        title: String,
        /// JSON script with a viewport size and selection events
        #[arg(long)]
        script: PathBuf,
        /// Output PNG path for the cropped capture
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json)?;

    tracing::debug!(platform = ?detect_platform(), "Starting");

    match cli.command {
        Commands::ListWindows { json } => {
            blocking(move || list_windows(json)).await?;
        }
        Commands::Capture {
            title,
            out,
            crop,
            ocr,
            lang,
        } => {
            blocking(move || capture_window(&title, out, crop, ocr, lang)).await?;
        }
        Commands::Replay { title, script, out } => {
            let script = ReplayScript::load(&script)?;
            blocking(move || replay(&title, &script, out)).await?;
        }
    }

    Ok(())
}

fn init_logging(json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().or_else(|_| {
        tracing_subscriber::EnvFilter::try_new("cropshot=info,cropshot_core=warn")
    })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

/// Runs blocking capture work off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("Capture worker panicked")?
}

/// Appends the remediation hint to a core error.
fn explain(err: CaptureError) -> anyhow::Error {
    anyhow::anyhow!("{}\nHint: {}", err, err.remediation_hint())
}

fn find_window(title: &str) -> Result<WindowHandle> {
    let windows = create_window_enumerator().list_windows().map_err(explain)?;
    WindowMatcher::new(title)
        .find(&windows)
        .cloned()
        .with_context(|| format!("No window matches '{}' ({} windows open)", title, windows.len()))
}

fn session_for(title: &str) -> Result<CaptureSession> {
    let handle = find_window(title)?;
    eprintln!("Found window: {} [{}]", handle.title, handle.id);

    let mut session = CaptureSession::with_platform_defaults();
    tracing::debug!(engine = ?session.engine(), "Session ready");
    session.select_window(handle);

    let (width, height) = session.take_capture().map_err(explain)?.dimensions();
    eprintln!("Captured {}x{}", width, height);
    Ok(session)
}

fn save_cropped(session: &CaptureSession, out: &Path) -> Result<()> {
    let image = session.cropped_image().map_err(explain)?;
    image.save_png(out).map_err(explain)?;
    eprintln!("✓ Saved {}x{} to {}", image.width(), image.height(), out.display());
    Ok(())
}

fn list_windows(json: bool) -> Result<()> {
    let windows = create_window_enumerator().list_windows().map_err(explain)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&windows)?);
        return Ok(());
    }

    println!("Found {} windows:\n", windows.len());
    for window in windows {
        println!("  ID: {}", window.id);
        println!("  Title: {}", window.title);
        let r = window.rect;
        println!("  Rect: {}x{} at ({}, {})", r.width, r.height, r.left, r.top);
        println!();
    }

    Ok(())
}

fn capture_window(
    title: &str,
    out: PathBuf,
    crop: Option<CropBox>,
    ocr: bool,
    lang: String,
) -> Result<()> {
    let mut session = session_for(title)?;

    if let Some(crop) = crop {
        session.set_crop(crop).map_err(explain)?;
    }
    save_cropped(&session, &out)?;

    if ocr {
        println!("{}", recognize(&session, lang)?);
    }

    Ok(())
}

#[cfg(feature = "tesseract")]
fn recognize(session: &CaptureSession, lang: String) -> Result<String> {
    use cropshot_core::ocr::{TesseractParameter, TesseractRecognizer};

    let recognizer = TesseractRecognizer::new(TesseractParameter {
        lang,
        ..TesseractParameter::default()
    });
    session.recognize_text(&recognizer).map_err(explain)
}

#[cfg(not(feature = "tesseract"))]
fn recognize(_session: &CaptureSession, _lang: String) -> Result<String> {
    anyhow::bail!("OCR is not available: rebuild with `--features tesseract`")
}

fn replay(title: &str, script: &ReplayScript, out: PathBuf) -> Result<()> {
    let mut session = session_for(title)?;
    let crop = script.replay(&mut session);

    save_cropped(&session, &out)?;
    println!("{}", serde_json::to_string(&crop)?);
    Ok(())
}
