use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use picblend::{
    COMPOSITE_FILENAME, FINAL_IMAGE_FILENAME, HttpProcessService, InputSlot, SUBJECT_ONLY_FILENAME,
    Session, SessionPhase, Surface, write_encoded, write_surface_png,
};

#[derive(Parser, Debug)]
#[command(name = "picblend", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose the foreground over an optional background and write a PNG.
    Compose(ComposeArgs),
    /// Submit the images to the remote processing service and save the results.
    Process(ProcessArgs),
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Subject image path.
    #[arg(long)]
    foreground: PathBuf,

    /// Background image path (optional).
    #[arg(long)]
    background: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long, default_value = COMPOSITE_FILENAME)]
    out: PathBuf,

    /// Surface width in pixels.
    #[arg(long, default_value_t = picblend::DEFAULT_SURFACE_WIDTH)]
    width: u32,

    /// Surface height in pixels.
    #[arg(long, default_value_t = picblend::DEFAULT_SURFACE_HEIGHT)]
    height: u32,
}

#[derive(Parser, Debug)]
struct ProcessArgs {
    /// Subject image path.
    #[arg(long)]
    foreground: PathBuf,

    /// Background image path (optional).
    #[arg(long)]
    background: Option<PathBuf>,

    /// Base URL of the processing API.
    #[arg(long, default_value = "http://localhost:8000/api")]
    api_url: String,

    /// Directory the result images are written into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Process(args) => cmd_process(args),
    }
}

fn select_from_path(session: &mut Session, slot: InputSlot, path: &PathBuf) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    session
        .select(slot, bytes)
        .with_context(|| format!("load image '{}'", path.display()))?;
    Ok(())
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let mut session = Session::new();
    select_from_path(&mut session, InputSlot::Foreground, &args.foreground)?;
    if let Some(background) = &args.background {
        select_from_path(&mut session, InputSlot::Background, background)?;
    }

    let mut surface = Surface::new(args.width, args.height)?;
    session.render_preview(&mut surface)?;
    write_surface_png(&surface, &args.out)?;

    session.release_all();
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_process(args: ProcessArgs) -> anyhow::Result<()> {
    let mut session = Session::new();
    select_from_path(&mut session, InputSlot::Foreground, &args.foreground)?;
    if let Some(background) = &args.background {
        select_from_path(&mut session, InputSlot::Background, background)?;
    }

    let service = HttpProcessService::with_timeout(
        &args.api_url,
        std::time::Duration::from_secs(args.timeout_secs),
    )?;
    session.set_submit_timeout(std::time::Duration::from_secs(args.timeout_secs));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    runtime.block_on(session.submit(&service));

    if session.phase() == SessionPhase::Error {
        let message = session
            .last_error()
            .unwrap_or(picblend::GENERIC_PROCESS_ERROR)
            .to_string();
        session.release_all();
        anyhow::bail!("{message}");
    }

    let bundle = session
        .result()
        .context("processing finished without a result")?;

    let subject_path = write_encoded(&bundle.subject_only, &args.out_dir, SUBJECT_ONLY_FILENAME)?;
    eprintln!("wrote {}", subject_path.display());

    if let Some(composite) = &bundle.final_composite {
        let final_path = write_encoded(composite, &args.out_dir, FINAL_IMAGE_FILENAME)?;
        eprintln!("wrote {}", final_path.display());
    }

    if let Some(caption) = bundle.caption() {
        println!("{caption}");
    }

    session.release_all();
    Ok(())
}
