use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use lovereel::{
    Container, DisplayTicker, EncoderProbe as _, ExportConfig, ExportOutcome, ExportRequest,
    ExportState, FfmpegBackend, FfmpegProbe, FitMode, FrameTicker, GreetingStore, ImageSource,
    Phase, SlideshowExporter, SteppedTicker,
};

#[derive(Parser, Debug)]
#[command(name = "lovereel", version, about = "Render photos and a name into a love story video")]
struct Cli {
    /// More logging (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode the slideshow video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render the single frame shown at a given time as a PNG.
    Frame(FrameArgs),
    /// Report which containers the local encoder can produce.
    Probe(ProbeArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Image source: file path, http(s) URL or data: URL. Repeat for each image, in order.
    #[arg(long = "image", value_name = "SRC")]
    images: Vec<String>,

    /// Caption drawn on every frame and used to name the output.
    #[arg(long)]
    caption: Option<String>,

    /// Greeting store JSON to take images and caption from.
    #[arg(long, requires = "slug", conflicts_with = "images")]
    store: Option<PathBuf>,

    /// Slug of the greeting inside `--store`.
    #[arg(long, requires = "store")]
    slug: Option<String>,

    /// PIN for a locked greeting.
    #[arg(long)]
    pin: Option<String>,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// JSON config file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// How images are mapped onto the canvas.
    #[arg(long, value_enum)]
    fit: Option<FitChoice>,

    /// Milliseconds each image stays on screen.
    #[arg(long)]
    per_image_ms: Option<u64>,

    /// Extra directory of .ttf/.otf fonts for the caption.
    #[arg(long)]
    font_dir: Option<PathBuf>,

    /// Container to try first.
    #[arg(long, value_enum)]
    prefer: Option<ContainerChoice>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    config: ConfigArgs,

    /// Directory the video is written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Pace frames against the wall clock instead of rendering offline.
    #[arg(long)]
    realtime: bool,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    config: ConfigArgs,

    /// Time into the slideshow, in milliseconds.
    #[arg(long)]
    at_ms: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ProbeArgs {
    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FitChoice {
    Stretch,
    Cover,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ContainerChoice {
    Webm,
    Mp4,
}

impl From<ContainerChoice> for Container {
    fn from(c: ContainerChoice) -> Self {
        match c {
            ContainerChoice::Webm => Container::WebM,
            ContainerChoice::Mp4 => Container::Mp4,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Probe(args) => cmd_probe(args),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<ExportConfig> {
    let mut cfg = match &args.config {
        Some(path) => ExportConfig::from_path(path)?,
        None => ExportConfig::default(),
    };
    if let Some(fit) = args.fit {
        cfg.fit = match fit {
            FitChoice::Stretch => FitMode::Stretch,
            FitChoice::Cover => FitMode::Cover,
        };
    }
    if let Some(ms) = args.per_image_ms {
        cfg.per_image_ms = ms;
    }
    if let Some(dir) = &args.font_dir {
        cfg.font_dir = Some(dir.clone());
    }
    if let Some(prefer) = args.prefer {
        cfg.prefer_container(prefer.into());
    }
    cfg.validate()?;
    Ok(cfg)
}

fn build_request(input: &InputArgs) -> anyhow::Result<ExportRequest> {
    if let (Some(store_path), Some(slug)) = (&input.store, &input.slug) {
        let store = GreetingStore::from_path(store_path)?;
        let record = store
            .lookup(slug)?
            .with_context(|| format!("no greeting with slug '{slug}' in '{}'", store_path.display()))?;
        if !record.unlock(input.pin.as_deref()) {
            anyhow::bail!("greeting '{slug}' is locked; pass the correct --pin");
        }
        let mut request = record.to_request();
        if let Some(caption) = &input.caption {
            request.caption = caption.clone();
        }
        return Ok(request);
    }

    let caption = input.caption.clone().unwrap_or_else(|| "Beloved".to_string());
    let sources = input.images.iter().map(|s| ImageSource::parse(s)).collect();
    Ok(ExportRequest::new(sources, caption))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    let request = build_request(&args.input)?;

    let mut ticker: Box<dyn FrameTicker> = if args.realtime {
        Box::new(DisplayTicker::new(cfg.display_hz)?)
    } else {
        Box::new(SteppedTicker::new(cfg.fps))
    };

    let backend = FfmpegBackend::new().with_background(cfg.background.to_array());
    let exporter = SlideshowExporter::new(cfg, Arc::new(backend))?.with_out_dir(&args.out_dir);
    exporter.subscribe(Arc::new(log_progress));

    let outcome = exporter
        .export(&request, ticker.as_mut())
        .map_err(|e| {
            let notice = e.user_notice();
            anyhow::Error::new(e).context(notice)
        })?;

    match outcome {
        ExportOutcome::Completed(artifact) => match artifact.path {
            Some(path) => eprintln!("wrote {}", path.display()),
            None => eprintln!("encoded {} frames", artifact.frames),
        },
        ExportOutcome::Empty => eprintln!("no images given; nothing to export"),
        ExportOutcome::Cancelled => eprintln!("export cancelled"),
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    let request = build_request(&args.input)?;

    let exporter = SlideshowExporter::new(cfg, Arc::new(FfmpegBackend::new()))?;
    let frame = exporter
        .preview_frame(&request, Duration::from_millis(args.at_ms))?
        .with_context(|| format!("nothing is on screen at {} ms", args.at_ms))?;

    lovereel::ensure_parent_dir(&args.out)?;
    frame.save_png(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    let probe = FfmpegProbe::new();
    for &container in &cfg.containers {
        let ok = probe.supports(container)?;
        println!(
            "{container:<5} {:<11} {}",
            container.encoder(),
            if ok { "available" } else { "missing" }
        );
    }
    let selected = lovereel::negotiate_container(&cfg.containers, &probe)?;
    println!("selected: {selected} ({})", selected.mime_type());
    Ok(())
}

fn log_progress(state: &ExportState) {
    match state.phase {
        Phase::Running if state.progress_percent.is_multiple_of(10) => {
            tracing::info!(progress = state.progress_percent, "rendering");
        }
        Phase::Running => {
            tracing::debug!(progress = state.progress_percent, "rendering");
        }
        phase => tracing::debug!(?phase, "export phase"),
    }
}
