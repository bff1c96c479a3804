use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "dpframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a new frame definition with default placeholders.
    Init(InitArgs),
    /// Render the organizer preview of a frame as a PNG.
    Preview(PreviewArgs),
    /// Composite an attendee photo and name into a frame.
    Generate(GenerateArgs),
    /// Print the SVG path data of a placeholder shape.
    Shape(ShapeArgs),
}

#[derive(Parser, Debug)]
struct InitArgs {
    /// Frame display name.
    #[arg(long)]
    name: String,

    #[arg(long, default_value = "frame-1")]
    id: String,

    #[arg(long, default_value = "event-1")]
    event_id: String,

    /// Frame artwork; the canvas adopts its size.
    #[arg(long)]
    frame_image: Option<PathBuf>,

    /// Output JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameInputs {
    /// Frame definition JSON.
    #[arg(long)]
    frame: PathBuf,

    /// Frame artwork image.
    #[arg(long)]
    frame_image: Option<PathBuf>,

    /// Font file or directory to register (repeatable). `DPFRAME_FONT_DIR` is also honoured.
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    inputs: FrameInputs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    inputs: FrameInputs,

    /// Attendee photo.
    #[arg(long)]
    photo: PathBuf,

    /// Attendee name (at most 30 characters are kept).
    #[arg(long)]
    name: String,

    /// Photo zoom, clamped to 0.5..=3.0.
    #[arg(long, default_value_t = 1.0)]
    zoom: f64,

    /// Horizontal photo offset in canvas px.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    offset_x: f64,

    /// Vertical photo offset in canvas px.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    offset_y: f64,

    /// Disable the name drop shadow.
    #[arg(long, default_value_t = false)]
    no_shadow: bool,

    /// Directory the PNG is written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct ShapeArgs {
    /// circle, square, rounded-square, hexagon, star or heart.
    #[arg(long)]
    kind: dpframe::PlaceholderShape,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    x: f64,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    y: f64,

    #[arg(long)]
    width: f64,

    #[arg(long)]
    height: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dpframe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Init(args) => cmd_init(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Generate(args) => cmd_generate(args),
        Command::Shape(args) => cmd_shape(args),
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    let frame = dpframe::DpFrame::new(args.id, args.event_id, args.name, chrono::Utc::now());
    let mut draft = dpframe::FrameDraft::new(frame, None)?;
    if let Some(path) = &args.frame_image {
        draft.upload_frame_image(dpframe::Upload::from_path(path)?)?;
    }
    let json = draft.into_frame().to_json_pretty()?;
    write_file(&args.out, json.as_bytes())?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let (frame, frame_image) = load_frame(&args.inputs)?;
    let mut text = load_fonts(&args.inputs.fonts)?;
    let draft = dpframe::FrameDraft::new(frame, frame_image)?;
    let out = draft.render_preview(&mut dpframe::CpuRenderer::default(), &mut text)?;
    dpframe::write_png(&out, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let (frame, frame_image) = load_frame(&args.inputs)?;
    let mut text = load_fonts(&args.inputs.fonts)?;

    let mut session = dpframe::GenerationSession::new(frame, frame_image)?;
    session
        .load_photo(dpframe::Upload::from_path(&args.photo)?)
        .with_context(|| format!("load photo '{}'", args.photo.display()))?;
    session.set_name(&args.name);
    session.set_zoom(args.zoom);
    session.pan_to(dpframe::Vec2::new(args.offset_x, args.offset_y));

    let opts = dpframe::CpuRendererOpts::default().with_shadow(!args.no_shadow);
    let dp = session.generate(&mut dpframe::CpuRenderer::new(opts), &mut text)?;

    let out = args.out_dir.join(&dp.file_name);
    write_file(&out, &dp.png)?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_shape(args: ShapeArgs) -> anyhow::Result<()> {
    let path = dpframe::build_path(args.kind, args.x, args.y, args.width, args.height)?;
    println!("{}", path.to_svg());
    Ok(())
}

fn load_frame(
    inputs: &FrameInputs,
) -> anyhow::Result<(dpframe::DpFrame, Option<dpframe::PreparedImage>)> {
    let frame = dpframe::DpFrame::from_path(&inputs.frame)
        .with_context(|| format!("load frame '{}'", inputs.frame.display()))?;
    let frame_image = match &inputs.frame_image {
        Some(path) => {
            let bytes =
                std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
            Some(dpframe::decode_image(&bytes)?)
        }
        None => {
            if !frame.frame_image_url.is_empty() {
                tracing::warn!(
                    frame_image_url = %frame.frame_image_url,
                    "frame references artwork but no --frame-image was given; rendering without it"
                );
            }
            None
        }
    };
    Ok((frame, frame_image))
}

fn load_fonts(paths: &[PathBuf]) -> anyhow::Result<dpframe::TextLayoutEngine> {
    let mut engine = dpframe::TextLayoutEngine::from_env()?;
    for path in paths {
        if path.is_dir() {
            engine.register_font_dir(path)?;
        } else {
            engine.register_font_file(path)?;
        }
    }
    if !engine.has_fonts() {
        tracing::warn!("no fonts registered; name text will not be drawn");
    }
    Ok(engine)
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}
