use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "flipbook", version)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flatten a single frame to a PNG.
    Frame(FrameArgs),
    /// Export the whole animation as an animated GIF.
    Gif(GifArgs),
    /// Print frame count and duration.
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Ghost the neighbouring frames beneath this one.
    #[arg(long, default_value_t = false)]
    onion: bool,

    /// Scale the result down to fit this many pixels on its longest side.
    #[arg(long)]
    max_side: Option<u32>,
}

#[derive(Parser, Debug)]
struct GifArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,

    /// Number of plays; 0 loops forever.
    #[arg(long, default_value_t = 0)]
    loop_count: u16,

    /// Output scale relative to the canvas.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Encoder quality, 1..=100.
    #[arg(long, default_value_t = 80)]
    quality: u8,

    /// Matte color behind transparent pixels, `#rrggbb` or `#rrggbbaa`.
    #[arg(long)]
    background: Option<String>,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Gif(args) => cmd_gif(args),
        Command::Info(args) => cmd_info(args),
    }
}

fn ensure_parent(path: &std::path::Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let seq = flipbook::AnimationSequence::load(&args.in_path)?;
    let frame = seq.frames.get(args.frame).with_context(|| {
        format!(
            "frame {} out of range (frames: {})",
            args.frame,
            seq.frame_count()
        )
    })?;

    let mut img = if args.onion {
        flipbook::render_onion_skin(&seq, args.frame, &flipbook::OnionSkinOpts::default())?
    } else {
        flipbook::composite_layers(&frame.layers, seq.canvas, &flipbook::CompositeOpts::default())?
    };
    if let Some(max_side) = args.max_side {
        img = img.fit_within(max_side)?;
    }

    ensure_parent(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        img.as_bytes(),
        img.width(),
        img.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_gif(args: GifArgs) -> anyhow::Result<()> {
    let seq = flipbook::AnimationSequence::load(&args.in_path)?;
    let background = args
        .background
        .as_deref()
        .map(flipbook::Rgba8::from_hex)
        .transpose()?;
    let opts = flipbook::ExportOpts {
        quality: args.quality,
        loop_count: args.loop_count,
        scale: args.scale,
        background,
    };

    ensure_parent(&args.out)?;
    let stats = flipbook::save_gif(&seq, &opts, &args.out)?;

    eprintln!(
        "wrote {} ({} frames, {} ms)",
        args.out.display(),
        stats.frames,
        stats.total_delay_ms
    );
    Ok(())
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let seq = flipbook::AnimationSequence::load(&args.in_path)?;
    println!("canvas: {}x{}", seq.canvas.width, seq.canvas.height);
    println!("fps: {}", seq.fps.get());
    println!("frames: {}", seq.frame_count());
    println!("total_ticks: {}", seq.total_duration_ticks());
    println!("duration_secs: {:.3}", seq.total_duration_secs());
    Ok(())
}
