use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "vizplay", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the frame at one elapsed time as a PNG.
    Frame(FrameArgs),
    /// Play a spec to completion and write every drawn frame as a PNG.
    Play(PlayArgs),
    /// Print layer classification, applied defaults and validation findings.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct ViewArgs {
    /// Device pixel ratio (defaults to `VIZPLAY_DPR`, then 1).
    #[arg(long)]
    dpr: Option<f64>,

    /// Disable drop shadows.
    #[arg(long)]
    no_shadows: bool,

    /// Background color (any CSS color); `transparent` leaves the surface clear.
    #[arg(long)]
    background: Option<String>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input visualization spec JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Elapsed time in milliseconds (clamped to the spec's duration).
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    view: ViewArgs,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Input visualization spec JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for `frame_<n>_<elapsed>ms.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Display refresh rate driving ticks.
    #[arg(long, default_value_t = 60.0)]
    refresh_hz: f64,

    /// Sleep in real time between refreshes instead of simulating time.
    #[arg(long)]
    realtime: bool,

    #[command(flatten)]
    view: ViewArgs,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input visualization spec JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Also print the spec with defaults applied.
    #[arg(long)]
    normalized: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Play(args) => cmd_play(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn viewport_opts(args: &ViewArgs) -> anyhow::Result<vizplay::ViewportOpts> {
    let mut opts = vizplay::ViewportOpts::from_env();
    if let Some(dpr) = args.dpr {
        anyhow::ensure!(dpr.is_finite() && dpr > 0.0, "--dpr must be > 0, got {dpr}");
        opts.device_pixel_ratio = dpr;
    }
    opts.shadows = !args.no_shadows;
    if let Some(bg) = &args.background {
        opts.background = if bg == "transparent" {
            None
        } else {
            Some(
                vizplay::parse_rgba8(bg)
                    .with_context(|| format!("parse --background color '{bg}'"))?,
            )
        };
    }
    Ok(opts)
}

fn load(path: &std::path::Path) -> anyhow::Result<vizplay::VisualizationSpec> {
    vizplay::VisualizationSpec::from_path(path)
        .with_context(|| format!("load spec '{}'", path.display()))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let spec = load(&args.in_path)?;
    let mut controller = vizplay::PlaybackController::with_queue(viewport_opts(&args.view)?)?;
    controller.load_spec(spec)?;
    controller.preview_at(args.at)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    vizplay::write_png(&args.out, &controller.frame())?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let spec = load(&args.in_path)?;
    let mut controller = vizplay::PlaybackController::with_queue(viewport_opts(&args.view)?)?;
    controller.load_spec(spec)?;
    controller.set_playing(true);

    let mut refresh = vizplay::RefreshLoop::new(vizplay::RefreshLoopOpts {
        refresh_hz: args.refresh_hz,
        realtime: args.realtime,
    })?;
    let mut sink = vizplay::PngDirSink::new(&args.out_dir);
    let stats = refresh.run(&mut controller, &mut sink)?;

    eprintln!(
        "wrote {} frames to {} ({} ticks, {} throttled)",
        stats.frames_drawn,
        args.out_dir.display(),
        stats.ticks,
        stats.ticks_throttled
    );
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let spec = load(&args.in_path)?;
    let classified = vizplay::classify_layers(&spec.layers);

    println!("id:        {}", spec.id);
    println!("duration:  {} ms", spec.duration_ms);
    println!("fps:       {}", spec.fps);
    println!(
        "layers:    {} ({} static, {} dynamic)",
        classified.len(),
        classified.static_layers.len(),
        classified.dynamic_layers.len()
    );
    for (i, layer) in spec.layers.iter().enumerate() {
        let id = layer.id.as_deref().unwrap_or("-");
        let role = if layer.is_dynamic() { "dynamic" } else { "static" };
        println!(
            "  [{i}] {:<8} {id:<16} {role} ({} animations)",
            layer.kind.name(),
            layer.animations.len()
        );
    }

    let issues = spec.validate();
    if issues.is_empty() {
        println!("issues:    none");
    } else {
        println!("issues:");
        for issue in &issues {
            println!("  {issue}");
        }
    }

    if args.normalized {
        println!("{}", spec.to_json_string_pretty()?);
    }
    Ok(())
}
