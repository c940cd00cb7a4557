use std::{
    fs::File,
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use phylomovie::{
    Command as EngineCommand, Engine, EngineOpts, LeafSet, MovieData, RenderDescriptor, Stage,
};

#[derive(Parser, Debug)]
#[command(name = "phylomovie", version)]
struct Cli {
    /// Log at debug level instead of warn.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a payload and print the report as JSON.
    Validate(CommonArgs),
    /// Print the engine state at one frame.
    Inspect(InspectArgs),
    /// Play the movie headless and print one JSON line per tick.
    Play(PlayArgs),
    /// Apply a JSON array of commands and print the state after each.
    Script(ScriptArgs),
    /// Print the movie summary.
    Summary(CommonArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Input movie JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Engine options JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Frame index (0-based).
    #[arg(long, allow_negative_numbers = true)]
    index: i64,
}

#[derive(Args, Debug)]
struct PlayArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Ticks per second of the simulated animation-frame source.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Playback rate.
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    rate: f64,

    /// Stop after this many ticks.
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,
}

#[derive(Args, Debug)]
struct ScriptArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// JSON array of commands, e.g. `[{"cmd":"forward"}]`.
    #[arg(long)]
    script: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Play(args) => cmd_play(args),
        Command::Script(args) => cmd_script(args),
        Command::Summary(args) => cmd_summary(args),
    }
}

fn read_movie_json(path: &Path) -> anyhow::Result<MovieData> {
    let f = File::open(path).with_context(|| format!("open movie '{}'", path.display()))?;
    let data: MovieData =
        serde_json::from_reader(BufReader::new(f)).with_context(|| "parse movie JSON")?;
    Ok(data.normalized())
}

fn read_opts(path: Option<&Path>) -> anyhow::Result<EngineOpts> {
    let Some(path) = path else {
        return Ok(EngineOpts::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    Ok(EngineOpts::from_json_str(&text)?)
}

fn load_engine(args: &CommonArgs) -> anyhow::Result<Engine> {
    let opts = read_opts(args.config.as_deref())?;
    let data = read_movie_json(&args.in_path)?;
    let mut engine = Engine::new(opts);
    let report = engine.load(data)?;
    for w in &report.warnings {
        tracing::warn!("{w}");
    }
    Ok(engine)
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value).with_context(|| "write JSON")?;
    writeln!(out)?;
    Ok(())
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct DescriptorView<'a> {
    source_index: usize,
    target_index: usize,
    interpolated_index: usize,
    progress: f64,
    stage: Stage,
    phase: &'static str,
    active_change_edge: &'a LeafSet,
    subtree: &'a LeafSet,
    scale: f64,
    tweened: bool,
}

impl<'a> From<&RenderDescriptor<'a>> for DescriptorView<'a> {
    fn from(d: &RenderDescriptor<'a>) -> Self {
        Self {
            source_index: d.source_index,
            target_index: d.target_index,
            interpolated_index: d.interpolated_index,
            progress: d.progress,
            stage: d.stage,
            phase: d.phase.as_str(),
            active_change_edge: d.active_change_edge,
            subtree: d.subtree,
            scale: d.scale,
            tweened: d.tweened,
        }
    }
}

fn cmd_validate(args: CommonArgs) -> anyhow::Result<()> {
    let opts = read_opts(args.config.as_deref())?;
    let data = read_movie_json(&args.in_path)?;
    let report = phylomovie::validate_movie(&data, &opts.validation);
    print_json(&report)?;
    if !report.is_valid() {
        anyhow::bail!("payload has {} fatal issue(s)", report.issues.len());
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let mut engine = load_engine(&args.common)?;
    engine.go_to_index(args.index);
    let descriptor = engine.current_render_descriptor();
    let view = serde_json::json!({
        "snapshot": engine.snapshot(),
        "msaWindow": engine.msa_window(),
        "distances": engine.current_distances(),
        "descriptor": descriptor.as_ref().map(DescriptorView::from),
    });
    drop(descriptor);
    print_json(&view)?;
    for c in engine.take_conditions() {
        eprintln!("{c}");
    }
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        anyhow::bail!("--fps must be > 0");
    }
    let mut engine = load_engine(&args.common)?;
    engine.set_rate(args.rate);
    engine.play();

    let frame_ms = 1000.0 / args.fps;
    let mut out = std::io::stdout().lock();
    for tick in 0..args.max_ticks {
        let report = engine.tick(tick as f64 * frame_ms);
        serde_json::to_writer(&mut out, &report).with_context(|| "write tick")?;
        writeln!(out)?;
        if report.finished {
            break;
        }
    }
    if let Some(request) = engine.flush_msa_sync() {
        serde_json::to_writer(&mut out, &request).with_context(|| "write msa sync")?;
        writeln!(out)?;
    }
    for c in engine.take_conditions() {
        eprintln!("{c}");
    }
    Ok(())
}

fn cmd_script(args: ScriptArgs) -> anyhow::Result<()> {
    let mut engine = load_engine(&args.common)?;
    let text = std::fs::read_to_string(&args.script)
        .with_context(|| format!("read script '{}'", args.script.display()))?;
    let commands: Vec<EngineCommand> =
        serde_json::from_str(&text).with_context(|| "parse script JSON")?;

    let mut out = std::io::stdout().lock();
    for command in commands {
        engine.apply(command);
        serde_json::to_writer(&mut out, &engine.snapshot()).with_context(|| "write snapshot")?;
        writeln!(out)?;
    }
    for c in engine.take_conditions() {
        eprintln!("{c}");
    }
    Ok(())
}

fn cmd_summary(args: CommonArgs) -> anyhow::Result<()> {
    let engine = load_engine(&args)?;
    print_json(&engine.summary())
}
