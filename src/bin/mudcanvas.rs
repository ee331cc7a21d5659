use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use mudcanvas::SurfaceRegistry as _;

#[derive(Parser, Debug)]
#[command(name = "mudcanvas", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a draw script and write one widget as a PNG.
    Render(RenderArgs),
    /// Print the color spans of MUD-coded text.
    Colors(ColorsArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input draw script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Widget to export (defaults to the first declared widget).
    #[arg(long)]
    widget: Option<String>,

    /// Extra font directory (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Settings JSON; environment overrides are applied on top.
    #[arg(long)]
    settings: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ColorsArgs {
    /// Text containing `$` color codes.
    text: String,

    /// Color for text before the first code.
    #[arg(long, default_value = "white")]
    default: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Colors(args) => cmd_colors(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let script = mudcanvas::DrawScript::from_path(&args.in_path)?;
    script.validate()?;

    let mut settings = match &args.settings {
        Some(path) => mudcanvas::CanvasSettings::from_json_path(path)?,
        None => mudcanvas::CanvasSettings::default(),
    }
    .with_env_overrides();
    settings.font_dirs.extend(args.font_dirs);
    if settings.asset_root.is_none() {
        settings.asset_root = args.in_path.parent().map(PathBuf::from);
    }

    let widget = match args.widget.or_else(|| script.widgets.first().map(|w| w.id.clone())) {
        Some(id) => id,
        None => anyhow::bail!("script declares no widgets"),
    };

    let mut engine = mudcanvas::DrawEngine::in_memory(settings);
    let report = mudcanvas::run_script(&mut engine, &script)?;
    for (index, error) in &report.failures {
        eprintln!("command {index}: {error}");
    }
    if report.batch_failures > 0 {
        eprintln!("{} batched op(s) failed", report.batch_failures);
    }

    let surface = engine
        .registry()
        .resolve(&widget)
        .with_context(|| format!("widget '{widget}' not found in script"))?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &surface.to_rgba8_straight(),
        surface.width(),
        surface.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({} ok, {} failed)",
        args.out.display(),
        report.succeeded,
        report.failures.len()
    );
    Ok(())
}

fn cmd_colors(args: ColorsArgs) -> anyhow::Result<()> {
    let default = mudcanvas::parse_color(&args.default)?;
    for span in mudcanvas::colorize(&args.text, default) {
        let c = span.color;
        println!(
            "#{:02x}{:02x}{:02x}{:02x}\t{:?}",
            c.r, c.g, c.b, c.a, span.text
        );
    }
    Ok(())
}
