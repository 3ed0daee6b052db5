use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use chartcast::{
    AnimationProfile, CaptureTarget, ChartKind, DataPoint, DataSeries, ProfileCatalog, Recorder,
    RecordingOpts, SeriesSet, SvgSnapshot, estimate_duration, rasterize_snapshot,
};

#[derive(Parser, Debug)]
#[command(name = "chartcast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the estimated animation duration for a chart and data set.
    Estimate(EstimateArgs),
    /// Render one frame of the built-in demo chart as a PNG.
    Frame(FrameArgs),
    /// Record the built-in demo chart animation to a WebM file
    /// (requires `ffmpeg` on PATH).
    Record(RecordArgs),
}

#[derive(Parser, Debug)]
struct EstimateArgs {
    /// Chart kind (line, area, pie, donut, vertical_bar, horizontal_bar, bar_race).
    #[arg(long, default_value = "vertical_bar")]
    kind: String,

    /// Animation style key from the built-in catalog.
    #[arg(long, default_value = "basic")]
    style: String,

    /// Data series JSON; the demo data set is used when omitted.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Animation progress in [0, 1].
    #[arg(long, default_value_t = 1.0)]
    progress: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Frame width in pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Frame height in pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Data series JSON; the demo data set is used when omitted.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RecordArgs {
    /// Chart kind for duration estimation.
    #[arg(long, default_value = "vertical_bar")]
    kind: String,

    /// Animation style key from the built-in catalog.
    #[arg(long, default_value = "basic")]
    style: String,

    /// Output WebM path.
    #[arg(long)]
    out: PathBuf,

    /// Sampling and encoding frame rate.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Device-pixel scale applied to the chart's logical size.
    #[arg(long, default_value_t = 2)]
    pixel_ratio: u32,

    /// Data series JSON; the demo data set is used when omitted.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Estimate(args) => cmd_estimate(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Record(args) => cmd_record(args).await,
    }
}

fn read_series_json(path: &Path) -> anyhow::Result<SeriesSet> {
    let f = File::open(path).with_context(|| format!("open series '{}'", path.display()))?;
    let r = BufReader::new(f);
    let series: SeriesSet = serde_json::from_reader(r).with_context(|| "parse series JSON")?;
    series.validate()?;
    Ok(series)
}

fn load_series(path: Option<&Path>) -> anyhow::Result<SeriesSet> {
    match path {
        Some(p) => read_series_json(p),
        None => Ok(demo_series()),
    }
}

fn lookup_profile<'a>(
    catalog: &'a ProfileCatalog,
    kind: ChartKind,
    style: &str,
) -> anyhow::Result<&'a AnimationProfile> {
    catalog.get(kind, style).ok_or_else(|| {
        anyhow::anyhow!(
            "no style '{style}' for kind '{}'; available: {}",
            kind.as_str(),
            catalog.styles_for(kind).join(", ")
        )
    })
}

fn cmd_estimate(args: EstimateArgs) -> anyhow::Result<()> {
    let kind: ChartKind = args.kind.parse()?;
    let catalog = ProfileCatalog::builtin();
    let profile = lookup_profile(&catalog, kind, &args.style)?;
    let series = load_series(args.in_path.as_deref())?;

    let estimated = estimate_duration(kind, Some(profile), &series);
    println!(
        "{} / {} ({} points): {} ms",
        kind.as_str(),
        profile.name,
        series.max_points(),
        estimated.as_millis()
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let series = load_series(args.in_path.as_deref())?;
    let svg = demo_chart_svg(&series, args.progress.clamp(0.0, 1.0), 640, 360);
    let rgba = rasterize_snapshot(&SvgSnapshot::new(svg), args.width, args.height)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &rgba,
        args.width,
        args.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

async fn cmd_record(args: RecordArgs) -> anyhow::Result<()> {
    let kind: ChartKind = args.kind.parse()?;
    let catalog = ProfileCatalog::builtin();
    let profile = lookup_profile(&catalog, kind, &args.style)?;
    let series = load_series(args.in_path.as_deref())?;

    let expected = estimate_duration(kind, Some(profile), &series);
    let target = Arc::new(DemoChart::new(series.clone(), expected));

    let mut recorder = Recorder::new(RecordingOpts {
        frame_rate: args.fps,
        pixel_ratio: args.pixel_ratio,
        ..RecordingOpts::default()
    });
    let handle = recorder.start(target, &series, kind, Some(profile))?;

    let mut progress = handle.progress_watch();
    let reporter = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            eprint!("\rrecording: {:>3.0}%", *progress.borrow() * 100.0);
        }
        eprintln!();
    });

    let artifact = handle
        .wait()
        .await
        .ok_or_else(|| anyhow::anyhow!("recording did not produce an artifact"))?;
    let _ = reporter.await;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, artifact.data.as_slice())
        .with_context(|| format!("write webm '{}'", args.out.display()))?;

    eprintln!("wrote {} ({} bytes)", args.out.display(), artifact.data.len());
    Ok(())
}

fn demo_series() -> SeriesSet {
    SeriesSet::new(vec![DataSeries {
        name: "Quarterly revenue".to_string(),
        points: vec![
            DataPoint { label: "Q1".to_string(), value: 42.0 },
            DataPoint { label: "Q2".to_string(), value: 67.0 },
            DataPoint { label: "Q3".to_string(), value: 55.0 },
            DataPoint { label: "Q4".to_string(), value: 90.0 },
        ],
    }])
}

/// A self-animating bar chart used as the demo capture target: bar heights
/// ease in over the expected animation duration.
struct DemoChart {
    series: SeriesSet,
    duration: Duration,
    started: Instant,
}

impl DemoChart {
    fn new(series: SeriesSet, duration: Duration) -> Self {
        Self {
            series,
            duration,
            started: Instant::now(),
        }
    }
}

impl CaptureTarget for DemoChart {
    fn is_attached(&self) -> bool {
        true
    }

    fn size(&self) -> (u32, u32) {
        (640, 360)
    }

    fn snapshot(&self) -> Option<SvgSnapshot> {
        let progress = (self.started.elapsed().as_secs_f64() / self.duration.as_secs_f64())
            .clamp(0.0, 1.0);
        Some(SvgSnapshot::new(demo_chart_svg(
            &self.series,
            progress,
            640,
            360,
        )))
    }
}

/// Draw the first series of `set` as vertical bars at `progress` (cubic
/// ease-out), as a complete SVG document.
fn demo_chart_svg(set: &SeriesSet, progress: f64, width: u32, height: u32) -> String {
    let eased = {
        let inv = 1.0 - progress;
        1.0 - inv * inv * inv
    };

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
         viewBox=\"0 0 {width} {height}\">\
         <rect width=\"{width}\" height=\"{height}\" fill=\"#ffffff\"/>"
    );

    let points: &[DataPoint] = set.series.first().map(|s| s.points.as_slice()).unwrap_or(&[]);
    let max = points.iter().map(|p| p.value).fold(f64::EPSILON, f64::max);
    let n = points.len().max(1) as f64;

    let margin = 40.0;
    let plot_w = f64::from(width) - margin * 2.0;
    let plot_h = f64::from(height) - margin * 2.0;
    let slot = plot_w / n;
    let bar_w = slot * 0.6;

    for (i, p) in points.iter().enumerate() {
        let full_h = (p.value / max) * plot_h;
        let bar_h = full_h * eased;
        let x = margin + slot * (i as f64) + (slot - bar_w) / 2.0;
        let y = margin + plot_h - bar_h;
        svg.push_str(&format!(
            "<rect x=\"{x:.1}\" y=\"{y:.1}\" width=\"{bar_w:.1}\" height=\"{bar_h:.1}\" \
             fill=\"#4f7cac\"/>\
             <text x=\"{cx:.1}\" y=\"{ly:.1}\" font-family=\"sans-serif\" font-size=\"14\" \
             text-anchor=\"middle\" fill=\"#333333\">{label}</text>",
            cx = x + bar_w / 2.0,
            ly = margin + plot_h + 20.0,
            label = xml_escape(&p.label),
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// Escape text for use inside an SVG text node; labels are free-form.
fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
