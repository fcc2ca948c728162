//! spreadview - Spread-at-a-time page viewer engine.
//!
//! Usage:
//!   spreadview urls --base-path P --total N      List page image URLs
//!   spreadview browse DIR --keys "→→←"           Scripted navigation session
//!   spreadview browse --config catalog.toml      Same, from a TOML catalog
//!   spreadview scrub --total N --width W X...    Map pointer positions to spreads
//!   spreadview --help                            Show help

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, bail, eyre};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::broadcast;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use spreadview_engine::{
    Animator, FsLoader, InstantAnimator, NavigationIntent, NavigationOutcome, Navigator,
    NavigatorConfig, NavigatorEvent, SleepAnimator,
};
use spreadview_input::{InputAdapter, spread_at, tooltip_left};

#[derive(Parser)]
#[command(
    name = "spreadview",
    version,
    about = "Spread-at-a-time page viewer engine",
    long_about = "spreadview drives the page navigator headlessly.\n\n\
                  Use `browse` to run a scripted session against a directory of \
                  page images and watch the events it emits."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the image URL of every page
    Urls {
        /// Base path; URLs are `{base}_{page:04}.{ext}`
        #[arg(short, long)]
        base_path: String,

        /// Number of pages
        #[arg(short, long)]
        total: usize,

        /// Absolute number of the first page
        #[arg(short, long, default_value = "1")]
        first: i64,

        /// Image file extension
        #[arg(short, long, default_value = "webp")]
        ext: String,
    },

    /// Run a scripted navigation session and print events as JSON lines
    Browse {
        /// Directory holding `{name}_{page:04}.{ext}` images
        #[arg(required_unless_present = "config")]
        dir: Option<PathBuf>,

        /// TOML catalog file instead of a directory
        #[arg(short, long, conflicts_with = "dir")]
        config: Option<PathBuf>,

        /// Image file extension when scanning a directory
        #[arg(short, long, default_value = "webp")]
        ext: String,

        /// Key presses: → l n step forward, ← h p step back
        #[arg(short, long, default_value = "")]
        keys: String,

        /// Click positions across the viewer, applied after the keys
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        click: Vec<f32>,

        /// Viewer width used to resolve clicks
        #[arg(short, long, default_value = "1000")]
        width: f32,

        /// Absolute pages to jump to, applied last
        #[arg(short, long, allow_hyphen_values = true)]
        goto: Vec<i64>,

        /// Skip animation timing
        #[arg(long)]
        instant: bool,
    },

    /// Print the 1-based spread under each pointer position of a strip
    Scrub {
        /// Number of spreads on the strip
        #[arg(short, long)]
        total: usize,

        /// Strip width
        #[arg(short, long)]
        width: f32,

        /// Tooltip width; prints the clamped tooltip offset too
        #[arg(long)]
        tooltip_width: Option<f32>,

        /// Pointer positions
        #[arg(required = true, allow_hyphen_values = true)]
        x: Vec<f32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Logs go to stderr so stdout stays machine readable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Urls {
            base_path,
            total,
            first,
            ext,
        } => {
            run_urls(base_path, total, first, ext)?;
        }
        Command::Browse {
            dir,
            config,
            ext,
            keys,
            click,
            width,
            goto,
            instant,
        } => {
            let config = match (config, dir) {
                (Some(path), _) => NavigatorConfig::load(&path)
                    .with_context(|| format!("Failed to load {}", path.display()))?,
                (None, Some(dir)) => discover_catalog(&dir, &ext)?,
                (None, None) => bail!("Either a directory or --config is required"),
            };
            let script = Script::parse(&keys, &click, &goto)?;
            run_browse(config, script, width, instant).await?;
        }
        Command::Scrub {
            total,
            width,
            tooltip_width,
            x,
        } => {
            run_scrub(total, width, tooltip_width, &x);
        }
    }

    Ok(())
}

/// Print every page URL of a sequence.
fn run_urls(base_path: String, total: usize, first: i64, ext: String) -> Result<()> {
    let config = NavigatorConfig::builder()
        .base_path(base_path)
        .total_count(total)
        .first_index(first)
        .extension(ext)
        .build()
        .map_err(|e| eyre!("Invalid configuration: {e}"))?;

    for relative in 0..config.total_count {
        println!("{}", config.url_for(relative));
    }
    Ok(())
}

/// Print spread numbers for pointer positions.
fn run_scrub(total: usize, width: f32, tooltip_width: Option<f32>, xs: &[f32]) {
    for &x in xs {
        let spread = spread_at(x, width, total).map_or_else(|| "-".to_string(), |s| s.to_string());
        match tooltip_width {
            Some(tooltip) => println!("{x}\t{spread}\t{}", tooltip_left(x, width, tooltip)),
            None => println!("{x}\t{spread}"),
        }
    }
}

/// One scripted input.
#[derive(Debug, Clone, Copy)]
enum Step {
    Key(KeyCode),
    Click(f32),
    Goto(i64),
}

#[derive(Debug, Default)]
struct Script {
    steps: Vec<Step>,
}

impl Script {
    fn parse(keys: &str, clicks: &[f32], gotos: &[i64]) -> Result<Self> {
        let mut steps = Vec::new();
        for ch in keys.chars().filter(|c| !c.is_whitespace()) {
            let code = match ch {
                '→' | 'l' | 'n' => KeyCode::Right,
                '←' | 'h' | 'p' => KeyCode::Left,
                other => bail!("Unknown key '{other}' (use → l n or ← h p)"),
            };
            steps.push(Step::Key(code));
        }
        steps.extend(clicks.iter().copied().map(Step::Click));
        steps.extend(gotos.iter().copied().map(Step::Goto));
        Ok(Self { steps })
    }
}

/// Run a scripted session, printing every event as a JSON line.
async fn run_browse(config: NavigatorConfig, script: Script, width: f32, instant: bool) -> Result<()> {
    info!(base_path = %config.base_path, total = config.total_count, "starting session");

    let adapter = InputAdapter::with_zones(config.click_zones);
    let animator: Arc<dyn Animator> = if instant {
        Arc::new(InstantAnimator)
    } else {
        Arc::new(SleepAnimator::new())
    };
    let navigator = Navigator::new(config, Arc::new(FsLoader::new()), animator);
    let mut events = navigator.subscribe();

    navigator.mount().await.context("Failed to show the first page")?;
    print_events(&mut events)?;

    for step in script.steps {
        let intent = match step {
            Step::Key(code) => adapter.on_key(KeyEvent::new(code, KeyModifiers::NONE)).intent,
            Step::Click(x) => adapter.on_click(x, width),
            Step::Goto(absolute) => Some(NavigationIntent::Goto(absolute)),
        };
        let Some(intent) = intent else {
            debug!(?step, "input ignored");
            continue;
        };

        match navigator.request(intent).await {
            NavigationOutcome::Committed(transition) => {
                debug!(from = transition.from, to = transition.to, "step done");
            }
            NavigationOutcome::Dropped(reason) => eprintln!("{step:?}: dropped ({reason})"),
            NavigationOutcome::LoadFailed(err) => eprintln!("{step:?}: {err}"),
        }
        print_events(&mut events)?;
    }

    eprintln!(
        "Finished on page {} of {}",
        navigator.current_absolute(),
        navigator.total()
    );
    Ok(())
}

fn print_events(events: &mut broadcast::Receiver<NavigatorEvent>) -> Result<()> {
    loop {
        match events.try_recv() {
            Ok(event) => println!("{}", serde_json::to_string(&event)?),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                eprintln!("{skipped} event(s) skipped");
            }
            Err(_) => return Ok(()),
        }
    }
}

/// Build a config from a directory of `{name}_{page:04}.{ext}` images.
///
/// All images must share one name. Pages are numbered from the lowest page
/// found to the highest; gaps surface as load failures when reached.
fn discover_catalog(dir: &Path, ext: &str) -> Result<NavigatorConfig> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?;

    let mut names = BTreeSet::new();
    let mut pages = BTreeSet::new();
    for entry in entries {
        let file_name = entry?.file_name();
        let Some((name, page)) = file_name.to_str().and_then(|f| split_page_name(f, ext)) else {
            continue;
        };
        names.insert(name.to_string());
        pages.insert(page);
    }

    let name = match names.len() {
        0 => bail!("No *_NNNN.{ext} images in {}", dir.display()),
        1 => names.pop_first().unwrap_or_default(),
        _ => bail!("Mixed image names in {}: {:?}", dir.display(), names),
    };
    let (Some(&first), Some(&last)) = (pages.first(), pages.last()) else {
        bail!("No pages found in {}", dir.display());
    };

    let config = NavigatorConfig::builder()
        .base_path(dir.join(name).to_string_lossy().into_owned())
        .total_count((last - first + 1) as usize)
        .first_index(first)
        .extension(ext)
        .build()
        .map_err(|e| eyre!("Invalid catalog: {e}"))?;
    debug!(first, last, found = pages.len(), "catalog discovered");
    Ok(config)
}

/// Split `K3519_0007.webp` into `("K3519", 7)`.
fn split_page_name<'a>(file_name: &'a str, ext: &str) -> Option<(&'a str, i64)> {
    let stem = file_name.strip_suffix(ext)?.strip_suffix('.')?;
    let (name, digits) = stem.rsplit_once('_')?;
    if name.is_empty() || digits.len() < 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((name, digits.parse().ok()?))
}
