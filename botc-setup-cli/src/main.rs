mod assets;
mod reports;
mod storage;
mod util;

use anyhow::{Context, Result};
use botc_setup::{SelAction, SetupEngine, seeded_rng};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use log::{info, warn};
use std::fs::{self, File};
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;

use assets::FsCatalogSource;
use reports::{SetupReport, generate_console_report, generate_json_report};
use storage::JsonFileStore;
use util::{resolve_on_script, script_id_for, split_csv};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored summary for the terminal
    Console,
    /// Machine-readable setup report
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "botc-setup", version)]
#[command(about = "Build a Blood on the Clocktower game setup from a script")]
struct Args {
    /// Directory holding roles.json, botc_online_roles.json, nightsheet.json
    /// and an optional overrides.json
    #[arg(long, default_value = "assets/data")]
    assets: PathBuf,

    /// Script-tool JSON file
    #[arg(long)]
    script: PathBuf,

    /// Number of players (defaults to the saved count, or 8)
    #[arg(long)]
    players: Option<usize>,

    /// Seed for the ranking and random setup (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Characters to select (comma-separated ids or names)
    #[arg(long, default_value = "")]
    select: String,

    /// Fill the rest of the bag with random characters
    #[arg(long)]
    random_setup: bool,

    /// Include the first and other night order
    #[arg(long)]
    night_order: bool,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory for saved sessions, one JSON file per script
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Forget any saved session for the script before starting
    #[arg(long)]
    reset: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.report == ReportFormat::Console && args.output.is_none() {
        announce_banner();
    }

    let report = build_setup(&args)?;
    write_report(&args, &report)
}

fn announce_banner() {
    println!("{}", "🕰️  Clocktower Setup".bright_cyan().bold());
    println!("{}", "====================".cyan());
}

fn build_setup(args: &Args) -> Result<SetupReport> {
    let source = FsCatalogSource::new(&args.assets);
    let engine = SetupEngine::load(&source, JsonFileStore::new(args.state_dir.clone()))
        .with_context(|| format!("failed to load assets from {}", args.assets.display()))?;

    let script_id = script_id_for(&args.script);
    let json = fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read script {}", args.script.display()))?;
    let script = engine
        .script_from_json(&script_id, &json)
        .with_context(|| format!("failed to load script {}", args.script.display()))?;

    if args.reset {
        engine
            .forget_session(&script_id)
            .context("failed to reset saved session")?;
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    info!("using seed {seed}");
    let mut rng = seeded_rng(seed);
    let mut session = engine
        .open_session(script, &mut rng)
        .context("failed to open saved session")?;

    if let Some(players) = args.players {
        let seated = session.set_num_players(players);
        if seated != players {
            warn!("{players} players is out of range, using {seated}");
        }
    }
    for token in split_csv(&args.select) {
        let id = resolve_on_script(session.script(), &token)?;
        if !session.selection().contains(&id) {
            session.dispatch(&SelAction::toggle(id));
        }
    }
    if args.random_setup {
        session.random_setup(&mut rng);
    }

    engine
        .save_session(&session)
        .context("failed to save session")?;
    SetupReport::build(engine.catalog(), &session, seed, args.night_order)
        .context("failed to build setup report")
}

fn write_report(args: &Args, report: &SetupReport) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report {
        ReportFormat::Json => generate_json_report(&mut output_target, report)?,
        ReportFormat::Console => generate_console_report(&mut output_target, report)?,
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
