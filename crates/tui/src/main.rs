mod app;
mod backend;
mod renderer;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use seatplan_core::config::EditorConfig;
use seatplan_core::editor::EditorSession;
use seatplan_core::flatten::seat_definitions;
use seatplan_core::model::Dimensions;
use seatplan_core::parsers::{HydrationPolicy, parse_bus_detail, parse_layout_auto};
use seatplan_core::submit::BusForm;
use seatplan_protocol::BusType;

use crate::app::App;
use crate::backend::FileBackend;

/// Design bus seat maps in the terminal.
#[derive(Debug, Parser)]
#[command(name = "seatplan", version)]
struct Cli {
    /// Editor config (JSON). Defaults apply to anything it leaves out.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Append logs to this file.
    #[arg(long, global = true, value_name = "PATH")]
    log: Option<PathBuf>,

    /// Log debug output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Lay out a new bus and save it.
    New {
        #[arg(long)]
        decks: Option<usize>,
        #[arg(long)]
        rows: Option<usize>,
        #[arg(long)]
        cols: Option<usize>,
        /// Directory the bus and seat-map JSON are written to.
        #[arg(long, default_value = ".")]
        out: PathBuf,
        #[arg(long)]
        operator: Option<String>,
        #[arg(long, default_value = "")]
        plate: String,
        #[arg(long, default_value = "")]
        model: String,
        #[arg(long, value_enum, default_value_t = BusKind::Sleeper)]
        bus_type: BusKind,
    },
    /// Open a stored bus detail document for editing.
    Edit {
        bus: PathBuf,
        /// Browse the layout without saving.
        #[arg(long)]
        view_only: bool,
        /// Accept legacy seat records.
        #[arg(long)]
        lenient: bool,
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Replace the bus's operator.
        #[arg(long)]
        operator: Option<String>,
    },
    /// Print the seat definitions of a stored layout as JSON.
    Flatten {
        input: PathBuf,
        #[arg(long)]
        lenient: bool,
    },
    /// Print a stored layout as SVG.
    Svg {
        input: PathBuf,
        #[arg(long)]
        dark: bool,
        #[arg(long)]
        lenient: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BusKind {
    Sleeper,
    Limousine,
    Seater,
    Vip,
}

impl From<BusKind> for BusType {
    fn from(kind: BusKind) -> Self {
        match kind {
            BusKind::Sleeper => BusType::Sleeper,
            BusKind::Limousine => BusType::Limousine,
            BusKind::Seater => BusType::Seater,
            BusKind::Vip => BusType::Vip,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, Command::New { .. } | Command::Edit { .. });
    init_logging(cli.log.as_deref(), cli.verbose, interactive)?;

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::New {
            decks,
            rows,
            cols,
            out,
            operator,
            plate,
            model,
            bus_type,
        } => {
            let base = config.default_dimensions;
            let dims = Dimensions::new(
                decks.unwrap_or(base.decks),
                rows.unwrap_or(base.rows),
                cols.unwrap_or(base.cols),
            );
            let session = EditorSession::new_bus_with(&config, dims)?;
            let form = BusForm {
                operator_id: operator,
                plate_number: plate,
                model,
                bus_type: bus_type.into(),
                seat_capacity: 0,
            };
            edit(session, form, &out)
        }
        Command::Edit {
            bus,
            view_only,
            lenient,
            out,
            operator,
        } => {
            if lenient {
                config.hydration_policy = HydrationPolicy::Lenient;
            }
            let data = read(&bus)?;
            let detail = parse_bus_detail(&data)?;
            let session = if view_only {
                EditorSession::view_only(&detail, &config)?
            } else {
                EditorSession::existing_bus(&detail, &config)?
            };
            let mut form = BusForm::from_detail(&detail);
            if operator.is_some() {
                form.operator_id = operator;
            }
            edit(session, form, &out)
        }
        Command::Flatten { input, lenient } => {
            if lenient {
                config.hydration_policy = HydrationPolicy::Lenient;
            }
            let layout = parse_layout_auto(&read(&input)?, &config.hydrate_options())?;
            let mut json = serde_json::to_vec_pretty(&seat_definitions(&layout))?;
            json.push(b'\n');
            std::io::stdout().write_all(&json)?;
            Ok(())
        }
        Command::Svg {
            input,
            dark,
            lenient,
        } => {
            if lenient {
                config.hydration_policy = HydrationPolicy::Lenient;
            }
            let layout = parse_layout_auto(&read(&input)?, &config.hydrate_options())?;
            let svg = seatplan_core::svg::render_layout_svg(&layout, dark);
            std::io::stdout().write_all(svg.as_bytes())?;
            Ok(())
        }
    }
}

fn edit(session: EditorSession, form: BusForm, out: &Path) -> Result<()> {
    let backend = FileBackend::new(out);
    let mut app = App::new(session, form, backend);
    renderer::run_tui(&mut app)?;

    if let Some(report) = &app.saved {
        let backend = app.backend();
        let mut msg = format!(
            "saved bus {} to {}\n",
            report.bus_id,
            backend.bus_path(&report.bus_id).display()
        );
        if report.seats_saved > 0 {
            msg.push_str(&format!(
                "saved {} seats to {}\n",
                report.seats_saved,
                backend.seat_map_path(&report.bus_id).display()
            ));
        }
        std::io::stdout().write_all(msg.as_bytes())?;
    }
    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    let config = EditorConfig::from_json(&read(path)?)
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}

/// Logs go to `--log` when given. Without it, the interactive commands stay
/// silent so the terminal UI is not overwritten; the others log to stderr.
fn init_logging(log: Option<&Path>, verbose: bool, interactive: bool) -> Result<()> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let default = if verbose {
        "seatplan=debug,seatplan_core=debug,info"
    } else {
        "seatplan=info,seatplan_core=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    if let Some(path) = log {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_target(true);
        tracing_subscriber::registry().with(filter).with(layer).init();
        return Ok(());
    }

    if interactive {
        return Ok(());
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
