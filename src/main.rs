//! PagolaTerm - terminal host for the simulated consoles
//!
//! Hosts one session on stdin/stdout. Lines typed on stdin are submitted to
//! the session; transcript changes are printed as they happen. The boot
//! console hands over to the welcome console on `start`.

use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};

use pagolaterm::bridge::{BridgeEvent, ChannelBridge, HostBridge};
use pagolaterm::models::{LineKind, SimulatedProgram, TranscriptLine};
use pagolaterm::session::{Session, SessionKind, SubmitOutcome};
use pagolaterm::{sessions, Config};

/// Command line options
#[derive(Debug, Default)]
struct AppArgs {
    /// Console to start in
    session: Option<SessionKind>,
    /// Configuration file path
    config_path: Option<PathBuf>,
    /// Seed for the IDE programs' random replies
    seed: Option<u64>,
    /// Print without ANSI colors
    no_color: bool,
    /// Enable debug logging
    debug: bool,
}

impl AppArgs {
    /// Parse command line arguments
    fn parse() -> anyhow::Result<Self> {
        let args: Vec<String> = env::args().collect();
        let mut app_args = AppArgs::default();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--session" | "-s" => {
                    let value = args.get(i + 1).ok_or_else(|| anyhow!("Missing session name"))?;
                    app_args.session = Some(value.parse::<SessionKind>()?);
                    i += 1;
                }
                "--config" | "-c" => {
                    let value = args
                        .get(i + 1)
                        .ok_or_else(|| anyhow!("Missing config file path"))?;
                    app_args.config_path = Some(PathBuf::from(value));
                    i += 1;
                }
                "--seed" => {
                    let value = args.get(i + 1).ok_or_else(|| anyhow!("Missing seed"))?;
                    app_args.seed = Some(
                        value
                            .parse::<u64>()
                            .with_context(|| format!("Invalid seed: {}", value))?,
                    );
                    i += 1;
                }
                "--no-color" => {
                    app_args.no_color = true;
                }
                "--debug" | "-d" => {
                    app_args.debug = true;
                }
                "--help" | "-h" => {
                    print_help();
                    process::exit(0);
                }
                "--version" | "-V" => {
                    println!("{} v{}", pagolaterm::NAME, pagolaterm::VERSION);
                    process::exit(0);
                }
                arg => {
                    return Err(anyhow!("Unknown option: {}", arg));
                }
            }
            i += 1;
        }

        Ok(app_args)
    }
}

/// Print help information
fn print_help() {
    println!("PagolaTerm - simulated portfolio consoles");
    println!();
    println!("USAGE:");
    println!("    pagolaterm [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -s, --session <NAME>   Console to start: boot, welcome, ide (default: boot)");
    println!("    -c, --config <PATH>    Path to configuration file");
    println!("        --seed <N>         Seed for the IDE programs' replies");
    println!("        --no-color         Disable ANSI colors");
    println!("    -d, --debug            Enable debug logging");
    println!("    -h, --help             Print this help message");
    println!("    -V, --version          Print version information");
    println!();
    println!("IDE CONSOLE:");
    println!("    :open <FILE>           Select AI_Oracle.py or SecurityGate.java");
    println!("    :run                   Run the selected program");
    println!("    anything else          Answer the running program");
    println!();
    println!("CONFIGURATION:");
    println!("    PagolaTerm looks for config.toml / config.json in the following order:");
    println!("    1. Path specified with --config or $PAGOLATERM_CONFIG");
    println!("    2. <config dir>/pagolaterm/");
    println!("    3. $XDG_CONFIG_HOME/pagolaterm/");
    println!("    4. ~/.pagolaterm/");
    println!("    5. ./.pagolaterm/");
    println!("    6. Built-in defaults");
    println!();
    println!("ENVIRONMENT:");
    println!("    PAGOLATERM_CONFIG      Path to configuration file");
    println!("    PAGOLATERM_DEBUG       Enable debug logging (1 or true)");
    println!("    RUST_LOG               Set logging level (error, warn, info, debug, trace)");
}

/// Prints the part of the transcript not shown yet
struct Printer {
    shown: Vec<TranscriptLine>,
    color: bool,
}

impl Printer {
    fn new(color: bool) -> Self {
        Self {
            shown: Vec::new(),
            color,
        }
    }

    fn render(&mut self, lines: Vec<TranscriptLine>) -> std::io::Result<()> {
        let mut out = std::io::stdout().lock();

        let continues = lines.len() >= self.shown.len()
            && self
                .shown
                .iter()
                .zip(&lines)
                .all(|(a, b)| a == b && a.timestamp == b.timestamp);

        let start = if continues {
            self.shown.len()
        } else {
            if self.color {
                write!(out, "\x1b[2J\x1b[H")?;
            } else {
                writeln!(out, "----")?;
            }
            0
        };

        for line in &lines[start..] {
            writeln!(out, "{}", self.paint(line))?;
        }
        out.flush()?;

        self.shown = lines;
        Ok(())
    }

    fn paint(&self, line: &TranscriptLine) -> String {
        if !self.color {
            return line.text.clone();
        }

        let base = match line.kind {
            LineKind::System => "\x1b[90m",
            LineKind::Success => "\x1b[32m",
            LineKind::Info => "\x1b[34m",
            LineKind::Warning => "\x1b[33m",
            LineKind::Error => "\x1b[31m",
            LineKind::Input => "\x1b[1m",
            LineKind::Plain => "",
        };

        let mut painted = String::new();
        for segment in line.segments() {
            if segment.highlighted {
                painted.push_str("\x1b[1;33m");
                painted.push_str(segment.text);
                painted.push_str("\x1b[0m");
            } else {
                painted.push_str(base);
                painted.push_str(segment.text);
                painted.push_str("\x1b[0m");
            }
        }
        painted
    }
}

fn build_session(
    kind: SessionKind,
    config: &Config,
    bridge: Arc<dyn HostBridge>,
    seed: Option<u64>,
) -> pagolaterm::Result<Session> {
    let mut builder = sessions::builder(kind, config).bridge(bridge);
    if let Some(seed) = seed {
        builder = builder.seed(seed);
    }
    builder.build()
}

/// Handle one stdin line. Returns false when the host should exit.
fn handle_line(session: &mut Session, line: &str) -> bool {
    if session.kind() == SessionKind::Ide {
        let trimmed = line.trim();
        if let Some(file) = trimmed.strip_prefix(":open") {
            match file.trim().parse::<SimulatedProgram>() {
                Ok(program) => {
                    if !session.select_program(program) {
                        eprintln!("Cannot open {} while {}", program, session.phase());
                    }
                }
                Err(e) => eprintln!("{}", e),
            }
            return true;
        }
        if trimmed == ":run" {
            if !session.run() {
                eprintln!("Cannot run while {}", session.phase());
            }
            return true;
        }
    }

    if line.trim() == ":quit" {
        return false;
    }

    if session.submit_line(line) == SubmitOutcome::Ignored {
        debug!("Line ignored in phase {}", session.phase());
    }
    true
}

async fn run(args: AppArgs) -> anyhow::Result<()> {
    let config = match &args.config_path {
        Some(path) => pagolaterm::init_with_config(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => pagolaterm::init(),
    };

    let (bridge, mut events) = ChannelBridge::new();
    let bridge: Arc<dyn HostBridge> = bridge;

    let kind = args.session.unwrap_or(SessionKind::Boot);
    let mut session = build_session(kind, &config, Arc::clone(&bridge), args.seed)?;
    let mut scroll = session.subscribe_scroll();
    let mut printer = Printer::new(!args.no_color);
    printer.render(session.transcript())?;

    if kind == SessionKind::Ide {
        println!(
            "Program: {} (:open <file>, :run)",
            session.selected_program()
        );
    }

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = stdin.next_line() => {
                let Some(line) = line? else {
                    info!("stdin closed");
                    break;
                };
                if !handle_line(&mut session, &line) {
                    break;
                }
            }
            Some(event) = events.recv() => match event {
                BridgeEvent::BootComplete => debug!("Boot complete"),
                BridgeEvent::ScreenTransition => {
                    if session.kind() != SessionKind::Boot {
                        break;
                    }
                    session.teardown();
                    session = build_session(
                        SessionKind::Welcome,
                        &config,
                        Arc::clone(&bridge),
                        args.seed,
                    )?;
                    scroll = session.subscribe_scroll();
                    printer = Printer::new(!args.no_color);
                    println!();
                    printer.render(session.transcript())?;
                }
                BridgeEvent::Navigate(url) => {
                    println!("-> {}", url);
                }
            },
            changed = scroll.changed() => {
                if changed.is_err() {
                    break;
                }
                printer.render(session.transcript())?;
            }
        }
    }

    session.teardown();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = AppArgs::parse().unwrap_or_else(|e| {
        eprintln!("Failed to parse arguments: {}", e);
        print_help();
        process::exit(1);
    });

    let log_level = if args.debug
        || env::var("PAGOLATERM_DEBUG").is_ok_and(|v| v == "1" || v.to_lowercase() == "true")
    {
        "debug"
    } else {
        "info"
    };

    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from(env_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    info!("Starting {} v{}", pagolaterm::NAME, pagolaterm::VERSION);

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        process::exit(1);
    }
}
