//! autopad – input device auto-configuration.
//!
//! CLI entry point.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::SystemTime;

use clap::Parser;
use log::{Level, LevelFilter, Log, Metadata, Record};

use autopad::config::{AppConfig, parse_config_file};
use autopad::copy::auto_copy_input_config;
use autopad::devices::{device_name, list_joystick_devices};
use autopad::matcher::{AutoConfigurator, SLOT_LIMIT, header_scores, slot_section_name};
use autopad::parser::ProfileDatabase;
use autopad::score::Platform;
use autopad::store::{ConfigStore, MemoryStore};

#[derive(Parser)]
#[command(name = "autopad", about = "Auto-configure an input device from a profile database")]
struct Cli {
    /// Device name as reported by the input driver
    name: Option<String>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Profile database to use instead of searching the data directories
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Host device index written to every configured slot
    #[arg(short = 'i', long, default_value_t = 0)]
    device_index: i32,

    /// Platform whose header prefixes apply (linux, unix, macos, windows, other)
    #[arg(short, long)]
    platform: Option<Platform>,

    /// Read the device name from this evdev node
    #[arg(short, long)]
    event: Option<PathBuf>,

    /// Copy the configured slots into Input-SDL-Control<PORT> and up (1-4)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
    port: Option<u8>,

    /// Print the score of every profile header
    #[arg(long)]
    explain: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// List available joystick devices and exit
    #[arg(short, long)]
    list_devices: bool,
}

/// Simple logger that writes to stderr and optionally to a log file.
struct AutopadLogger {
    level: LevelFilter,
    file: Option<Mutex<std::fs::File>>,
}

impl Log for AutopadLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with("autopad")
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let level = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        let line = format!("[{secs} {level} autopad] {}\n", record.args());

        eprint!("{line}");

        if let Some(ref file_mutex) = self.file {
            if let Ok(mut f) = file_mutex.lock() {
                let _ = f.write_all(line.as_bytes());
            }
        }
    }

    fn flush(&self) {
        if let Some(ref file_mutex) = self.file {
            if let Ok(mut f) = file_mutex.lock() {
                let _ = f.flush();
            }
        }
    }
}

fn init_logging(cli: &Cli, config: &AppConfig) {
    // CLI --verbose overrides the config file setting.
    let log_level: LevelFilter = if cli.verbose {
        LevelFilter::Debug
    } else {
        config.log_level.parse().unwrap_or(LevelFilter::Info)
    };

    let log_file = config.log_file.as_deref().and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(Mutex::new(file)),
            Err(e) => {
                eprintln!("Warning: cannot open log file '{path}': {e}");
                None
            }
        }
    });

    let logger = AutopadLogger {
        level: log_level,
        file: log_file,
    };
    if let Err(e) = log::set_boxed_logger(Box::new(logger)) {
        eprintln!("Warning: cannot install logger: {e}");
        return;
    }
    log::set_max_level(log_level);
}

fn explain(database: &ProfileDatabase, name: &str, platform: Platform) {
    println!("Profile scores for '{name}' ({platform}):");
    for entry in header_scores(database, name, platform) {
        match entry.score {
            Some(score) => println!("  line {:>5}  {score:>3}  [{}]", entry.line, entry.header),
            None => println!("  line {:>5}    -  [{}]", entry.line, entry.header),
        }
    }
    println!();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list_devices {
        return list_joystick_devices();
    }

    let config = match cli.config.as_deref().map(parse_config_file).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&cli, &config);

    let name = match (&cli.name, &cli.event) {
        (Some(name), _) => name.clone(),
        (None, Some(event)) => match device_name(event) {
            Ok(name) => name,
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        },
        (None, None) => {
            eprintln!(
                "Error: no device name given.\n\n\
                 Pass a name, or read one from a device with:\n\
                 \x20 autopad --event /dev/input/eventN\n\n\
                 To find available joystick devices, run:\n\
                 \x20 autopad --list-devices"
            );
            return ExitCode::FAILURE;
        }
    };

    let mut configurator = AutoConfigurator::from(&config.database);
    if let Some(platform) = cli.platform {
        configurator.platform = platform;
    }

    let mut store = MemoryStore::with_data_dirs(config.database.search_paths.iter().cloned());
    let database_path = cli
        .database
        .clone()
        .or_else(|| store.shared_data_file_path(&configurator.database_file));

    if cli.explain {
        match database_path.as_deref().map(ProfileDatabase::load) {
            Some(Ok(database)) => explain(&database, &name, configurator.platform),
            Some(Err(e)) => eprintln!("Error: {e}"),
            None => eprintln!("Error: profile database '{}' not found", configurator.database_file),
        }
    }

    log::info!("Auto-configuring device {}: '{name}'", cli.device_index);
    let slots = match &cli.database {
        Some(path) => configurator.set_defaults_from(&mut store, path, cli.device_index, &name),
        None => configurator.set_defaults(&mut store, cli.device_index, Some(&name)),
    };

    if let Some(port) = cli.port {
        let first = usize::from(port);
        for slot in 0..slots.min(SLOT_LIMIT + 1 - first) {
            let dest = format!("Input-SDL-Control{}", first + slot);
            if !auto_copy_input_config(&mut store, &slot_section_name(slot), &dest, Some(&name)) {
                return ExitCode::FAILURE;
            }
        }
    }

    print!("{}", store.render());

    if slots == 0 {
        eprintln!("No profile in the database matches '{name}'");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
