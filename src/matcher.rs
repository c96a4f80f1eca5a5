//! Device matching and configuration emission.
//!
//! One pass over the profile database scores every header against the
//! device name, keeps the best one seen so far, and writes the body of the
//! accepted block into `AutoConfig<N>` sections of a [`ConfigStore`].
//! A block may span several controller slots via `__NextController:`,
//! capped at [`SLOT_LIMIT`].
use std::path::Path;

use log::{debug, error, info, warn};

use crate::config::{DEFAULT_DATABASE_FILE, DatabaseConfig};
use crate::parser::{Keyword, Line, LineKind, ProfileDatabase};
use crate::score::{Platform, score};
use crate::store::{ConfigStore, ParamValue, SectionHandle, StoreError};

/// Maximum number of controller slots one pass may configure.
pub const SLOT_LIMIT: usize = 4;

/// Parameter carrying the host device index in every opened slot.
pub const DEVICE_KEY: &str = "device";

/// Name of the store section for a controller slot.
pub fn slot_section_name(slot: usize) -> String {
    format!("AutoConfig{slot}")
}

/// Whether body lines are currently being written or discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// No accepted header; body lines are discarded.
    #[default]
    SeekingHeader,
    /// A header just won; nothing from its body has been read yet.
    HeaderAccepted,
    ReadingParameters,
}

/// Input to [`ParseMode::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A header line was scored; `improved` if it beat the best score.
    Header { improved: bool },
    /// A parameter or `__NextController:` line was consumed.
    Body,
}

impl ParseMode {
    /// Headers that do not improve on the best score only drop the mode
    /// back to seeking once a body line has been read. Back-to-back headers
    /// therefore leave an earlier accepted block open.
    pub fn transition(self, step: Step) -> Self {
        match (self, step) {
            (_, Step::Header { improved: true }) => ParseMode::HeaderAccepted,
            (ParseMode::ReadingParameters, Step::Header { improved: false }) => {
                ParseMode::SeekingHeader
            }
            (mode, Step::Header { improved: false }) => mode,
            (_, Step::Body) => ParseMode::ReadingParameters,
        }
    }

    pub fn accepts_body(self) -> bool {
        self != ParseMode::SeekingHeader
    }
}

/// Parse the leading integer of `text` like C `atoi`: optional whitespace
/// and sign, then digits up to the first non-digit. Saturates instead of
/// overflowing; no digits gives 0.
pub fn parse_leading_int(text: &str) -> i32 {
    let trimmed = text.trim_start_matches([' ', '\t', '\n', '\r', '\x0b', '\x0c']);
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, trimmed.get(1..).unwrap_or("")),
        Some(b'+') => (false, trimmed.get(1..).unwrap_or("")),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        value = (value * 10 + i64::from(digit - b'0')).min(i64::from(i32::MAX) + 1);
    }
    if negative {
        value = -value;
    }
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Type a raw database value by its key: `device` is an integer,
/// `plugged` and `mouse` are booleans, everything else stays a string.
pub fn typed_value(key: &str, raw: &str) -> ParamValue {
    if key.eq_ignore_ascii_case(DEVICE_KEY) {
        ParamValue::Int(parse_leading_int(raw))
    } else if key.eq_ignore_ascii_case("plugged") || key.eq_ignore_ascii_case("mouse") {
        ParamValue::Bool(raw.eq_ignore_ascii_case("true"))
    } else {
        ParamValue::Str(raw.to_string())
    }
}

enum Flow {
    Continue,
    Stop(usize),
}

/// State of one matching pass.
struct MatchPass<'s, S: ConfigStore + ?Sized> {
    store: &'s mut S,
    device_name: &'s str,
    device_index: i32,
    platform: Platform,
    mode: ParseMode,
    best: Option<u32>,
    slots: usize,
    section: Option<SectionHandle>,
}

impl<S: ConfigStore + ?Sized> MatchPass<'_, S> {
    fn write(&mut self, key: &str, value: ParamValue) {
        let Some(section) = self.section.as_ref() else {
            return;
        };
        if let Err(e) = self.store.set_parameter(section, key, &value) {
            warn!("Couldn't set '{key}' in section '{}': {e}", section.name());
        }
    }

    /// Open the next `AutoConfig<N>` section and stamp it with the device index.
    fn open_slot(&mut self) -> Result<(), StoreError> {
        let name = slot_section_name(self.slots);
        let handle = self.store.open_section(&name)?;
        debug!("Opened config section '{name}'");
        self.section = Some(handle);
        self.slots += 1;
        self.write(DEVICE_KEY, ParamValue::Int(self.device_index));
        Ok(())
    }

    fn feed(&mut self, line: Line<'_>) -> Flow {
        match line.kind {
            LineKind::Blank | LineKind::Comment => {}
            LineKind::SectionHeader(header) => {
                let found = score(self.device_name, header, self.platform);
                let improved = found > self.best;
                if improved {
                    self.slots = 0;
                    if let Err(e) = self.open_slot() {
                        error!("Couldn't open config section '{}': {e}", slot_section_name(0));
                        return Flow::Stop(0);
                    }
                    debug!(
                        "Header '{header}' (line {}) matches '{}' with score {}",
                        line.number,
                        self.device_name,
                        found.unwrap_or_default()
                    );
                    self.best = found;
                }
                self.mode = self.mode.transition(Step::Header { improved });
            }
            LineKind::Parameter { key, value } => {
                if self.mode.accepts_body() {
                    self.mode = self.mode.transition(Step::Body);
                    self.write(key, typed_value(key, value));
                }
            }
            LineKind::Keyword(Keyword::NextController) => {
                if self.mode.accepts_body() {
                    self.mode = self.mode.transition(Step::Body);
                    if self.slots >= SLOT_LIMIT {
                        debug!("All {SLOT_LIMIT} controller slots configured, stopping");
                        return Flow::Stop(SLOT_LIMIT);
                    }
                    if let Err(e) = self.open_slot() {
                        error!(
                            "Couldn't open config section '{}': {e}",
                            slot_section_name(self.slots)
                        );
                        return Flow::Stop(self.slots);
                    }
                }
            }
            LineKind::UnknownKeyword(keyword) => {
                error!("Unknown keyword '{keyword}' at line {} of profile database", line.number);
            }
            LineKind::Invalid(text) => {
                error!("Invalid line {} in profile database: '{text}'", line.number);
            }
        }
        Flow::Continue
    }
}

/// Run one matching pass of `database` for `device_name`, writing the
/// accepted profile(s) into `store`. Returns the number of controller
/// slots configured, 0 when no header matched.
pub fn match_profiles<S: ConfigStore + ?Sized>(
    store: &mut S,
    database: &ProfileDatabase,
    device_name: &str,
    device_index: i32,
    platform: Platform,
) -> usize {
    let mut pass = MatchPass {
        store,
        device_name,
        device_index,
        platform,
        mode: ParseMode::SeekingHeader,
        best: None,
        slots: 0,
        section: None,
    };

    for line in database.lines() {
        if let Flow::Stop(count) = pass.feed(line) {
            return count;
        }
    }

    if pass.best.is_some() { pass.slots } else { 0 }
}

/// Score of one header in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderScore {
    pub line: usize,
    pub header: String,
    pub score: Option<u32>,
}

/// Score every header of the database against `device_name`, in file order.
pub fn header_scores(
    database: &ProfileDatabase,
    device_name: &str,
    platform: Platform,
) -> Vec<HeaderScore> {
    database
        .lines()
        .filter_map(|line| match line.kind {
            LineKind::SectionHeader(header) => Some(HeaderScore {
                line: line.number,
                header: header.to_string(),
                score: score(device_name, header, platform),
            }),
            _ => None,
        })
        .collect()
}

/// The header a matching pass would pick, without writing anything.
/// Ties go to the earliest header.
pub fn best_profile(
    database: &ProfileDatabase,
    device_name: &str,
    platform: Platform,
) -> Option<HeaderScore> {
    let mut best: Option<HeaderScore> = None;
    for candidate in header_scores(database, device_name, platform) {
        if candidate.score.is_some() && candidate.score > best.as_ref().and_then(|b| b.score) {
            best = Some(candidate);
        }
    }
    best
}

/// Entry point configuration: which platform prefixes count and which
/// shared data file holds the database.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoConfigurator {
    pub platform: Platform,
    pub database_file: String,
}

impl Default for AutoConfigurator {
    fn default() -> Self {
        Self {
            platform: Platform::current(),
            database_file: DEFAULT_DATABASE_FILE.to_string(),
        }
    }
}

impl From<&DatabaseConfig> for AutoConfigurator {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            platform: config.platform,
            database_file: config.file_name.clone(),
        }
    }
}

impl AutoConfigurator {
    /// Locate the database through the store's shared data lookup and run a
    /// matching pass. Returns the number of slots configured; every failure
    /// is logged and reported as 0.
    pub fn set_defaults<S: ConfigStore + ?Sized>(
        &self,
        store: &mut S,
        device_index: i32,
        device_name: Option<&str>,
    ) -> usize {
        let Some(device_name) = device_name.filter(|n| !n.is_empty()) else {
            debug!("No device name for device {device_index}, skipping auto-config");
            return 0;
        };
        let Some(path) = store
            .shared_data_file_path(&self.database_file)
            .filter(|p| !p.as_os_str().is_empty())
        else {
            error!("Couldn't find config file '{}'", self.database_file);
            return 0;
        };
        self.set_defaults_from(store, &path, device_index, device_name)
    }

    /// Like [`set_defaults`](Self::set_defaults) with an explicit database path.
    pub fn set_defaults_from<S: ConfigStore + ?Sized>(
        &self,
        store: &mut S,
        path: &Path,
        device_index: i32,
        device_name: &str,
    ) -> usize {
        if device_name.is_empty() {
            return 0;
        }
        let database = match ProfileDatabase::load(path) {
            Ok(db) => db,
            Err(e) => {
                error!("{e}");
                return 0;
            }
        };
        info!("Using auto-config file at: '{}'", path.display());
        let slots = match_profiles(store, &database, device_name, device_index, self.platform);
        if slots == 0 {
            info!("No auto-config profile matches '{device_name}'");
        }
        slots
    }
}

/// Auto-configure `device_name` with the build platform and the default
/// database file. Returns the number of controller slots configured.
pub fn auto_set_defaults<S: ConfigStore + ?Sized>(
    store: &mut S,
    device_index: i32,
    device_name: Option<&str>,
) -> usize {
    AutoConfigurator::default().set_defaults(store, device_index, device_name)
}
