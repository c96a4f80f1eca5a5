//! Name matching between a live device name and profile headers.
use serde::Deserialize;
use strum::{Display, EnumString, IntoStaticStr};

use crate::parser::strip_space;

/// Bonus for a header that is exactly the device name.
pub const EXACT_MATCH_BONUS: u32 = 4;
/// Bonus for each header word found in the device name.
pub const WORD_MATCH_BONUS: u32 = 4;
/// Header words longer than this are cut before searching.
pub const MAX_WORD_LEN: usize = 63;

/// Platform family whose header prefixes are honoured.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    /// Unix-like systems other than Linux and macOS.
    Unix,
    #[strum(to_string = "macos", serialize = "osx")]
    #[serde(alias = "osx")]
    MacOs,
    Windows,
    Other,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(windows) {
            Platform::Windows
        } else if cfg!(unix) {
            Platform::Unix
        } else {
            Platform::Other
        }
    }

    /// Recognised header prefixes with their bonus, in check order.
    pub fn prefixes(self) -> &'static [(&'static str, u32)] {
        match self {
            Platform::Linux => &[("Unix:", 1), ("Linux:", 1)],
            Platform::Unix => &[("Unix:", 1)],
            Platform::MacOs => &[("OSX:", 1)],
            Platform::Windows => &[("Win32:", 1), ("XInput:", 2)],
            Platform::Other => &[],
        }
    }

    /// Strip the first recognised prefix from `header`, returning the rest
    /// and the prefix bonus (0 when no prefix applies).
    pub fn strip_prefix(self, header: &str) -> (&str, u32) {
        self.prefixes()
            .iter()
            .find_map(|&(marker, bonus)| {
                header
                    .strip_prefix(marker)
                    .map(|rest| (strip_space(rest), bonus))
            })
            .unwrap_or((header, 0))
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

/// Cut `word` to at most [`MAX_WORD_LEN`] bytes without splitting a character.
fn truncate_word(word: &str) -> &str {
    if word.len() <= MAX_WORD_LEN {
        return word;
    }
    let mut end = MAX_WORD_LEN;
    while !word.is_char_boundary(end) {
        end -= 1;
    }
    word.get(..end).unwrap_or(word)
}

fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

/// Score `header` against `device_name`.
///
/// Every space-separated word of the header (after any platform prefix)
/// must appear in the device name, ignoring ASCII case, or the header is
/// rejected with `None`. Otherwise the score is the prefix bonus, plus
/// [`EXACT_MATCH_BONUS`] for an exact match, plus [`WORD_MATCH_BONUS`] per
/// word. An empty header matches anything with score 0.
pub fn score(device_name: &str, header: &str, platform: Platform) -> Option<u32> {
    let (rest, mut total) = platform.strip_prefix(header);

    if rest == device_name {
        total += EXACT_MATCH_BONUS;
    }

    for word in rest.split(' ').filter(|w| !w.is_empty()) {
        if !contains_ignore_ascii_case(device_name, truncate_word(word)) {
            return None;
        }
        total += WORD_MATCH_BONUS;
    }

    Some(total)
}
