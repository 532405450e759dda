//! Parsing of winget's tabular `list` output.
//!
//! winget prints a fixed-width table:
//!
//! ```text
//! Name              Id            Version Available Source
//! --------------------------------------------------------
//! VLC media player  VideoLAN.VLC  3.0.18  3.0.20    winget
//! ```
//!
//! Columns are located by their display offsets in the header line, since
//! names may contain spaces. Header words are matched case-insensitively and a
//! column ends where the next header word begins, so unknown or localized
//! columns do not bleed into their neighbours. Console progress artifacts
//! (spinners, block bars, percentages) interleave with the table and are
//! dropped first.

use unicode_width::UnicodeWidthChar;

use super::InstalledPackage;

// Progress artifact detection patterns
const PROGRESS_BAR_CHARS: [char; 2] = ['█', '▒'];
const SPINNER_CHARS: [char; 4] = ['-', '\\', '|', '/'];
const PROGRESS_INDICATORS: [&str; 4] = [" KB / ", " MB / ", " GB / ", "Processing "];

/// Returns true for a trimmed line that is console progress, not content.
pub(crate) fn is_noise(line: &str) -> bool {
    if line.chars().count() <= 2 && line.chars().all(|c| SPINNER_CHARS.contains(&c) || c == ' ') {
        return true;
    }
    if line
        .chars()
        .all(|c| PROGRESS_BAR_CHARS.contains(&c) || c.is_whitespace())
    {
        return true;
    }
    if line.chars().any(|c| PROGRESS_BAR_CHARS.contains(&c)) && line.ends_with('%') {
        return true;
    }
    if line.ends_with('%') && line.trim_end_matches('%').trim().parse::<u32>().is_ok() {
        return true;
    }
    PROGRESS_INDICATORS.iter().any(|ind| line.contains(ind))
}

fn is_separator(line: &str) -> bool {
    let t = line.trim();
    t.len() >= 3 && t.chars().all(|c| c == '-')
}

const ID_HEADERS: [&str; 1] = ["Id"];
const VERSION_HEADERS: [&str; 2] = ["Version", "Versión"];
const AVAILABLE_HEADERS: [&str; 3] = ["Available", "Verfügbar", "Disponible"];

/// Characters of a line paired with the display column each starts at.
///
/// winget pads cells by display width, so wide (CJK) characters take two
/// columns.
fn cells(line: &str) -> Vec<(usize, char)> {
    let mut col = 0;
    line.chars()
        .map(|c| {
            let at = col;
            col += c.width().unwrap_or(0);
            (at, c)
        })
        .collect()
}

/// Header words with the display column each starts at.
fn header_words(header: &str) -> Vec<(usize, String)> {
    let mut words: Vec<(usize, String)> = Vec::new();
    let mut prev_blank = true;
    for (at, c) in cells(header) {
        if c.is_whitespace() {
            prev_blank = true;
            continue;
        }
        if prev_blank {
            words.push((at, String::new()));
        }
        if let Some((_, word)) = words.last_mut() {
            word.push(c);
        }
        prev_blank = false;
    }
    words
}

/// Column start offsets, in display columns, taken from the header line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Columns {
    id: usize,
    version: usize,
    available: Option<usize>,
    /// Start of every header word, ascending.
    starts: Vec<usize>,
}

impl Columns {
    fn from_header(header: &str) -> Option<Self> {
        let words = header_words(header);
        let find = |names: &[&str]| {
            words
                .iter()
                .find(|(_, w)| names.iter().any(|n| w.to_lowercase() == n.to_lowercase()))
                .map(|(at, _)| *at)
        };

        let id = find(&ID_HEADERS)?;
        let version = find(&VERSION_HEADERS)?;
        if version <= id {
            return None;
        }
        let available = find(&AVAILABLE_HEADERS).filter(|&p| p > version);
        Some(Self {
            id,
            version,
            available,
            starts: words.iter().map(|(at, _)| *at).collect(),
        })
    }

    /// End of the column starting at `start`: wherever the next one begins.
    fn end_of(&self, start: usize) -> Option<usize> {
        self.starts.iter().copied().find(|&s| s > start)
    }

    /// The column after the version columns, if any, holds the source.
    fn source(&self) -> Option<usize> {
        self.end_of(self.available.unwrap_or(self.version))
    }
}

fn slice(cells: &[(usize, char)], start: usize, end: Option<usize>) -> String {
    cells
        .iter()
        .filter(|(at, _)| *at >= start && end.is_none_or(|e| *at < e))
        .map(|(_, c)| c)
        .collect::<String>()
        .trim()
        .to_string()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

fn parse_row(line: &str, cols: &Columns) -> Option<InstalledPackage> {
    let cells = cells(line);
    let name = slice(&cells, 0, Some(cols.id));
    let id = slice(&cells, cols.id, cols.end_of(cols.id));
    let version = slice(&cells, cols.version, cols.end_of(cols.version));
    let available = cols
        .available
        .and_then(|start| non_empty(slice(&cells, start, cols.end_of(start))));
    let source = cols
        .source()
        .and_then(|start| non_empty(slice(&cells, start, cols.end_of(start))));

    if id.is_empty() || version.is_empty() {
        return None;
    }
    Some(InstalledPackage {
        id,
        name,
        version,
        available,
        source,
    })
}

/// Parse every package row of a `winget list` table.
///
/// Returns `None` when the output holds no table with recognizable `Id` and
/// `Version` headers.
pub fn parse_list(output: &str) -> Option<Vec<InstalledPackage>> {
    let lines: Vec<&str> = output
        .lines()
        .map(|l| l.rsplit('\r').next().unwrap_or(l))
        .filter(|l| !l.trim().is_empty() && !is_noise(l.trim()))
        .collect();

    let sep_idx = lines.iter().position(|l| is_separator(l))?;
    if sep_idx == 0 {
        return None;
    }
    let cols = Columns::from_header(lines[sep_idx - 1])?;

    Some(
        lines[sep_idx + 1..]
            .iter()
            .filter(|l| !is_separator(l))
            .filter_map(|l| parse_row(l, &cols))
            .collect(),
    )
}

/// Whether a listed id names `app_id`.
///
/// winget truncates long identifiers with `…`; a truncated id matches when
/// what is left is a prefix of `app_id`.
fn id_matches(listed: &str, app_id: &str) -> bool {
    if listed.eq_ignore_ascii_case(app_id) {
        return true;
    }
    match listed.strip_suffix('…') {
        Some(prefix) if !prefix.is_empty() => app_id
            .to_lowercase()
            .starts_with(&prefix.to_lowercase()),
        _ => false,
    }
}

/// Pick the row for `app_id` from a table produced by an exact-id query.
pub fn find_package(packages: Vec<InstalledPackage>, app_id: &str) -> Option<InstalledPackage> {
    packages.into_iter().find(|p| id_matches(&p.id, app_id))
}
