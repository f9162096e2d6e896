use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const NO_BREAK_SPACE: char = '\u{a0}';

/// Regular files directly inside `dir`, sorted by name so that loading
/// order (and with it any overwrite between files) is reproducible.
pub fn list_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parses a number written with a decimal comma, dropping surrounding
/// whitespace and space or no-break space thousands separators.
///
/// # Examples
///
/// ```
/// use fxledger::providers::util::parse_local_decimal;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_local_decimal("1\u{a0}234,5").unwrap(), Decimal::new(12345, 1));
/// ```
pub fn parse_local_decimal(value: &str) -> Result<Decimal, rust_decimal::Error> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| *c != NO_BREAK_SPACE && *c != ' ')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    Decimal::from_str(&cleaned)
}
