use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    fn app_name(&self) -> &'static str {
        match self {
            Profile::Dev => "taskdeck-dev",
            Profile::Prod => "taskdeck",
        }
    }
}

/// Get the configuration directory path
/// If profile is Dev, uses "taskdeck-dev" instead of "taskdeck"
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "taskdeck", profile.app_name())
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path (database and log file live here)
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "taskdeck", profile.app_name())
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%MZ",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%d %H:%MZ",
    "%Y-%m-%d %H:%M:%S%.fZ",
];

/// Parse an ISO 8601 date or timestamp into a UTC instant.
///
/// Accepts `YYYY-MM-DD` (midnight UTC), local-less date-times with `T` or a space
/// separator, and date-times carrying an offset or `Z` at minute or second
/// precision. Returns `None` for anything else, including out-of-range calendar
/// dates such as `2025-02-30`.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    parse_date(value)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse a date string in ISO 8601 format (YYYY-MM-DD)
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
}

/// True when the string names a valid calendar date in any accepted ISO form
pub fn is_valid_date(value: &str) -> bool {
    parse_timestamp(value).is_some()
}

/// Format a timestamp the way it is persisted: RFC 3339, UTC, millisecond precision
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Human-readable due date, e.g. "Nov 20, 2025". Missing or unparseable dates
/// read as "No due date".
pub fn format_due_date(due_date: Option<&str>) -> String {
    match due_date.and_then(parse_timestamp) {
        Some(ts) => ts.format("%b %-d, %Y").to_string(),
        None => "No due date".to_string(),
    }
}

/// Parsed key binding information
#[derive(Debug, Clone)]
pub struct ParsedKeyBinding {
    pub key_code: crossterm::event::KeyCode,
    pub requires_ctrl: bool,
}

/// Check if a key event has the primary modifier (Ctrl on Windows/Linux, Option/Alt on macOS)
pub fn has_primary_modifier(modifiers: crossterm::event::KeyModifiers) -> bool {
    #[cfg(target_os = "macos")]
    {
        modifiers.contains(crossterm::event::KeyModifiers::CONTROL)
            || modifiers.contains(crossterm::event::KeyModifiers::ALT)
    }

    #[cfg(not(target_os = "macos"))]
    {
        modifiers.contains(crossterm::event::KeyModifiers::CONTROL)
    }
}

/// On macOS, "Ctrl+" is shown as "Opt+"; other platforms show the binding as-is
pub fn format_key_binding_for_display(key_binding: &str) -> String {
    #[cfg(target_os = "macos")]
    {
        key_binding.replace("Ctrl+", "Opt+")
    }

    #[cfg(not(target_os = "macos"))]
    {
        key_binding.to_string()
    }
}

/// Parse a key binding string from config into a ParsedKeyBinding
/// Supports single keys ("q", "n"), special keys ("Enter", "Space", "F1") and "Ctrl+" prefixes
pub fn parse_key_binding(key_str: &str) -> Result<ParsedKeyBinding, String> {
    let key_str = key_str.trim();

    if let Some(key_part) = key_str.strip_prefix("Ctrl+") {
        let key_code = parse_key_code(key_part)?;
        return Ok(ParsedKeyBinding {
            key_code,
            requires_ctrl: true,
        });
    }

    let key_code = parse_key_code(key_str)?;
    Ok(ParsedKeyBinding {
        key_code,
        requires_ctrl: false,
    })
}

fn parse_key_code(key_str: &str) -> Result<crossterm::event::KeyCode, String> {
    use crossterm::event::KeyCode;

    match key_str {
        "Enter" => Ok(KeyCode::Enter),
        "Esc" | "Escape" => Ok(KeyCode::Esc),
        "Backspace" => Ok(KeyCode::Backspace),
        "Tab" => Ok(KeyCode::Tab),
        "Space" | " " => Ok(KeyCode::Char(' ')),
        "Left" => Ok(KeyCode::Left),
        "Right" => Ok(KeyCode::Right),
        "Up" => Ok(KeyCode::Up),
        "Down" => Ok(KeyCode::Down),
        "Home" => Ok(KeyCode::Home),
        "End" => Ok(KeyCode::End),
        "Delete" => Ok(KeyCode::Delete),
        _ => {
            if let Some(n) = key_str.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
                if (1..=12).contains(&n) {
                    return Ok(KeyCode::F(n));
                }
            }
            let mut chars = key_str.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(KeyCode::Char(c)),
                _ => Err(format!("Unknown key binding: {}", key_str)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_plain_dates_as_utc_midnight() {
        let ts = parse_timestamp("2025-11-20").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2025, 11, 20));
        assert_eq!(ts.hour(), 0);
    }

    #[test]
    fn parses_rfc3339_and_naive_datetimes() {
        let a = parse_timestamp("2025-11-09T12:00:00Z").unwrap();
        let b = parse_timestamp("2025-11-09T12:00:00.000Z").unwrap();
        let c = parse_timestamp("2025-11-09 12:00:00").unwrap();
        let d = parse_timestamp("2025-11-09T14:00:00+02:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a, d);

        let e = parse_timestamp("2025-11-09T12:00Z").unwrap();
        let f = parse_timestamp("2025-11-09T14:00+02:00").unwrap();
        let g = parse_timestamp("2025-11-09T14:00:00+0200").unwrap();
        assert_eq!(a, e);
        assert_eq!(a, f);
        assert_eq!(a, g);
    }

    #[test]
    fn rejects_garbage_and_impossible_dates() {
        assert!(parse_timestamp("not-a-date").is_none());
        assert!(parse_timestamp("2025-02-30").is_none());
        assert!(parse_timestamp("").is_none());
        assert!(!is_valid_date("   "));
    }

    #[test]
    fn due_date_display() {
        assert_eq!(format_due_date(Some("2025-11-20")), "Nov 20, 2025");
        assert_eq!(format_due_date(Some("2025-11-05")), "Nov 5, 2025");
        assert_eq!(format_due_date(Some("bogus")), "No due date");
        assert_eq!(format_due_date(None), "No due date");
    }

    #[test]
    fn key_bindings() {
        use crossterm::event::KeyCode;
        let b = parse_key_binding("Ctrl+s").unwrap();
        assert!(b.requires_ctrl);
        assert_eq!(b.key_code, KeyCode::Char('s'));
        assert_eq!(parse_key_binding("F1").unwrap().key_code, KeyCode::F(1));
        assert_eq!(parse_key_binding("Space").unwrap().key_code, KeyCode::Char(' '));
        assert!(parse_key_binding("Hyper+x").is_err());
    }
}
