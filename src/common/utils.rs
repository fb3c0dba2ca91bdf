//! Small helpers shared across modules: interval parsing, system time zone
//! detection and path display.

use anyhow::{Result, bail};
use chrono_tz::Tz;
use std::path::Path;
use std::time::Duration;

/// Parse a duration string such as `30s`, `1m30s`, `500ms` or `1.5h`.
///
/// The string is a sequence of decimal numbers, each followed by a unit
/// (`ns`, `us`, `ms`, `s`, `m`, `h`). At least one component is required.
pub fn parse_interval(input: &str) -> Result<Duration> {
    let text = input.trim();
    if text.is_empty() {
        bail!("empty interval");
    }

    let mut total = Duration::ZERO;
    let mut rest = text;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            bail!("invalid interval '{input}': expected a number");
        }
        let (number, tail) = rest.split_at(number_len);
        let value: f64 = number
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid interval '{input}': bad number '{number}'"))?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_len);
        let unit_secs = match unit {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            "" => bail!("invalid interval '{input}': missing unit after '{number}'"),
            other => bail!("invalid interval '{input}': unknown unit '{other}'"),
        };

        total += Duration::try_from_secs_f64(value * unit_secs)
            .map_err(|_| anyhow::anyhow!("invalid interval '{input}': out of range"))?;
        rest = next;
    }

    Ok(total)
}

/// Best-effort lookup of the host's IANA time zone.
///
/// Checks `$TZ`, then the `/etc/localtime` symlink target, then
/// `/etc/timezone`. Returns `None` when none of them names a known zone.
pub fn detect_system_timezone() -> Option<Tz> {
    if let Ok(tz) = std::env::var("TZ")
        && let Ok(zone) = tz.trim_start_matches(':').parse::<Tz>()
    {
        return Some(zone);
    }

    if let Ok(target) = std::fs::read_link("/etc/localtime")
        && let Some(zone) = zone_from_zoneinfo_path(&target)
    {
        return Some(zone);
    }

    std::fs::read_to_string("/etc/timezone")
        .ok()
        .and_then(|content| content.trim().parse::<Tz>().ok())
}

/// Extract the zone name from a path like `/usr/share/zoneinfo/Europe/Berlin`.
fn zone_from_zoneinfo_path(path: &Path) -> Option<Tz> {
    let text = path.to_string_lossy();
    let (_, name) = text.split_once("zoneinfo/")?;
    name.parse::<Tz>().ok()
}

/// Replace the home directory prefix with `~` for display.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval_simple_units() {
        assert_eq!(parse_interval("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_interval("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_interval("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_interval("500ms").unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn test_parse_interval_compound_and_fractional() {
        assert_eq!(parse_interval("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_interval("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_interval(" 45s ").unwrap(), Duration::from_secs(45));
    }

    #[test]
    fn test_parse_interval_rejects_malformed() {
        assert!(parse_interval("").is_err());
        assert!(parse_interval("30").is_err());
        assert!(parse_interval("s").is_err());
        assert!(parse_interval("10 minutes").is_err());
        assert!(parse_interval("5d").is_err());
        assert!(parse_interval("1..2s").is_err());
    }

    #[test]
    fn test_zone_from_zoneinfo_path() {
        let zone = zone_from_zoneinfo_path(Path::new("/usr/share/zoneinfo/Europe/Berlin"));
        assert_eq!(zone, Some(chrono_tz::Europe::Berlin));
        assert_eq!(zone_from_zoneinfo_path(Path::new("/etc/localtime")), None);
    }
}
