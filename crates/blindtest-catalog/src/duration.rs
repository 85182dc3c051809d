//! ISO 8601 durations as returned in `contentDetails.duration`.

use std::time::Duration;

/// Parse durations such as `PT4M13S`, `PT1H2M`, `P1DT2H` or `PT0.5S`.
///
/// Returns `None` for anything that is not a day/time duration.
pub fn parse_iso8601_duration(s: &str) -> Option<Duration> {
    let rest = s.strip_prefix('P')?;
    if rest.is_empty() {
        return None;
    }

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => {
            if time.is_empty() {
                return None;
            }
            (date, Some(time))
        }
        None => (rest, None),
    };

    let mut total = 0.0_f64;
    total += sum_components(date_part, &[('W', 604_800.0), ('D', 86_400.0)])?;
    if let Some(time) = time_part {
        total += sum_components(time, &[('H', 3_600.0), ('M', 60.0), ('S', 1.0)])?;
    }

    Duration::try_from_secs_f64(total).ok()
}

/// Sum `<number><unit>` pairs, units appearing at most once and in order.
fn sum_components(part: &str, units: &[(char, f64)]) -> Option<f64> {
    let mut total = 0.0;
    let mut number = String::new();
    let mut next_unit = 0;

    for c in part.chars() {
        if c.is_ascii_digit() || c == '.' {
            number.push(c);
            continue;
        }

        let offset = units[next_unit..].iter().position(|(unit, _)| *unit == c)?;
        let (_, seconds) = units[next_unit + offset];
        let value: f64 = number.parse().ok()?;
        total += value * seconds;
        number.clear();
        next_unit += offset + 1;
    }

    if number.is_empty() {
        Some(total)
    } else {
        None
    }
}
