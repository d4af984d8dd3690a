use std::time::Duration;

use anyhow::{Context, Result};

/// Parse a move offset: plain minutes (`90`, `-15`) or a signed humantime
/// duration (`1h30m`, `-2days`). Durations must be whole minutes.
pub fn parse_minutes(input: &str) -> Result<i64> {
    let input = input.trim();
    if let Ok(minutes) = input.parse::<i64>() {
        return Ok(minutes);
    }

    let (sign, magnitude) = match input.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, input.strip_prefix('+').unwrap_or(input)),
    };

    let duration = humantime::parse_duration(magnitude.trim())
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("Could not parse duration: \"{}\"", input))?;

    if duration.subsec_nanos() != 0 || duration.as_secs() % 60 != 0 {
        anyhow::bail!("Move offset must be a whole number of minutes: \"{}\"", input);
    }

    let minutes = i64::try_from(duration.as_secs() / 60).context("Duration too large")?;
    Ok(sign * minutes)
}

/// `90` → `+1h 30m`, `-15` → `-15m`, `1440` → `+1day`.
pub fn format_minutes(minutes: i64) -> String {
    let sign = if minutes < 0 { "-" } else { "+" };
    let duration = Duration::from_secs(minutes.unsigned_abs().saturating_mul(60));

    format!("{}{}", sign, humantime::format_duration(duration))
}
