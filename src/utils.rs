use anyhow::Context;

/// Parse a relative time window like `90s`, `30m`, `1h` or `2d` into seconds.
/// A bare number is taken as seconds.
pub fn parse_since(value: &str) -> anyhow::Result<i64> {
    let value = value.trim();
    let (digits, multiplier) = match value.chars().last() {
        Some('s') => (&value[..value.len() - 1], 1),
        Some('m') => (&value[..value.len() - 1], 60),
        Some('h') => (&value[..value.len() - 1], 3600),
        Some('d') => (&value[..value.len() - 1], 86400),
        Some(c) if c.is_ascii_digit() => (value, 1),
        _ => anyhow::bail!("invalid --since value '{}' (expected e.g. 30m, 1h, 2d)", value),
    };
    let amount: i64 = digits
        .parse()
        .with_context(|| format!("invalid --since value '{}'", value))?;
    anyhow::ensure!(amount > 0, "--since must be a positive duration");
    Ok(amount * multiplier)
}
