//! Rate strings such as `20M` or `512K`.

/// Parses a byte rate: plain bytes, or a number with a `K`, `M` or `G`
/// suffix (powers of 1024, case-insensitive, optional trailing `B`).
pub fn parse_rate(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let upper = s.to_ascii_uppercase();
    let digits = upper.strip_suffix('B').unwrap_or(&upper);
    let (number, shift) = match digits.chars().last() {
        Some('K') => (&digits[..digits.len() - 1], 10),
        Some('M') => (&digits[..digits.len() - 1], 20),
        Some('G') => (&digits[..digits.len() - 1], 30),
        _ => (digits, 0),
    };
    let value: u64 = number
        .parse()
        .map_err(|_| format!("invalid rate [{s}], expected e.g. 20M, 512K or 1048576"))?;
    value
        .checked_mul(1u64 << shift)
        .ok_or_else(|| format!("rate [{s}] is too large"))
}
