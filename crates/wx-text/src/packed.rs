//! 7-bit packed code strings.
//!
//! The payload is one big-endian integer. Its top bit is a framing bit and
//! the next `(8 * len - 1) % 7` low-order bits are padding; above the
//! padding sit 7-bit character groups, last character lowest. A zero group
//! ends a code.

/// Decode the code strings of a local use payload.
///
/// Lines that do not look like codes are dropped: a code is at least four
/// characters long and has four `:` separators (weather), a `.`
/// (hazard) or the `<None>` placeholder.
pub fn unpack_codes(raw: &[u8]) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }

    let total_bits = raw.len() * 8;
    let count = (total_bits - 1) / 7;
    let skip = (total_bits - 1) % 7;

    let mut text: Vec<char> = (0..count)
        .filter_map(|k| match group(raw, skip + 7 * k) {
            0 => Some('\n'),
            c @ 32..=126 => Some(char::from(c)),
            _ => None,
        })
        .collect();
    text.reverse();

    let text: String = text.into_iter().collect();
    let codes: Vec<String> = text.lines().filter(|l| is_code(l)).map(str::to_string).collect();
    tracing::trace!(bytes = raw.len(), codes = codes.len(), "Unpacked code strings");
    codes
}

/// 7-bit group starting at bit `start`, counted from the least
/// significant end.
fn group(raw: &[u8], start: usize) -> u8 {
    let last = raw.len() - 1;
    (0..7).fold(0u8, |acc, b| {
        let p = start + b;
        let bit = (raw[last - p / 8] >> (p % 8)) & 1;
        acc | (bit << b)
    })
}

fn is_code(line: &str) -> bool {
    line.len() >= 4
        && (line.matches(':').count() >= 4 || line.contains('.') || line.contains("<None>"))
}
