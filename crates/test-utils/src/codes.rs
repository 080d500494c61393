//! Encoder for the 7-bit packed code strings carried in NDFD local use
//! sections.

/// Pack code strings into the bit layout NDFD uses for `wx` and `wwa`
/// local use sections.
///
/// Each code is terminated by a zero group. The text is written as 7-bit
/// groups from the least significant end of a big-endian integer, last
/// character first, leaving the high-order bits unused.
pub fn pack_codes(codes: &[&str]) -> Vec<u8> {
    let mut groups: Vec<u8> = Vec::new();
    for code in codes {
        groups.extend(code.bytes().map(|b| b & 0x7F));
        groups.push(0);
    }

    let num_bytes = (7 * groups.len() + 8) / 8;
    let skip = (8 * num_bytes - 1) % 7;

    let mut raw = vec![0u8; num_bytes];
    for (k, &value) in groups.iter().rev().enumerate() {
        for b in 0..7 {
            if value >> b & 1 == 1 {
                let p = skip + 7 * k + b;
                raw[num_bytes - 1 - p / 8] |= 1 << (p % 8);
            }
        }
    }
    raw
}
