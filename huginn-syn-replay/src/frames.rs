use huginn_syn::{Result, SynError};

/// Decode a frames file: one hex-encoded Ethernet frame per line.
///
/// Blank lines and lines starting with `#` are skipped. Whitespace inside a
/// line is ignored so `xxd`-style grouping can be pasted as is.
pub fn parse_frames(txt: &str) -> Result<Vec<Vec<u8>>> {
    let mut frames = Vec::new();
    for (idx, raw) in txt.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let frame = decode_hex(line)
            .map_err(|reason| SynError::InvalidFrame { line: idx.saturating_add(1), reason })?;
        frames.push(frame);
    }
    Ok(frames)
}

fn decode_hex(line: &str) -> std::result::Result<Vec<u8>, String> {
    let digits: Vec<u8> = line.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits ({})", digits.len()));
    }
    digits
        .chunks_exact(2)
        .map(|pair| -> std::result::Result<u8, String> {
            Ok((nibble(pair[0])? << 4) | nibble(pair[1])?)
        })
        .collect()
}

fn nibble(digit: u8) -> std::result::Result<u8, String> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        other => Err(format!("invalid hex digit {:?}", char::from(other))),
    }
}
