//! Handling of container log output as returned by `/containers/{id}/logs`.
//!
//! For containers without a TTY, Docker multiplexes stdout and stderr into frames,
//! each prefixed with an 8 byte header: `[stream, 0, 0, 0, size (u32 big endian)]`.

const FRAME_HEADER_LEN: usize = 8;

/// Returns the payload size announced by a frame header, or `None` if `buf` does not
/// start with one.
fn frame_size(buf: &[u8]) -> Option<usize> {
    match buf {
        [0..=2, 0, 0, 0, a, b, c, d, ..] => Some(u32::from_be_bytes([*a, *b, *c, *d]) as usize),
        _ => None,
    }
}

/// Strips the frame headers from multiplexed log output.
///
/// Output that does not start with a frame header (TTY containers) is returned as is.
pub fn demultiplex(raw: &[u8]) -> Vec<u8> {
    if frame_size(raw).is_none() {
        return raw.to_vec();
    }

    let mut out = Vec::with_capacity(raw.len());
    let mut rest = raw;
    while !rest.is_empty() {
        match frame_size(rest) {
            Some(size) => {
                let end = FRAME_HEADER_LEN.saturating_add(size).min(rest.len());
                out.extend_from_slice(&rest[FRAME_HEADER_LEN..end]);
                rest = &rest[end..];
            }
            None => {
                out.extend_from_slice(rest);
                break;
            }
        }
    }
    out
}

/// Returns the timestamp of the last log line.
///
/// Expects output requested with `timestamps=1`, where every line starts with an
/// RFC 3339 timestamp followed by a space. Returns an empty string if there is no log.
pub fn last_log_timestamp(raw: &[u8]) -> String {
    let text = demultiplex(raw);
    let text = String::from_utf8_lossy(&text);
    text.lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .and_then(|line| line.split_whitespace().next())
        .unwrap_or_default()
        .to_owned()
}

#[cfg(test)]
pub(crate) fn frame(stream: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![stream, 0, 0, 0];
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
    out
}
