use crate::Error;
use percent_encoding::percent_decode_str;
use std::borrow::Cow;

/// Decodes the escapes of a request path so its literal parts can be compared with the decoded
/// literals of the routes. `%2F` and `%25` stay escaped: the result splits on `/` exactly like
/// the request path, and decoding a slice of it once more yields the fully decoded value.
pub(crate) fn decode_for_matching(path: &str) -> crate::Result<Cow<'_, str>> {
    if !path.contains('%') {
        return Ok(Cow::Borrowed(path));
    }

    let bytes = path.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] != b'%' {
            decoded.push(bytes[idx]);
            idx += 1;
            continue;
        }

        match bytes.get(idx + 1..idx + 3) {
            Some(&[hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                let byte = (hex_value(hi) << 4) | hex_value(lo);
                if byte == b'/' || byte == b'%' {
                    decoded.extend_from_slice(&bytes[idx..idx + 3]);
                } else {
                    decoded.push(byte);
                }
                idx += 3;
            }
            _ => return Err(Error::Decode(path.to_owned())),
        }
    }

    String::from_utf8(decoded)
        .map(Cow::Owned)
        .map_err(|_| Error::Decode(path.to_owned()))
}

fn hex_value(digit: u8) -> u8 {
    (digit as char).to_digit(16).unwrap_or(0) as u8
}

/// Percent decodes a single path segment.
///
/// Unlike `percent_decode_str` alone, a `%` which isn't followed by two hex digits is an error,
/// as is a decoded byte sequence which isn't valid UTF-8.
pub(crate) fn percent_decode_segment(segment: &str) -> crate::Result<Cow<'_, str>> {
    let mut rest = segment.as_bytes();
    while let Some(idx) = rest.iter().position(|&b| b == b'%') {
        match rest.get(idx + 1..idx + 3) {
            Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => rest = &rest[idx + 3..],
            _ => return Err(Error::Decode(segment.to_owned())),
        }
    }

    percent_decode_str(segment)
        .decode_utf8()
        .map_err(|_| Error::Decode(segment.to_owned()))
}

/// Percent decodes a path segment by segment, so an encoded `/` inside a segment can't be
/// confused with a separator before the segments are split.
pub(crate) fn percent_decode_path(path: &str) -> crate::Result<Cow<'_, str>> {
    if !path.contains('%') {
        return Ok(Cow::Borrowed(path));
    }

    let mut decoded = String::with_capacity(path.len());
    for (idx, segment) in path.split('/').enumerate() {
        if idx > 0 {
            decoded.push('/');
        }
        decoded.push_str(&percent_decode_segment(segment)?);
    }

    Ok(Cow::Owned(decoded))
}

/// Returns the canonical form of a URL path: duplicate slashes removed, `.` and `..` segments
/// resolved, a leading slash added. A trailing slash is kept.
pub(crate) fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_owned();
    }

    let trailing_slash = path.len() > 1 && path.ends_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }

    let mut cleaned = String::with_capacity(path.len() + 1);
    for segment in segments {
        cleaned.push('/');
        cleaned.push_str(segment);
    }

    if cleaned.is_empty() || trailing_slash {
        cleaned.push('/');
    }

    cleaned
}

/// Adds a trailing slash to the path or removes it.
pub(crate) fn toggle_trailing_slash(path: &str) -> String {
    match path.strip_suffix('/') {
        Some(stripped) => stripped.to_owned(),
        None => format!("{}/", path),
    }
}
