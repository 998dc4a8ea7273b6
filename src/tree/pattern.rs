use crate::Error;

/// A piece of a parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece {
    /// Literal bytes, always containing the `/` separators around them.
    Static(String),
    /// `:name`, a single non-empty path segment.
    Param(String),
    /// `*name`, the rest of the path.
    CatchAll(String),
}

/// Splits a route pattern into literal runs and placeholders.
///
/// Placeholders take a whole segment. A segment starting with `\:` or `\*` is a literal segment
/// starting with `:` or `*`.
pub(crate) fn parse(pattern: &str) -> crate::Result<Vec<Piece>> {
    let rest = pattern
        .strip_prefix('/')
        .ok_or_else(|| Error::invalid_pattern(pattern, "a route pattern must start with '/'"))?;

    let segments: Vec<&str> = rest.split('/').collect();
    let last = segments.len() - 1;

    let mut pieces = Vec::new();
    let mut literal = String::from("/");

    for (idx, segment) in segments.into_iter().enumerate() {
        if let Some(name) = segment.strip_prefix(':') {
            validate_name(pattern, name, "parameter")?;
            flush(&mut literal, &mut pieces);
            pieces.push(Piece::Param(name.to_owned()));
        } else if let Some(name) = segment.strip_prefix('*') {
            validate_name(pattern, name, "catch-all")?;
            if idx != last {
                return Err(Error::invalid_pattern(
                    pattern,
                    "a catch-all must be the last segment of the pattern",
                ));
            }
            flush(&mut literal, &mut pieces);
            pieces.push(Piece::CatchAll(name.to_owned()));
        } else if segment.starts_with("\\:") || segment.starts_with("\\*") {
            literal.push_str(&segment[1..]);
        } else {
            literal.push_str(segment);
        }

        if idx != last {
            literal.push('/');
        }
    }
    flush(&mut literal, &mut pieces);

    Ok(pieces)
}

fn flush(literal: &mut String, pieces: &mut Vec<Piece>) {
    if !literal.is_empty() {
        pieces.push(Piece::Static(std::mem::take(literal)));
    }
}

fn validate_name(pattern: &str, name: &str, kind: &str) -> crate::Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_pattern(pattern, format!("a {} must have a name", kind)));
    }
    if name.contains(&[':', '*'][..]) {
        return Err(Error::invalid_pattern(
            pattern,
            format!("the {} name {:?} contains ':' or '*'", kind, name),
        ));
    }
    Ok(())
}
