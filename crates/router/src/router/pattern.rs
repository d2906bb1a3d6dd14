//! Route pattern compiler.
//!
//! A pattern is a `/` separated list of segments. `:name` captures one segment, a lone `*`
//! captures the rest of the path, everything else is matched literally. A pattern without
//! any `:` or `*` is static and is matched as a whole string.

use super::error::RouteError;

pub(crate) const CATCH_ALL_NAME: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'p> {
    Static(&'p str),
    Param(&'p str),
    CatchAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Pattern<'p> {
    raw: &'p str,
    segments: Vec<Segment<'p>>,
}

impl<'p> Pattern<'p> {
    pub(crate) fn parse(raw: &'p str) -> Result<Self, RouteError> {
        if raw.is_empty() {
            return Err(RouteError::EmptyPattern);
        }
        if !raw.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash { pattern: raw.to_owned() });
        }
        if !raw.contains([':', '*']) {
            return Ok(Self { raw, segments: Vec::new() });
        }

        let mut segments = Vec::new();
        for segment in raw[1..].split('/') {
            if segments.last() == Some(&Segment::CatchAll) {
                return Err(RouteError::CatchAllNotLast { pattern: raw.to_owned() });
            }
            segments.push(parse_segment(raw, segment)?);
        }

        Ok(Self { raw, segments })
    }

    pub(crate) fn raw(&self) -> &'p str {
        self.raw
    }

    /// A static pattern has no dynamic segment and is only matched by the exact same path
    pub(crate) fn is_static(&self) -> bool {
        self.segments.is_empty()
    }

    pub(crate) fn segments(&self) -> &[Segment<'p>] {
        &self.segments
    }

    /// Names of the captured values in path order, `*` standing for the catch-all
    pub(crate) fn param_names(&self) -> impl Iterator<Item = &'p str> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Static(_) => None,
            Segment::Param(name) => Some(*name),
            Segment::CatchAll => Some(CATCH_ALL_NAME),
        })
    }
}

fn parse_segment<'p>(pattern: &str, segment: &'p str) -> Result<Segment<'p>, RouteError> {
    if segment.is_empty() {
        return Err(RouteError::EmptySegment { pattern: pattern.to_owned() });
    }
    if segment.as_bytes()[1..].iter().any(|byte| matches!(byte, b':' | b'*')) {
        return Err(RouteError::MisplacedMarker { pattern: pattern.to_owned(), segment: segment.to_owned() });
    }

    match segment.as_bytes()[0] {
        b':' if segment.len() == 1 => Err(RouteError::EmptyParamName { pattern: pattern.to_owned() }),
        b':' => Ok(Segment::Param(&segment[1..])),
        b'*' if segment.len() == 1 => Ok(Segment::CatchAll),
        b'*' => Err(RouteError::InvalidCatchAll { pattern: pattern.to_owned(), segment: segment.to_owned() }),
        _ => Ok(Segment::Static(segment)),
    }
}
