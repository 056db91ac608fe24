//! Route path patterns and location matching.
//!
//! PATTERN SYNTAX
//! ==============
//! - `orders`: static segment
//! - `:id`: parameter, matches exactly one segment
//! - `*rest`: catch-all, last segment only, matches zero or more segments
//!
//! Empty segments are ignored on both sides, so `/orders/`, `//orders` and
//! `/orders` are the same location.

#[cfg(test)]
#[path = "path_test.rs"]
mod path_test;

use std::collections::BTreeMap;

use super::RouteError;

/// Values captured from a matched location, keyed by parameter name.
pub type Params = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

impl Segment {
    fn rank(&self) -> u8 {
        match self {
            Self::Static(_) => 3,
            Self::Param(_) => 2,
            Self::CatchAll(_) => 1,
        }
    }
}

/// Ordering key for choosing between patterns that match the same location.
///
/// Field order matters: patterns without a catch-all always win, then
/// segments compare left to right (static over parameter), and a longer
/// fixed prefix wins when one is a prefix of the other.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity {
    exact: bool,
    ranks: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse an absolute pattern (`/orders/:id`).
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        if !raw.starts_with('/') {
            return Err(invalid(raw, "must start with '/'"));
        }
        Self::parse_relative(raw)
    }

    /// Parse a pattern without requiring a leading slash (child routes).
    pub fn parse_relative(raw: &str) -> Result<Self, RouteError> {
        let mut segments = Vec::new();
        let parts: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        for (i, part) in parts.iter().enumerate() {
            let segment = if let Some(name) = part.strip_prefix(':') {
                if !is_param_name(name) {
                    return Err(invalid(raw, &format!("bad parameter name '{name}'")));
                }
                Segment::Param(name.to_owned())
            } else if let Some(name) = part.strip_prefix('*') {
                if i + 1 != parts.len() {
                    return Err(invalid(raw, "catch-all must be the last segment"));
                }
                if !name.is_empty() && !is_param_name(name) {
                    return Err(invalid(raw, &format!("bad catch-all name '{name}'")));
                }
                Segment::CatchAll(if name.is_empty() { "path".to_owned() } else { name.to_owned() })
            } else if part.contains(['?', '#']) {
                return Err(invalid(raw, "query and fragment are not allowed in patterns"));
            } else {
                Segment::Static((*part).to_owned())
            };
            segments.push(segment);
        }

        let mut seen = Vec::new();
        for segment in &segments {
            if let Segment::Param(name) | Segment::CatchAll(name) = segment {
                if seen.contains(&name) {
                    return Err(invalid(raw, &format!("duplicate parameter '{name}'")));
                }
                seen.push(name);
            }
        }

        Ok(Self { raw: render(&segments), segments })
    }

    /// Append a child pattern to this one.
    pub fn join(&self, child: &PathPattern) -> Result<Self, RouteError> {
        if self.has_catch_all() && !child.segments.is_empty() {
            return Err(invalid(&format!("{}/{}", self.raw, child.raw), "catch-all must be the last segment"));
        }
        let mut segments = self.segments.clone();
        segments.extend(child.segments.iter().cloned());
        Self::parse(&render(&segments))
    }

    /// Canonical form: leading slash, no trailing slash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn has_catch_all(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::CatchAll(_)))
    }

    #[must_use]
    pub fn specificity(&self) -> Specificity {
        Specificity {
            exact: !self.has_catch_all(),
            ranks: self
                .segments
                .iter()
                .filter(|s| !matches!(s, Segment::CatchAll(_)))
                .map(Segment::rank)
                .collect(),
        }
    }

    /// Match already-split location segments, returning captured params.
    #[must_use]
    pub fn matches(&self, location: &[&str]) -> Option<Params> {
        let mut params = Params::new();
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::CatchAll(name) => {
                    let rest = location.get(i..).unwrap_or_default();
                    params.insert(name.clone(), rest.join("/"));
                    return Some(params);
                }
                Segment::Static(expected) => {
                    if location.get(i) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = location.get(i)?;
                    params.insert(name.clone(), (*value).to_owned());
                }
            }
        }
        (location.len() == self.segments.len()).then_some(params)
    }

    /// Build a concrete path by substituting `params`.
    pub fn build(&self, params: &Params) -> Result<String, RouteError> {
        let mut out = String::new();
        for segment in &self.segments {
            let value = match segment {
                Segment::Static(text) => text.as_str(),
                Segment::Param(name) => params
                    .get(name)
                    .map(String::as_str)
                    .filter(|v| !v.is_empty() && !v.contains('/'))
                    .ok_or_else(|| RouteError::MissingParam { pattern: self.raw.clone(), param: name.clone() })?,
                Segment::CatchAll(name) => match params.get(name).map(|v| v.trim_matches('/')) {
                    Some(v) if !v.is_empty() => v,
                    _ => continue,
                },
            };
            out.push('/');
            out.push_str(value);
        }
        if out.is_empty() {
            out.push('/');
        }
        Ok(out)
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A location split into its path segments, query, and fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitLocation<'a> {
    pub segments: Vec<&'a str>,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

impl SplitLocation<'_> {
    /// Normalized path: leading slash, no empty segments.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

#[must_use]
pub fn split_location(location: &str) -> SplitLocation<'_> {
    let (rest, fragment) = match location.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (location, None),
    };
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };
    SplitLocation {
        segments: path.split('/').filter(|s| !s.is_empty()).collect(),
        query: query.filter(|q| !q.is_empty()),
        fragment: fragment.filter(|f| !f.is_empty()),
    }
}

fn render(segments: &[Segment]) -> String {
    if segments.is_empty() {
        return "/".to_owned();
    }
    segments
        .iter()
        .map(|s| match s {
            Segment::Static(text) => format!("/{text}"),
            Segment::Param(name) => format!("/:{name}"),
            Segment::CatchAll(name) => format!("/*{name}"),
        })
        .collect()
}

fn is_param_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn invalid(pattern: &str, reason: &str) -> RouteError {
    RouteError::InvalidPattern { pattern: pattern.to_owned(), reason: reason.to_owned() }
}
