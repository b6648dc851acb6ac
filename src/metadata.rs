//! Route metadata model.
//!
//! A [`RouteTable`] maps controller method names to the [`RouteEntry`]
//! describing how that method is exposed over HTTP. Tables are assembled by
//! [`crate::decorator`] and consumed once by [`crate::dispatcher`].

use std::fmt;

use hyper::Method;

/// HTTP verbs a controller method can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    /// The matching hyper method.
    pub fn method(self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Delete => Method::DELETE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a positional handler argument comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    /// A named field of the query string.
    Query(String),
    /// The whole parsed request body.
    Body,
    /// The session produced by the session resolver.
    Session,
}

/// Upper bound (exclusive) on a positional parameter index.
pub const MAX_PARAMETERS: usize = 64;

/// Describes how to extract one positional handler argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescription {
    pub index: usize,
    /// `None` for a placeholder slot no decorator targeted.
    pub kind: Option<ParameterKind>,
}

impl ParameterDescription {
    pub fn placeholder(index: usize) -> Self {
        Self { index, kind: None }
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind.is_none()
    }

    /// Query field name, if this slot reads from the query string.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            Some(ParameterKind::Query(name)) => Some(name),
            _ => None,
        }
    }
}

/// Routing facts recorded for one controller method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteEntry {
    pub verb: Option<Verb>,
    pub path: Option<String>,
    pub auth_required: bool,
    /// Minimum session role level; implies authorization.
    pub role_level: Option<u32>,
    /// Ordered so that `parameters[i].index == i`.
    pub parameters: Vec<ParameterDescription>,
}

impl RouteEntry {
    /// Whether a session must be established before the handler runs.
    pub fn needs_session(&self) -> bool {
        self.auth_required || self.role_level.is_some()
    }

    /// Set the slot at `index`, growing the sequence with placeholders.
    pub(crate) fn set_parameter(&mut self, index: usize, kind: ParameterKind) {
        while self.parameters.len() <= index {
            let next = self.parameters.len();
            self.parameters.push(ParameterDescription::placeholder(next));
        }
        self.parameters[index].kind = Some(kind);
    }
}

/// Ordered mapping from method name to route entry.
///
/// Iteration follows the order in which each method was first decorated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    entries: Vec<(String, RouteEntry)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the entry for `method`.
    pub fn get(&self, method: &str) -> Option<&RouteEntry> {
        self.entries
            .iter()
            .find(|(name, _)| name == method)
            .map(|(_, entry)| entry)
    }

    /// Look up or create the entry for `method`.
    pub fn entry(&mut self, method: &str) -> &mut RouteEntry {
        let idx = match self.entries.iter().position(|(name, _)| name == method) {
            Some(idx) => idx,
            None => {
                self.entries.push((method.to_string(), RouteEntry::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for RouteTable {
    type Item = (String, RouteEntry);
    type IntoIter = std::vec::IntoIter<(String, RouteEntry)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
