//! Route decorators.
//!
//! Each factory returns a [`Decorator`] that, applied to a [`RouteTable`] for
//! a method name, merges one fact into that method's [`RouteEntry`]:
//!
//! ```ignore
//! use gangway::decorator::{auth_required, get, query_param, session};
//!
//! let routes = RouteTable::builder()
//!     .route("list", [get("/items"), query_param(0, "page")])
//!     .route("mine", [get("/mine"), auth_required(), session(0)])
//!     .build()?;
//! ```
//!
//! A role level set with [`role_level`] implies [`auth_required`].
//!
//! Decorators on the same method commute. Verb decorators are the exception:
//! applying a second one replaces the recorded verb and path.
//!
//! [`RouteEntry`]: crate::metadata::RouteEntry

use crate::error::{Error, Result};
use crate::metadata::{MAX_PARAMETERS, ParameterKind, RouteTable, Verb};

/// One metadata mutation targeting a controller method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decorator {
    Mapping { verb: Verb, path: String },
    AuthRequired,
    RoleLevel(u32),
    Parameter { index: i64, kind: ParameterKind },
}

impl Decorator {
    /// Merge this decorator into the entry for `method`.
    pub fn apply(&self, table: &mut RouteTable, method: &str) -> Result<()> {
        match self {
            Decorator::Mapping { verb, path } => {
                let entry = table.entry(method);
                entry.verb = Some(*verb);
                entry.path = Some(path.clone());
            }
            Decorator::AuthRequired => {
                table.entry(method).auth_required = true;
            }
            Decorator::RoleLevel(level) => {
                table.entry(method).role_level = Some(*level);
            }
            Decorator::Parameter { index, kind } => {
                let slot = usize::try_from(*index)
                    .ok()
                    .filter(|slot| *slot < MAX_PARAMETERS)
                    .ok_or_else(|| Error::InvalidParameterIndex {
                        method: method.to_string(),
                        index: *index,
                    })?;
                table.entry(method).set_parameter(slot, kind.clone());
            }
        }
        Ok(())
    }
}

pub fn mapping(verb: Verb, path: impl Into<String>) -> Decorator {
    Decorator::Mapping {
        verb,
        path: path.into(),
    }
}

pub fn get(path: impl Into<String>) -> Decorator {
    mapping(Verb::Get, path)
}

pub fn post(path: impl Into<String>) -> Decorator {
    mapping(Verb::Post, path)
}

pub fn put(path: impl Into<String>) -> Decorator {
    mapping(Verb::Put, path)
}

pub fn delete(path: impl Into<String>) -> Decorator {
    mapping(Verb::Delete, path)
}

/// Require a valid session before the method is invoked.
pub fn auth_required() -> Decorator {
    Decorator::AuthRequired
}

/// Require a session whose role level is at least `level`.
pub fn role_level(level: u32) -> Decorator {
    Decorator::RoleLevel(level)
}

/// Bind argument `index` (below [`MAX_PARAMETERS`]) to the query field `name`.
pub fn query_param(index: i64, name: impl Into<String>) -> Decorator {
    Decorator::Parameter {
        index,
        kind: ParameterKind::Query(name.into()),
    }
}

/// Bind argument `index` to the parsed request body.
pub fn body(index: i64) -> Decorator {
    Decorator::Parameter {
        index,
        kind: ParameterKind::Body,
    }
}

/// Bind argument `index` to the resolved session.
pub fn session(index: i64) -> Decorator {
    Decorator::Parameter {
        index,
        kind: ParameterKind::Session,
    }
}

/// Fluent construction of a [`RouteTable`].
///
/// Errors are held back until [`build`](Builder::build) so that a table can
/// be declared as a single expression.
#[derive(Debug, Default)]
pub struct Builder {
    table: RouteTable,
    error: Option<Error>,
}

impl Builder {
    /// Apply `decorators` in order to `method`.
    pub fn route<I>(mut self, method: &str, decorators: I) -> Self
    where
        I: IntoIterator<Item = Decorator>,
    {
        if self.error.is_some() {
            return self;
        }
        for decorator in decorators {
            if let Err(e) = decorator.apply(&mut self.table, method) {
                self.error = Some(e);
                break;
            }
        }
        self
    }

    /// Finish the table, returning the first decorator error if any.
    pub fn build(self) -> Result<RouteTable> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.table),
        }
    }
}

impl RouteTable {
    pub fn builder() -> Builder {
        Builder::default()
    }
}
