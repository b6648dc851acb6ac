//! Parameter resolution.
//!
//! Turns a request plus a method's ordered [`ParameterDescription`]s into the
//! positional [`Arguments`] handed to the controller.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::metadata::{ParameterDescription, ParameterKind};
use crate::router::Request;
use crate::session::{Session, SessionResolver};

/// One resolved positional argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// No decorator targeted this position.
    Unset,
    /// Raw query field; `None` when absent.
    Query(Option<String>),
    /// The parsed request body.
    Body(Value),
    Session(Session),
}

/// Positional arguments for one handler invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Vec<Argument>);

impl Arguments {
    pub fn new(args: Vec<Argument>) -> Self {
        Self(args)
    }

    pub fn get(&self, index: usize) -> Option<&Argument> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.0.iter()
    }

    /// Query value at `index`.
    pub fn query(&self, index: usize) -> Result<Option<&str>> {
        match self.get(index) {
            Some(Argument::Query(value)) => Ok(value.as_deref()),
            _ => Err(mismatch(index, "query parameter")),
        }
    }

    /// Query value at `index`, failing with BadRequest when absent.
    pub fn require_query(&self, index: usize) -> Result<&str> {
        self.query(index)?
            .ok_or_else(|| Error::BadRequest(format!("Missing query parameter at position {index}")))
    }

    /// Body at `index` as raw JSON.
    pub fn raw_body(&self, index: usize) -> Result<&Value> {
        match self.get(index) {
            Some(Argument::Body(value)) => Ok(value),
            _ => Err(mismatch(index, "body")),
        }
    }

    /// Body at `index` deserialized into `T`.
    pub fn body<T: DeserializeOwned>(&self, index: usize) -> Result<T> {
        T::deserialize(self.raw_body(index)?)
            .map_err(|e| Error::BadRequest(format!("Invalid request body: {e}")))
    }

    /// Session at `index`.
    pub fn session(&self, index: usize) -> Result<&Session> {
        match self.get(index) {
            Some(Argument::Session(session)) => Ok(session),
            _ => Err(mismatch(index, "session")),
        }
    }

    /// First resolved session, wherever it sits.
    pub(crate) fn find_session(&self) -> Option<&Session> {
        self.0.iter().find_map(|arg| match arg {
            Argument::Session(session) => Some(session),
            _ => None,
        })
    }
}

fn mismatch(index: usize, expected: &str) -> Error {
    Error::BadRequest(format!("Argument {index} is not a {expected}"))
}

fn parse_body(request: &Request) -> Result<Value> {
    if request.body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&request.body)
        .map_err(|e| Error::BadRequest(format!("Invalid request body: {e}")))
}

/// Resolve `parameters` against `request` in ascending positional order.
///
/// Session lookups are awaited before the next position is touched, and their
/// errors are returned unchanged.
pub async fn resolve(
    request: &Request,
    parameters: &[ParameterDescription],
    sessions: &dyn SessionResolver,
) -> Result<Arguments> {
    let mut args = Vec::with_capacity(parameters.len());
    for description in parameters {
        let arg = match &description.kind {
            None => Argument::Unset,
            Some(ParameterKind::Query(name)) => {
                Argument::Query(request.query(name).map(str::to_string))
            }
            Some(ParameterKind::Body) => Argument::Body(parse_body(request)?),
            Some(ParameterKind::Session) => Argument::Session(sessions.resolve(request).await?),
        };
        args.push(arg);
    }
    Ok(Arguments(args))
}
