use std::num::ParseFloatError;
use std::result;
use thiserror::Error;

pub type Result<T> = result::Result<T, SandDanceError>;

#[derive(Clone, Debug, Default)]
pub struct ErrorContext {
    pub contexts: Vec<String>,
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (i, context) in self.contexts.iter().enumerate() {
            writeln!(f, "    Context[{i}]: {context}")?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum SandDanceError {
    #[error("Expression parsing error: {0}\n{1}")]
    ParseError(String, ErrorContext),

    #[error("Expression evaluation error: {0}\n{1}")]
    EvaluationError(String, ErrorContext),

    #[error("Internal error: {0}\n{1}")]
    InternalError(String, ErrorContext),

    #[error("Vega Specification error: {0}\n{1}")]
    SpecificationError(String, ErrorContext),

    #[error("IO Error: {0}\n{1}")]
    IOError(std::io::Error, ErrorContext),

    #[error("Serde JSON Error: {0}\n{1}")]
    SerdeJsonError(serde_json::Error, ErrorContext),
}

impl SandDanceError {
    /// Append a new context level to the error
    pub fn with_context<S, F>(self, context_fn: F) -> Self
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        use SandDanceError::*;
        match self {
            ParseError(msg, mut context) => {
                context.contexts.push(context_fn().into());
                SandDanceError::ParseError(msg, context)
            }
            EvaluationError(msg, mut context) => {
                context.contexts.push(context_fn().into());
                SandDanceError::EvaluationError(msg, context)
            }
            InternalError(msg, mut context) => {
                context.contexts.push(context_fn().into());
                SandDanceError::InternalError(msg, context)
            }
            SpecificationError(msg, mut context) => {
                context.contexts.push(context_fn().into());
                SandDanceError::SpecificationError(msg, context)
            }
            IOError(err, mut context) => {
                context.contexts.push(context_fn().into());
                SandDanceError::IOError(err, context)
            }
            SerdeJsonError(err, mut context) => {
                context.contexts.push(context_fn().into());
                SandDanceError::SerdeJsonError(err, context)
            }
        }
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::ParseError(message.into(), Default::default())
    }

    pub fn evaluation<S: Into<String>>(message: S) -> Self {
        Self::EvaluationError(message.into(), Default::default())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::InternalError(message.into(), Default::default())
    }

    pub fn specification<S: Into<String>>(message: S) -> Self {
        Self::SpecificationError(message.into(), Default::default())
    }

    /// Context entries attached so far, outermost last
    pub fn contexts(&self) -> &[String] {
        use SandDanceError::*;
        match self {
            ParseError(_, context)
            | EvaluationError(_, context)
            | InternalError(_, context)
            | SpecificationError(_, context)
            | IOError(_, context)
            | SerdeJsonError(_, context) => &context.contexts,
        }
    }
}

pub trait ResultWithContext<R> {
    fn with_context<S, F>(self, context_fn: F) -> Result<R>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<R, E> ResultWithContext<R> for result::Result<R, E>
where
    E: Into<SandDanceError>,
{
    fn with_context<S, F>(self, context_fn: F) -> Result<R>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        match self {
            Ok(val) => Ok(val),
            Err(err) => {
                let sanddance_error: SandDanceError = err.into();
                Err(sanddance_error.with_context(context_fn))
            }
        }
    }
}

impl<R> ResultWithContext<R> for Option<R> {
    fn with_context<S, F>(self, context_fn: F) -> Result<R>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        match self {
            Some(val) => Ok(val),
            None => Err(SandDanceError::internal(context_fn().into())),
        }
    }
}

impl From<ParseFloatError> for SandDanceError {
    fn from(err: ParseFloatError) -> Self {
        Self::parse(err.to_string())
    }
}

impl From<std::io::Error> for SandDanceError {
    fn from(err: std::io::Error) -> Self {
        Self::IOError(err, Default::default())
    }
}

impl From<serde_json::Error> for SandDanceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerdeJsonError(err, Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_is_listed_in_display() {
        let err: Result<()> = Err(SandDanceError::specification("Parent scope has no width"));
        let err = err
            .with_context(|| "Failed to build layout Bar #0")
            .unwrap_err();
        assert_eq!(err.contexts(), &["Failed to build layout Bar #0".to_string()]);
        let msg = err.to_string();
        assert!(msg.starts_with("Vega Specification error: Parent scope has no width"));
        assert!(msg.contains("Context[0]: Failed to build layout Bar #0"));
    }

    #[test]
    fn test_none_becomes_internal() {
        let value: Option<u32> = None;
        let err = value.with_context(|| "No group with index 3").unwrap_err();
        assert!(matches!(err, SandDanceError::InternalError(..)));
    }
}
