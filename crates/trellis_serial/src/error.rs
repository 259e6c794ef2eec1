use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;

use thiserror::Error;
use trellis_tree::TreeError;

use crate::info::Type;

// -----------------------------------------------------------------------------
// ForbiddenType

/// A type named by the input was rejected by the [`TypeGate`](crate::security::TypeGate).
///
/// This is a security violation: the operation that raised it must be aborted,
/// the value is never skipped or replaced by a default.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("type `{0}` is not permitted by the type permissions")]
pub struct ForbiddenType(pub Type);

// -----------------------------------------------------------------------------
// ConversionError

/// Errors raised while marshalling or unmarshalling.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConversionError {
    #[error(transparent)]
    Forbidden(#[from] ForbiddenType),

    #[error("no converter registered for type `{0}`")]
    NoConverter(Type),

    #[error("type `{0}` is not registered")]
    UnregisteredType(Type),

    #[error("value of an unregistered runtime type")]
    UnregisteredValue,

    #[error("element `{0}` does not name a known type")]
    UnknownElement(String),

    #[error("type `{owner}` has no member for element `{element}`")]
    UnknownField { owner: Type, element: String },

    #[error("type `{0}` cannot be instantiated")]
    NotInstantiable(Type),

    #[error("expected a value of type `{expected}`, found {}", found_name(.found))]
    TypeMismatch { expected: Type, found: Option<Type> },

    #[error("cannot read `{text}` as `{ty}`")]
    InvalidText { ty: Type, text: String },

    #[error("attribute `{attribute}` of `{owner}` is already in use")]
    AttributeInUse { owner: Type, attribute: String },

    #[error("tree is nested deeper than {0} nodes")]
    TooDeep(usize),

    #[error("converter invoked outside of an unmarshalling call")]
    MissingRequiredType,

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("{source} (at {path})")]
    At {
        path: String,
        #[source]
        source: Box<ConversionError>,
    },
}

fn found_name(found: &Option<Type>) -> Cow<'static, str> {
    match found {
        Some(ty) => Cow::Owned(alloc::format!("`{ty}`")),
        None => Cow::Borrowed("a value of an unregistered type"),
    }
}

impl ConversionError {
    /// Shorthand for a [`TypeMismatch`](Self::TypeMismatch).
    #[inline]
    pub fn mismatch(expected: &Type, found: Option<&Type>) -> Self {
        Self::TypeMismatch {
            expected: expected.clone(),
            found: found.cloned(),
        }
    }

    /// Returns `true` if the error, or the error it locates, is a [`ForbiddenType`].
    pub fn is_security_violation(&self) -> bool {
        matches!(self.root_cause(), Self::Forbidden(_))
    }

    /// The error with all [`At`](Self::At) locations removed.
    pub fn root_cause(&self) -> &ConversionError {
        match self {
            Self::At { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// The innermost recorded tree path, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::At { path, source } => source.path().or(Some(path.as_str())),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::{String, ToString};

    use super::{ConversionError, ForbiddenType};
    use crate::info::Type;

    #[test]
    fn security_violation_survives_location() {
        let forbidden = ConversionError::from(ForbiddenType(Type::from_static("evil.Payload")));
        let located = ConversionError::At {
            path: String::from("/list/item"),
            source: Box::new(forbidden),
        };
        assert!(located.is_security_violation());
        assert_eq!(located.path(), Some("/list/item"));
        assert!(matches!(located.root_cause(), ConversionError::Forbidden(_)));
        assert!(!ConversionError::UnregisteredValue.is_security_violation());
    }

    #[test]
    fn messages() {
        let error = ConversionError::mismatch(&Type::from_static("i32"), None);
        assert_eq!(
            error.to_string(),
            "expected a value of type `i32`, found a value of an unregistered type"
        );
        let error = ConversionError::mismatch(
            &Type::from_static("i32"),
            Some(&Type::from_static("string")),
        );
        assert_eq!(error.to_string(), "expected a value of type `i32`, found `string`");
    }
}
