//! Validation result type and combinators.
//!
//! Every field validator and every request-body validation in this crate
//! produces a [`Validation`]: either the strongly typed value a field parsed
//! into, or the list of human-readable messages explaining why it did not.
//! Validation of unrelated fields is never short-circuited — callers run
//! every validator, gate on [`all_valid`], and collect the full error set in
//! a single pass so a form submission reports everything that is wrong at
//! once.

use std::future::Future;

/// Tagged success/failure union for a single validation step.
///
/// Exactly one variant is ever populated. `E` defaults to a list of
/// human-readable messages, the shape every field validator uses.
///
/// # Examples
/// ```
/// use backend::domain::validation::{invalid, valid, Validation};
///
/// let ok: Validation<u32> = valid(7);
/// let bad: Validation<u32> = invalid(vec!["must be positive".to_owned()]);
/// assert!(ok.is_valid());
/// assert!(bad.is_invalid());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<T, E = Vec<String>> {
    /// The input passed and produced a typed value.
    Valid(T),
    /// The input failed with an error payload.
    Invalid(E),
}

/// Construct a [`Validation::Valid`].
pub const fn valid<T, E>(value: T) -> Validation<T, E> {
    Validation::Valid(value)
}

/// Construct a [`Validation::Invalid`].
pub const fn invalid<T, E>(errors: E) -> Validation<T, E> {
    Validation::Invalid(errors)
}

impl<T, E> Validation<T, E> {
    /// `true` when the value variant is populated.
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// `true` when the error variant is populated.
    pub const fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// Map the valid value, leaving errors untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validation<U, E> {
        match self {
            Self::Valid(value) => Validation::Valid(f(value)),
            Self::Invalid(errors) => Validation::Invalid(errors),
        }
    }

    /// Map the error payload, leaving valid values untouched.
    pub fn map_invalid<F>(self, f: impl FnOnce(E) -> F) -> Validation<T, F> {
        match self {
            Self::Valid(value) => Validation::Valid(value),
            Self::Invalid(errors) => Validation::Invalid(f(errors)),
        }
    }

    /// Chain a further validation over the valid value.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Validation<U, E>) -> Validation<U, E> {
        match self {
            Self::Valid(value) => f(value),
            Self::Invalid(errors) => Validation::Invalid(errors),
        }
    }

    /// The valid value, discarding errors.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Invalid(_) => None,
        }
    }

    /// The error payload, discarding the valid value.
    ///
    /// This is how a combined error object reports partial field failures:
    /// fields that passed contribute `None` and are skipped during
    /// serialisation, so only the failing fields appear in the map.
    pub fn err(self) -> Option<E> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(errors) => Some(errors),
        }
    }

    /// The error payload if invalid, otherwise a caller-supplied fallback.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::validation::{invalid, valid, Validation};
    ///
    /// let bad: Validation<(), Vec<String>> = invalid(vec!["nope".to_owned()]);
    /// assert_eq!(bad.err_or(vec![]), vec!["nope".to_owned()]);
    /// let ok: Validation<(), Vec<String>> = valid(());
    /// assert_eq!(ok.err_or(vec![]), Vec::<String>::new());
    /// ```
    pub fn err_or(self, fallback: E) -> E {
        match self {
            Self::Valid(_) => fallback,
            Self::Invalid(errors) => errors,
        }
    }

    /// Convert into a [`Result`] for `?`-style propagation.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Invalid(errors) => Err(errors),
        }
    }
}

impl<T, E> From<Result<T, E>> for Validation<T, E> {
    fn from(value: Result<T, E>) -> Self {
        match value {
            Ok(inner) => Self::Valid(inner),
            Err(errors) => Self::Invalid(errors),
        }
    }
}

/// Discriminant view over validations of differing payload types.
///
/// [`all_valid`] needs to inspect a heterogeneous list of results (a legal
/// name, a parsed URL, a file record) without caring what each one carries.
pub trait Validity {
    /// `true` when the underlying validation succeeded.
    fn valid(&self) -> bool;
}

impl<T, E> Validity for Validation<T, E> {
    fn valid(&self) -> bool {
        self.is_valid()
    }
}

/// `true` iff every result in the list is valid.
///
/// The empty list is vacuously valid. This is the single gate a resource
/// checks before committing a multi-field validation.
///
/// # Examples
/// ```
/// use backend::domain::validation::{all_valid, invalid, valid, Validation};
///
/// let name: Validation<&str> = valid("Acme");
/// let count: Validation<u32> = invalid(vec!["too large".to_owned()]);
/// assert!(!all_valid(&[&name, &count]));
/// assert!(all_valid(&[]));
/// ```
pub fn all_valid(results: &[&dyn Validity]) -> bool {
    results.iter().all(|result| result.valid())
}

/// Validate an optional input with an asynchronous validator.
///
/// Absent input short-circuits to `Valid(None)`; present input awaits the
/// validator (typically an existence lookup against the store) and wraps
/// the result in `Some`.
pub async fn optional_async<A, T, E, F, Fut>(
    value: Option<A>,
    validate: F,
) -> Validation<Option<T>, E>
where
    F: FnOnce(A) -> Fut,
    Fut: Future<Output = Validation<T, E>>,
{
    match value {
        None => Validation::Valid(None),
        Some(inner) => validate(inner).await.map(Some),
    }
}
