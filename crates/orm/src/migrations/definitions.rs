//! Migration Definitions - the contract every data migration implements
//!
//! A data migration is a behavior holder: it is constructed from its
//! arguments right before a run, applies one logical change in `up`, checks
//! that change in `verify`, and is dropped afterwards.

use std::fmt::Display;
use std::str::FromStr;

use async_trait::async_trait;

use crate::context::MigrationContext;
use crate::error::{MigrationError, MigrationResult};

/// A one-off, self-verifying data change
///
/// Both methods run inside the same transaction. Any error returned from
/// either one rolls back everything `up` wrote.
#[async_trait(?Send)]
pub trait DataMigration {
    /// Apply the change. Fail loudly rather than skipping partial work.
    async fn up(&mut self, ctx: &mut MigrationContext) -> MigrationResult<()>;

    /// Assert, with reads independent of `up`'s own logic, that the change is correct.
    async fn verify(&mut self, ctx: &mut MigrationContext) -> MigrationResult<()>;
}

/// Construction of a migration from its invocation arguments
pub trait FromArgs: Sized {
    fn from_args(args: MigrationArgs) -> MigrationResult<Self>;
}

/// Positional arguments forwarded verbatim to a migration's constructor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationArgs(Vec<String>);

impl MigrationArgs {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Split a comma-separated list (`"42,dry"`) into arguments.
    /// An empty string yields no arguments.
    pub fn from_comma_list(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::new();
        }
        Self(raw.split(',').map(str::to_string).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Raw argument at `index`
    pub fn raw(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Parse the required argument at `index`
    pub fn get<T>(&self, index: usize) -> MigrationResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.optional(index)?.ok_or_else(|| {
            MigrationError::InvalidArgument(format!(
                "missing argument at position {} ({} given)",
                index,
                self.len()
            ))
        })
    }

    /// Parse the argument at `index` if it was supplied
    pub fn optional<T>(&self, index: usize) -> MigrationResult<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.raw(index)
            .map(|raw| {
                raw.parse::<T>().map_err(|e| {
                    MigrationError::InvalidArgument(format!(
                        "argument {} ('{}') could not be parsed: {}",
                        index, raw, e
                    ))
                })
            })
            .transpose()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for MigrationArgs {
    fn from(args: Vec<String>) -> Self {
        Self(args)
    }
}

impl<'a> FromIterator<&'a str> for MigrationArgs {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

impl FromIterator<String> for MigrationArgs {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_comma_list() {
        assert!(MigrationArgs::from_comma_list("").is_empty());

        let args = MigrationArgs::from_comma_list("arg1,arg2");
        assert_eq!(args.as_slice(), &["arg1".to_string(), "arg2".to_string()]);

        let args = MigrationArgs::from_comma_list("a,,b");
        assert_eq!(args.len(), 3);
        assert_eq!(args.raw(1), Some(""));
    }

    #[test]
    fn test_typed_access() {
        let args: MigrationArgs = ["42", "true", "abc"].into_iter().collect();

        assert_eq!(args.get::<i64>(0).unwrap(), 42);
        assert!(args.get::<bool>(1).unwrap());
        assert_eq!(args.optional::<String>(5).unwrap(), None);

        let err = args.get::<i64>(2).unwrap_err();
        assert!(matches!(err, MigrationError::InvalidArgument(_)));
        assert!(err.to_string().contains("'abc'"));

        let err = args.get::<i64>(3).unwrap_err();
        assert!(err.to_string().contains("missing argument at position 3"));
    }
}
