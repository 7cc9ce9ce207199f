//! # Environment Variables
//!
//! Utilities for reading and parsing environment variables.

use std::env;
use std::str::FromStr;

/// Get an environment variable by name.
pub fn get_env(name: &'static str) -> Result<String, Error> {
    env::var(name).map_err(|_| Error::MissingEnv(name))
}

/// Get and parse an environment variable.
pub fn get_env_parse<T: FromStr>(name: &'static str) -> Result<T, Error> {
    let val = get_env(name)?;
    val.parse::<T>().map_err(|_| Error::WrongFormat(name))
}

/// Get a comma-separated environment variable as a list.
///
/// Entries are trimmed and empty entries are discarded; an unset variable
/// yields an empty list rather than an error.
pub fn get_env_list(name: &'static str) -> Vec<String> {
    env::var(name)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

// region:    --- Error
#[derive(Debug)]
pub enum Error {
    MissingEnv(&'static str),
    WrongFormat(&'static str),
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for Error {}
// endregion: --- Error

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_list_trims_and_drops_empty() {
        std::env::set_var("LIB_UTILS_TEST_LIST", " a.example , ,b.example,");
        assert_eq!(
            get_env_list("LIB_UTILS_TEST_LIST"),
            vec!["a.example".to_string(), "b.example".to_string()]
        );
        std::env::remove_var("LIB_UTILS_TEST_LIST");
    }

    #[test]
    fn test_get_env_list_unset_is_empty() {
        assert!(get_env_list("LIB_UTILS_TEST_UNSET").is_empty());
    }
}
