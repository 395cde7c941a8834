use std::env;
use std::str::FromStr;

use crate::PipelineError;

/// Retrieves an environment variable and splits it into a vector of strings based on a delimiter.
///
/// Empty pieces are dropped, so an unset variable yields an empty vector.
///
/// # Arguments
/// - `var`: The name of the environment variable.
/// - `delimiter`: The character to split the environment variable's value by.
pub fn get_env_var_as_vec(var: &str, delimiter: char) -> Vec<String> {
    env::var(var)
        .unwrap_or_default()
        .split(delimiter)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Returns the trimmed value of `var` if it is set and non-empty.
pub fn get_env_var(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses `var` into `T` if it is set. An unparsable value is a configuration error.
pub fn parse_env_var<T>(var: &str) -> Result<Option<T>, PipelineError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_var(var) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| PipelineError::Config(format!("{}={:?}: {}", var, raw, e))),
        None => Ok(None),
    }
}
