use std::env;
use std::str::FromStr;

/// Retrieves an environment variable and splits it into a vector of strings based on a delimiter.
///
/// Empty entries are dropped, so an unset variable yields an empty vector.
pub fn get_env_var_as_vec(var: &str, delimiter: char) -> Vec<String> {
    env::var(var)
        .unwrap_or_default()
        .split(delimiter)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Returns the trimmed value of `var`, or `None` when it is unset or blank.
pub fn get_env_var(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reads `var` and parses it, falling back to `default` when unset.
///
/// A value that is set but fails to parse is reported through `Err` with the raw text,
/// rather than being silently replaced by the default.
pub fn get_env_var_parsed<T: FromStr>(var: &str, default: T) -> Result<T, String> {
    match get_env_var(var) {
        Some(raw) => raw.parse::<T>().map_err(|_| raw),
        None => Ok(default),
    }
}

/// Interprets common truthy / falsy spellings ("1", "true", "yes", "on" and their opposites).
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
