use std::{env, fmt::Display, str::FromStr};

/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Reads `name` from the environment and parses it into `T`. Unset or unparseable values yield `default`. In the
/// latter case the parse error is returned alongside so that callers can log it.
pub fn parse_env_or_default<T>(name: &str, default: T) -> (T, Option<String>)
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(s) => match s.trim().parse::<T>() {
            Ok(v) => (v, None),
            Err(e) => (default, Some(format!("{s} is not a valid value for {name}. {e}"))),
        },
        Err(_) => (default, None),
    }
}
