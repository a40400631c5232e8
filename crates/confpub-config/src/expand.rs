//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// Supports:
/// - `${VAR}` - expands to the value of VAR, errors if unset
/// - `${VAR:-default}` - expands to VAR if set, otherwise uses default
///
/// Bare `$VAR` is left alone so passwords and URLs containing `$` survive.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(LookupError {
                var_name: var.to_owned(),
            }),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Expand an optional string field in place.
pub(crate) fn expand_opt(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(inner) = value.as_deref() {
        *value = Some(expand_env(inner, field)?);
    }
    Ok(())
}

struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_token_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("CONFPUB_EXPAND_TOKEN", "pat-123");
        }
        let result = expand_env("${CONFPUB_EXPAND_TOKEN}", "confluence.token").unwrap();
        assert_eq!(result, "pat-123");
        unsafe {
            std::env::remove_var("CONFPUB_EXPAND_TOKEN");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("CONFPUB_EXPAND_UNSET");
        }
        let result = expand_env("${CONFPUB_EXPAND_UNSET:-TUS}", "confluence.space_key").unwrap();
        assert_eq!(result, "TUS");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("CONFPUB_EXPAND_MISSING");
        }
        let err = expand_env("${CONFPUB_EXPAND_MISSING}", "confluence.password").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("CONFPUB_EXPAND_MISSING"));
        assert!(err.to_string().contains("confluence.password"));
    }

    #[test]
    fn test_expand_embedded_in_url() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("CONFPUB_EXPAND_HOST", "wiki.example.com");
        }
        let url = "https://${CONFPUB_EXPAND_HOST}:8090";
        let result = expand_env(url, "confluence.base_url").unwrap();
        assert_eq!(result, "https://wiki.example.com:8090");
        unsafe {
            std::env::remove_var("CONFPUB_EXPAND_HOST");
        }
    }

    #[test]
    fn test_bare_dollar_kept() {
        let result = expand_env("P@$$w0rd", "confluence.password").unwrap();
        assert_eq!(result, "P@$$w0rd");
    }

    #[test]
    fn test_expand_opt_none_untouched() {
        let mut value = None;
        expand_opt(&mut value, "confluence.token").unwrap();
        assert!(value.is_none());
    }
}
