//! Secret references in `config.toml`.
//!
//! `[auth] access_token` may point at a secret instead of holding it:
//!
//! - `pass::path/in/store` - first line of `pass show path/in/store`
//! - `env::VAR_NAME` - the value of `$VAR_NAME`
//! - anything else is the token itself

use std::process::Command;

/// Resolves a value that may be a secret reference.
pub fn resolve(value: &str) -> Result<String, String> {
    match value.split_once("::") {
        Some(("pass", path)) => from_pass(path),
        Some(("env", var)) => from_env(var),
        _ => Ok(value.to_string()),
    }
}

/// Returns true if the value is a reference rather than a literal.
pub fn is_reference(value: &str) -> bool {
    value.starts_with("pass::") || value.starts_with("env::")
}

fn from_pass(path: &str) -> Result<String, String> {
    let output = Command::new("pass")
        .args(["show", path])
        .output()
        .map_err(|e| format!("failed to run `pass show {}`: {}", path, e))?;

    if !output.status.success() {
        return Err(format!(
            "`pass show {}` failed ({}): {}",
            path,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| format!("`pass show {}` produced no output", path))
}

fn from_env(var: &str) -> Result<String, String> {
    std::env::var(var).map_err(|_| format!("environment variable `{}` is not set", var))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_token_passthrough() {
        assert_eq!(resolve("ya29.a0AfH6").unwrap(), "ya29.a0AfH6");
        assert_eq!(resolve("").unwrap(), "");
        assert!(!is_reference("ya29.a0AfH6"));
    }

    #[test]
    fn unknown_prefix_is_literal() {
        assert_eq!(resolve("vault::secret/x").unwrap(), "vault::secret/x");
    }

    #[test]
    fn env_reference_resolves() {
        unsafe {
            std::env::set_var("_WORKLOCATION_TEST_TOKEN", "env-token");
        }
        assert!(is_reference("env::_WORKLOCATION_TEST_TOKEN"));
        assert_eq!(resolve("env::_WORKLOCATION_TEST_TOKEN").unwrap(), "env-token");
        unsafe {
            std::env::remove_var("_WORKLOCATION_TEST_TOKEN");
        }
    }

    #[test]
    fn env_reference_missing_var_errors() {
        let err = resolve("env::_WORKLOCATION_NONEXISTENT_VAR_98765").unwrap_err();
        assert!(err.contains("not set"));
    }

    #[test]
    fn pass_reference_failure_errors() {
        assert!(resolve("pass::nonexistent/worklocation/entry/98765").is_err());
    }
}
