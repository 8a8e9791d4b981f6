//! Registry credentials with memory-safe handling
//!
//! Credentials are sourced once from an explicit environment map, wrapped in
//! `secrecy` so the password cannot leak through `Debug` or logs, and dropped
//! right after login.

use crate::core::error::AuthError;
use secrecy::SecretString;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;

/// Username/password pair for registry login
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::new(password.into().into()),
        }
    }

    /// Read credentials from an environment map.
    ///
    /// A variable that is missing or empty yields
    /// `AuthError::MissingCredentials` naming that variable. The username is
    /// checked first.
    ///
    /// # Examples
    ///
    /// ```
    /// use image_publisher::security::Credentials;
    /// use std::collections::HashMap;
    ///
    /// let mut env = HashMap::new();
    /// env.insert("DOCKER_USERNAME".to_string(), "bot".to_string());
    /// env.insert("DOCKER_PASSWORD".to_string(), "hunter2-hunter2".to_string());
    ///
    /// let credentials = Credentials::from_env(&env, "DOCKER_USERNAME", "DOCKER_PASSWORD").unwrap();
    /// assert_eq!(credentials.username(), "bot");
    /// ```
    pub fn from_env(
        env: &HashMap<String, String>,
        username_var: &str,
        password_var: &str,
    ) -> Result<Self, AuthError> {
        let lookup = |name: &str| {
            env.get(name)
                .filter(|value| !value.is_empty())
                .cloned()
                .ok_or_else(|| AuthError::MissingCredentials {
                    variable: name.to_string(),
                })
        };

        let username = lookup(username_var)?;
        let password = lookup(password_var)?;

        Ok(Self::new(username, password))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Fail if any of `names` is set in `vars` with a value that is not UTF-8.
///
/// A UTF-8 environment map silently lacks such variables, which would
/// otherwise be reported as unset.
pub fn reject_non_unicode<I>(vars: I, names: &[&str]) -> Result<(), AuthError>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    for (key, value) in vars {
        if value.to_str().is_some() {
            continue;
        }
        if let Some(name) = key.to_str().filter(|key| names.contains(key)) {
            return Err(AuthError::NotUnicode {
                variable: name.to_string(),
            });
        }
    }
    Ok(())
}
