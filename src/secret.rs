use anyhow::Result;
use zeroize::Zeroizing;

/// Primary environment variable holding the generation API credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Legacy spelling accepted as a fallback.
pub const API_KEY_ENV_FALLBACK: &str = "GOOGLE_API_KEY";

/// Small secret wrapper with redacted debug output and automatic zeroization.
#[derive(Default)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
    pub fn new(value: String) -> Self {
        Self(Zeroizing::new(value))
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.0.to_string())
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

pub trait ExposeSecret {
    fn expose_secret(&self) -> &str;
}

impl ExposeSecret for SecretString {
    fn expose_secret(&self) -> &str {
        self.0.as_str()
    }
}

/// Resolve the API credential from an arbitrary variable lookup.
///
/// Tries [`API_KEY_ENV`] first, then [`API_KEY_ENV_FALLBACK`]. Blank values
/// count as unset. The credential is resolved exactly once at startup and
/// handed to the model client as an explicit value; nothing deeper in the
/// call tree reads the environment again.
pub fn resolve_api_key_from<F>(lookup: F) -> Result<SecretString>
where
    F: Fn(&str) -> Option<String>,
{
    for var in [API_KEY_ENV, API_KEY_ENV_FALLBACK] {
        if let Some(value) = lookup(var) {
            if !value.trim().is_empty() {
                return Ok(SecretString::new(value));
            }
        }
    }
    anyhow::bail!("{API_KEY_ENV} environment variable not set.")
}

/// Resolve the API credential from the process environment.
pub fn resolve_api_key() -> Result<SecretString> {
    resolve_api_key_from(|var| std::env::var(var).ok())
}
