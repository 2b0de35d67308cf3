use anyhow::{Result, bail};
use serde::Deserialize;
use std::env::VarError;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

fn default_env_var() -> String {
    "MAPBOX_ACCESS_TOKEN".to_string()
}
fn default_dotenv_path() -> PathBuf {
    PathBuf::from(".env")
}
fn default_dotenv_key() -> String {
    "VITE_YOUR_MAPBOX_ACCESS_TOKEN".to_string()
}

/// Where to look for the Mapbox access token
#[derive(Debug, Deserialize, Clone)]
pub struct CredentialSources {
    #[serde(default = "default_env_var")]
    pub env_var: String,
    #[serde(default = "default_dotenv_path")]
    pub dotenv_path: PathBuf,
    /// Key looked up in the dotenv file before `env_var`
    #[serde(default = "default_dotenv_key")]
    pub dotenv_key: String,
}

impl Default for CredentialSources {
    fn default() -> Self {
        Self {
            env_var: default_env_var(),
            dotenv_path: default_dotenv_path(),
            dotenv_key: default_dotenv_key(),
        }
    }
}

impl CredentialSources {
    /// Resolve the token from the process environment, the dotenv file, or
    /// an interactive prompt, and fail if all of them come up empty.
    pub fn require_token(&self) -> Result<String> {
        match self.resolve_with(|key| std::env::var(key), prompt_for_token) {
            Some(token) => Ok(token),
            None => bail!(
                "{} is not set. Export it, add {}=<token> to {}, or enter it when prompted",
                self.env_var,
                self.dotenv_key,
                self.dotenv_path.display()
            ),
        }
    }

    /// Token lookup with injectable environment and prompt.
    ///
    /// Order: environment variable, dotenv file, prompt. Blank values are
    /// skipped.
    pub fn resolve_with<E, P>(&self, lookup: E, prompt: P) -> Option<String>
    where
        E: Fn(&str) -> Result<String, VarError>,
        P: FnOnce() -> Option<String>,
    {
        if let Some(token) = lookup(self.env_var.as_str()).ok().and_then(non_blank) {
            return Some(token);
        }

        let keys = [self.dotenv_key.as_str(), self.env_var.as_str()];
        if let Some(token) = read_dotenv_token(&self.dotenv_path, &keys) {
            return Some(token);
        }

        prompt().and_then(non_blank)
    }
}

/// First non-blank value among `keys` in a dotenv file.
///
/// Missing files are ignored. Parsing follows `dotenvy`: `$VAR` references
/// are substituted and malformed lines are skipped, but an unterminated
/// quote swallows every line after it.
pub fn read_dotenv_token(path: &Path, keys: &[&str]) -> Option<String> {
    if !path.exists() {
        return None;
    }

    let entries: Vec<(String, String)> = dotenvy::from_path_iter(path)
        .ok()?
        .filter_map(|entry| entry.ok())
        .collect();

    keys.iter().find_map(|key| {
        entries
            .iter()
            .filter(|(name, _)| name == key)
            .find_map(|(_, value)| non_blank(value.clone()))
    })
}

fn prompt_for_token() -> Option<String> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return None;
    }

    eprint!("Enter your Mapbox access token: ");
    io::stderr().flush().ok()?;

    let mut line = String::new();
    stdin.lock().read_line(&mut line).ok()?;
    non_blank(line)
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
