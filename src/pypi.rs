//! PyPI API token storage in the project's `.pypirc`
//!
//! The file only ever holds the upload token:
//!
//! ```ini
//! [pypi]
//! username = __token__
//! password = pypi-...
//! ```
//!
//! Tokens are checked for the `pypi-` prefix only. Whether PyPI accepts them is not verified.

use crate::console::Console;
use crate::error::PypiError;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Token file name, relative to the project root
pub const PYPIRC_FILE: &str = ".pypirc";

const PYPI_SECTION: &str = "pypi";
const TOKEN_USERNAME: &str = "__token__";
const TOKEN_PREFIX: &str = "pypi-";

/// Options of the `[pypi]` section, keys lowercased
fn pypi_section(content: &str) -> HashMap<String, String> {
    let mut options = HashMap::new();
    let mut in_section = false;

    for line in content.lines() {
        if line.starts_with([' ', '\t']) {
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(['#', ';']) {
            continue;
        }

        if let Some(header) = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            in_section = header.trim() == PYPI_SECTION;
            continue;
        }

        if in_section {
            if let Some((key, value)) = trimmed.split_once(['=', ':']) {
                options.insert(key.trim().to_lowercase(), value.trim().to_string());
            }
        }
    }

    options
}

/// Whether the file holds a `[pypi]` section with the token username and a prefixed password
pub fn verify_pypirc(path: &Path) -> bool {
    let Ok(content) = fs::read_to_string(path) else {
        return false;
    };
    let options = pypi_section(&content);
    options.get("username").map(String::as_str) == Some(TOKEN_USERNAME)
        && options
            .get("password")
            .is_some_and(|password| password.starts_with(TOKEN_PREFIX))
}

/// Trim a token and check its prefix
pub fn validate_token(token: &str) -> Result<&str, PypiError> {
    let token = token.trim();
    if token.starts_with(TOKEN_PREFIX) {
        Ok(token)
    } else {
        Err(PypiError::InvalidToken)
    }
}

/// Overwrite the file with a `[pypi]` section holding the token
pub fn write_pypirc(path: &Path, token: &str) -> Result<(), PypiError> {
    let content = format!(
        "[{}]\nusername = {}\npassword = {}\n\n",
        PYPI_SECTION, TOKEN_USERNAME, token
    );
    fs::write(path, content).map_err(|e| PypiError::write(path, e))
}

/// Source of tokens and retry decisions
pub trait TokenPrompt {
    /// Ask for a token, input hidden
    fn token(&self) -> Result<String, PypiError>;

    /// Ask whether to try again after a rejected token
    fn retry(&self) -> Result<bool, PypiError>;
}

/// Interactive terminal prompt
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerPrompt;

impl TokenPrompt for DialoguerPrompt {
    fn token(&self) -> Result<String, PypiError> {
        dialoguer::Password::new()
            .with_prompt(
                "Enter your PyPI (API) token. It will be stored in .pypirc for future use. \
                 Input is hidden",
            )
            .interact()
            .map_err(|e| PypiError::prompt(e.to_string()))
    }

    fn retry(&self) -> Result<bool, PypiError> {
        dialoguer::Confirm::new()
            .with_prompt("Do you want to try again?")
            .default(true)
            .interact()
            .map_err(|e| PypiError::prompt(e.to_string()))
    }
}

/// Where the token in use came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// A valid token was already stored
    Existing,
    /// A new token was entered and written
    Entered,
}

/// Keep a valid stored token, or prompt until a valid one is written
///
/// With `replace` set, a stored token is ignored. A rejected token asks to retry and
/// declining returns [`PypiError::Aborted`].
pub fn acquire_token(
    path: &Path,
    replace: bool,
    prompt: &dyn TokenPrompt,
    console: &Console,
) -> Result<TokenSource, PypiError> {
    if !replace && verify_pypirc(path) {
        return Ok(TokenSource::Existing);
    }

    console.info(&format!(
        "No usable token in {}, acquiring a new one.",
        path.display()
    ));

    loop {
        let entered = prompt.token()?;
        let stored = validate_token(&entered).and_then(|token| write_pypirc(path, token));
        match stored {
            Ok(()) => return Ok(TokenSource::Entered),
            Err(e) => {
                console.warn(&e.to_string());
                if !prompt.retry()? {
                    return Err(PypiError::Aborted);
                }
            }
        }
    }
}
