use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("no element matches `{selector}`")]
    NotFound { selector: String },

    #[error("click was intercepted by another element")]
    ClickIntercepted,

    #[error("timed out after {timeout:?} waiting for `{selector}`")]
    TimedOut { selector: String, timeout: Duration },

    #[error("webdriver command failed: {0}")]
    Command(String),

    #[error("failed to start webdriver session: {0}")]
    Session(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("failed to read response body from {url}: {reason}")]
    Body { url: String, reason: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode record: {0}")]
    Encode(String),
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Write(#[from] StorageError),
}

/// Conditions that end the whole run.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("no product entries appeared within {timeout:?}: {source}")]
    NoProducts {
        timeout: Duration,
        #[source]
        source: BrowserError,
    },
}

/// The fixed per-product step sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Name,
    MainImage,
    Swatches,
    Details,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Name => write!(f, "name resolution"),
            Step::MainImage => write!(f, "main image"),
            Step::Swatches => write!(f, "swatches"),
            Step::Details => write!(f, "details"),
        }
    }
}

/// A step that could not complete; the product carries on without its output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{step} skipped: {reason}")]
pub struct Skipped {
    pub step: Step,
    pub reason: String,
}

impl Skipped {
    pub fn new(step: Step, reason: impl ToString) -> Self {
        Self {
            step,
            reason: reason.to_string(),
        }
    }
}

pub type StepResult<T> = Result<T, Skipped>;
