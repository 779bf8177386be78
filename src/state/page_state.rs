/// Page state definitions for tracking harvest progress
///
/// The store keeps nullable columns; this module turns them into an explicit
/// two-state machine and rejects rows that are only partially filled.
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// Payload of a page that has been fetched at least once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedContent {
    /// Raw response body
    pub content: Vec<u8>,

    /// Hex digest of `content`
    pub digest: String,

    /// When the content was last committed
    pub updated_at: DateTime<Utc>,
}

/// Represents the current state of a page in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    /// Known URL with no content yet; eligible for fetching
    Pending,

    /// Content, digest and timestamp have been committed
    Fetched(FetchedContent),
}

/// Payload-free view of [`PageState`], used for counting and display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageStatus {
    Pending,
    Fetched,
}

/// A stored row had some, but not all, of its fetch columns set
#[derive(Debug, Error)]
#[error("partial record: content={content}, digest={digest}, updated_at={updated_at}")]
pub struct PartialRecord {
    pub content: bool,
    pub digest: bool,
    pub updated_at: bool,
}

impl PageState {
    /// Builds a state from the three nullable columns of a stored row
    ///
    /// All three must be present (fetched) or all absent (pending).
    pub fn from_columns(
        content: Option<Vec<u8>>,
        digest: Option<String>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Result<Self, PartialRecord> {
        match (content, digest, updated_at) {
            (None, None, None) => Ok(Self::Pending),
            (Some(content), Some(digest), Some(updated_at)) => {
                Ok(Self::Fetched(FetchedContent {
                    content,
                    digest,
                    updated_at,
                }))
            }
            (content, digest, updated_at) => Err(PartialRecord {
                content: content.is_some(),
                digest: digest.is_some(),
                updated_at: updated_at.is_some(),
            }),
        }
    }

    /// Returns true if the page still needs its first successful fetch
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns the fetched payload, if any
    pub fn fetched(&self) -> Option<&FetchedContent> {
        match self {
            Self::Pending => None,
            Self::Fetched(fetched) => Some(fetched),
        }
    }

    pub fn status(&self) -> PageStatus {
        match self {
            Self::Pending => PageStatus::Pending,
            Self::Fetched(_) => PageStatus::Fetched,
        }
    }
}

impl PageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetched => "fetched",
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status())
    }
}
