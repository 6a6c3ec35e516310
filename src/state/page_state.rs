/// Page state definitions for tracking crawl progress
///
/// This module defines all possible states a URL can be in during a crawl.
use std::fmt;

/// Represents the current state of a URL in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    /// URL has not been claimed by any path yet
    Unclaimed,

    /// URL is claimed and its fetch is queued or running
    Downloading,

    /// Page was fetched and is waiting to be extracted or finished
    Fetched,

    /// Page was fetched and its links are being extracted
    Extracting,

    /// Fetch or extraction failed; the cause is in the error map
    Errored,

    /// No further work will happen for this URL
    Done,
}

impl PageState {
    /// Returns true if the transition `self -> next` is allowed
    pub fn can_transition_to(&self, next: PageState) -> bool {
        use PageState::*;
        matches!(
            (self, next),
            (Unclaimed, Downloading)
                | (Downloading, Fetched)
                | (Downloading, Errored)
                | (Fetched, Extracting)
                | (Fetched, Done)
                | (Extracting, Errored)
                | (Extracting, Done)
                | (Errored, Done)
        )
    }

    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true once the page body has been fetched
    ///
    /// `Done` is included; callers must still consult the error map because
    /// errored URLs also end in `Done`.
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched | Self::Extracting | Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unclaimed => "unclaimed",
            Self::Downloading => "downloading",
            Self::Fetched => "fetched",
            Self::Extracting => "extracting",
            Self::Errored => "errored",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
