//! Error kinds raised by the catalog client, the search flow and the session

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The user submitted a blank search; no request is made.
    #[error("Search can't empty")]
    EmptySearchTerm,

    #[error("Network error while searching for \"{term}\": {message}")]
    Network { term: String, message: String },

    #[error("{status} {reason} from {url}")]
    Server {
        status: u16,
        reason: String,
        url: String,
    },

    #[error("No songs found for '{term}'.")]
    EmptyResult { term: String },

    /// Selection of an index the current playlist doesn't have. Logged, never shown.
    #[error("track index {index} is outside the playlist ({len} tracks)")]
    InvalidSelection { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Message shown in place of the results list.
    pub fn user_message(&self) -> String {
        match self {
            Error::Network { .. } | Error::Server { .. } => {
                format!("Error fetching songs: {}", self)
            }
            _ => self.to_string(),
        }
    }
}
