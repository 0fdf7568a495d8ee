use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum HnError {
    #[error("API error: {0}")]
    Api(String),

    #[error("cache error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for HnError {
    fn from(err: reqwest::Error) -> Self {
        HnError::Api(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HnError>;
