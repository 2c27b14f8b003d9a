use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Most print-host endpoints answer either with their payload, or with an
/// `{"error": "..."}` object carrying the reason.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Reply<T> {
    Failed { error: String },
    Ok(T),
}

impl<T> Reply<T> {
    pub(crate) fn into_result(self) -> Result<T> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Failed { error } => Err(Error::Backend(error)),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct MessageReply {
    pub message: String,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub(crate) struct FilenameRequest<'a> {
    pub filename: &'a str,
}
