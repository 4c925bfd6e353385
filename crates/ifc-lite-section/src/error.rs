// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for section edge generation

use ifc_lite_model::ModelError;
use thiserror::Error;

/// Section edge result type
pub type Result<T> = std::result::Result<T, Error>;

/// Section edge errors
///
/// All of these are scoped to one style: the coordinator records them and
/// carries on with the remaining styles.
#[derive(Error, Debug)]
pub enum Error {
    /// The subset builder could not produce geometry for a style
    #[error("Subset could not be created for style '{style}': {source}")]
    SubsetCreation {
        style: String,
        #[source]
        source: ModelError,
    },

    /// The subset's world transform has no inverse
    #[error("Subset transform of style '{style}' is not invertible")]
    SingularTransform { style: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Create a subset creation error
    pub fn subset_creation(style: impl Into<String>, source: ModelError) -> Self {
        Error::SubsetCreation {
            style: style.into(),
            source,
        }
    }

    /// Create a singular transform error
    pub fn singular_transform(style: impl Into<String>) -> Self {
        Error::SingularTransform {
            style: style.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Name of the style the error belongs to, if any
    pub fn style(&self) -> Option<&str> {
        match self {
            Error::SubsetCreation { style, .. } | Error::SingularTransform { style } => Some(style),
            Error::Config(_) => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
