// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for model queries and subset creation

use crate::{EntityId, ModelId};
use thiserror::Error;

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors reported by model collaborators
#[derive(Error, Debug)]
pub enum ModelError {
    /// Entity not found in the model
    #[error("Entity {0} not found")]
    EntityNotFound(EntityId),

    /// Model is not loaded (or was unloaded)
    #[error("{0} is not loaded")]
    ModelNotLoaded(ModelId),

    /// Entity exists but carries no geometry
    #[error("Entity {0} has no geometry")]
    MissingGeometry(EntityId),

    /// Subset could not be assembled
    #[error("Subset '{custom_id}' could not be created: {message}")]
    SubsetCreation { custom_id: String, message: String },

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl ModelError {
    /// Create a subset creation error
    pub fn subset(custom_id: impl Into<String>, msg: impl Into<String>) -> Self {
        ModelError::SubsetCreation {
            custom_id: custom_id.into(),
            message: msg.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        ModelError::Other(msg.into())
    }
}
