// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

/// Failures surfaced by the browser, the forms, and the remote client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Transport failure or a non-success response from the backend.
    #[error("network error: {message}")]
    Network { message: String },

    /// A required field is missing or invalid; raised before any request is sent.
    #[error("{0}")]
    Validation(String),

    #[error("{kind} {id:?} not found")]
    NotFound { kind: &'static str, id: String },

    #[error(
        "page {requested} is not reachable from page {current} of {total_pages}"
    )]
    PageBoundary {
        requested: u32,
        current: u32,
        total_pages: u32,
    },
}

impl Error {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
