// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for the dashboard API clients and their dispatcher.
//!
//! Every fallible operation returns [`Result<T>`], an alias for
//! `std::result::Result<T, DashboardApiError>`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardApiError {
    /// The client registry may only be overridden in the test environment.
    #[error("dashboard API clients can only be overridden in the test environment")]
    OverrideOutsideTest,

    /// The configured API version has no matching client.
    #[error("Unknown Dashboard API version: {0}")]
    UnknownApiVersion(String),

    #[error("Dashboard not found: {0}")]
    NotFound(String),

    /// Authentication failed or the caller lacks permission.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The dashboard changed since it was read, or the uid/title is taken.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, or the bare status.
        message: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input detected before any request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The stored dashboard could not be converted to the requested version.
    #[error("Dashboard stored as {stored_version} could not be converted: {message}")]
    Conversion {
        stored_version: String,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, DashboardApiError>;
