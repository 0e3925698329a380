//! Error taxonomy of the crate.
//!
//! Configuration problems surface at build time through the
//! [`ParamsBuilder`](crate::params::ParamsBuilder) and never during learning.
//! Persistence problems are reported as [`PersistError`] from
//! [`Xcsf::load`](crate::system::Xcsf::load) and
//! [`Xcsf::save`](crate::system::Xcsf::save), leaving no partial state behind.
//! Internal invariant violations (an empty match set after covering, a
//! numerosity reaching zero through an arithmetic bug) abort with a panic and
//! a diagnostic; they are not recoverable conditions.
use thiserror::Error;

/// Errors raised by [`Xcsf::save`](crate::system::Xcsf::save) and
/// [`Xcsf::load`](crate::system::Xcsf::load).
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed population file: {0}")]
    Format(#[from] serde_json::Error),
    #[error("unrecognized save tag `{0}`, expected `{1}`")]
    Tag(String, &'static str),
}
