//! Error types for the fpsutil library.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read network counters: {0}")]
    CounterSource(#[source] std::io::Error),

    #[error("no network interfaces reported")]
    NoInterfaces,

    #[error("malformed /proc/net/dev line {line}: {reason}")]
    MalformedNetDev { line: usize, reason: String },

    #[error("config file '{path}' not accessible: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("failed to create output file '{path}': {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("row queue closed")]
    QueueClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
