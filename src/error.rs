use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed registration data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("no student at index {index} (dataset has {len} records)")]
    UnknownStudent { index: usize, len: usize },

    #[error("unrecognised viewer '{0}', expected 'admin' or a student index")]
    InvalidViewer(String),

    #[error("this view requires the admin role")]
    AdminRequired,

    #[error("admins have no home page of their own; pass --index to view a student's")]
    StudentRequired,
}
