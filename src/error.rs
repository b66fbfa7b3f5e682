//! Error types for simulation construction and configuration loading.

use std::collections::TryReserveError;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that prevent a simulation from being created.
///
/// Once construction succeeds, stepping cannot fail.
#[derive(Debug, Error)]
pub enum SimError {
    /// The grid must have at least two cells per axis.
    #[error("invalid grid size {size}: need at least 2 cells per axis")]
    InvalidGridSize {
        /// Requested cells per axis.
        size: usize,
    },

    /// A field, scratch, or transform buffer could not be reserved.
    #[error("failed to allocate {buffer} buffer")]
    Allocation {
        /// Name of the buffer being allocated.
        buffer: &'static str,
        /// Underlying allocator error.
        #[source]
        source: TryReserveError,
    },
}

/// Errors from reading a YAML configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read {path}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not valid configuration YAML.
    #[error("failed to parse {path}")]
    Parse {
        /// Path that was parsed.
        path: PathBuf,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },
}

/// Allocate a zero-filled vector, reporting allocation failure instead of aborting.
pub(crate) fn try_zeroed<T: Clone + Default>(len: usize, buffer: &'static str) -> Result<Vec<T>, SimError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|source| SimError::Allocation { buffer, source })?;
    v.resize(len, T::default());
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_zeroed_len_and_contents() {
        let v: Vec<f64> = try_zeroed(12, "test").unwrap();
        assert_eq!(v.len(), 12);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_try_zeroed_reports_overflow() {
        let err = try_zeroed::<f64>(usize::MAX, "huge").unwrap_err();
        match err {
            SimError::Allocation { buffer, .. } => assert_eq!(buffer, "huge"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_error_messages() {
        let e = SimError::InvalidGridSize { size: 1 };
        assert_eq!(e.to_string(), "invalid grid size 1: need at least 2 cells per axis");
    }
}
