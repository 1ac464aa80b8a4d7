/////////////////////////////////////////////////////////////////////////////////////////////
//
// Saves and loads fitted models through a versioned JSON envelope.
//
// Created on: 12 Aug 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const JSON_FORMAT_NAME: &str = "geosurf.json";
const JSON_VERSION: u32 = 1;

/// Borrowing envelope for SAVE (no clone of the model).
#[derive(Serialize)]
struct JsonEnvelopeRef<'a, T: ?Sized> {
    format: &'static str,
    version: u32,
    #[serde(flatten)]
    model: &'a T,
}

/// Owning envelope for LOAD (generic over the concrete model).
#[derive(Serialize, Deserialize)]
struct JsonEnvelopeOwned<T> {
    format: String,
    version: u32,
    #[serde(flatten)]
    model: T,
}

type ModelIOResult<T> = std::result::Result<T, ModelIOError>;

/// Save a fitted model to a **JSON envelope** `{ format, version, model }`.
///
/// The on-disk format is versioned; files produced here are intended to be
/// read back with [`load_model`].
///
/// ### Errors
/// - Returns `ModelIOError::{Create, Serialize, Flush}` on I/O or
///   serialization failures.
pub fn save_model<T: Serialize, P: AsRef<Path>>(model: &T, path: P) -> ModelIOResult<()> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref).map_err(|e| ModelIOError::Create {
        path: path_ref.to_path_buf(),
        source: e,
    })?;
    let mut w = BufWriter::new(file);

    let env = JsonEnvelopeRef {
        format: JSON_FORMAT_NAME,
        version: JSON_VERSION,
        model,
    };

    serde_json::to_writer_pretty(&mut w, &env).map_err(|e| ModelIOError::Serialize {
        path: path_ref.to_path_buf(),
        source: e,
    })?;
    w.flush().map_err(|e| ModelIOError::Flush {
        path: path_ref.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Load a model from a versioned **JSON envelope**, validating format & version.
///
/// ### Validation
/// - Fails if `format` or `version` do not match the supported envelope.
///
/// ### Errors
/// - Returns `ModelIOError::{Open, Parse, FormatMismatch, VersionMismatch}`
///   as appropriate.
pub fn load_model<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> ModelIOResult<T> {
    let path_ref = path.as_ref();

    let file = File::open(path_ref).map_err(|e| ModelIOError::Open {
        path: path_ref.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);

    let env: JsonEnvelopeOwned<T> =
        serde_json::from_reader(reader).map_err(|e| ModelIOError::Parse {
            path: path_ref.to_path_buf(),
            source: e,
        })?;

    // Validate envelope
    if env.format != JSON_FORMAT_NAME {
        return Err(ModelIOError::FormatMismatch {
            path: path_ref.to_path_buf(),
            found: env.format,
            expected: JSON_FORMAT_NAME,
        });
    }
    if env.version != JSON_VERSION {
        return Err(ModelIOError::VersionMismatch {
            path: path_ref.to_path_buf(),
            found: env.version,
            expected: JSON_VERSION,
        });
    }

    Ok(env.model)
}

/// Errors that can occur when saving or loading a fitted model.
///
/// This is the error type returned by [`save_model`] and [`load_model`],
/// wrapping lower-level I/O and JSON serialization issues as well as
/// format/version validation failures.
#[derive(Debug)]
pub enum ModelIOError {
    /// Failed to create the target file before writing a model.
    Create { path: PathBuf, source: io::Error },
    /// Failed to open an existing model file for reading.
    Open { path: PathBuf, source: io::Error },
    /// Failed to flush buffered output when finishing a write.
    Flush { path: PathBuf, source: io::Error },
    /// Error serializing the in-memory model to JSON.
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Error parsing JSON when reading a model from disk.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// The JSON `format` field does not match the expected model format.
    FormatMismatch {
        path: PathBuf,
        found: String,
        expected: &'static str,
    },
    /// The JSON `version` field does not match the supported version.
    VersionMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}

impl fmt::Display for ModelIOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelIOError::Create { path, source } => {
                write!(f, "creating {}: {}", path.display(), source)
            }
            ModelIOError::Open { path, source } => {
                write!(f, "opening {}: {}", path.display(), source)
            }
            ModelIOError::Flush { path, source } => {
                write!(f, "flushing {}: {}", path.display(), source)
            }
            ModelIOError::Serialize { path, source } => {
                write!(f, "serializing JSON to {}: {}", path.display(), source)
            }
            ModelIOError::Parse { path, source } => {
                write!(f, "parsing JSON in {}: {}", path.display(), source)
            }
            ModelIOError::FormatMismatch {
                path,
                found,
                expected,
            } => write!(
                f,
                "unsupported format {:?} (expected {:?}) in {}",
                found,
                expected,
                path.display()
            ),
            ModelIOError::VersionMismatch {
                path,
                found,
                expected,
            } => write!(
                f,
                "unsupported version {} (expected {}) in {}",
                found,
                expected,
                path.display()
            ),
        }
    }
}

impl Error for ModelIOError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ModelIOError::Create { source, .. }
            | ModelIOError::Open { source, .. }
            | ModelIOError::Flush { source, .. } => Some(source),
            ModelIOError::Serialize { source, .. } | ModelIOError::Parse { source, .. } => {
                Some(source)
            }
            ModelIOError::FormatMismatch { .. } | ModelIOError::VersionMismatch { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::constraints::{ConstraintStore, Point};
    use crate::methods::single_surface::SingleSurface;
    use crate::methods::ModelingMethod;
    use equator::assert;
    use geosurf_utils::KernelType;

    fn solved_method() -> SingleSurface {
        let mut store = ConstraintStore::new();
        store.add_interface([0.0, 0.0, 0.0], 0.0);
        store.add_interface([1.0, 0.0, 0.0], 1.0);
        store.add_interface([0.0, 1.0, 0.0], -1.0);
        let config = ModelConfig::builder(KernelType::GaussianRbf).build();
        let mut method = SingleSurface::new(config, store);
        method.setup_system_solver().unwrap();
        method
    }

    #[test]
    fn saved_model_evaluates_identically_after_load() {
        let method = solved_method();
        let path = std::env::temp_dir().join("geosurf_model_roundtrip_test.json");

        save_model(&method, &path).unwrap();
        let loaded: SingleSurface = load_model(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let positions = [[0.3, 0.4, 0.1], [0.9, -0.2, 0.5]];
        for position in positions {
            let mut a = Point::new(position);
            let mut b = Point::new(position);
            method.eval_scalar_interpolant_at_point(&mut a).unwrap();
            loaded.eval_scalar_interpolant_at_point(&mut b).unwrap();
            assert!(a.scalar_field().unwrap() == b.scalar_field().unwrap());
        }
    }

    #[test]
    fn wrong_format_is_rejected() {
        let path = std::env::temp_dir().join("geosurf_model_bad_format_test.json");
        std::fs::write(&path, r#"{"format":"other.json","version":1}"#).unwrap();

        let result: ModelIOResult<serde_json::Value> = load_model(&path);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(result, Err(ModelIOError::FormatMismatch { .. })));
    }
}
