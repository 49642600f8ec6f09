//! Exit codes following sysexits.h conventions.
//!
//! These codes provide semantic meaning for different failure modes,
//! enabling scripts to handle errors appropriately.

use shoplens_core::{CatalogError, SearchError};

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line usage error.
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Data format error (malformed metadata, unusable engine output).
/// Maps to EX_DATAERR from sysexits.h.
pub const DATA_ERROR: i32 = 65;

/// Cannot open input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// Service unavailable (catalog database, similarity engine).
/// Maps to EX_UNAVAILABLE from sysexits.h.
pub const UNAVAILABLE: i32 = 69;

/// I/O error.
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Classified failure of a command.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        Self {
            code: classify(err, &message),
            message: Some(message),
        }
    }
}

fn classify(err: &anyhow::Error, message: &str) -> i32 {
    // Typed errors first, then the context strings attached by the commands
    for cause in err.chain() {
        if let Some(search) = cause.downcast_ref::<SearchError>() {
            return match search {
                SearchError::NoFileProvided => INPUT_ERROR,
                SearchError::EngineProducedNoOutput | SearchError::EngineOutputMalformed(_) => {
                    DATA_ERROR
                }
                SearchError::EngineTimeout(_)
                | SearchError::EngineUnavailable(_)
                | SearchError::CatalogUnavailable(_) => UNAVAILABLE,
                SearchError::Storage(_) => IO_ERROR,
            };
        }
        if cause.downcast_ref::<CatalogError>().is_some() {
            return UNAVAILABLE;
        }
        if cause.downcast_ref::<serde_json::Error>().is_some() {
            return DATA_ERROR;
        }
    }

    if message.contains("Failed to read") {
        INPUT_ERROR
    } else if message.contains("--yes") {
        USAGE_ERROR
    } else if message.contains("DATABASE_URL") {
        UNAVAILABLE
    } else if message.contains("Failed to write") {
        IO_ERROR
    } else {
        GENERAL_ERROR
    }
}
