//! Conversions from external infrastructure errors into domain errors.

use std::error::Error as StdError;
use std::io;

use boardsync_domain::BoardSyncError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub BoardSyncError);

impl From<InfraError> for BoardSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<BoardSyncError> for InfraError {
    fn from(value: BoardSyncError) -> Self {
        InfraError(value)
    }
}

trait IntoBoardSyncError {
    fn into_boardsync(self) -> BoardSyncError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → BoardSyncError */
/* -------------------------------------------------------------------------- */

impl IntoBoardSyncError for SqlError {
    fn into_boardsync(self) -> BoardSyncError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => BoardSyncError::Storage("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        BoardSyncError::Storage("database is locked".into())
                    }
                    ErrorCode::ReadOnly => {
                        BoardSyncError::Storage("database is read-only".into())
                    }
                    ErrorCode::CannotOpen => {
                        BoardSyncError::Storage(format!("unable to open database: {message}"))
                    }
                    _ => BoardSyncError::Storage(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => BoardSyncError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                BoardSyncError::Storage(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                BoardSyncError::Storage(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => BoardSyncError::Config(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => BoardSyncError::Storage(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_boardsync())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → BoardSyncError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(BoardSyncError::Storage(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → BoardSyncError */
/* -------------------------------------------------------------------------- */

impl IntoBoardSyncError for HttpError {
    fn into_boardsync(self) -> BoardSyncError {
        if is_connection_reset(&self) {
            return BoardSyncError::ConnectionReset(self.to_string());
        }

        if self.is_timeout() {
            return BoardSyncError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return BoardSyncError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_decode() {
            return BoardSyncError::InvalidInput(format!("malformed response body: {self}"));
        }

        if let Some(status) = self.status() {
            return status_error(status.as_u16(), status.canonical_reason().unwrap_or("unknown status"));
        }

        BoardSyncError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_boardsync())
    }
}

/// Map a non-success HTTP status to the domain error for that class.
///
/// 410 is only meaningful for change feed calls, which map it themselves.
pub fn status_error(code: u16, detail: &str) -> BoardSyncError {
    let message = format!("HTTP {code}: {detail}");
    match code {
        401 | 403 => BoardSyncError::Auth(message),
        404 => BoardSyncError::NotFound(message),
        400..=499 => BoardSyncError::InvalidInput(message),
        _ => BoardSyncError::Network(message),
    }
}

/// Walks the source chain looking for a reset socket.
fn is_connection_reset(error: &HttpError) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(error as &(dyn StdError + 'static));
    while let Some(err) = current {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::ConnectionReset {
                return true;
            }
        }
        let text = err.to_string().to_ascii_lowercase();
        if text.contains("connection reset") || text.contains("socket hang up") {
            return true;
        }
        current = err.source();
    }
    false
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
