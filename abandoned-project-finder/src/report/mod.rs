//! Ranking and report output.
//!
//! [`ReportRow`] is a pure mapping from candidates to the fixed column set;
//! this module then encodes rows as CSV.

mod error;
mod row;

pub use error::ReportError;
pub use row::{ReportRow, REPORT_COLUMNS};

use crate::repository::AbandonedCandidate;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{error, info};

/// Default report file name.
pub const DEFAULT_OUTPUT: &str = "abandoned_projects.csv";

/// File mode of written reports.
#[cfg(unix)]
const REPORT_MODE: u32 = 0o644;

/// Sorts candidates by score descending, then identity ascending.
pub fn rank(candidates: &mut [AbandonedCandidate]) {
    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.id().cmp(b.id()))
    });
}

/// Directory a report at `path` is written into.
fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn write_error(path: &Path, source: std::io::Error) -> ReportError {
    ReportError::OutputWrite {
        path: path.display().to_string(),
        source,
    }
}

/// Checks that a report can be created at `path`.
///
/// Run before any API call so a bad destination costs no quota.
///
/// # Errors
///
/// Returns [`ReportError::OutputWrite`] if the parent directory is missing or
/// not writable, or if `path` is a directory.
pub fn ensure_writable(path: &Path) -> Result<(), ReportError> {
    if path.is_dir() {
        return Err(write_error(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path is a directory"),
        ));
    }
    NamedTempFile::new_in(parent_dir(path))
        .map(drop)
        .map_err(|e| write_error(path, e))
}

/// Writes `rows` to `path`, replacing any existing file.
///
/// The header is always written, even with no rows. Rows go to a temporary
/// file in the same directory which is then renamed over `path`, so readers
/// never observe a partially written report.
///
/// # Errors
///
/// Returns [`ReportError`] if the file cannot be written.
pub fn write_report(rows: &[ReportRow], path: &Path) -> Result<(), ReportError> {
    let mut temp = NamedTempFile::new_in(parent_dir(path)).map_err(|e| write_error(path, e))?;
    let encode_error = |source| ReportError::Encode {
        path: path.display().to_string(),
        source,
    };

    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(temp.as_file_mut());
        writer.write_record(REPORT_COLUMNS).map_err(encode_error)?;
        for row in rows {
            writer.serialize(row).map_err(encode_error)?;
        }
        writer.flush().map_err(|e| write_error(path, e))?;
    }

    // Temp files are created owner-only; reports are ordinary shared files.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(REPORT_MODE))
            .map_err(|e| write_error(path, e))?;
    }

    temp.persist(path).map_err(|e| write_error(path, e.error))?;
    info!(path = %path.display(), rows = rows.len(), "Report written");
    Ok(())
}

/// Reads a report written by [`write_report`].
///
/// # Errors
///
/// Returns [`ReportError::Read`] if the file is missing or a row does not match the schema.
pub fn read_report(path: &Path) -> Result<Vec<ReportRow>, ReportError> {
    let read_error = |source| ReportError::Read {
        path: path.display().to_string(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(read_error)?;
    reader
        .deserialize()
        .collect::<Result<Vec<ReportRow>, _>>()
        .map_err(read_error)
}

/// Logs every row as JSON so results survive a failed write.
pub fn dump_rows(rows: &[ReportRow]) {
    for row in rows {
        match serde_json::to_string(row) {
            Ok(json) => error!(row = %json, "Unsaved report row"),
            Err(e) => error!(owner = %row.owner, name = %row.name, error = %e, "Unsaved report row"),
        }
    }
}
