// JobSleuth - platform/fs.rs
//
// Reading OCR text inputs from disk or standard input.
//
// OCR engines occasionally emit stray bytes; invalid UTF-8 is replaced
// rather than rejected so a damaged capture still yields a partial result.

use crate::util::constants;
use crate::util::error::InputError;
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;

/// Read an input file as text, refusing files larger than `max_size`.
///
/// Transient I/O errors are retried with the delays in
/// `READ_RETRY_DELAYS_MS`; permanent errors return at once.
pub fn read_input(path: &Path, max_size: u64) -> Result<String, InputError> {
    let io_err = |e: io::Error| match e.kind() {
        io::ErrorKind::NotFound => InputError::NotFound {
            path: path.to_path_buf(),
        },
        _ => InputError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    };

    let size = std::fs::metadata(path).map_err(io_err)?.len();
    if size > max_size {
        return Err(InputError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            max_size,
        });
    }

    let bytes = read_with_retry(path).map_err(io_err)?;
    tracing::debug!(file = %path.display(), bytes = bytes.len(), "Input read");
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read all of `reader` (typically stdin) as lossy UTF-8, capped at `max_size`.
pub fn read_stream<R: Read>(reader: R, max_size: u64) -> Result<String, InputError> {
    let label = Path::new("<stdin>");
    let mut bytes = Vec::new();
    reader
        .take(max_size + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| InputError::Io {
            path: label.to_path_buf(),
            source: e,
        })?;

    if bytes.len() as u64 > max_size {
        return Err(InputError::FileTooLarge {
            path: label.to_path_buf(),
            size: bytes.len() as u64,
            max_size,
        });
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn read_with_retry(path: &Path) -> io::Result<Vec<u8>> {
    let mut last_err: Option<io::Error> = None;

    for attempt in 0..constants::MAX_READ_RETRIES {
        match std::fs::read(path) {
            Ok(bytes) => return Ok(bytes),
            Err(e) if is_transient_error(&e) => {
                tracing::debug!(
                    file = %path.display(),
                    attempt = attempt + 1,
                    error = %e,
                    "Transient I/O error, retrying"
                );
                std::thread::sleep(Duration::from_millis(
                    constants::READ_RETRY_DELAYS_MS[attempt as usize],
                ));
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or_else(|| io::Error::other("Unknown read error")))
}

/// Returns true for transient I/O errors that are worth retrying.
fn is_transient_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}
