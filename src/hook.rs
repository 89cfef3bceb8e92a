use crate::format::{FormatError, Formatter, JsonFormatter};
use crate::level::{Level, ALL_LEVELS};
use crate::record::LogRecord;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Secondary destination that receives records alongside the primary output.
///
/// Implementations are called synchronously on the emitting thread, after
/// the level threshold has been applied and before the primary output is
/// written. A failing hook never prevents the other hooks or the primary
/// output from receiving the record.
pub trait Hook: Send + Sync {
    /// Levels this hook reacts to. Records at other levels are not fired.
    fn levels(&self) -> &[Level];

    /// Persist or forward a single record.
    ///
    /// **Returns**
    /// - `Ok(())` if the record was fully written.
    /// - `Err(..)` on encode or I/O failure; the logger reports it on
    ///   stderr and carries on.
    fn fire(&self, record: &LogRecord) -> Result<(), HookError>;
}

/// Error type returned by [`Hook::fire`].
#[derive(thiserror::Error, Debug)]
pub enum HookError {
    #[error(transparent)]
    Encode(#[from] FormatError),

    #[error("failed appending: {0}")]
    Io(#[from] io::Error),

    /// The write call succeeded but accepted fewer bytes than requested.
    #[error("failed appending: wrote {written} of {expected} bytes")]
    Append { written: usize, expected: usize },
}

/// Appends every record it fires on to a file as one JSON object per line.
///
/// The file layout is always JSON, whatever the primary output uses, so
/// the file stays machine readable when the console is colored text.
#[derive(Debug, Clone)]
pub struct FileHook {
    path: PathBuf,
    levels: Vec<Level>,
    formatter: JsonFormatter,
}

impl FileHook {
    pub fn new(path: impl Into<PathBuf>, levels: &[Level]) -> Self {
        FileHook {
            path: path.into(),
            levels: levels.to_vec(),
            formatter: JsonFormatter,
        }
    }

    /// A hook that fires on every level.
    pub fn all_levels(path: impl Into<PathBuf>) -> Self {
        Self::new(path, &ALL_LEVELS)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Hook for FileHook {
    fn levels(&self) -> &[Level] {
        &self.levels
    }

    fn fire(&self, record: &LogRecord) -> Result<(), HookError> {
        let mut line = self.formatter.format(record, false)?;
        line.push('\n');
        append_to_file(&self.path, line.as_bytes())
    }
}

/// Open `path` for appending (creating it if needed), write `data` and close.
///
/// The file is not kept open between calls so that several processes
/// sharing one path interleave whole records.
pub fn append_to_file(path: &Path, data: &[u8]) -> Result<(), HookError> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    append(&mut file, data)
}

/// Write `data` with a single `write` call.
///
/// A short write is reported as [`HookError::Append`], distinct from the
/// I/O error the call itself may return.
pub fn append<W: Write>(writer: &mut W, data: &[u8]) -> Result<(), HookError> {
    let written = writer.write(data)?;
    if written != data.len() {
        return Err(HookError::Append {
            written,
            expected: data.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// Accepts at most `limit` bytes per call.
    struct Truncating {
        limit: usize,
    }

    impl Write for Truncating {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len().min(self.limit))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn short_write_is_an_append_error() {
        let err = append(&mut Truncating { limit: 3 }, b"hello").unwrap_err();
        match err {
            HookError::Append { written, expected } => {
                assert_eq!(written, 3);
                assert_eq!(expected, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn io_failure_is_kept_apart_from_truncation() {
        let err = append(&mut Broken, b"hello").unwrap_err();
        assert!(matches!(err, HookError::Io(_)));
        assert_eq!(err.to_string(), "failed appending: disk on fire");
    }

    #[test]
    fn full_write_succeeds() {
        let mut buf = Vec::new();
        append(&mut buf, b"hello").unwrap();
        assert_eq!(buf, b"hello");
    }

    #[test]
    fn file_hook_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jx.log");
        let hook = FileHook::all_levels(&path);

        hook.fire(&LogRecord::new(Level::Debug, "first", BTreeMap::new()))
            .unwrap();
        hook.fire(&LogRecord::new(Level::Error, "second", BTreeMap::new()))
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(r#""msg":"first""#));
        assert!(lines[0].contains(r#""level":"debug""#));
        assert!(lines[1].contains(r#""msg":"second""#));
        assert!(contents.ends_with("}\n"));
    }

    #[cfg(unix)]
    #[test]
    fn created_file_is_private_to_the_owner() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jx.log");
        append_to_file(&path, b"{}\n").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn file_hook_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let hook = FileHook::all_levels(dir.path().join("missing").join("jx.log"));

        let err = hook
            .fire(&LogRecord::new(Level::Info, "lost", BTreeMap::new()))
            .unwrap_err();
        assert!(matches!(err, HookError::Io(_)));
    }

    #[test]
    fn levels_are_the_constructed_set() {
        let hook = FileHook::new("unused.log", &[Level::Error, Level::Fatal]);
        assert_eq!(hook.levels(), &[Level::Error, Level::Fatal]);
        assert_eq!(FileHook::all_levels("x").levels().len(), 7);
    }
}
