use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Primary destination of formatted records.
///
/// Whether ANSI colors may be written is decided once, when the output is
/// constructed, and never re-checked per line.
pub struct Output {
    writer: Box<dyn Write + Send>,
    ansi: bool,
}

impl Output {
    pub fn new(writer: impl Write + Send + 'static, ansi: bool) -> Self {
        Output {
            writer: Box::new(writer),
            ansi,
        }
    }

    /// Standard output, colored only when it is a terminal.
    pub fn stdout() -> Self {
        let ansi = io::stdout().is_terminal();
        Self::new(io::stdout(), ansi)
    }

    /// Standard error, colored only when it is a terminal.
    pub fn stderr() -> Self {
        let ansi = io::stderr().is_terminal();
        Self::new(io::stderr(), ansi)
    }

    pub fn ansi(&self) -> bool {
        self.ansi
    }

    /// Write `line` followed by exactly one newline.
    pub(crate) fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        self.writer.write_all(buf.as_bytes())?;
        self.writer.flush()
    }
}

impl Default for Output {
    fn default() -> Self {
        Output::stdout()
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output").field("ansi", &self.ansi).finish_non_exhaustive()
    }
}

/// In-memory writer whose contents can be read back while it is installed.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_line_appends_single_newline() {
        let buffer = SharedBuffer::new();
        let mut output = Output::new(buffer.clone(), false);

        output.write_line("hello").unwrap();
        output.write_line("").unwrap();

        assert_eq!(buffer.contents(), "hello\n\n");
        assert!(!output.ansi());
    }
}
