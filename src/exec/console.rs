//! Line-atomic console sink shared by the stream drains.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Destination for relayed interpreter output.
///
/// Cloning is cheap; all clones write to the same sink. Each [`Console::write_line`] holds the lock for the
/// whole line, so output from concurrent drains never interleaves mid-line.
#[derive(Clone)]
pub struct Console {
    sink: Arc<Mutex<dyn Write + Send>>,
}

/// Handle to the bytes written through a capturing [`Console`].
#[derive(Clone, Default)]
pub struct Captured {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Captured {
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Console {
    /// Console that writes to the process's stdout.
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(writer)),
        }
    }

    /// Console that records everything in memory.
    pub fn capture() -> (Self, Captured) {
        let captured = Captured::default();
        let sink: Arc<Mutex<dyn Write + Send>> = captured.buffer.clone();
        (Self { sink }, captured)
    }

    /// Write one line followed by a newline.
    ///
    /// Write failures are dropped: a closed console must not fail the test it is reporting on.
    pub fn write_line(&self, line: &str) {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(sink, "{line}");
        let _ = sink.flush();
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdout()
    }
}
