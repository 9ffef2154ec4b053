//! Console echo of a streaming response

use std::io::{self, Write};
use tracing::warn;

const HEADER: &str = "🤖 Assistant: ";
const REASONING_MARKER: &str = "🤔 (thinking...)\n";
const ANSWER_MARKER: &str = "\n\n✅ (answer)\n";

/// Writes a response to a terminal-like sink as it streams
///
/// Write failures are logged and dropped; echo never fails a dispatch.
pub struct EchoSink {
    writer: Box<dyn Write + Send>,
}

impl EchoSink {
    /// Echo into an arbitrary writer
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Box::new(writer),
        }
    }

    /// Echo to standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Announce the start of a response
    pub fn header(&mut self) {
        self.write(HEADER);
    }

    /// Mark the start of the reasoning channel
    pub fn reasoning_started(&mut self) {
        self.write(REASONING_MARKER);
    }

    /// Mark the switch from reasoning to the answer
    pub fn answer_after_reasoning(&mut self) {
        self.write(ANSWER_MARKER);
    }

    /// Write one fragment verbatim
    pub fn fragment(&mut self, text: &str) {
        self.write(text);
    }

    /// Terminate the response
    pub fn finish(&mut self) {
        self.write("\n");
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = self
            .writer
            .write_all(text.as_bytes())
            .and_then(|_| self.writer.flush())
        {
            warn!("Dropping echo output: {}", e);
        }
    }
}

impl std::fmt::Debug for EchoSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EchoSink").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    /// Cloneable in-memory writer whose contents can be read back
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuffer(pub(crate) Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Writer that always fails
    pub(crate) struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
