//! Multi-line user input with attachment commands

use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::debug;

const USAGE_HINT: &str =
    "(finish with Ctrl-D on an empty line; type /image or /file on its own line to attach)";

/// What kind of file the user wants to attach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// An image, sent inline to the endpoint
    Image,
    /// A text file whose contents are appended to the message
    File,
}

impl AttachmentKind {
    fn from_command(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "/image" => Some(AttachmentKind::Image),
            "/file" => Some(AttachmentKind::File),
            _ => None,
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentKind::Image => f.write_str("image"),
            AttachmentKind::File => f.write_str("file"),
        }
    }
}

/// A file selected while capturing input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Kind requested by the user
    pub kind: AttachmentKind,
    /// Selected path
    pub path: PathBuf,
}

/// One captured user turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    /// Typed lines joined with `\n`
    pub text: String,
    /// File selected with `/image` or `/file`, if any
    pub attachment: Option<Attachment>,
}

impl Captured {
    /// Whether nothing was typed and nothing attached
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.attachment.is_none()
    }
}

/// Lets the user choose a file
pub trait FilePicker {
    /// Return the chosen path, or `None` if the user cancelled
    fn pick(
        &mut self,
        kind: AttachmentKind,
        input: &mut dyn BufRead,
        output: &mut dyn Write,
    ) -> io::Result<Option<PathBuf>>;
}

/// Asks for a path on the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPicker;

impl FilePicker for TerminalPicker {
    fn pick(
        &mut self,
        kind: AttachmentKind,
        input: &mut dyn BufRead,
        output: &mut dyn Write,
    ) -> io::Result<Option<PathBuf>> {
        write!(output, "Path to {} (blank to cancel): ", kind)?;
        output.flush()?;

        let mut line = String::new();
        input.read_line(&mut line)?;
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let path = PathBuf::from(line);
        if !path.is_file() {
            writeln!(output, "No such file: {}", path.display())?;
            return Ok(None);
        }
        Ok(Some(path))
    }
}

/// Reads one user turn from a line source
pub struct InputCapture<R, P> {
    reader: R,
    picker: P,
    output: Box<dyn Write + Send>,
}

impl<R: BufRead, P: FilePicker> InputCapture<R, P> {
    /// Capture from `reader`, writing prompts to stderr
    pub fn new(reader: R, picker: P) -> Self {
        Self {
            reader,
            picker,
            output: Box::new(io::stderr()),
        }
    }

    /// Write prompts and notices somewhere other than stderr
    pub fn with_output(mut self, output: impl Write + Send + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    /// Read lines until EOF or until a file is attached
    ///
    /// `/image` and `/file` open the picker; a selection ends the turn with
    /// the text typed so far, a cancellation resumes reading.
    pub fn capture(&mut self, prompt: &str) -> io::Result<Captured> {
        writeln!(self.output, "{}", prompt)?;
        writeln!(self.output, "{}", USAGE_HINT)?;

        let mut lines: Vec<String> = Vec::new();
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim_end_matches(['\n', '\r']);

            let Some(kind) = AttachmentKind::from_command(line) else {
                lines.push(line.to_string());
                continue;
            };

            match self.picker.pick(kind, &mut self.reader, &mut self.output)? {
                Some(path) => {
                    debug!(%kind, path = %path.display(), "Attachment selected");
                    return Ok(Captured {
                        text: lines.join("\n"),
                        attachment: Some(Attachment { kind, path }),
                    });
                }
                None => writeln!(self.output, "No {} selected, keep typing.", kind)?,
            }
        }

        Ok(Captured {
            text: lines.join("\n"),
            attachment: None,
        })
    }
}
