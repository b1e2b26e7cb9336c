//! Destinations for the human readable diagnostics of the interface:
//! solve summaries and Slater condition messages.
//!
//! Machine readable events go through `tracing` instead.

use std::fs::File;
use std::io::{stderr, stdout, BufWriter, Error, ErrorKind, Result, Write};

/// Where diagnostic text is written.
#[derive(Default)]
pub enum PrintTarget {
    #[default]
    Stdout,
    Stderr,
    File(BufWriter<File>),
    /// kept in memory until read back
    Buffer(Vec<u8>),
    Stream(Box<dyn Write + Send + Sync>),
    Discard,
}

impl std::fmt::Debug for PrintTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PrintTarget::Stdout => "stdout",
            PrintTarget::Stderr => "stderr",
            PrintTarget::File(_) => "file",
            PrintTarget::Buffer(b) => return write!(f, "PrintTarget(buffer, {} bytes)", b.len()),
            PrintTarget::Stream(_) => "stream",
            PrintTarget::Discard => "discard",
        };
        write!(f, "PrintTarget({})", name)
    }
}

impl Write for PrintTarget {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        match self {
            PrintTarget::Stdout => stdout().lock().write(buf),
            PrintTarget::Stderr => stderr().lock().write(buf),
            PrintTarget::File(file) => file.write(buf),
            PrintTarget::Buffer(buffer) => {
                buffer.extend_from_slice(buf);
                Ok(buf.len())
            }
            PrintTarget::Stream(stream) => stream.write(buf),
            PrintTarget::Discard => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self {
            PrintTarget::Stdout => stdout().flush(),
            PrintTarget::Stderr => stderr().flush(),
            PrintTarget::File(file) => file.flush(),
            PrintTarget::Stream(stream) => stream.flush(),
            PrintTarget::Buffer(_) | PrintTarget::Discard => Ok(()),
        }
    }
}

/// Redirection of diagnostic output.  Implementors only expose their
/// [`PrintTarget`].
pub trait ConfigurablePrintTarget {
    fn print_target_mut(&mut self) -> &mut PrintTarget;

    fn print_to_stdout(&mut self) {
        self.replace_target(PrintTarget::Stdout);
    }

    fn print_to_stderr(&mut self) {
        self.replace_target(PrintTarget::Stderr);
    }

    fn print_to_file(&mut self, file: File) {
        self.replace_target(PrintTarget::File(BufWriter::new(file)));
    }

    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.replace_target(PrintTarget::Stream(stream));
    }

    /// Drop all diagnostic output.
    fn print_to_sink(&mut self) {
        self.replace_target(PrintTarget::Discard);
    }

    /// Collect diagnostic output in memory, see [`get_print_buffer`](Self::get_print_buffer).
    fn print_to_buffer(&mut self) {
        self.replace_target(PrintTarget::Buffer(Vec::new()));
    }

    /// Text collected since the last call to [`print_to_buffer`](Self::print_to_buffer).
    fn get_print_buffer(&mut self) -> Result<String> {
        match self.print_target_mut() {
            PrintTarget::Buffer(buffer) => Ok(String::from_utf8_lossy(buffer).into_owned()),
            other => Err(Error::new(
                ErrorKind::Other,
                format!("diagnostics are not buffered ({:?})", other),
            )),
        }
    }

    // pending output of the old target is flushed before switching
    #[doc(hidden)]
    fn replace_target(&mut self, target: PrintTarget) {
        let mut old = std::mem::replace(self.print_target_mut(), target);
        let _ = old.flush();
    }
}

impl ConfigurablePrintTarget for PrintTarget {
    fn print_target_mut(&mut self) -> &mut PrintTarget {
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_buffer_target() {
        let mut target = PrintTarget::default();
        assert!(target.get_print_buffer().is_err());

        target.print_to_buffer();
        writeln!(target, "SDP {}: {}", 3, "solved").unwrap();
        assert_eq!(target.get_print_buffer().unwrap(), "SDP 3: solved\n");

        target.print_to_sink();
        writeln!(target, "dropped").unwrap();
        assert!(target.get_print_buffer().is_err());
    }

    #[test]
    fn test_file_target() {
        let file = tempfile::tempfile().unwrap();
        let mut target = PrintTarget::default();
        target.print_to_file(file);
        writeln!(target, "primal Slater condition holds").unwrap();
        target.flush().unwrap();
        assert!(format!("{:?}", target).contains("file"));
    }
}
