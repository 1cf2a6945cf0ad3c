//! External document conversion via pandoc.

use std::io::Read as _;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::errors::ConversionError;

/// How long one conversion may run before the child is killed.
const CONVERT_TIMEOUT: Duration = Duration::from_secs(120);

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Converts a saved HTML artifact into a word-processor document.
///
/// A missing binary, non-zero exit, or timeout is recoverable: the caller
/// keeps the HTML artifact and moves on to the next entry.
pub fn to_docx(
    program: &str,
    html_path: &Path,
    docx_path: &Path,
    reference_doc: Option<&Path>,
) -> Result<(), ConversionError> {
    let mut command = Command::new(program);
    command
        .arg(html_path)
        .arg("-o")
        .arg(docx_path)
        .args(["--from", "html", "--to", "docx"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    if let Some(reference) = reference_doc {
        command.arg("--reference-doc").arg(reference);
    }

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConversionError::MissingConverter {
                program: program.to_owned(),
            });
        }
        Err(err) => return Err(err.into()),
    };

    // Drain stderr on its own thread; a converter that fills the pipe
    // buffer would otherwise block and stall the wait loop.
    let stderr_reader = child.stderr.take().map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buffer = String::new();
            let _ = pipe.read_to_string(&mut buffer);
            buffer
        })
    });

    let deadline = Instant::now() + CONVERT_TIMEOUT;
    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                if let Some(reader) = stderr_reader {
                    let _ = reader.join();
                }
                return Err(ConversionError::TimedOut(CONVERT_TIMEOUT));
            }
            None => std::thread::sleep(POLL_INTERVAL),
        }
    };

    let stderr = stderr_reader
        .and_then(|reader| reader.join().ok())
        .unwrap_or_default();

    if !status.success() {
        return Err(ConversionError::Failed {
            status,
            stderr: stderr.trim().to_owned(),
        });
    }

    Ok(())
}
