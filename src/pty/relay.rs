//! Byte relays between the caller's streams and the pty master.

use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, PoisonError};

use nix::errno::Errno;
use tracing::{debug, trace};

const CHUNK_SIZE: usize = 8 * 1024;

/// Writer half of the pty master, shared with the input thread.
///
/// The session takes the writer out when the run ends, which closes it even
/// while the input thread is still blocked on the caller's input.
pub type SharedWriter = Arc<Mutex<Option<Box<dyn Write + Send>>>>;

/// Closes the pty writer, whoever else holds the handle.
pub fn close_writer(writer: &SharedWriter) {
    let mut slot = writer.lock().unwrap_or_else(PoisonError::into_inner);
    drop(slot.take());
}

/// Copies `reader` into `writer` until end of stream, flushing every chunk.
///
/// Bytes are written in the order they were read. A pty master reports
/// `EIO` once the last slave descriptor closes; that is end of stream, not
/// an error.
///
/// # Errors
///
/// Returns the first read or write error other than `EIO`/`Interrupted`.
pub fn pump<R, W>(mut reader: R, mut writer: W) -> io::Result<u64>
where
    R: Read,
    W: Write,
{
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if is_pty_hangup(&e) => break,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        writer.flush()?;
        total += n as u64;
        trace!(bytes = n, "relayed chunk");
    }

    Ok(total)
}

fn is_pty_hangup(err: &io::Error) -> bool {
    err.raw_os_error() == Some(Errno::EIO as i32)
}

/// Starts a detached thread copying `input` into the pty writer.
///
/// The thread ends on input EOF, on the first write failure, or once the
/// writer has been closed. It only holds a clone of the handle, so the
/// session keeps the pty input open after the caller's input ends. The
/// thread is never joined: a read from a terminal stdin may block for as
/// long as the process lives.
///
/// # Errors
///
/// Returns an error if the thread cannot be spawned.
pub fn spawn_input<R>(mut input: R, writer: SharedWriter) -> io::Result<()>
where
    R: Read + Send + 'static,
{
    std::thread::Builder::new()
        .name("ptyrun-stdin".to_string())
        .spawn(move || {
            let mut buf = [0u8; CHUNK_SIZE];
            loop {
                let n = match input.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        debug!(error = %e, "stdin relay read failed");
                        break;
                    }
                };
                let Ok(mut slot) = writer.lock() else { break };
                let Some(pty) = slot.as_mut() else {
                    debug!("pty writer closed, dropping input");
                    break;
                };
                if let Err(e) = pty.write_all(&buf[..n]).and_then(|()| pty.flush()) {
                    debug!(error = %e, "stdin relay write failed");
                    break;
                }
            }
            debug!("stdin relay finished");
        })?;
    Ok(())
}

/// A cloneable in-memory sink, handy for capturing relayed output.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything written so far.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().map(|buf| buf.clone()).unwrap_or_default()
    }

    /// Everything written so far, lossily decoded.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("buffer lock poisoned"))?
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
