//! Connection handler that serves JSONL requests until the client hangs up.
//!
//! Each line read from the stream is one request; each request is answered
//! with exactly one response line before the next line is read. Blank lines
//! are skipped. A malformed line is answered with `4 Bad Request` and the
//! connection stays open; an oversized line is answered with `6 Error` and
//! the connection is closed.

use std::io::{self, BufRead, BufReader, Read, Write};

use tracing::{debug, warn};

use crate::transport::{ConnectionHandler, ConnectionStream};

use super::errors::DispatchError;
use super::request::Request;
use super::response::ResponseWriter;
use super::router::{DISPATCH_TARGET, Dispatcher};

/// Maximum size of a single request line in bytes, newline included.
pub(crate) const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Connection handler that decodes and dispatches JSONL requests.
#[derive(Debug, Clone)]
pub struct DispatchConnectionHandler {
    dispatcher: Dispatcher,
}

impl DispatchConnectionHandler {
    /// Creates a handler answering requests through `dispatcher`.
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Serves requests from `reader`, writing responses to `writer`.
    ///
    /// Returns once the reader reaches end of stream or a fatal error occurs.
    pub fn serve<R: Read, W: Write>(&self, reader: R, writer: W) {
        let mut reader = BufReader::new(reader);
        let mut writer = ResponseWriter::new(writer);
        let mut served = 0_usize;

        loop {
            let line = match read_request_line(&mut reader) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(error) => {
                    warn!(target: DISPATCH_TARGET, %error, "failed to read request");
                    if !matches!(error, DispatchError::Io(_))
                        && let Err(write_error) = writer.write_error(&error)
                    {
                        warn!(target: DISPATCH_TARGET, error = %write_error, "failed to write error");
                    }
                    break;
                }
            };

            if line.trim_ascii().is_empty() {
                continue;
            }

            let result = match Request::parse(&line) {
                Ok(request) => writer.write_response(&self.dispatcher.handle(&request)),
                Err(error) => {
                    debug!(target: DISPATCH_TARGET, %error, "malformed request");
                    writer.write_error(&error)
                }
            };
            if let Err(error) = result {
                warn!(target: DISPATCH_TARGET, %error, "failed to write response");
                break;
            }
            served += 1;
        }

        debug!(target: DISPATCH_TARGET, served, "connection finished");
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, stream: ConnectionStream) {
        match stream.try_clone() {
            Ok(writer) => self.serve(stream, writer),
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %error, "failed to clone connection stream");
            }
        }
    }
}

/// Reads one bounded request line.
///
/// Returns `Ok(None)` at end of stream. A final line without a newline is
/// still returned.
fn read_request_line<R: BufRead>(reader: &mut R) -> Result<Option<Vec<u8>>, DispatchError> {
    let mut buffer = Vec::new();
    let limit = u64::try_from(MAX_REQUEST_BYTES + 1).unwrap_or(u64::MAX);
    let bytes_read = read_with_retry(&mut reader.by_ref().take(limit), &mut buffer)?;

    if bytes_read == 0 {
        return Ok(None);
    }
    if buffer.len() > MAX_REQUEST_BYTES {
        return Err(DispatchError::request_too_large(buffer.len(), MAX_REQUEST_BYTES));
    }
    Ok(Some(buffer))
}

/// Reads up to the next newline, retrying on interrupts.
fn read_with_retry<R: BufRead>(reader: &mut R, buffer: &mut Vec<u8>) -> io::Result<usize> {
    loop {
        match reader.read_until(b'\n', buffer) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
