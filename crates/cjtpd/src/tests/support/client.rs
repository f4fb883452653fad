//! Line-oriented protocol client used by end-to-end scenarios.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use crate::dispatch::Response;

/// A persistent connection that sends raw lines and decodes responses.
pub struct LineClient {
    writer: TcpStream,
    reader: BufReader<TcpStream>,
}

impl LineClient {
    /// Connects with a two second read timeout.
    #[must_use]
    pub fn connect(addr: SocketAddr) -> Self {
        let writer = TcpStream::connect(addr).expect("connect");
        writer
            .set_read_timeout(Some(Duration::from_secs(2)))
            .expect("set read timeout");
        let reader = BufReader::new(writer.try_clone().expect("clone stream"));
        Self { writer, reader }
    }

    /// Writes `line` plus a newline delimiter.
    pub fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).expect("write request");
        self.writer.write_all(b"\n").expect("write newline");
        self.writer.flush().expect("flush");
    }

    /// Reads the next response line, or `None` once the server closes.
    pub fn receive(&mut self) -> Option<Response> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).expect("read response");
        (read > 0).then(|| Response::from_json(&line).expect("decode response"))
    }

    /// Sends one request line and waits for its response.
    pub fn exchange(&mut self, line: &str) -> Response {
        self.send(line);
        self.receive().expect("server closed connection")
    }
}
