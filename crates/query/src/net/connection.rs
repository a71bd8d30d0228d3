use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::protocol::{clean_line, encode_command, is_terminator};
use crate::reply::Reply;

#[derive(Debug, Clone, Default)]
pub struct ConnectionStats {
    pub lines_sent: u64,
    pub lines_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub replies_received: u64,
}

/// Line framing over an exclusively owned stream.
#[derive(Debug)]
pub struct Connection<S: Read + Write> {
    reader: BufReader<S>,
    stats: ConnectionStats,
}

impl<S: Read + Write> Connection<S> {
    pub fn new(stream: S) -> Self {
        Self {
            reader: BufReader::new(stream),
            stats: ConnectionStats::default(),
        }
    }

    pub fn write_line(&mut self, command: &str) -> io::Result<()> {
        let line = encode_command(command);
        let stream = self.reader.get_mut();
        stream.write_all(line.as_bytes())?;
        stream.flush()?;
        self.stats.lines_sent += 1;
        self.stats.bytes_sent += line.len() as u64;
        Ok(())
    }

    /// Reads one cleaned line. End of stream is an error: the server never
    /// closes mid-reply.
    pub fn read_line(&mut self) -> io::Result<String> {
        let mut raw = Vec::new();
        let read = self.reader.read_until(b'\n', &mut raw)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "query server closed the connection",
            ));
        }
        self.stats.lines_received += 1;
        self.stats.bytes_received += read as u64;
        Ok(clean_line(&decode(raw)).to_string())
    }

    /// Reads lines up to and including the next terminator.
    pub fn read_reply(&mut self) -> io::Result<Reply> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            let done = is_terminator(&line);
            lines.push(line);
            if done {
                break;
            }
        }
        self.stats.replies_received += 1;
        Ok(Reply::new(lines))
    }

    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    pub fn get_ref(&self) -> &S {
        self.reader.get_ref()
    }

    pub fn into_inner(self) -> S {
        self.reader.into_inner()
    }
}

impl Connection<TcpStream> {
    pub fn open(
        host: &str,
        port: u16,
        connect_timeout: Duration,
        read_timeout: Option<Duration>,
    ) -> io::Result<Self> {
        let mut last_err = None;
        for addr in (host, port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, connect_timeout) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    stream.set_read_timeout(read_timeout)?;
                    log::debug!("Query socket connected to {}", addr);
                    return Ok(Self::new(stream));
                }
                Err(e) => {
                    log::debug!("Connect to {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{host} did not resolve"))
        }))
    }
}

/// The server speaks Latin-1 when a line is not valid UTF-8.
fn decode(raw: Vec<u8>) -> String {
    match String::from_utf8(raw) {
        Ok(text) => text,
        Err(err) => err.into_bytes().iter().map(|&byte| char::from(byte)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::testing::Scripted;

    #[test]
    fn test_write_line_terminates_command() {
        let mut connection = Connection::new(Scripted::new(""));
        connection.write_line(" pl ").unwrap();
        assert_eq!(connection.get_ref().written(), "pl\n");
        assert_eq!(connection.stats().lines_sent, 1);
        assert_eq!(connection.stats().bytes_sent, 3);
    }

    #[test]
    fn test_read_reply_stops_at_terminator() {
        let mut connection = Connection::new(Scripted::new(
            "p_id\tnick\r\n1\t\"a\"\r\nOK\r\nERROR, invalid id\n",
        ));
        let reply = connection.read_reply().unwrap();
        assert_eq!(reply.lines(), ["p_id\tnick", "1\t\"a\"", "OK"]);
        let reply = connection.read_reply().unwrap();
        assert_eq!(reply.lines(), ["ERROR, invalid id"]);
        assert_eq!(connection.stats().replies_received, 2);
    }

    #[test]
    fn test_lowercase_error_terminates() {
        let mut connection = Connection::new(Scripted::new("error, unknown command\n"));
        assert!(connection.read_reply().unwrap().is_scalar());
    }

    #[test]
    fn test_eof_is_an_error() {
        let mut connection = Connection::new(Scripted::new("partial\n"));
        let err = connection.read_reply().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_latin1_fallback() {
        let mut bytes = b"nick=J".to_vec();
        bytes.push(0xfc);
        bytes.extend_from_slice(b"rgen\n");
        let mut connection = Connection::new(Scripted::from_bytes(bytes));
        assert_eq!(connection.read_line().unwrap(), "nick=Jürgen");
    }
}
