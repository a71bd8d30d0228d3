use std::io::{self, Cursor, Read, Write};

/// In-memory duplex stream: reads come from a script, writes are captured.
#[derive(Debug, Default)]
pub(crate) struct Scripted {
    input: Cursor<Vec<u8>>,
    output: Vec<u8>,
}

impl Scripted {
    pub(crate) fn new(input: &str) -> Self {
        Self::from_bytes(input.as_bytes().to_vec())
    }

    pub(crate) fn from_bytes(input: Vec<u8>) -> Self {
        Self {
            input: Cursor::new(input),
            output: Vec::new(),
        }
    }

    pub(crate) fn written(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.written().lines().map(str::to_string).collect()
    }
}

impl Read for Scripted {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for Scripted {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.output.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
