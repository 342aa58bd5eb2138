use std::io::{self, Stderr, Stdout, Write};

pub struct LoginWriter {
    pub out: Stdout,
    pub err: Stderr,
}

impl LoginWriter {
    pub fn new() -> Self {
        LoginWriter {
            out: io::stdout(),
            err: io::stderr(),
        }
    }
}

impl Default for LoginWriter {
    fn default() -> Self {
        LoginWriter::new()
    }
}

pub trait OutErr {
    fn write_err(&mut self, s: &str);
    fn write(&mut self, s: &str);
}

impl OutErr for LoginWriter {
    fn write_err(&mut self, s: &str) {
        match self.err.write_all(s.as_bytes()).and_then(|_| self.err.flush()) {
            Ok(_) => (),
            Err(e) => eprintln!("{}", e),
        }
    }

    fn write(&mut self, s: &str) {
        match self.out.write_all(s.as_bytes()).and_then(|_| self.out.flush()) {
            Ok(_) => (),
            Err(e) => eprintln!("{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_to_both_streams() {
        let mut writer = LoginWriter::new();

        writer.write("");
        writer.write_err("");
    }
}
