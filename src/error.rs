use std::{error::Error, fmt};

use backtrace::Backtrace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Every frame of the buffer pool is pinned and nothing can be evicted.
    PoolExhausted,
    /// A disk read/write failed.
    Io,
    /// An on-disk structure does not look like what it claims to be.
    Corrupted,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::PoolExhausted => write!(f, "POOL_EXHAUSTED"),
            ErrorKind::Io => write!(f, "IO"),
            ErrorKind::Corrupted => write!(f, "CORRUPTED"),
        }
    }
}

#[derive(Debug)]
pub struct CrabError {
    kind: ErrorKind,
    details: String,
}

impl CrabError {
    pub fn new(kind: ErrorKind, msg: &str) -> CrabError {
        let bt = Backtrace::new();
        let details = format!("kind: [{}], msg: [{}]\nerror backtrace:\n{:?}", kind, msg, bt);
        CrabError { kind, details }
    }

    pub fn pool_exhausted(msg: &str) -> CrabError {
        Self::new(ErrorKind::PoolExhausted, msg)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn show_backtrace(&self) {
        println!("{}", self.details);
    }
}

impl fmt::Display for CrabError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.details)
    }
}

impl Error for CrabError {}
