use {snafu::prelude::*, std::path::PathBuf};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum Error {
    #[snafu(display("Failed to read {}, source: {}", path.display(), source))]
    ReadSnapshot {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Failed to decode {}, source: {}", path.display(), source))]
    DecodeSnapshot {
        path: PathBuf,
        #[snafu(backtrace)]
        source: wire::Error,
    },

    #[snafu(display("{} has {} trailing bytes", path.display(), len))]
    TrailingBytes { path: PathBuf, len: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
