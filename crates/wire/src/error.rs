use {
    crate::WIRE_FORMAT_VERSION,
    snafu::{prelude::*, Backtrace},
    std::{io, string::FromUtf8Error},
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("IO error: {}", source))]
    Io { source: io::Error },

    Utf8Encoding { source: FromUtf8Error },

    #[snafu(display("input ended in the middle of a value"))]
    Truncated { backtrace: Backtrace },

    #[snafu(display("not a catalog wire payload"))]
    BadMagic { backtrace: Backtrace },

    #[snafu(display(
        "unsupported wire format version {}, expected {}",
        version,
        WIRE_FORMAT_VERSION
    ))]
    UnsupportedVersion { version: u16, backtrace: Backtrace },

    #[snafu(display("invalid {} tag {}", kind, tag))]
    InvalidTag {
        kind: &'static str,
        tag: u8,
        backtrace: Backtrace,
    },

    PrimitiveType {
        #[snafu(backtrace)]
        source: def::types::Error,
    },

    FileFormat {
        #[snafu(backtrace)]
        source: def::layout::Error,
    },

    #[snafu(display("length {} does not fit the wire format", len))]
    TooLong { len: usize, backtrace: Backtrace },
}

pub type Result<T> = std::result::Result<T, Error>;
