use {
    common::pub_fields_struct,
    snafu::{prelude::*, Backtrace},
    std::fmt::Display,
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("invalid file format tag {}", tag))]
    InvalidFormatTag { tag: u8, backtrace: Backtrace },
}

pub_fields_struct! {
    /// A contiguous byte range of a file and the hosts holding a replica of it.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct FileBlock {
        offset: u64,
        length: u64,
        hosts: Vec<String>,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct FileDescriptor {
        /// File name relative to the partition directory.
        path: String,
        length: u64,
        modification_time: i64,
        blocks: Vec<FileBlock>,
    }
}

impl FileBlock {
    pub fn new(offset: u64, length: u64, hosts: Vec<String>) -> Self {
        Self {
            offset,
            length,
            hosts,
        }
    }
}

impl FileDescriptor {
    pub fn new(path: impl Into<String>, length: u64, modification_time: i64) -> Self {
        Self {
            path: path.into(),
            length,
            modification_time,
            blocks: vec![],
        }
    }

    pub fn with_blocks(mut self, blocks: Vec<FileBlock>) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn add_block(&mut self, block: FileBlock) {
        self.blocks.push(block);
    }
}

/// On-disk format of the files in a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FileFormat {
    Text = 1,
    SequenceFile,
    RcFile,
    Avro,
    Parquet,
}

impl FileFormat {
    pub fn from_input_format(class_name: &str) -> Option<Self> {
        Some(match class_name {
            "org.apache.hadoop.mapred.TextInputFormat" => Self::Text,
            "org.apache.hadoop.mapred.SequenceFileInputFormat" => Self::SequenceFile,
            "org.apache.hadoop.hive.ql.io.RCFileInputFormat" => Self::RcFile,
            "org.apache.hadoop.hive.ql.io.avro.AvroContainerInputFormat" => Self::Avro,
            "parquet.hive.DeprecatedParquetInputFormat"
            | "parquet.hive.MapredParquetInputFormat"
            | "org.apache.hadoop.hive.ql.io.parquet.MapredParquetInputFormat" => Self::Parquet,
            _ => return None,
        })
    }

    /// The canonical input format class name.
    pub const fn input_format(self) -> &'static str {
        match self {
            Self::Text => "org.apache.hadoop.mapred.TextInputFormat",
            Self::SequenceFile => "org.apache.hadoop.mapred.SequenceFileInputFormat",
            Self::RcFile => "org.apache.hadoop.hive.ql.io.RCFileInputFormat",
            Self::Avro => "org.apache.hadoop.hive.ql.io.avro.AvroContainerInputFormat",
            Self::Parquet => "org.apache.hadoop.hive.ql.io.parquet.MapredParquetInputFormat",
        }
    }

    pub const fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Result<Self, Error> {
        Ok(match tag {
            1 => Self::Text,
            2 => Self::SequenceFile,
            3 => Self::RcFile,
            4 => Self::Avro,
            5 => Self::Parquet,
            _ => return InvalidFormatTagSnafu { tag }.fail(),
        })
    }
}

impl Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Text => "TEXT",
                Self::SequenceFile => "SEQUENCE_FILE",
                Self::RcFile => "RC_FILE",
                Self::Avro => "AVRO",
                Self::Parquet => "PARQUET",
            }
        )
    }
}
