use {
    crate::{
        error::*, TableType, WireHBaseTable, WireHdfsTable, WirePartition, WireTable,
    },
    byteorder::{ReadBytesExt, WriteBytesExt, LE},
    def::{
        codec::{Decoder, Encoder},
        Column, FieldSchema, FileBlock, FileDescriptor, FileFormat, LiteralExpr, PrimitiveType,
        RawDescriptor, StorageDescriptor,
    },
    snafu::prelude::*,
    std::{
        collections::BTreeMap,
        io::{self, Cursor, Read},
    },
};

const MAGIC: &[u8; 4] = b"CTLG";

/// Bumped whenever the layout below changes incompatibly.
pub const WIRE_FORMAT_VERSION: u16 = 1;

/// Encodes a single table, prefixed with the magic and format version.
#[derive(Debug, Clone, Copy, Default)]
pub struct WireCodec;

/// Encodes a whole catalog snapshot: one header followed by every table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotCodec;

impl Encoder for WireCodec {
    type Item = WireTable;
    type Error = Error;

    fn encode(&self, table: &WireTable) -> Result<Vec<u8>> {
        let mut bytes = vec![];
        bytes.write_header()?;
        bytes.write_table(table)?;

        Ok(bytes)
    }
}

impl Decoder for WireCodec {
    type Item = WireTable;
    type Error = Error;

    fn decode(&self, src: &[u8]) -> Result<(WireTable, usize)> {
        let mut reader = Cursor::new(src);
        reader.read_header()?;
        let table = reader.read_table()?;

        Ok((table, reader.position() as usize))
    }
}

impl Encoder for SnapshotCodec {
    type Item = Vec<WireTable>;
    type Error = Error;

    fn encode(&self, tables: &Vec<WireTable>) -> Result<Vec<u8>> {
        let mut bytes = vec![];
        bytes.write_header()?;
        bytes.write_seq(tables, |w, table| w.write_table(table))?;

        Ok(bytes)
    }
}

impl Decoder for SnapshotCodec {
    type Item = Vec<WireTable>;
    type Error = Error;

    fn decode(&self, src: &[u8]) -> Result<(Vec<WireTable>, usize)> {
        let mut reader = Cursor::new(src);
        reader.read_header()?;
        let tables = reader.read_seq(|r| r.read_table())?;

        Ok((tables, reader.position() as usize))
    }
}

trait WriteWire: io::Write + Sized {
    fn write_header(&mut self) -> Result<()> {
        self.write_all(MAGIC).context(IoSnafu)?;
        self.write_u16::<LE>(WIRE_FORMAT_VERSION).context(IoSnafu)
    }

    fn write_len(&mut self, len: usize) -> Result<()> {
        let len32 = u32::try_from(len).ok().context(TooLongSnafu { len })?;
        self.write_u32::<LE>(len32).context(IoSnafu)
    }

    fn write_flag(&mut self, flag: bool) -> Result<()> {
        self.write_u8(flag as u8).context(IoSnafu)
    }

    fn write_string(&mut self, s: &str) -> Result<()> {
        self.write_len(s.len())?;
        self.write_all(s.as_bytes()).context(IoSnafu)
    }

    fn write_opt<T>(
        &mut self,
        value: Option<&T>,
        mut f: impl FnMut(&mut Self, &T) -> Result<()>,
    ) -> Result<()>
    where
        T: ?Sized,
    {
        self.write_flag(value.is_some())?;
        match value {
            Some(v) => f(self, v),
            None => Ok(()),
        }
    }

    fn write_seq<T>(
        &mut self,
        items: &[T],
        mut f: impl FnMut(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        self.write_len(items.len())?;
        items.iter().try_for_each(|item| f(self, item))
    }

    fn write_strings(&mut self, items: &[String]) -> Result<()> {
        self.write_seq(items, |w, s| w.write_string(s))
    }

    fn write_field(&mut self, field: &FieldSchema) -> Result<()> {
        self.write_string(&field.name)?;
        self.write_string(&field.type_name)?;
        self.write_opt(field.comment.as_deref(), |w, s| w.write_string(s))
    }

    fn write_descriptor(&mut self, desc: &RawDescriptor) -> Result<()> {
        self.write_string(&desc.db_name)?;
        self.write_string(&desc.tbl_name)?;
        self.write_string(&desc.owner)?;
        self.write_string(&desc.table_type)?;
        self.write_i64::<LE>(desc.create_time).context(IoSnafu)?;

        let sd = &desc.storage;
        self.write_string(&sd.location)?;
        self.write_string(&sd.input_format)?;
        self.write_string(&sd.output_format)?;
        self.write_string(&sd.serde_lib)?;
        self.write_seq(&sd.columns, |w, f| w.write_field(f))?;

        self.write_seq(&desc.partition_keys, |w, f| w.write_field(f))?;

        self.write_len(desc.parameters.len())?;
        for (k, v) in &desc.parameters {
            self.write_string(k)?;
            self.write_string(v)?;
        }

        self.write_opt(desc.view_original_text.as_deref(), |w, s| w.write_string(s))?;
        self.write_opt(desc.view_expanded_text.as_deref(), |w, s| w.write_string(s))
    }

    fn write_column(&mut self, column: &Column) -> Result<()> {
        self.write_string(&column.name)?;
        self.write_u8(column.column_type.tag()).context(IoSnafu)?;
        self.write_opt(column.comment.as_deref(), |w, s| w.write_string(s))?;
        self.write_u32::<LE>(column.position).context(IoSnafu)
    }

    fn write_literal(&mut self, expr: &LiteralExpr) -> Result<()> {
        match expr {
            LiteralExpr::Null => self.write_u8(0),
            LiteralExpr::Boolean(v) => {
                self.write_u8(1).context(IoSnafu)?;
                self.write_u8(*v as u8)
            }
            LiteralExpr::Int(v) => {
                self.write_u8(2).context(IoSnafu)?;
                self.write_i64::<LE>(*v)
            }
            LiteralExpr::Float(v) => {
                self.write_u8(3).context(IoSnafu)?;
                self.write_f64::<LE>(*v)
            }
            LiteralExpr::String(v) => {
                self.write_u8(4).context(IoSnafu)?;
                return self.write_string(v);
            }
        }
        .context(IoSnafu)
    }

    fn write_file_descriptor(&mut self, fd: &FileDescriptor) -> Result<()> {
        self.write_string(&fd.path)?;
        self.write_u64::<LE>(fd.length).context(IoSnafu)?;
        self.write_i64::<LE>(fd.modification_time).context(IoSnafu)?;
        self.write_seq(&fd.blocks, |w, block| {
            w.write_u64::<LE>(block.offset).context(IoSnafu)?;
            w.write_u64::<LE>(block.length).context(IoSnafu)?;
            w.write_strings(&block.hosts)
        })
    }

    fn write_partition(&mut self, partition: &WirePartition) -> Result<()> {
        self.write_string(&partition.location)?;
        self.write_u8(partition.file_format.tag()).context(IoSnafu)?;
        self.write_seq(&partition.partition_key_exprs, |w, e| w.write_literal(e))?;
        self.write_seq(&partition.file_descriptors, |w, fd| {
            w.write_file_descriptor(fd)
        })
    }

    fn write_hdfs_table(&mut self, hdfs: &WireHdfsTable) -> Result<()> {
        self.write_string(&hdfs.hdfs_base_dir)?;
        self.write_u8(hdfs.file_format.tag()).context(IoSnafu)?;
        self.write_len(hdfs.partitions.len())?;
        for (id, partition) in &hdfs.partitions {
            self.write_i64::<LE>(*id).context(IoSnafu)?;
            self.write_partition(partition)?;
        }

        Ok(())
    }

    fn write_hbase_table(&mut self, hbase: &WireHBaseTable) -> Result<()> {
        self.write_string(&hbase.table_name)?;
        self.write_strings(&hbase.families)?;
        self.write_strings(&hbase.qualifiers)?;
        self.write_seq(&hbase.binary_encoded, |w, b| w.write_flag(*b))
    }

    fn write_table(&mut self, table: &WireTable) -> Result<()> {
        self.write_u64::<LE>(table.id).context(IoSnafu)?;
        self.write_string(&table.tbl_name)?;
        self.write_string(&table.db_name)?;
        self.write_opt(table.table_type.as_ref(), |w, ty| {
            w.write_u8(*ty as u8).context(IoSnafu)
        })?;
        self.write_descriptor(&table.metastore_table)?;
        self.write_seq(&table.partition_columns, |w, c| w.write_column(c))?;
        self.write_seq(&table.columns, |w, c| w.write_column(c))?;
        self.write_i64::<LE>(table.num_rows).context(IoSnafu)?;
        self.write_opt(table.load_error.as_deref(), |w, s| w.write_string(s))?;
        self.write_opt(table.hdfs_table.as_ref(), |w, t| w.write_hdfs_table(t))?;
        self.write_opt(table.hbase_table.as_ref(), |w, t| w.write_hbase_table(t))
    }
}

impl<W: io::Write> WriteWire for W {}

trait ReadWire: io::Read + Sized {
    fn read_header(&mut self) -> Result<()> {
        let mut magic = [0u8; 4];
        self.read_exact(&mut magic).context(IoSnafu)?;
        ensure!(&magic == MAGIC, BadMagicSnafu);

        let version = self.read_u16::<LE>().context(IoSnafu)?;
        ensure!(
            version == WIRE_FORMAT_VERSION,
            UnsupportedVersionSnafu { version }
        );

        Ok(())
    }

    fn read_len(&mut self) -> Result<usize> {
        Ok(self.read_u32::<LE>().context(IoSnafu)? as usize)
    }

    fn read_flag(&mut self) -> Result<bool> {
        match self.read_u8().context(IoSnafu)? {
            0 => Ok(false),
            1 => Ok(true),
            tag => InvalidTagSnafu { kind: "flag", tag }.fail(),
        }
    }

    fn read_string(&mut self) -> Result<String> {
        let len = self.read_len()?;

        // never trust the length enough to allocate it up front
        let mut buf = vec![];
        self.by_ref()
            .take(len as u64)
            .read_to_end(&mut buf)
            .context(IoSnafu)?;
        ensure!(buf.len() == len, TruncatedSnafu);

        String::from_utf8(buf).context(Utf8EncodingSnafu)
    }

    fn read_opt<T>(&mut self, mut f: impl FnMut(&mut Self) -> Result<T>) -> Result<Option<T>> {
        if self.read_flag()? {
            f(self).map(Some)
        } else {
            Ok(None)
        }
    }

    fn read_seq<T>(&mut self, mut f: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let len = self.read_len()?;
        (0..len).map(|_| f(self)).collect()
    }

    fn read_strings(&mut self) -> Result<Vec<String>> {
        self.read_seq(|r| r.read_string())
    }

    fn read_field(&mut self) -> Result<FieldSchema> {
        Ok(FieldSchema {
            name: self.read_string()?,
            type_name: self.read_string()?,
            comment: self.read_opt(|r| r.read_string())?,
        })
    }

    fn read_descriptor(&mut self) -> Result<RawDescriptor> {
        let db_name = self.read_string()?;
        let tbl_name = self.read_string()?;
        let owner = self.read_string()?;
        let table_type = self.read_string()?;
        let create_time = self.read_i64::<LE>().context(IoSnafu)?;

        let storage = StorageDescriptor {
            location: self.read_string()?,
            input_format: self.read_string()?,
            output_format: self.read_string()?,
            serde_lib: self.read_string()?,
            columns: self.read_seq(|r| r.read_field())?,
        };

        let partition_keys = self.read_seq(|r| r.read_field())?;

        let mut parameters = BTreeMap::new();
        for _ in 0..self.read_len()? {
            let key = self.read_string()?;
            let value = self.read_string()?;
            parameters.insert(key, value);
        }

        Ok(RawDescriptor {
            db_name,
            tbl_name,
            owner,
            table_type,
            create_time,
            storage,
            partition_keys,
            parameters,
            view_original_text: self.read_opt(|r| r.read_string())?,
            view_expanded_text: self.read_opt(|r| r.read_string())?,
        })
    }

    fn read_column(&mut self) -> Result<Column> {
        let name = self.read_string()?;
        let tag = self.read_u8().context(IoSnafu)?;

        Ok(Column {
            name,
            column_type: PrimitiveType::from_tag(tag).context(PrimitiveTypeSnafu)?,
            comment: self.read_opt(|r| r.read_string())?,
            position: self.read_u32::<LE>().context(IoSnafu)?,
        })
    }

    fn read_literal(&mut self) -> Result<LiteralExpr> {
        Ok(match self.read_u8().context(IoSnafu)? {
            0 => LiteralExpr::Null,
            1 => LiteralExpr::Boolean(self.read_flag()?),
            2 => LiteralExpr::Int(self.read_i64::<LE>().context(IoSnafu)?),
            3 => LiteralExpr::Float(self.read_f64::<LE>().context(IoSnafu)?),
            4 => LiteralExpr::String(self.read_string()?),
            tag => {
                return InvalidTagSnafu {
                    kind: "literal",
                    tag,
                }
                .fail()
            }
        })
    }

    fn read_file_format(&mut self) -> Result<FileFormat> {
        let tag = self.read_u8().context(IoSnafu)?;
        FileFormat::from_tag(tag).context(FileFormatSnafu)
    }

    fn read_file_descriptor(&mut self) -> Result<FileDescriptor> {
        Ok(FileDescriptor {
            path: self.read_string()?,
            length: self.read_u64::<LE>().context(IoSnafu)?,
            modification_time: self.read_i64::<LE>().context(IoSnafu)?,
            blocks: self.read_seq(|r| {
                Ok(FileBlock {
                    offset: r.read_u64::<LE>().context(IoSnafu)?,
                    length: r.read_u64::<LE>().context(IoSnafu)?,
                    hosts: r.read_strings()?,
                })
            })?,
        })
    }

    fn read_partition(&mut self) -> Result<WirePartition> {
        Ok(WirePartition {
            location: self.read_string()?,
            file_format: self.read_file_format()?,
            partition_key_exprs: self.read_seq(|r| r.read_literal())?,
            file_descriptors: self.read_seq(|r| r.read_file_descriptor())?,
        })
    }

    fn read_hdfs_table(&mut self) -> Result<WireHdfsTable> {
        let hdfs_base_dir = self.read_string()?;
        let file_format = self.read_file_format()?;

        let mut partitions = BTreeMap::new();
        for _ in 0..self.read_len()? {
            let id = self.read_i64::<LE>().context(IoSnafu)?;
            partitions.insert(id, self.read_partition()?);
        }

        Ok(WireHdfsTable {
            hdfs_base_dir,
            file_format,
            partitions,
        })
    }

    fn read_hbase_table(&mut self) -> Result<WireHBaseTable> {
        Ok(WireHBaseTable {
            table_name: self.read_string()?,
            families: self.read_strings()?,
            qualifiers: self.read_strings()?,
            binary_encoded: self.read_seq(|r| r.read_flag())?,
        })
    }

    fn read_table_type(&mut self) -> Result<TableType> {
        match self.read_u8().context(IoSnafu)? {
            1 => Ok(TableType::Hdfs),
            2 => Ok(TableType::HBase),
            tag => InvalidTagSnafu {
                kind: "table type",
                tag,
            }
            .fail(),
        }
    }

    fn read_table(&mut self) -> Result<WireTable> {
        Ok(WireTable {
            id: self.read_u64::<LE>().context(IoSnafu)?,
            tbl_name: self.read_string()?,
            db_name: self.read_string()?,
            table_type: self.read_opt(|r| r.read_table_type())?,
            metastore_table: self.read_descriptor()?,
            partition_columns: self.read_seq(|r| r.read_column())?,
            columns: self.read_seq(|r| r.read_column())?,
            num_rows: self.read_i64::<LE>().context(IoSnafu)?,
            load_error: self.read_opt(|r| r.read_string())?,
            hdfs_table: self.read_opt(|r| r.read_hdfs_table())?,
            hbase_table: self.read_opt(|r| r.read_hbase_table())?,
        })
    }
}

impl<R: io::Read> ReadWire for R {}
