use {
    crate::{types, FieldSchema, PrimitiveType},
    common::pub_fields_struct,
};

pub_fields_struct! {
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Column {
        name: String,
        column_type: PrimitiveType,
        comment: Option<String>,
        /// Zero-based position within the table; clustering columns come first.
        position: u32,
    }
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: PrimitiveType, position: u32) -> Self {
        Self {
            name: name.into(),
            column_type,
            comment: None,
            position,
        }
    }

    pub fn from_field_schema(field: &FieldSchema, position: u32) -> types::Result<Self> {
        Ok(Self {
            name: field.name.clone(),
            column_type: PrimitiveType::from_metastore_type(&field.type_name)?,
            comment: field.comment.clone(),
            position,
        })
    }
}
