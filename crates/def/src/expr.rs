//! Literal expressions used as partition keys.

use {
    crate::PrimitiveType,
    snafu::{prelude::*, Backtrace},
    std::fmt::Display,
};

/// The directory value Hive writes for a NULL partition key.
pub const HIVE_DEFAULT_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display(r#"cannot interpret "{}" as a {} partition value"#, value, ty))]
    InvalidLiteral {
        value: String,
        ty: PrimitiveType,
        backtrace: Backtrace,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralExpr {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl LiteralExpr {
    /// Parses a partition value as stored by the metastore into a literal of
    /// the partition column's type.
    pub fn parse(value: &str, ty: PrimitiveType) -> Result<Self> {
        if value == HIVE_DEFAULT_PARTITION {
            return Ok(Self::Null);
        }

        let invalid = || InvalidLiteralSnafu { value, ty }.build();

        Ok(match ty {
            PrimitiveType::Boolean => match value.to_ascii_lowercase().as_str() {
                "true" => Self::Boolean(true),
                "false" => Self::Boolean(false),
                _ => return Err(invalid()),
            },

            PrimitiveType::TinyInt
            | PrimitiveType::SmallInt
            | PrimitiveType::Int
            | PrimitiveType::BigInt => {
                let v: i64 = value.trim().parse().map_err(|_| invalid())?;
                match ty.integer_range() {
                    Some((min, max)) if v < min || v > max => return Err(invalid()),
                    _ => Self::Int(v),
                }
            }

            PrimitiveType::Float | PrimitiveType::Double => {
                Self::Float(value.trim().parse().map_err(|_| invalid())?)
            }

            PrimitiveType::String | PrimitiveType::Timestamp | PrimitiveType::Binary => {
                Self::String(value.to_string())
            }
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl Display for LiteralExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "'{}'", v),
        }
    }
}
