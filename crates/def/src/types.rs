use {
    snafu::{prelude::*, Backtrace},
    std::fmt::Display,
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display(r#"unsupported column type "{}""#, type_name))]
    UnsupportedType {
        type_name: String,
        backtrace: Backtrace,
    },

    #[snafu(display("invalid primitive type tag {}", tag))]
    InvalidTag { tag: u8, backtrace: Backtrace },
}

pub type Result<T> = std::result::Result<T, Error>;

macro_rules! define_types {
    ($($var:ident = ($tag:literal, $name:literal $(| $alias:literal)*),)*) => {
        #[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
        #[repr(u8)]
        pub enum PrimitiveType {
            $($var = $tag,)*
        }

        impl PrimitiveType {
            pub const ALL: &'static [PrimitiveType] = &[$(Self::$var,)*];

            pub const fn tag(self) -> u8 {
                self as u8
            }

            pub fn from_tag(tag: u8) -> Result<Self> {
                match tag {
                    $($tag => Ok(Self::$var),)*
                    _ => InvalidTagSnafu { tag }.fail(),
                }
            }

            /// The metastore spelling of the type.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$var => $name,)*
                }
            }

            pub fn from_metastore_type(type_name: &str) -> Result<Self> {
                match type_name.trim().to_ascii_lowercase().as_str() {
                    $($name $(| $alias)* => Ok(Self::$var),)*
                    _ => UnsupportedTypeSnafu { type_name }.fail(),
                }
            }
        }
    };
}

define_types! {
    Boolean = (1, "boolean"),

    // Numeric types
    TinyInt = (2, "tinyint"),
    SmallInt = (3, "smallint"),
    Int = (4, "int" | "integer"),
    BigInt = (5, "bigint"),

    Float = (6, "float"),
    Double = (7, "double"),

    String = (8, "string"),
    Timestamp = (9, "timestamp"),
    Binary = (10, "binary"),
}

impl PrimitiveType {
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::TinyInt | Self::SmallInt | Self::Int | Self::BigInt
        )
    }

    pub const fn is_floating_point(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Whether values of this type may be stored in a wide-column store in
    /// their binary form instead of as UTF-8 text.
    pub const fn supports_binary_encoding(self) -> bool {
        matches!(self, Self::Boolean) || self.is_integer() || self.is_floating_point()
    }

    /// Inclusive range of an integer type.
    pub const fn integer_range(self) -> Option<(i64, i64)> {
        match self {
            Self::TinyInt => Some((i8::MIN as i64, i8::MAX as i64)),
            Self::SmallInt => Some((i16::MIN as i64, i16::MAX as i64)),
            Self::Int => Some((i32::MIN as i64, i32::MAX as i64)),
            Self::BigInt => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }
}

impl Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name().to_ascii_uppercase())
    }
}
