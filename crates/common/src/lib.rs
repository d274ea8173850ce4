mod macros;
pub mod name;
