mod error;
mod inspect;


pub use {error::*, inspect::*};
