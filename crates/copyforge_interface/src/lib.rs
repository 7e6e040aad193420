//! Trait seams between the Copyforge gate and its backing stores.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::PrincipalStore;
