//! Value-transfer rail implementations.

pub mod internal;

pub use internal::InternalRail;
