//! Wire types shared by the Auto-Didact clients and the backend HTTP contract.

pub mod domain;
pub mod error;
pub mod protocol;
