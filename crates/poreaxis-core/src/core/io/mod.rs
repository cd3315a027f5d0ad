//! Plain-text atom input and CSV profile output.

pub mod atoms;
pub mod profile;
