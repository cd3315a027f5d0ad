//! Stateless building blocks: data models, spatial queries, radius lookup,
//! the molecular path curve and I/O.

pub mod io;
pub mod models;
pub mod path;
pub mod radii;
pub mod spatial;
pub mod utils;
