pub mod atom;
pub mod path_point;
