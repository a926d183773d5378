mod unique_vec;

pub use unique_vec::*;
