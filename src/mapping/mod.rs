pub mod affine;
pub mod compound;
pub mod map;
pub mod perm;
pub mod unit;
