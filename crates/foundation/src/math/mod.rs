pub mod geodesy;
pub mod lnglat;

pub use geodesy::*;
pub use lnglat::*;
