pub mod forecast;
pub mod geojson;
pub mod measure;
pub mod timestamp;
pub mod track;

pub use forecast::*;
pub use geojson::*;
pub use measure::*;
pub use track::*;
