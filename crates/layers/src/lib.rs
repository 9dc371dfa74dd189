pub mod classify;
pub mod headless;
pub mod interaction;
pub mod layer;
pub mod path;
pub mod refresh;
pub mod surface;
pub mod symbology;
pub mod synthesis;

pub use layer::*;
pub use refresh::*;
pub use surface::*;
