pub mod dashboard;
pub mod feed;
pub mod protocol;
pub mod weather;

pub use dashboard::*;
pub use feed::*;
pub use protocol::*;
pub use weather::*;
