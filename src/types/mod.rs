pub mod api;
pub mod bar;
pub mod table;

pub use api::*;
pub use bar::*;
pub use table::*;
