pub mod request;
pub mod settings;

pub use request::*;
pub use settings::*;
