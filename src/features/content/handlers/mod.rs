mod content_handler;
mod hero_handler;

pub use content_handler::*;
pub use hero_handler::*;
