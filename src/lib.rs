pub mod color;
pub mod config;
pub mod edge;
pub mod error;
pub mod events;
pub mod export;
pub mod image_ref;
pub mod interaction;
pub mod layout;
pub mod momentum;
pub mod parallax;
pub mod scheduler;
pub mod snap;
pub mod sources;
pub mod viewport;
pub mod wall;
pub mod tasks {
    pub mod replay;
}

pub use error::{Error, Result};
