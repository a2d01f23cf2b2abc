//! Модели данных

mod auth;
mod carbonate;
mod status;

pub use auth::*;
pub use carbonate::*;
pub use status::*;
