//! Хранилища состояния клиента

mod auth;
mod carbonate;

pub use auth::{AuthState, AuthStore};
pub use carbonate::{CarbonateState, CarbonateStore};
