//! События между хранилищами

mod bus;

pub use bus::{AuthEvent, EventBus, SubscriptionId};
