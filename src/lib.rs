//! Клиент заявок на расчёт карбонатов
//!
//! Пользователь собирает черновик заявки из кислот с массами и массы
//! CaCO3, отправляет его на проверку; модератор завершает или отклоняет
//! сформированные заявки. Расчёт объёма CO2 и переходы статусов делает
//! сервер, клиент только показывает данные и вызывает API.

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod routes;
pub mod state;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

pub use error::ApiError;
