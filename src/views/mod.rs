//! Экраны клиента
//!
//! Страницы не рисуют ничего сами: они держат локальное состояние формы,
//! вызывают действия хранилищ и отдают готовые к отображению структуры.
//! Навигация возвращается как [`Route`](crate::routes::Route).

mod details_page;
mod list_page;
mod navbar;

use thiserror::Error;

use crate::error::ApiError;

pub use details_page::{AcidRow, CarbonateDetailsPage, DetailsContent, DetailsView, parse_mass};
pub use list_page::{
    CarbonatesListPage, ListFilters, ListRow, ListView, StatusAction, Today, format_date,
};
pub use navbar::{NavLink, Navbar, NavbarView, SessionView};

/// Ошибка действия на странице
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    #[error("Carbonate is not a draft")]
    NotDraft,

    #[error("No carbonate is opened")]
    NoDetail,

    #[error("Only administrators can change carbonate status")]
    NotAdmin,

    #[error("Carbonate {0} does not accept this status change")]
    ActionUnavailable(i64),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Подтверждение опасного действия
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}
