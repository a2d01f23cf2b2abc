//! Статусы заявок
//!
//! Сервер отдаёт статус свободной строкой, то по-английски (`Draft`), то
//! по-русски (`черновик`). Вся логика клиента работает с
//! [`CarbonateStatus`], строка разбирается один раз на входе.

use std::fmt;

/// Статус заявки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarbonateStatus {
    Draft,
    Created,
    Finished,
    Rejected,
}

/// Цвет бейджа статуса
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeVariant {
    Warning,
    Primary,
    Success,
    Danger,
    Secondary,
}

/// Готовый к отображению статус
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: String,
    pub variant: BadgeVariant,
}

impl CarbonateStatus {
    pub const ALL: [CarbonateStatus; 4] = [
        CarbonateStatus::Draft,
        CarbonateStatus::Created,
        CarbonateStatus::Finished,
        CarbonateStatus::Rejected,
    ];

    /// Разобрать статус из строки сервера (регистр и пробелы не важны)
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "draft" | "черновик" => Some(Self::Draft),
            "created" | "сформирован" => Some(Self::Created),
            "finished" | "завершен" | "завершён" => Some(Self::Finished),
            "rejected" | "отклонен" | "отклонён" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Токен, который понимает сервер в фильтрах и при смене статуса
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Draft => "черновик",
            Self::Created => "сформирован",
            Self::Finished => "завершен",
            Self::Rejected => "отклонен",
        }
    }

    /// Подпись для интерфейса
    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "Черновик",
            Self::Created => "Сформирован",
            Self::Finished => "Завершен",
            Self::Rejected => "Отклонен",
        }
    }

    pub fn variant(self) -> BadgeVariant {
        match self {
            Self::Draft => BadgeVariant::Warning,
            Self::Created => BadgeVariant::Primary,
            Self::Finished => BadgeVariant::Success,
            Self::Rejected => BadgeVariant::Danger,
        }
    }
}

impl fmt::Display for CarbonateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Бейдж для сырой строки статуса; неизвестные значения не ломают отображение
pub fn status_badge(raw: Option<&str>) -> StatusBadge {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return StatusBadge {
            label: "Неизвестно".to_string(),
            variant: BadgeVariant::Secondary,
        };
    };

    match CarbonateStatus::parse(raw) {
        Some(status) => StatusBadge {
            label: status.label().to_string(),
            variant: status.variant(),
        },
        None => StatusBadge {
            label: capitalize(raw.trim()),
            variant: BadgeVariant::Secondary,
        },
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
