//! Типы данных API заявок

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::status::CarbonateStatus;

/// Кислота из каталога
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acid {
    #[serde(rename = "ID", alias = "id")]
    pub id: i64,
    #[serde(rename = "Name", alias = "name", default)]
    pub name: Option<String>,
    #[serde(rename = "Img", alias = "img", default)]
    pub img: Option<String>,
}

/// Кислота в составе заявки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonateAcid {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acid_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acid: Option<Acid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    /// Объём CO2, считает сервер
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<f64>,
}

impl CarbonateAcid {
    /// Идентификатор кислоты, по которому работают запросы изменения массы и удаления
    pub fn target_acid_id(&self) -> Option<i64> {
        self.acid
            .as_ref()
            .map(|a| a.id)
            .filter(|id| *id != 0)
            .or(self.acid_id.filter(|id| *id != 0))
    }
}

/// Заявка целиком
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonateDetail {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_create: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acids: Option<Vec<CarbonateAcid>>,
}

impl CarbonateDetail {
    pub fn status(&self) -> Option<CarbonateStatus> {
        self.status.as_deref().and_then(CarbonateStatus::parse)
    }

    pub fn acids(&self) -> &[CarbonateAcid] {
        self.acids.as_deref().unwrap_or_default()
    }
}

/// Строка списка заявок
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonateListEntry {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_create: Option<String>,
    /// Логин автора, приходит только администратору
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    /// Количество кислот
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculated: Option<i64>,
}

impl CarbonateListEntry {
    pub fn status(&self) -> Option<CarbonateStatus> {
        self.status.as_deref().and_then(CarbonateStatus::parse)
    }
}

/// Ответ `GET /carbonates`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CarbonateListResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbonates: Option<Vec<CarbonateListEntry>>,
}

/// Сводка по текущему черновику
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentCarbonateInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbonate_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acid_count: Option<u32>,
}

/// Тело запросов изменения массы
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MassRequest {
    pub mass: f64,
}

/// Тело запроса смены статуса
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// Фильтр списка заявок
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    pub status: Option<CarbonateStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl ListFilter {
    /// Фильтр за один день без ограничения по статусу
    pub fn for_day(day: NaiveDate) -> Self {
        Self {
            status: None,
            date_from: Some(day),
            date_to: Some(day),
        }
    }

    /// Строка запроса вида `?status=..&date_from=..`; пустая, если фильтров нет
    pub fn query_string(&self) -> String {
        let mut params = Vec::new();

        if let Some(status) = self.status {
            params.push(format!("status={}", urlencoding::encode(status.as_wire())));
        }
        if let Some(from) = self.date_from {
            params.push(format!("date_from={}", from.format("%Y-%m-%d")));
        }
        if let Some(to) = self.date_to {
            params.push(format!("date_to={}", to.format("%Y-%m-%d")));
        }

        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_parses_backend_payload() {
        let json = r#"{
            "id": 7,
            "status": "черновик",
            "mass": 10.5,
            "date_create": "2024-01-01T10:00:00Z",
            "acids": [
                {"id": 1, "acid": {"ID": 3, "Name": "HCl", "Img": "http://img/hcl.png"}, "mass": 2.0, "result": 0.448},
                {"id": 2, "acid_id": 4, "mass": 1.0}
            ]
        }"#;

        let detail: CarbonateDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.status(), Some(CarbonateStatus::Draft));
        assert_eq!(detail.acids().len(), 2);
        assert_eq!(detail.acids()[0].target_acid_id(), Some(3));
        assert_eq!(detail.acids()[1].target_acid_id(), Some(4));
        assert_eq!(detail.acids()[0].acid.as_ref().unwrap().name.as_deref(), Some("HCl"));
    }

    #[test]
    fn null_acids_reads_as_empty() {
        let detail: CarbonateDetail =
            serde_json::from_str(r#"{"id": 1, "status": "Created", "acids": null}"#).unwrap();
        assert!(detail.acids().is_empty());
    }

    #[test]
    fn query_string_encodes_status_and_dates() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let filter = ListFilter {
            status: Some(CarbonateStatus::Created),
            ..ListFilter::for_day(day)
        };

        assert_eq!(
            filter.query_string(),
            "?status=%D1%81%D1%84%D0%BE%D1%80%D0%BC%D0%B8%D1%80%D0%BE%D0%B2%D0%B0%D0%BD&date_from=2024-01-01&date_to=2024-01-01"
        );
        assert_eq!(ListFilter::default().query_string(), "");
        assert_eq!(ListFilter::for_day(day).query_string(), "?date_from=2024-01-01&date_to=2024-01-01");
    }
}
