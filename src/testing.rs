//! In-memory backend for unit tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{AuthApi, CarbonateApi};
use crate::error::ApiError;
use crate::models::*;

#[derive(Default)]
struct Backend {
    current: CurrentCarbonateInfo,
    list: Vec<CarbonateListEntry>,
    details: HashMap<i64, CarbonateDetail>,
    user: Option<User>,
    fail_next: Option<ApiError>,
    fail_on: Option<(String, ApiError)>,
    delay: Option<Duration>,
    calls: Vec<String>,
    filters: Vec<ListFilter>,
}

pub struct FakeApi {
    backend: Mutex<Backend>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            backend: Mutex::new(Backend::default()),
        }
    }

    pub fn set_list(&self, list: Vec<CarbonateListEntry>) {
        self.backend.lock().unwrap().list = list;
    }

    pub fn set_current(&self, current: CurrentCarbonateInfo) {
        self.backend.lock().unwrap().current = current;
    }

    pub fn put_detail(&self, detail: CarbonateDetail) {
        self.backend.lock().unwrap().details.insert(detail.id, detail);
    }

    pub fn set_user(&self, user: User) {
        self.backend.lock().unwrap().user = Some(user);
    }

    /// The next call of any kind fails with `err`
    pub fn fail_next(&self, err: ApiError) {
        self.backend.lock().unwrap().fail_next = Some(err);
    }

    /// The next call named `name` fails with `err`; other calls pass
    pub fn fail_on(&self, name: &str, err: ApiError) {
        self.backend.lock().unwrap().fail_on = Some((name.to_string(), err));
    }

    /// List and detail responses arrive after `delay`
    pub fn set_delay(&self, delay: Duration) {
        self.backend.lock().unwrap().delay = Some(delay);
    }

    pub fn calls(&self) -> Vec<String> {
        self.backend.lock().unwrap().calls.clone()
    }

    /// Number of calls whose name starts with `name`
    pub fn calls_of(&self, name: &str) -> usize {
        self.backend
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.split('(').next() == Some(name))
            .count()
    }

    pub fn filters(&self) -> Vec<ListFilter> {
        self.backend.lock().unwrap().filters.clone()
    }

    fn record(&self, call: String) -> Result<std::sync::MutexGuard<'_, Backend>, ApiError> {
        let mut backend = self.backend.lock().unwrap();
        let name = call.split('(').next().unwrap_or_default().to_string();
        backend.calls.push(call);

        if let Some(err) = backend.fail_next.take() {
            return Err(err);
        }
        if backend.fail_on.as_ref().is_some_and(|(target, _)| *target == name) {
            let (_, err) = backend.fail_on.take().unwrap();
            return Err(err);
        }
        Ok(backend)
    }

    async fn respond_later(&self) {
        let delay = self.backend.lock().unwrap().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl CarbonateApi for FakeApi {
    async fn current_carbonate(&self) -> Result<CurrentCarbonateInfo, ApiError> {
        let backend = self.record("current_carbonate()".into())?;
        Ok(backend.current.clone())
    }

    async fn list_carbonates(&self, filter: &ListFilter) -> Result<Vec<CarbonateListEntry>, ApiError> {
        let list = {
            let mut backend = self.record("list_carbonates()".into())?;
            backend.filters.push(filter.clone());
            backend.list.clone()
        };
        self.respond_later().await;
        Ok(list)
    }

    async fn carbonate_detail(&self, id: i64) -> Result<CarbonateDetail, ApiError> {
        let detail = {
            let backend = self.record(format!("carbonate_detail({})", id))?;
            backend.details.get(&id).cloned()
        };
        self.respond_later().await;
        detail.ok_or_else(|| ApiError::from_status(404, "not found".into()))
    }

    async fn update_carbonate_mass(&self, id: i64, mass: f64) -> Result<(), ApiError> {
        let mut backend = self.record(format!("update_carbonate_mass({}, {})", id, mass))?;
        if let Some(detail) = backend.details.get_mut(&id) {
            detail.mass = Some(mass);
        }
        Ok(())
    }

    async fn set_carbonate_status(&self, id: i64, status: CarbonateStatus) -> Result<(), ApiError> {
        let mut backend = self.record(format!("set_carbonate_status({}, {})", id, status.as_wire()))?;
        for item in backend.list.iter_mut().filter(|e| e.id == id) {
            item.status = Some(status.as_wire().to_string());
        }
        Ok(())
    }

    async fn delete_carbonate(&self, id: i64) -> Result<(), ApiError> {
        let mut backend = self.record(format!("delete_carbonate({})", id))?;
        backend.details.remove(&id);
        Ok(())
    }

    async fn submit_form(&self) -> Result<(), ApiError> {
        let _backend = self.record("submit_form()".into())?;
        Ok(())
    }

    async fn add_acid(&self, acid_id: i64) -> Result<(), ApiError> {
        let _backend = self.record(format!("add_acid({})", acid_id))?;
        Ok(())
    }

    async fn update_acid_mass(&self, acid_id: i64, mass: f64) -> Result<(), ApiError> {
        let mut backend = self.record(format!("update_acid_mass({}, {})", acid_id, mass))?;
        for detail in backend.details.values_mut() {
            for acid in detail.acids.iter_mut().flatten() {
                if acid.target_acid_id() == Some(acid_id) {
                    acid.mass = Some(mass);
                }
            }
        }
        Ok(())
    }

    async fn remove_acid(&self, acid_id: i64) -> Result<(), ApiError> {
        let mut backend = self.record(format!("remove_acid({})", acid_id))?;
        for detail in backend.details.values_mut() {
            if let Some(acids) = detail.acids.as_mut() {
                acids.retain(|a| a.target_acid_id() != Some(acid_id));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AuthApi for FakeApi {
    async fn login(&self, login: &str, _password: &str) -> Result<LoginResponse, ApiError> {
        let backend = self.record(format!("login({})", login))?;
        Ok(LoginResponse {
            token: "token".into(),
            user: backend.user.clone(),
        })
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let _backend = self.record("logout()".into())?;
        Ok(())
    }

    async fn profile(&self) -> Result<User, ApiError> {
        let backend = self.record("profile()".into())?;
        backend.user.clone().ok_or(ApiError::Unauthorized)
    }
}

pub fn entry(id: i64, status: &str) -> CarbonateListEntry {
    CarbonateListEntry {
        id,
        status: Some(status.to_string()),
        mass: Some(10.0),
        date_create: Some("2024-01-01T09:30:00Z".to_string()),
        creator: None,
        calculated: Some(1),
    }
}

/// Detail with acids given as `(acid_id, mass)` pairs
pub fn detail(id: i64, status: &str, acids: &[(i64, f64)]) -> CarbonateDetail {
    CarbonateDetail {
        id,
        status: Some(status.to_string()),
        mass: Some(10.0),
        date_create: Some("2024-01-01T09:30:00Z".to_string()),
        creator: None,
        acids: Some(
            acids
                .iter()
                .enumerate()
                .map(|(i, (acid_id, mass))| CarbonateAcid {
                    id: Some(i as i64 + 100),
                    acid_id: Some(*acid_id),
                    acid: Some(Acid {
                        id: *acid_id,
                        name: Some(format!("Acid {}", acid_id)),
                        img: Some(format!("http://img/{}.png", acid_id)),
                    }),
                    mass: Some(*mass),
                    result: None,
                })
                .collect(),
        ),
    }
}

pub fn user(login: &str, role: Role) -> User {
    User {
        id: Some(1),
        login: login.to_string(),
        role,
    }
}
