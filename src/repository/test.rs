//! In-memory backend used by service tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::domain::row::Row;
use crate::domain::session::{AdminRole, SessionContext, SessionUser};
use crate::domain::types::EntityId;
use crate::repository::errors::{ApiError, ApiResult};
use crate::repository::{
    Authenticator, EntityReader, EntityWriter, Exporter, FileUpload, FileUploader, ListResult,
};

pub fn test_session(role: AdminRole) -> SessionContext {
    SessionContext::new(
        "test-token",
        SessionUser {
            id: "u1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            role,
        },
    )
}

/// Keeps one collection of rows and records every call it receives.
#[derive(Default)]
pub struct TestRepository {
    pub rows: Mutex<Vec<Row>>,
    pub list_error: Mutex<Option<ApiError>>,
    /// Totals reported by successive list calls instead of the row count.
    pub list_totals: Mutex<Vec<usize>>,
    pub write_error: Mutex<Option<ApiError>>,
    pub upload_error: Mutex<Option<ApiError>>,
    pub csv: Mutex<String>,
    pub bodies: Mutex<Vec<Map<String, Value>>>,
    calls: Mutex<Vec<String>>,
}

impl TestRepository {
    pub fn with_rows(count: usize) -> Self {
        let rows = (1..=count)
            .map(|id| {
                serde_json::from_value(json!({"id": format!("r{id}"), "title": format!("Row #{id}")}))
                    .unwrap()
            })
            .collect();
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn write_result(&self) -> ApiResult<()> {
        match self.write_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn param(params: &[(String, String)], key: &str) -> Option<usize> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .and_then(|(_, v)| v.parse().ok())
}

#[async_trait]
impl EntityReader for TestRepository {
    async fn list_entities(
        &self,
        _session: &SessionContext,
        endpoint: &str,
        params: &[(String, String)],
    ) -> ApiResult<ListResult<Row>> {
        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        self.record(format!("GET {endpoint}?{query}"));
        if let Some(err) = self.list_error.lock().unwrap().clone() {
            return Err(err);
        }
        let rows = self.rows.lock().unwrap().clone();
        let page = param(params, "page_no").unwrap_or(1);
        let limit = param(params, "limit").unwrap_or(rows.len().max(1));
        let items = rows
            .iter()
            .skip((page - 1) * limit)
            .take(limit)
            .cloned()
            .collect();
        let mut totals = self.list_totals.lock().unwrap();
        let total = if totals.is_empty() {
            rows.len()
        } else {
            totals.remove(0)
        };
        Ok(ListResult::new(items, total))
    }

    async fn get_entity(
        &self,
        _session: &SessionContext,
        endpoint: &str,
        id: &EntityId,
    ) -> ApiResult<Row> {
        self.record(format!("GET {endpoint}/{id}"));
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id().as_deref() == Some(id.as_str()))
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Record not found".into()))
    }
}

#[async_trait]
impl EntityWriter for TestRepository {
    async fn create_entity(
        &self,
        _session: &SessionContext,
        endpoint: &str,
        body: &Map<String, Value>,
    ) -> ApiResult<()> {
        self.record(format!("POST {endpoint}"));
        self.bodies.lock().unwrap().push(body.clone());
        self.write_result()
    }

    async fn update_entity(
        &self,
        _session: &SessionContext,
        endpoint: &str,
        id: &EntityId,
        body: &Map<String, Value>,
    ) -> ApiResult<()> {
        self.record(format!("PUT {endpoint}/{id}"));
        self.bodies.lock().unwrap().push(body.clone());
        self.write_result()
    }

    async fn patch_entity(
        &self,
        _session: &SessionContext,
        endpoint: &str,
        id: &EntityId,
        body: &Map<String, Value>,
    ) -> ApiResult<()> {
        self.record(format!("PATCH {endpoint}/{id} {}", Value::Object(body.clone())));
        self.write_result()
    }

    async fn delete_entity(
        &self,
        _session: &SessionContext,
        endpoint: &str,
        id: &EntityId,
    ) -> ApiResult<()> {
        self.record(format!("DELETE {endpoint}/{id}"));
        tokio::task::yield_now().await;
        self.write_result()?;
        self.rows
            .lock()
            .unwrap()
            .retain(|row| row.id().as_deref() != Some(id.as_str()));
        Ok(())
    }
}

#[async_trait]
impl FileUploader for TestRepository {
    async fn upload_file(
        &self,
        _session: &SessionContext,
        folder: &str,
        file: FileUpload,
    ) -> ApiResult<String> {
        self.record(format!("UPLOAD {folder} {}", file.file_name));
        if let Some(err) = self.upload_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(format!("https://cdn.test/{folder}/{}", file.file_name))
    }
}

#[async_trait]
impl Exporter for TestRepository {
    async fn export_csv(
        &self,
        _session: &SessionContext,
        endpoint: &str,
        params: &[(String, String)],
    ) -> ApiResult<String> {
        self.record(format!("EXPORT {endpoint} {params:?}"));
        Ok(self.csv.lock().unwrap().clone())
    }
}

#[async_trait]
impl Authenticator for TestRepository {
    async fn login(&self, email: &str, password: &str) -> ApiResult<SessionContext> {
        self.record(format!("LOGIN {email}"));
        if email == "ada@example.com" && password == "secret" {
            Ok(test_session(AdminRole::Admin))
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}
