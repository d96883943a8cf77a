use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    domain::{row::Row, session::SessionContext, types::EntityId},
    repository::errors::ApiResult,
};

pub mod errors;
pub mod http;
#[cfg(feature = "test-mocks")]
pub mod mock;
#[cfg(test)]
pub mod test;

pub use http::HttpRepository;

/// One page of a list endpoint. `items` keep server order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total_count: usize,
}

impl<T> ListResult<T> {
    pub fn new(items: Vec<T>, total_count: usize) -> Self {
        Self { items, total_count }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }
}

/// File received from a form, forwarded as-is to the upload service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait EntityReader: Send + Sync {
    async fn list_entities(
        &self,
        session: &SessionContext,
        endpoint: &str,
        params: &[(String, String)],
    ) -> ApiResult<ListResult<Row>>;

    async fn get_entity(
        &self,
        session: &SessionContext,
        endpoint: &str,
        id: &EntityId,
    ) -> ApiResult<Row>;
}

#[async_trait]
pub trait EntityWriter: Send + Sync {
    async fn create_entity(
        &self,
        session: &SessionContext,
        endpoint: &str,
        body: &Map<String, Value>,
    ) -> ApiResult<()>;

    async fn update_entity(
        &self,
        session: &SessionContext,
        endpoint: &str,
        id: &EntityId,
        body: &Map<String, Value>,
    ) -> ApiResult<()>;

    /// Partial update, used for status changes.
    async fn patch_entity(
        &self,
        session: &SessionContext,
        endpoint: &str,
        id: &EntityId,
        body: &Map<String, Value>,
    ) -> ApiResult<()>;

    async fn delete_entity(
        &self,
        session: &SessionContext,
        endpoint: &str,
        id: &EntityId,
    ) -> ApiResult<()>;
}

#[async_trait]
pub trait FileUploader: Send + Sync {
    /// Stores the file under `folder` and returns its public URL.
    async fn upload_file(
        &self,
        session: &SessionContext,
        folder: &str,
        file: FileUpload,
    ) -> ApiResult<String>;
}

#[async_trait]
pub trait Exporter: Send + Sync {
    /// Raw delimited text returned by an export endpoint.
    async fn export_csv(
        &self,
        session: &SessionContext,
        endpoint: &str,
        params: &[(String, String)],
    ) -> ApiResult<String>;
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> ApiResult<SessionContext>;
}
