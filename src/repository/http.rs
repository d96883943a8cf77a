//! Repository backed by the membership REST backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::domain::row::Row;
use crate::domain::session::{SessionContext, SessionUser};
use crate::domain::types::EntityId;
use crate::repository::errors::{ApiError, ApiResult};
use crate::repository::{
    Authenticator, EntityReader, EntityWriter, Exporter, FileUpload, FileUploader, ListResult,
};

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    data: Vec<Row>,
    #[serde(default, alias = "totalCount")]
    total_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
    user: SessionUser,
}

#[derive(Debug, Clone)]
pub struct HttpRepository {
    client: Client,
    base_url: String,
}

impl HttpRepository {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, session: &SessionContext, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .bearer_auth(&session.token)
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_response(status, &body);
        log::warn!("Backend responded {status}: {err}");
        Err(err)
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let body = self.send(request).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn write(
        &self,
        method: Method,
        session: &SessionContext,
        path: &str,
        body: Option<&Map<String, Value>>,
    ) -> ApiResult<()> {
        let mut request = self.request(method, session, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl EntityReader for HttpRepository {
    async fn list_entities(
        &self,
        session: &SessionContext,
        endpoint: &str,
        params: &[(String, String)],
    ) -> ApiResult<ListResult<Row>> {
        log::debug!("GET {endpoint} {params:?}");
        let request = self.request(Method::GET, session, endpoint).query(params);
        let envelope: ListEnvelope = self.json(request).await?;
        let total_count = envelope.total_count.unwrap_or(envelope.data.len());
        Ok(ListResult::new(envelope.data, total_count))
    }

    async fn get_entity(
        &self,
        session: &SessionContext,
        endpoint: &str,
        id: &EntityId,
    ) -> ApiResult<Row> {
        let request = self.request(Method::GET, session, &format!("{endpoint}/{id}"));
        let envelope: DataEnvelope<Row> = self.json(request).await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl EntityWriter for HttpRepository {
    async fn create_entity(
        &self,
        session: &SessionContext,
        endpoint: &str,
        body: &Map<String, Value>,
    ) -> ApiResult<()> {
        self.write(Method::POST, session, endpoint, Some(body)).await
    }

    async fn update_entity(
        &self,
        session: &SessionContext,
        endpoint: &str,
        id: &EntityId,
        body: &Map<String, Value>,
    ) -> ApiResult<()> {
        let path = format!("{endpoint}/{id}");
        self.write(Method::PUT, session, &path, Some(body)).await
    }

    async fn patch_entity(
        &self,
        session: &SessionContext,
        endpoint: &str,
        id: &EntityId,
        body: &Map<String, Value>,
    ) -> ApiResult<()> {
        let path = format!("{endpoint}/{id}");
        self.write(Method::PATCH, session, &path, Some(body)).await
    }

    async fn delete_entity(
        &self,
        session: &SessionContext,
        endpoint: &str,
        id: &EntityId,
    ) -> ApiResult<()> {
        let path = format!("{endpoint}/{id}");
        self.write(Method::DELETE, session, &path, None).await
    }
}

#[async_trait]
impl FileUploader for HttpRepository {
    async fn upload_file(
        &self,
        session: &SessionContext,
        folder: &str,
        file: FileUpload,
    ) -> ApiResult<String> {
        log::info!("Uploading {} to {folder}", file.file_name);
        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }
        let form = Form::new().text("folder", folder.to_string()).part("file", part);
        let request = self.request(Method::POST, session, "upload").multipart(form);
        let envelope: DataEnvelope<UploadData> = self.json(request).await?;
        Ok(envelope.data.url)
    }
}

#[async_trait]
impl Exporter for HttpRepository {
    async fn export_csv(
        &self,
        session: &SessionContext,
        endpoint: &str,
        params: &[(String, String)],
    ) -> ApiResult<String> {
        let request = self.request(Method::GET, session, endpoint).query(params);
        Ok(self.send(request).await?.text().await?)
    }
}

#[async_trait]
impl Authenticator for HttpRepository {
    async fn login(&self, email: &str, password: &str) -> ApiResult<SessionContext> {
        let request = self
            .client
            .post(self.url("auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }));
        let envelope: DataEnvelope<LoginData> = self.json(request).await?;
        Ok(SessionContext::new(envelope.data.token, envelope.data.user))
    }
}
