//! Mock repository implementations for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;
use serde_json::{Map, Value};

use crate::domain::row::Row;
use crate::domain::session::SessionContext;
use crate::domain::types::EntityId;
use crate::repository::errors::ApiResult;
use crate::repository::{
    Authenticator, EntityReader, EntityWriter, Exporter, FileUpload, FileUploader, ListResult,
};

mock! {
    pub Repository {}

    #[async_trait]
    impl EntityReader for Repository {
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
    impl EntityWriter for Repository {
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
    impl FileUploader for Repository {
        async fn upload_file(
            &self,
            session: &SessionContext,
            folder: &str,
            file: FileUpload,
        ) -> ApiResult<String>;
    }

    #[async_trait]
    impl Exporter for Repository {
        async fn export_csv(
            &self,
            session: &SessionContext,
            endpoint: &str,
            params: &[(String, String)],
        ) -> ApiResult<String>;
    }

    #[async_trait]
    impl Authenticator for Repository {
        async fn login(&self, email: &str, password: &str) -> ApiResult<SessionContext>;
    }
}
