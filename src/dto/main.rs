use serde::Serialize;

use crate::dto::list::ResourceMeta;

/// Data required to render the dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardData {
    /// Resources the signed-in user may open.
    pub resources: Vec<ResourceMeta>,
}
