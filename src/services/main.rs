use crate::domain::resource::Resource;
use crate::domain::session::SessionContext;
use crate::dto::list::ResourceMeta;
use crate::dto::main::DashboardData;

/// Resources the signed-in role may open, in navigation order.
pub fn load_dashboard(session: &SessionContext) -> DashboardData {
    DashboardData {
        resources: Resource::ALL
            .into_iter()
            .filter(|resource| session.has_role(resource.required_role()))
            .map(ResourceMeta::from)
            .collect(),
    }
}
