use crate::domain::resource::Resource;
use crate::domain::session::SessionContext;
use crate::domain::types::PageSize;
use crate::dto::api::{ListApiQuery, ListApiResponse};
use crate::listing::pagination::Pager;
use crate::listing::query::{QueryDescriptor, normalize_filters};
use crate::repository::EntityReader;
use crate::services::listing::{ListCache, ensure_access, fetch_page};
use crate::services::{ServiceError, ServiceResult};

fn descriptor(resource: Resource, query: ListApiQuery) -> ServiceResult<QueryDescriptor> {
    let page = match query.page.as_deref() {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|page| *page >= 1)
            .ok_or_else(|| ServiceError::Form(format!("Invalid page: {raw}")))?,
        None => 1,
    };
    let page_size = match query.page_size.as_deref() {
        Some(raw) => raw.parse::<PageSize>()?,
        None => PageSize::default(),
    };
    let declared: Vec<&str> = resource.filters().iter().map(|f| f.key).collect();
    let filters = normalize_filters(
        query
            .filters
            .into_iter()
            .filter(|(key, _)| declared.contains(&key.as_str()))
            .collect(),
    );

    Ok(QueryDescriptor {
        page,
        page_size,
        search: query.search.unwrap_or_default().trim().to_string(),
        filters,
        sort: query.sort.filter(|sort| !sort.trim().is_empty()),
    })
}

/// Stateless list lookup for `/api/v1/{resource}`. Undeclared filter keys are
/// ignored; the page is not clamped.
pub async fn list_json<R>(
    repo: &R,
    cache: &ListCache,
    session: &SessionContext,
    resource: Resource,
    query: ListApiQuery,
) -> ServiceResult<ListApiResponse>
where
    R: EntityReader + ?Sized,
{
    ensure_access(session, resource)?;
    let descriptor = descriptor(resource, query)?;
    let list = fetch_page(repo, cache, session, resource, &descriptor)
        .await
        .map_err(|err| {
            log::error!("Failed to list {resource}: {err}");
            ServiceError::from(err)
        })?;
    let pager = Pager::new(descriptor.page, descriptor.page_size, list.total_count);

    Ok(ListApiResponse {
        data: list.items,
        total_count: list.total_count,
        page: descriptor.page,
        total_pages: pager.total_pages(),
    })
}
