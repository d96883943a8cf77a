//! Services behind the list pages.

use crate::domain::resource::Resource;
use crate::domain::row::Row;
use crate::domain::session::SessionContext;
use crate::dto::list::ListPageData;
use crate::listing::actions::InFlightRows;
use crate::listing::cache::{CacheKey, QueryCache};
use crate::listing::query::{FilterValues, QueryDescriptor};
use crate::listing::store::{Settled, ViewStore};
use crate::listing::view::ListView;
use crate::repository::errors::{ApiError, ApiResult};
use crate::repository::{EntityReader, ListResult};
use crate::services::{ServiceError, ServiceResult};

/// Cache shared by every list page.
pub type ListCache = QueryCache<ListResult<Row>>;

/// Fails with `Forbidden` when the signed-in role may not open `resource`.
pub fn ensure_access(session: &SessionContext, resource: Resource) -> ServiceResult<()> {
    if session.has_role(resource.required_role()) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(resource.slug().to_string()))
    }
}

/// The descriptor actually sent: the page's descriptor plus the resource's
/// fixed parameters, which also keep queues sharing an endpoint apart in the
/// cache.
pub fn request_descriptor(resource: Resource, descriptor: &QueryDescriptor) -> QueryDescriptor {
    let mut request = descriptor.clone();
    request.filters.extend(
        resource
            .fixed_params()
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string())),
    );
    request
}

/// Fetches one page through the shared cache.
pub async fn fetch_page<R>(
    repo: &R,
    cache: &ListCache,
    session: &SessionContext,
    resource: Resource,
    descriptor: &QueryDescriptor,
) -> ApiResult<ListResult<Row>>
where
    R: EntityReader + ?Sized,
{
    let request = request_descriptor(resource, descriptor);
    let key = CacheKey::new(session.cache_scope(), resource.endpoint(), request.clone());
    cache
        .get_or_fetch(key, || async move {
            repo.list_entities(session, resource.endpoint(), &request.to_params())
                .await
        })
        .await
}

/// Loads the list page of `resource` from the user's stored view.
///
/// When the reported total no longer reaches the current page (e.g. the last
/// row of the last page was deleted) the page is pulled back and fetched once
/// more. A response overtaken by a newer request for the same list renders as
/// fetched but leaves the stored view alone. A 401 ends the request without
/// retrying; other failures render as an inline error.
pub async fn load_list_page<R>(
    repo: &R,
    cache: &ListCache,
    rows: &InFlightRows,
    views: &ViewStore,
    session: &SessionContext,
    resource: Resource,
) -> ServiceResult<ListPageData>
where
    R: EntityReader + ?Sized,
{
    ensure_access(session, resource)?;

    let mut refetched = false;
    let (view, result) = loop {
        let (mut view, ticket) = views.begin_fetch(session, resource);
        let requested = ticket.descriptor().page;
        let result = fetch_page(repo, cache, session, resource, ticket.descriptor()).await;
        let total = result.as_ref().ok().map(|list| list.total_count);

        match views.settle(session, resource, ticket, total) {
            Settled::Applied { view, moved } if moved && !refetched => {
                log::info!(
                    "{resource}: page {requested} is past the end, moving to page {}",
                    view.descriptor().page
                );
                refetched = true;
            }
            Settled::Applied { view, moved } => {
                if moved {
                    log::warn!(
                        "{resource}: total shrank again, showing page {} without refetching",
                        view.descriptor().page
                    );
                }
                break (view, result);
            }
            Settled::Stale => {
                if let Some(total) = total {
                    view.reconcile(total);
                }
                break (view, result);
            }
        }
    };

    match result {
        Ok(list) => Ok(ListPageData::new(resource, &view, list, None, rows)),
        Err(ApiError::Unauthorized) => Err(ServiceError::Unauthorized),
        Err(err) => {
            log::error!("Failed to list {resource}: {err}");
            let empty = ListResult::new(Vec::new(), view.last_total().unwrap_or(0));
            Ok(ListPageData::new(
                resource,
                &view,
                empty,
                Some(err.user_message()),
                rows,
            ))
        }
    }
}

/// Validates and commits submitted drawer values.
pub fn apply_filters(
    resource: Resource,
    view: &mut ListView,
    draft: FilterValues,
) -> ServiceResult<bool> {
    view.apply_filters(resource, draft).map_err(|err| {
        log::warn!("Rejected filters for {resource}: {err}");
        ServiceError::from(err)
    })
}

/// Moves to `page`; out-of-range pages are refused without fetching.
pub fn go_to_page(view: &mut ListView, page: usize) -> ServiceResult<bool> {
    view.go_to_page(page)
        .map_err(|err| ServiceError::Form(format!("Page {} does not exist.", err.requested)))
}
