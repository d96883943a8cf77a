//! Row actions: navigation, confirmation and the confirmed mutation.

use serde_json::{Map, Value};

use crate::domain::resource::{Resource, RowAction};
use crate::domain::session::SessionContext;
use crate::domain::types::EntityId;
use crate::dto::entity::ConfirmPageData;
use crate::listing::actions::{Dispatch, InFlightRows, RowMutation, dispatch};
use crate::listing::mutation::mutate_then_invalidate;
use crate::repository::EntityWriter;
use crate::services::listing::{ListCache, ensure_access};
use crate::services::{ServiceError, ServiceResult};

/// What a row click leads to.
#[derive(Debug)]
pub enum ActionOutcome {
    Redirect(String),
    Confirm(ConfirmPageData),
}

fn parse(resource: Resource, id: &str, action: &str) -> ServiceResult<(EntityId, RowAction)> {
    let id = EntityId::new(id)?;
    let action = action.parse::<RowAction>().map_err(|err| {
        log::warn!("Unknown action for {resource}: {err}");
        ServiceError::NotFound
    })?;
    Ok((id, action))
}

/// Routes a row click: `view`/`edit` redirect, mutating actions ask first.
pub fn open_action(
    session: &SessionContext,
    resource: Resource,
    id: &str,
    action: &str,
) -> ServiceResult<ActionOutcome> {
    ensure_access(session, resource)?;
    let (id, action) = parse(resource, id, action)?;
    match dispatch(resource, id, action)? {
        Dispatch::Navigate(path) => Ok(ActionOutcome::Redirect(path)),
        Dispatch::ConfirmationRequired(pending) => {
            Ok(ActionOutcome::Confirm(ConfirmPageData::from(&pending)))
        }
    }
}

/// Runs a confirmed row mutation and invalidates the resource's lists.
///
/// Returns `None` when the request did not carry a confirmation; nothing is
/// sent in that case. A second submission for the same row while the first
/// is running fails with [`crate::listing::actions::ActionError::AlreadyPending`].
#[allow(clippy::too_many_arguments)]
pub async fn execute_action<R>(
    repo: &R,
    cache: &ListCache,
    rows: &InFlightRows,
    session: &SessionContext,
    resource: Resource,
    id: &str,
    action: &str,
    confirmed: bool,
) -> ServiceResult<Option<String>>
where
    R: EntityWriter + ?Sized,
{
    ensure_access(session, resource)?;
    let (id, action) = parse(resource, id, action)?;

    let pending = match dispatch(resource, id, action)? {
        Dispatch::ConfirmationRequired(pending) => pending,
        Dispatch::Navigate(_) => {
            return Err(ServiceError::Form(format!(
                "{} does not change anything.",
                action.label()
            )));
        }
    };
    if !confirmed {
        log::info!("{action} on {resource}/{} was not confirmed", pending.id());
        return Ok(None);
    }

    let confirmed = pending.confirm(rows)?;
    let endpoint = resource.endpoint();
    match confirmed.mutation() {
        RowMutation::Delete => {
            mutate_then_invalidate(
                cache,
                endpoint,
                repo.delete_entity(session, endpoint, confirmed.id()),
            )
            .await?;
        }
        RowMutation::SetStatus(status) => {
            let mut body = Map::new();
            body.insert("status".to_string(), Value::from(status));
            mutate_then_invalidate(
                cache,
                endpoint,
                repo.patch_entity(session, endpoint, confirmed.id(), &body),
            )
            .await?;
        }
    }

    let message = match action {
        RowAction::Approve => format!("The {} was approved.", resource.singular()),
        RowAction::Reject => format!("The {} was rejected.", resource.singular()),
        _ => format!("The {} was deleted.", resource.singular()),
    };
    Ok(Some(message))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::session::AdminRole;
    use crate::listing::actions::ActionError;
    use crate::listing::cache::QueryCache;
    use crate::listing::store::ViewStore;
    use crate::repository::errors::ApiError;
    use crate::repository::test::{TestRepository, test_session};
    use crate::services::listing::load_list_page;

    fn cache() -> ListCache {
        QueryCache::new(Duration::from_secs(60))
    }

    fn views() -> ViewStore {
        ViewStore::new(Duration::from_secs(600))
    }

    #[test]
    fn view_and_edit_redirect() {
        let session = test_session(AdminRole::Admin);
        assert!(matches!(
            open_action(&session, Resource::Events, "7", "edit"),
            Ok(ActionOutcome::Redirect(path)) if path == "/events/7/edit"
        ));
        assert!(matches!(
            open_action(&session, Resource::Events, "7", "view"),
            Ok(ActionOutcome::Redirect(path)) if path == "/events/7"
        ));
    }

    #[test]
    fn delete_asks_for_confirmation() {
        let session = test_session(AdminRole::Admin);
        match open_action(&session, Resource::Users, "3", "delete").unwrap() {
            ActionOutcome::Confirm(page) => {
                assert_eq!(page.prompt, "Delete this user? This cannot be undone.");
            }
            other => panic!("expected confirmation, got {other:?}"),
        }
    }

    #[test]
    fn unknown_or_unsupported_actions_are_rejected() {
        let session = test_session(AdminRole::Admin);
        assert_eq!(
            open_action(&session, Resource::Events, "7", "explode").unwrap_err(),
            ServiceError::NotFound
        );
        assert!(matches!(
            open_action(&session, Resource::PostApprovals, "7", "delete"),
            Err(ServiceError::Action(ActionError::Unsupported { .. }))
        ));
    }

    #[actix_web::test]
    async fn unconfirmed_delete_fires_nothing() {
        let repo = TestRepository::with_rows(2);
        let result = execute_action(
            &repo,
            &cache(),
            &InFlightRows::new(),
            &test_session(AdminRole::Admin),
            Resource::Events,
            "r1",
            "delete",
            false,
        )
        .await;

        assert_eq!(result, Ok(None));
        assert!(repo.calls().is_empty());
    }

    #[actix_web::test]
    async fn double_confirmation_deletes_once() {
        let repo = TestRepository::with_rows(2);
        let cache = cache();
        let rows = InFlightRows::new();
        let session = test_session(AdminRole::Admin);

        let (first, second) = tokio::join!(
            execute_action(
                &repo,
                &cache,
                &rows,
                &session,
                Resource::Events,
                "r1",
                "delete",
                true
            ),
            execute_action(
                &repo,
                &cache,
                &rows,
                &session,
                Resource::Events,
                "r1",
                "delete",
                true
            ),
        );

        assert_eq!(first, Ok(Some("The event was deleted.".to_string())));
        assert!(matches!(
            second,
            Err(ServiceError::Action(ActionError::AlreadyPending { .. }))
        ));
        assert_eq!(repo.count("DELETE"), 1);
        assert!(!rows.is_pending(Resource::Events, &EntityId::new("r1").unwrap()));
    }

    #[actix_web::test]
    async fn approve_patches_status_and_refetches_current_page() {
        let repo = TestRepository::with_rows(3);
        let cache = cache();
        let rows = InFlightRows::new();
        let session = test_session(AdminRole::Admin);
        let views = views();

        load_list_page(&repo, &cache, &rows, &views, &session, Resource::CampaignApprovals)
            .await
            .unwrap();
        let message = execute_action(
            &repo,
            &cache,
            &rows,
            &session,
            Resource::CampaignApprovals,
            "r2",
            "approve",
            true,
        )
        .await
        .unwrap();
        load_list_page(&repo, &cache, &rows, &views, &session, Resource::CampaignApprovals)
            .await
            .unwrap();

        assert_eq!(message.as_deref(), Some("The campaign was approved."));
        assert_eq!(
            repo.calls(),
            vec![
                "GET campaigns?page_no=1&limit=10&approval_status=pending",
                r#"PATCH campaigns/r2 {"status":"approved"}"#,
                "GET campaigns?page_no=1&limit=10&approval_status=pending",
            ]
        );
    }

    #[actix_web::test]
    async fn deleting_last_row_of_last_page_moves_back() {
        let repo = TestRepository::with_rows(11);
        let cache = cache();
        let rows = InFlightRows::new();
        let session = test_session(AdminRole::Admin);
        let views = views();
        views
            .update(&session, Resource::Users, |view| {
                view.reconcile(11);
                view.go_to_page(2)
            })
            .unwrap();

        load_list_page(&repo, &cache, &rows, &views, &session, Resource::Users)
            .await
            .unwrap();
        execute_action(&repo, &cache, &rows, &session, Resource::Users, "r11", "delete", true)
            .await
            .unwrap();
        let page = load_list_page(&repo, &cache, &rows, &views, &session, Resource::Users)
            .await
            .unwrap();

        assert_eq!(page.rows.page, 1);
        assert_eq!(page.rows.total_count, 10);
        assert_eq!(
            repo.calls(),
            vec![
                "GET users?page_no=2&limit=10",
                "DELETE users/r11",
                "GET users?page_no=2&limit=10",
                "GET users?page_no=1&limit=10",
            ]
        );
    }

    #[actix_web::test]
    async fn failed_mutation_keeps_cached_list() {
        let repo = TestRepository::with_rows(2);
        *repo.write_error.lock().unwrap() = Some(ApiError::Server {
            status: 409,
            message: "Event has bookings".into(),
        });
        let cache = cache();
        let rows = InFlightRows::new();
        let session = test_session(AdminRole::Admin);

        load_list_page(&repo, &cache, &rows, &views(), &session, Resource::Events)
            .await
            .unwrap();
        let err = execute_action(&repo, &cache, &rows, &session, Resource::Events, "r1", "delete", true)
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Event has bookings");
        assert_eq!(cache.len(), 1);
    }
}
