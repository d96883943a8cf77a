//! Detail pages and the add/edit workflow.

use serde_json::Value;

use crate::domain::resource::{FormField, Resource, RowAction};
use crate::domain::row::{AttendeeKind, AttendeeRow, Row};
use crate::domain::session::SessionContext;
use crate::domain::types::{EntityId, PageSize};
use crate::dto::entity::{AttendeeTab, DetailPageData, FormPageData};
use crate::dto::list::ActionLink;
use crate::forms::entity::{EntitySubmission, FieldError, validate_values};
use crate::listing::actions::InFlightRows;
use crate::listing::draft::{DraftError, FormDraft};
use crate::listing::mutation::mutate_then_invalidate;
use crate::listing::pagination::{Paginated, Pager};
use crate::repository::errors::ApiError;
use crate::repository::{EntityReader, EntityWriter, FileUploader};
use crate::services::listing::{ListCache, ensure_access};
use crate::services::{ServiceError, ServiceResult};

const ATTENDEE_PAGE_SIZE: PageSize = PageSize::Ten;

/// Loads a detail page. Events also get the requested attendee tab.
#[allow(clippy::too_many_arguments)]
pub async fn load_detail<R>(
    repo: &R,
    rows: &InFlightRows,
    session: &SessionContext,
    resource: Resource,
    id: &str,
    tab: Option<&str>,
    attendee_page: usize,
) -> ServiceResult<DetailPageData>
where
    R: EntityReader + ?Sized,
{
    ensure_access(session, resource)?;
    let id = EntityId::new(id)?;
    let row = repo
        .get_entity(session, resource.endpoint(), &id)
        .await
        .map_err(|err| {
            log::error!("Failed to load {resource}/{id}: {err}");
            ServiceError::from(err)
        })?;

    let attendees = if resource.has_attendees() {
        let kind = tab.and_then(AttendeeKind::parse).unwrap_or_default();
        Some(load_attendees(repo, session, &id, kind, attendee_page.max(1)).await?)
    } else {
        None
    };

    let actions = ActionLink::for_row(resource, Some(&id), rows)
        .into_iter()
        .filter(|link| link.action != RowAction::View)
        .collect();

    Ok(DetailPageData {
        resource: resource.into(),
        fields: DetailPageData::field_values(resource, &row),
        id: id.into_inner(),
        actions,
        attendees,
    })
}

async fn load_attendees<R>(
    repo: &R,
    session: &SessionContext,
    event: &EntityId,
    kind: AttendeeKind,
    page: usize,
) -> ServiceResult<AttendeeTab>
where
    R: EntityReader + ?Sized,
{
    let endpoint = format!("events/{event}/attendees");
    let params = vec![
        ("page_no".to_string(), page.to_string()),
        ("limit".to_string(), ATTENDEE_PAGE_SIZE.get().to_string()),
        ("kind".to_string(), kind.as_str().to_string()),
    ];

    let (cells, total, error) = match repo.list_entities(session, &endpoint, &params).await {
        Ok(list) => {
            let cells = list
                .items
                .into_iter()
                .filter_map(|row| decode_attendee(row, kind))
                .map(|attendee| attendee.cells())
                .collect();
            (cells, list.total_count, None)
        }
        Err(ApiError::Unauthorized) => return Err(ServiceError::Unauthorized),
        Err(err) => {
            log::error!("Failed to list attendees of event {event}: {err}");
            (Vec::new(), 0, Some(err.user_message()))
        }
    };

    Ok(AttendeeTab {
        active: kind,
        tabs: AttendeeTab::tabs(kind),
        columns: kind.columns(),
        rows: Paginated::new(cells, Pager::new(page, ATTENDEE_PAGE_SIZE, total)),
        error,
    })
}

/// Rows come back without a discriminant when the tab already implies it.
fn decode_attendee(row: Row, kind: AttendeeKind) -> Option<AttendeeRow> {
    let mut fields = row.fields().clone();
    fields
        .entry("kind")
        .or_insert_with(|| Value::from(kind.as_str()));
    match serde_json::from_value::<AttendeeRow>(Value::Object(fields)) {
        Ok(attendee) if attendee.kind() == kind => Some(attendee),
        Ok(attendee) => {
            log::warn!("Skipping {:?} row in the {} tab", attendee.kind(), kind.as_str());
            None
        }
        Err(err) => {
            log::warn!("Skipping malformed attendee row: {err}");
            None
        }
    }
}

fn editable_fields(resource: Resource) -> ServiceResult<&'static [FormField]> {
    if resource.is_editable() {
        Ok(resource.form_fields())
    } else {
        Err(ServiceError::NotFound)
    }
}

/// Empty add form, or an edit form seeded from the stored entity.
pub async fn load_form<R>(
    repo: &R,
    session: &SessionContext,
    resource: Resource,
    id: Option<&str>,
) -> ServiceResult<FormPageData>
where
    R: EntityReader + ?Sized,
{
    ensure_access(session, resource)?;
    let fields = editable_fields(resource)?;
    let draft = match id {
        Some(id) => {
            let id = EntityId::new(id)?;
            let row = repo.get_entity(session, resource.endpoint(), &id).await?;
            FormDraft::from_entity(fields, &row)
        }
        None => FormDraft::new(fields),
    };
    Ok(FormPageData::new(
        resource,
        id.map(str::to_string),
        &draft,
        &[],
        Vec::new(),
    ))
}

/// Result of submitting an add/edit form.
#[derive(Debug)]
pub enum SaveOutcome {
    Saved(String),
    /// The form is shown again with its messages; nothing was written.
    Rejected(FormPageData),
}

fn label_of(fields: &[FormField], key: &str) -> String {
    fields
        .iter()
        .find(|field| field.key == key)
        .map_or_else(|| key.to_string(), |field| field.label.to_string())
}

fn draft_error(fields: &[FormField], err: DraftError) -> FieldError {
    match err {
        DraftError::UploadPending(key) => FieldError {
            message: format!("{} is still uploading.", label_of(fields, &key)),
            key,
        },
        DraftError::MissingUpload(key) => FieldError {
            message: format!("{} requires a file.", label_of(fields, &key)),
            key,
        },
        DraftError::UnknownUpload(key) => FieldError {
            message: format!("{} does not accept files.", label_of(fields, &key)),
            key,
        },
    }
}

/// Uploads files, runs the client guards and writes the entity.
///
/// Each file goes to the upload service on its own; a failed upload leaves
/// its field without a URL and the rest of the form intact. Upload fields
/// keep their current URL when no new file is sent.
pub async fn save_entity<R>(
    repo: &R,
    cache: &ListCache,
    session: &SessionContext,
    resource: Resource,
    id: Option<&str>,
    submission: EntitySubmission,
) -> ServiceResult<SaveOutcome>
where
    R: EntityWriter + FileUploader + ?Sized,
{
    ensure_access(session, resource)?;
    let fields = editable_fields(resource)?;
    let id = id.map(EntityId::new).transpose()?;

    let mut draft = FormDraft::new(fields);
    for (key, value) in submission.values {
        if draft.slot(&key).is_some() {
            if !value.is_empty() {
                draft.complete_upload(&key, value)?;
            }
        } else {
            draft.set(key, value);
        }
    }

    let mut errors = Vec::new();
    for (key, file) in submission.files {
        draft.begin_upload(&key)?;
        let name = file.file_name.clone();
        match repo
            .upload_file(session, resource.upload_folder(), file)
            .await
        {
            Ok(url) => {
                log::info!("Uploaded {name} for {resource}.{key}");
                draft.complete_upload(&key, url)?;
            }
            Err(ApiError::Unauthorized) => return Err(ServiceError::Unauthorized),
            Err(err) => {
                log::error!("Upload of {name} for {resource}.{key} failed: {err}");
                draft.fail_upload(&key)?;
                errors.push(format!(
                    "{}: the upload failed. {}",
                    label_of(fields, &key),
                    err.user_message()
                ));
            }
        }
    }

    let mut field_errors = validate_values(fields, draft.values());
    if let Err(err) = draft.can_submit() {
        field_errors.push(draft_error(fields, err));
    }
    let id_str = id.as_ref().map(ToString::to_string);
    if !field_errors.is_empty() || !errors.is_empty() {
        return Ok(SaveOutcome::Rejected(FormPageData::new(
            resource,
            id_str,
            &draft,
            &field_errors,
            errors,
        )));
    }

    let payload = draft.to_payload(fields);
    let endpoint = resource.endpoint();
    let result = mutate_then_invalidate(cache, endpoint, async {
        match &id {
            Some(id) => repo.update_entity(session, endpoint, id, &payload).await,
            None => repo.create_entity(session, endpoint, &payload).await,
        }
    })
    .await;

    match result {
        Ok(()) => {
            let verb = if id.is_some() { "updated" } else { "created" };
            Ok(SaveOutcome::Saved(format!(
                "The {} was {verb}.",
                resource.singular()
            )))
        }
        Err(ApiError::Unauthorized) => Err(ServiceError::Unauthorized),
        Err(err) => Ok(SaveOutcome::Rejected(FormPageData::new(
            resource,
            id_str,
            &draft,
            &[],
            vec![err.user_message()],
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::domain::session::AdminRole;
    use crate::listing::cache::QueryCache;
    use crate::repository::FileUpload;
    use crate::repository::test::{TestRepository, test_session};

    fn cache() -> ListCache {
        QueryCache::new(Duration::from_secs(60))
    }

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn image(name: &str) -> FileUpload {
        FileUpload {
            file_name: name.to_string(),
            content_type: Some("image/png".to_string()),
            bytes: vec![1, 2, 3],
        }
    }

    fn district() -> BTreeMap<String, String> {
        values(&[("name", "North"), ("code", "N1"), ("status", "active")])
    }

    #[actix_web::test]
    async fn create_posts_sanitized_payload_and_invalidates() {
        let repo = TestRepository::default();
        let outcome = save_entity(
            &repo,
            &cache(),
            &test_session(AdminRole::Admin),
            Resource::Districts,
            None,
            EntitySubmission {
                values: district(),
                files: Vec::new(),
            },
        )
        .await
        .unwrap();

        assert!(matches!(outcome, SaveOutcome::Saved(ref m) if m == "The district was created."));
        assert_eq!(repo.calls(), vec!["POST districts"]);
        assert_eq!(
            repo.bodies.lock().unwrap()[0],
            json!({"name": "North", "code": "N1", "status": "active"})
                .as_object()
                .unwrap()
                .clone()
        );
    }

    #[actix_web::test]
    async fn missing_required_value_blocks_submit() {
        let repo = TestRepository::default();
        let outcome = save_entity(
            &repo,
            &cache(),
            &test_session(AdminRole::Admin),
            Resource::Districts,
            None,
            EntitySubmission {
                values: values(&[("code", "N1"), ("status", "active")]),
                files: Vec::new(),
            },
        )
        .await
        .unwrap();

        let SaveOutcome::Rejected(page) = outcome else {
            panic!("expected the form back");
        };
        let name = page.fields.iter().find(|f| f.field.key == "name").unwrap();
        assert_eq!(name.error.as_deref(), Some("Name is required."));
        assert!(repo.calls().is_empty());
    }

    #[actix_web::test]
    async fn uploaded_file_url_becomes_field_value() {
        let repo = TestRepository::default();
        let mut form = values(&[
            ("title", "Spring Gala"),
            ("category", "social"),
            ("start_date", "2024-05-01T18:00"),
            ("end_date", "2024-05-01T22:00"),
            ("status", "draft"),
            ("venue", "Hall"),
        ]);
        form.insert("description".into(), "<p>Hi</p>".into());

        let outcome = save_entity(
            &repo,
            &cache(),
            &test_session(AdminRole::Admin),
            Resource::Events,
            None,
            EntitySubmission {
                values: form,
                files: vec![("cover_image".to_string(), image("cover.png"))],
            },
        )
        .await
        .unwrap();

        assert!(matches!(outcome, SaveOutcome::Saved(_)), "{outcome:?}");
        assert_eq!(repo.calls(), vec!["UPLOAD events cover.png", "POST events"]);
        assert_eq!(
            repo.bodies.lock().unwrap()[0]["cover_image"],
            "https://cdn.test/events/cover.png"
        );
    }

    #[actix_web::test]
    async fn failed_upload_keeps_form_and_blocks_required_field() {
        let repo = TestRepository::default();
        *repo.upload_error.lock().unwrap() = Some(ApiError::Server {
            status: 413,
            message: "File too large".into(),
        });

        let outcome = save_entity(
            &repo,
            &cache(),
            &test_session(AdminRole::Admin),
            Resource::Events,
            None,
            EntitySubmission {
                values: values(&[("title", "Spring Gala")]),
                files: vec![("cover_image".to_string(), image("huge.png"))],
            },
        )
        .await
        .unwrap();

        let SaveOutcome::Rejected(page) = outcome else {
            panic!("expected the form back");
        };
        assert_eq!(page.errors, vec!["Cover image: the upload failed. File too large"]);
        let cover = page
            .fields
            .iter()
            .find(|f| f.field.key == "cover_image")
            .unwrap();
        let slot = cover.upload.as_ref().unwrap();
        assert!(!slot.uploading);
        assert_eq!(slot.url, None);
        assert_eq!(cover.error.as_deref(), Some("Cover image requires a file."));
        let title = page.fields.iter().find(|f| f.field.key == "title").unwrap();
        assert_eq!(title.value, "Spring Gala");
        assert_eq!(repo.count("POST"), 0);
    }

    #[actix_web::test]
    async fn edit_keeps_existing_upload_and_shows_server_message() {
        let repo = TestRepository::default();
        *repo.write_error.lock().unwrap() = Some(ApiError::Server {
            status: 422,
            message: "Code already in use".into(),
        });

        let outcome = save_entity(
            &repo,
            &cache(),
            &test_session(AdminRole::Admin),
            Resource::Districts,
            Some("7"),
            EntitySubmission {
                values: district(),
                files: Vec::new(),
            },
        )
        .await
        .unwrap();

        let SaveOutcome::Rejected(page) = outcome else {
            panic!("expected the form back");
        };
        assert_eq!(page.id.as_deref(), Some("7"));
        assert_eq!(page.errors, vec!["Code already in use"]);
        assert_eq!(repo.calls(), vec!["PUT districts/7"]);
    }

    #[actix_web::test]
    async fn approval_queues_have_no_form() {
        let repo = TestRepository::default();
        let result = load_form(
            &repo,
            &test_session(AdminRole::Admin),
            Resource::PostApprovals,
            None,
        )
        .await;
        assert_eq!(result.unwrap_err(), ServiceError::NotFound);
    }

    #[actix_web::test]
    async fn edit_form_is_seeded_from_entity() {
        let repo = TestRepository::with_rows(2);
        let page = load_form(
            &repo,
            &test_session(AdminRole::Admin),
            Resource::Events,
            Some("r2"),
        )
        .await
        .unwrap();
        let title = page.fields.iter().find(|f| f.field.key == "title").unwrap();
        assert_eq!(title.value, "Row #2");
    }

    #[actix_web::test]
    async fn event_detail_shows_attendee_tab() {
        let repo = TestRepository::default();
        *repo.rows.lock().unwrap() = vec![
            serde_json::from_value(json!({"id": "e1", "name": "Ann", "email": "ann@example.com", "title": "Gala"}))
                .unwrap(),
        ];

        let page = load_detail(
            &repo,
            &InFlightRows::new(),
            &test_session(AdminRole::Admin),
            Resource::Events,
            "e1",
            Some("guest"),
            1,
        )
        .await
        .unwrap();

        let tab = page.attendees.unwrap();
        assert_eq!(tab.active, AttendeeKind::Guest);
        assert_eq!(tab.rows.items, vec![vec!["Ann", "ann@example.com", ""]]);
        assert_eq!(tab.rows.range_label, "1-1 of 1");
        assert!(page.actions.iter().all(|a| a.action != RowAction::View));
        assert_eq!(
            repo.calls(),
            vec![
                "GET events/e1",
                "GET events/e1/attendees?page_no=1&limit=10&kind=guest"
            ]
        );
    }

    #[actix_web::test]
    async fn missing_entity_is_not_found() {
        let repo = TestRepository::default();
        let result = load_detail(
            &repo,
            &InFlightRows::new(),
            &test_session(AdminRole::Admin),
            Resource::Users,
            "nope",
            None,
            1,
        )
        .await;
        assert_eq!(result.unwrap_err(), ServiceError::NotFound);
    }
}
