//! Catalog of the backend entities the console manages.
//!
//! Every list page is the same list/filter/paginate pattern; a [`Resource`]
//! supplies the per-entity pieces (endpoint, columns, filters, actions, form).

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::session::AdminRole;

/// Table column: a dotted path into the row and its header label.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
}

impl Column {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// Option of a select input.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

const fn choice(value: &'static str, label: &'static str) -> Choice {
    Choice { value, label }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "type", content = "options", rename_all = "snake_case")]
pub enum FilterKind {
    Text,
    Date,
    Select(&'static [Choice]),
}

/// Field shown in the filter drawer.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct FilterField {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FilterKind,
}

const fn filter(key: &'static str, label: &'static str, kind: FilterKind) -> FilterField {
    FilterField { key, label, kind }
}

/// Pair of date filters where each bound requires the other.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct DateRangeRule {
    pub start: &'static str,
    pub end: &'static str,
}

const fn range(start: &'static str, end: &'static str) -> DateRangeRule {
    DateRangeRule { start, end }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "type", content = "options", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    LongText,
    /// HTML content, sanitized before it is sent to the backend.
    RichText,
    Number,
    Date,
    DateTime,
    Email,
    Url,
    Select(&'static [Choice]),
    /// File forwarded to the upload service; the returned URL is the value.
    Upload { accept: &'static str },
}

/// Editable field of an add/edit form.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FormField {
    pub fn is_upload(&self) -> bool {
        matches!(self.kind, FieldKind::Upload { .. })
    }
}

const fn field(key: &'static str, label: &'static str, kind: FieldKind) -> FormField {
    FormField {
        key,
        label,
        kind,
        required: true,
    }
}

const fn optional(key: &'static str, label: &'static str, kind: FieldKind) -> FormField {
    FormField {
        key,
        label,
        kind,
        required: false,
    }
}

/// Per-row control routed by the row action dispatcher.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    View,
    Edit,
    Delete,
    Approve,
    Reject,
}

impl RowAction {
    pub const ALL: [RowAction; 5] = [
        RowAction::View,
        RowAction::Edit,
        RowAction::Delete,
        RowAction::Approve,
        RowAction::Reject,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RowAction::View => "view",
            RowAction::Edit => "edit",
            RowAction::Delete => "delete",
            RowAction::Approve => "approve",
            RowAction::Reject => "reject",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RowAction::View => "View",
            RowAction::Edit => "Edit",
            RowAction::Delete => "Delete",
            RowAction::Approve => "Approve",
            RowAction::Reject => "Reject",
        }
    }

    /// Destructive and state-changing actions go through a confirmation step.
    pub fn requires_confirmation(self) -> bool {
        matches!(
            self,
            RowAction::Delete | RowAction::Approve | RowAction::Reject
        )
    }
}

impl Display for RowAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RowAction {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

/// Returned when a URL segment names no known resource or action.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown name: {0}")]
pub struct UnknownName(pub String);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Events,
    Campaigns,
    Promotions,
    Surveys,
    Notifications,
    Users,
    Districts,
    Campuses,
    Admins,
    PostApprovals,
    CampaignApprovals,
}

const EVENT_STATUS: &[Choice] = &[
    choice("draft", "Draft"),
    choice("published", "Published"),
    choice("cancelled", "Cancelled"),
    choice("completed", "Completed"),
];
const EVENT_CATEGORY: &[Choice] = &[
    choice("workshop", "Workshop"),
    choice("social", "Social"),
    choice("conference", "Conference"),
    choice("webinar", "Webinar"),
];
const CAMPAIGN_STATUS: &[Choice] = &[
    choice("pending", "Pending"),
    choice("approved", "Approved"),
    choice("rejected", "Rejected"),
    choice("active", "Active"),
    choice("closed", "Closed"),
];
const PROMOTION_STATUS: &[Choice] = &[
    choice("scheduled", "Scheduled"),
    choice("active", "Active"),
    choice("expired", "Expired"),
];
const SURVEY_STATUS: &[Choice] = &[
    choice("draft", "Draft"),
    choice("open", "Open"),
    choice("closed", "Closed"),
];
const NOTIFICATION_STATUS: &[Choice] = &[
    choice("draft", "Draft"),
    choice("scheduled", "Scheduled"),
    choice("sent", "Sent"),
];
const AUDIENCE: &[Choice] = &[
    choice("all", "Everyone"),
    choice("members", "Members"),
    choice("admins", "Admins"),
];
const ACTIVE_STATUS: &[Choice] = &[choice("active", "Active"), choice("inactive", "Inactive")];
const USER_STATUS: &[Choice] = &[
    choice("active", "Active"),
    choice("inactive", "Inactive"),
    choice("suspended", "Suspended"),
];
const ADMIN_ROLES: &[Choice] = &[
    choice("admin", "Admin"),
    choice("super_admin", "Super admin"),
];

const IMAGES: &str = "image/*";
const DOCUMENTS: &str = "application/pdf,image/*";

const CRUD: &[RowAction] = &[RowAction::View, RowAction::Edit, RowAction::Delete];
const MODERATION: &[RowAction] = &[RowAction::View, RowAction::Approve, RowAction::Reject];
const PENDING: &[(&str, &str)] = &[("approval_status", "pending")];

const COLUMNS_EVENTS: &[Column] = &[
    Column::new("title", "Title"),
    Column::new("category", "Category"),
    Column::new("campus.name", "Campus"),
    Column::new("start_date", "Starts"),
    Column::new("end_date", "Ends"),
    Column::new("status", "Status"),
];
const COLUMNS_CAMPAIGNS: &[Column] = &[
    Column::new("title", "Title"),
    Column::new("goal_amount", "Goal"),
    Column::new("raised_amount", "Raised"),
    Column::new("start_date", "Starts"),
    Column::new("status", "Status"),
];
const COLUMNS_PROMOTIONS: &[Column] = &[
    Column::new("title", "Title"),
    Column::new("discount_percent", "Discount %"),
    Column::new("valid_from", "Valid from"),
    Column::new("valid_to", "Valid to"),
    Column::new("status", "Status"),
];
const COLUMNS_SURVEYS: &[Column] = &[
    Column::new("title", "Title"),
    Column::new("question_count", "Questions"),
    Column::new("passing_score", "Passing score"),
    Column::new("status", "Status"),
    Column::new("created_at", "Created"),
];
const COLUMNS_NOTIFICATIONS: &[Column] = &[
    Column::new("title", "Title"),
    Column::new("audience", "Audience"),
    Column::new("scheduled_at", "Scheduled"),
    Column::new("status", "Status"),
];
const COLUMNS_USERS: &[Column] = &[
    Column::new("name", "Name"),
    Column::new("email", "Email"),
    Column::new("phone", "Phone"),
    Column::new("district.name", "District"),
    Column::new("campus.name", "Campus"),
    Column::new("status", "Status"),
];
const COLUMNS_DISTRICTS: &[Column] = &[
    Column::new("name", "Name"),
    Column::new("code", "Code"),
    Column::new("campus_count", "Campuses"),
    Column::new("status", "Status"),
];
const COLUMNS_CAMPUSES: &[Column] = &[
    Column::new("name", "Name"),
    Column::new("district.name", "District"),
    Column::new("address", "Address"),
];
const COLUMNS_ADMINS: &[Column] = &[
    Column::new("name", "Name"),
    Column::new("email", "Email"),
    Column::new("role", "Role"),
    Column::new("status", "Status"),
];
const COLUMNS_POST_APPROVALS: &[Column] = &[
    Column::new("author.name", "Author"),
    Column::new("content", "Content"),
    Column::new("created_at", "Submitted"),
];
const COLUMNS_CAMPAIGN_APPROVALS: &[Column] = &[
    Column::new("title", "Title"),
    Column::new("goal_amount", "Goal"),
    Column::new("created_by.name", "Requested by"),
    Column::new("created_at", "Submitted"),
];
const FILTERS_EVENTS: &[FilterField] = &[
    filter("status", "Status", FilterKind::Select(EVENT_STATUS)),
    filter("category", "Category", FilterKind::Select(EVENT_CATEGORY)),
    filter("start_date", "From", FilterKind::Date),
    filter("end_date", "To", FilterKind::Date),
];
const FILTERS_CAMPAIGNS: &[FilterField] = &[
    filter("status", "Status", FilterKind::Select(CAMPAIGN_STATUS)),
    filter("start_date", "From", FilterKind::Date),
    filter("end_date", "To", FilterKind::Date),
];
const FILTERS_PROMOTIONS: &[FilterField] = &[
    filter("status", "Status", FilterKind::Select(PROMOTION_STATUS)),
    filter("valid_from", "Valid from", FilterKind::Date),
    filter("valid_to", "Valid to", FilterKind::Date),
];
const FILTERS_SURVEYS: &[FilterField] = &[filter("status", "Status", FilterKind::Select(SURVEY_STATUS))];
const FILTERS_NOTIFICATIONS: &[FilterField] = &[
    filter("status", "Status", FilterKind::Select(NOTIFICATION_STATUS)),
    filter("audience", "Audience", FilterKind::Select(AUDIENCE)),
    filter("scheduled_from", "Scheduled from", FilterKind::Date),
    filter("scheduled_to", "Scheduled to", FilterKind::Date),
];
const FILTERS_USERS: &[FilterField] = &[
    filter("status", "Status", FilterKind::Select(USER_STATUS)),
    filter("district", "District", FilterKind::Text),
    filter("campus", "Campus", FilterKind::Text),
    filter("joined_from", "Joined from", FilterKind::Date),
    filter("joined_to", "Joined to", FilterKind::Date),
];
const FILTERS_DISTRICTS: &[FilterField] = &[filter("status", "Status", FilterKind::Select(ACTIVE_STATUS))];
const FILTERS_CAMPUSES: &[FilterField] = &[filter("district", "District", FilterKind::Text)];
const FILTERS_ADMINS: &[FilterField] = &[filter("role", "Role", FilterKind::Select(ADMIN_ROLES))];
const FILTERS_APPROVALS: &[FilterField] = &[
    filter("submitted_from", "Submitted from", FilterKind::Date),
    filter("submitted_to", "Submitted to", FilterKind::Date),
];
const RANGES_START_END: &[DateRangeRule] = &[range("start_date", "end_date")];
const RANGES_PROMOTIONS: &[DateRangeRule] = &[range("valid_from", "valid_to")];
const RANGES_NOTIFICATIONS: &[DateRangeRule] = &[range("scheduled_from", "scheduled_to")];
const RANGES_USERS: &[DateRangeRule] = &[range("joined_from", "joined_to")];
const RANGES_APPROVALS: &[DateRangeRule] = &[range("submitted_from", "submitted_to")];
const FIELDS_EVENTS: &[FormField] = &[
    field("title", "Title", FieldKind::Text),
    field("description", "Description", FieldKind::RichText),
    field("category", "Category", FieldKind::Select(EVENT_CATEGORY)),
    field("start_date", "Starts", FieldKind::DateTime),
    field("end_date", "Ends", FieldKind::DateTime),
    optional("venue", "Venue", FieldKind::Text),
    optional("capacity", "Capacity", FieldKind::Number),
    field("status", "Status", FieldKind::Select(EVENT_STATUS)),
    field("cover_image", "Cover image", FieldKind::Upload { accept: IMAGES }),
    optional("brochure", "Brochure", FieldKind::Upload { accept: DOCUMENTS }),
];
const FIELDS_CAMPAIGNS: &[FormField] = &[
    field("title", "Title", FieldKind::Text),
    field("description", "Description", FieldKind::RichText),
    field("goal_amount", "Goal amount", FieldKind::Number),
    field("start_date", "Starts", FieldKind::Date),
    field("end_date", "Ends", FieldKind::Date),
    field("banner_image", "Banner", FieldKind::Upload { accept: IMAGES }),
];
const FIELDS_PROMOTIONS: &[FormField] = &[
    field("title", "Title", FieldKind::Text),
    optional("description", "Description", FieldKind::LongText),
    field("discount_percent", "Discount %", FieldKind::Number),
    field("valid_from", "Valid from", FieldKind::Date),
    field("valid_to", "Valid to", FieldKind::Date),
    optional("link", "Link", FieldKind::Url),
    field("image", "Image", FieldKind::Upload { accept: IMAGES }),
];
const FIELDS_SURVEYS: &[FormField] = &[
    field("title", "Title", FieldKind::Text),
    optional("description", "Description", FieldKind::LongText),
    field("question_count", "Questions", FieldKind::Number),
    field("passing_score", "Passing score", FieldKind::Number),
    field("status", "Status", FieldKind::Select(SURVEY_STATUS)),
];
const FIELDS_NOTIFICATIONS: &[FormField] = &[
    field("title", "Title", FieldKind::Text),
    field("body", "Message", FieldKind::RichText),
    field("audience", "Audience", FieldKind::Select(AUDIENCE)),
    optional("scheduled_at", "Send at", FieldKind::DateTime),
    optional("link", "Link", FieldKind::Url),
    optional("attachment", "Attachment", FieldKind::Upload { accept: DOCUMENTS }),
];
const FIELDS_USERS: &[FormField] = &[
    field("name", "Name", FieldKind::Text),
    field("email", "Email", FieldKind::Email),
    optional("phone", "Phone", FieldKind::Text),
    field("status", "Status", FieldKind::Select(USER_STATUS)),
    optional("avatar", "Avatar", FieldKind::Upload { accept: IMAGES }),
];
const FIELDS_DISTRICTS: &[FormField] = &[
    field("name", "Name", FieldKind::Text),
    field("code", "Code", FieldKind::Text),
    field("status", "Status", FieldKind::Select(ACTIVE_STATUS)),
];
const FIELDS_CAMPUSES: &[FormField] = &[
    field("name", "Name", FieldKind::Text),
    field("district_id", "District id", FieldKind::Text),
    optional("address", "Address", FieldKind::LongText),
    optional("image", "Image", FieldKind::Upload { accept: IMAGES }),
];
const FIELDS_ADMINS: &[FormField] = &[
    field("name", "Name", FieldKind::Text),
    field("email", "Email", FieldKind::Email),
    field("role", "Role", FieldKind::Select(ADMIN_ROLES)),
];
const READ_ONLY: &[FormField] = &[];

impl Resource {
    pub const ALL: [Resource; 11] = [
        Resource::Events,
        Resource::Campaigns,
        Resource::Promotions,
        Resource::Surveys,
        Resource::Notifications,
        Resource::Users,
        Resource::Districts,
        Resource::Campuses,
        Resource::Admins,
        Resource::PostApprovals,
        Resource::CampaignApprovals,
    ];

    /// URL segment used by the console routes.
    pub fn slug(self) -> &'static str {
        match self {
            Resource::Events => "events",
            Resource::Campaigns => "campaigns",
            Resource::Promotions => "promotions",
            Resource::Surveys => "surveys",
            Resource::Notifications => "notifications",
            Resource::Users => "users",
            Resource::Districts => "districts",
            Resource::Campuses => "campuses",
            Resource::Admins => "admins",
            Resource::PostApprovals => "post-approvals",
            Resource::CampaignApprovals => "campaign-approvals",
        }
    }

    /// Backend collection path; approval queues share the entity endpoint.
    pub fn endpoint(self) -> &'static str {
        match self {
            Resource::PostApprovals => "posts",
            Resource::CampaignApprovals => "campaigns",
            other => other.slug(),
        }
    }

    /// Parameters always sent with list requests.
    pub fn fixed_params(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Resource::PostApprovals | Resource::CampaignApprovals => PENDING,
            _ => &[],
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Resource::Events => "Events",
            Resource::Campaigns => "Campaigns",
            Resource::Promotions => "Promotions",
            Resource::Surveys => "Surveys",
            Resource::Notifications => "Notifications",
            Resource::Users => "Users",
            Resource::Districts => "Districts",
            Resource::Campuses => "Campuses",
            Resource::Admins => "Admins",
            Resource::PostApprovals => "Post approvals",
            Resource::CampaignApprovals => "Campaign approvals",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            Resource::Events => "event",
            Resource::Campaigns | Resource::CampaignApprovals => "campaign",
            Resource::Promotions => "promotion",
            Resource::Surveys => "survey",
            Resource::Notifications => "notification",
            Resource::Users => "user",
            Resource::Districts => "district",
            Resource::Campuses => "campus",
            Resource::Admins => "admin",
            Resource::PostApprovals => "post",
        }
    }

    pub fn columns(self) -> &'static [Column] {
        match self {
            Resource::Events => COLUMNS_EVENTS,
            Resource::Campaigns => COLUMNS_CAMPAIGNS,
            Resource::Promotions => COLUMNS_PROMOTIONS,
            Resource::Surveys => COLUMNS_SURVEYS,
            Resource::Notifications => COLUMNS_NOTIFICATIONS,
            Resource::Users => COLUMNS_USERS,
            Resource::Districts => COLUMNS_DISTRICTS,
            Resource::Campuses => COLUMNS_CAMPUSES,
            Resource::Admins => COLUMNS_ADMINS,
            Resource::PostApprovals => COLUMNS_POST_APPROVALS,
            Resource::CampaignApprovals => COLUMNS_CAMPAIGN_APPROVALS,
        }
    }

    pub fn filters(self) -> &'static [FilterField] {
        match self {
            Resource::Events => FILTERS_EVENTS,
            Resource::Campaigns => FILTERS_CAMPAIGNS,
            Resource::Promotions => FILTERS_PROMOTIONS,
            Resource::Surveys => FILTERS_SURVEYS,
            Resource::Notifications => FILTERS_NOTIFICATIONS,
            Resource::Users => FILTERS_USERS,
            Resource::Districts => FILTERS_DISTRICTS,
            Resource::Campuses => FILTERS_CAMPUSES,
            Resource::Admins => FILTERS_ADMINS,
            Resource::PostApprovals | Resource::CampaignApprovals => FILTERS_APPROVALS,
        }
    }

    /// Cross-field date rules validated before filters are applied.
    pub fn date_ranges(self) -> &'static [DateRangeRule] {
        match self {
            Resource::Events | Resource::Campaigns => RANGES_START_END,
            Resource::Promotions => RANGES_PROMOTIONS,
            Resource::Notifications => RANGES_NOTIFICATIONS,
            Resource::Users => RANGES_USERS,
            Resource::PostApprovals | Resource::CampaignApprovals => RANGES_APPROVALS,
            _ => &[],
        }
    }

    pub fn actions(self) -> &'static [RowAction] {
        match self {
            Resource::PostApprovals | Resource::CampaignApprovals => MODERATION,
            _ => CRUD,
        }
    }

    pub fn supports(self, action: RowAction) -> bool {
        self.actions().contains(&action)
    }

    /// Editable fields; empty for read-only queues.
    pub fn form_fields(self) -> &'static [FormField] {
        match self {
            Resource::Events => FIELDS_EVENTS,
            Resource::Campaigns => FIELDS_CAMPAIGNS,
            Resource::Promotions => FIELDS_PROMOTIONS,
            Resource::Surveys => FIELDS_SURVEYS,
            Resource::Notifications => FIELDS_NOTIFICATIONS,
            Resource::Users => FIELDS_USERS,
            Resource::Districts => FIELDS_DISTRICTS,
            Resource::Campuses => FIELDS_CAMPUSES,
            Resource::Admins => FIELDS_ADMINS,
            Resource::PostApprovals | Resource::CampaignApprovals => READ_ONLY,
        }
    }

    pub fn is_editable(self) -> bool {
        !self.form_fields().is_empty()
    }

    /// Download endpoint returning a delimited text payload.
    pub fn export_endpoint(self) -> Option<&'static str> {
        match self {
            Resource::Events => Some("events/export"),
            Resource::Campaigns => Some("campaigns/export"),
            Resource::Users => Some("users/export"),
            _ => None,
        }
    }

    /// Target-folder hint sent with uploads.
    pub fn upload_folder(self) -> &'static str {
        self.endpoint()
    }

    pub fn required_role(self) -> AdminRole {
        match self {
            Resource::Admins => AdminRole::SuperAdmin,
            _ => AdminRole::Admin,
        }
    }

    /// Events carry guest, speaker and RSVP lists on their detail page.
    pub fn has_attendees(self) -> bool {
        self == Resource::Events
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Resource {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|resource| resource.slug() == s)
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}
