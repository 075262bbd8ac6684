//! Wire DTOs for the Beanstalk API.
//!
//! # Design
//! Read and write shapes are separate types: the API accepts fewer fields
//! than it returns and in several places names them differently (team
//! members are ids going out and user objects coming back, permissions are a
//! map going out and a list coming back). Optional response fields default
//! so a sparse response still decodes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Repositories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryWrap<T> {
    pub repository: T,
}

/// Body of `POST repositories.json`. Sent bare, without the wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRepository {
    pub title: String,
    pub name: String,
    pub type_id: String,
    pub create_structure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRepository {
    pub title: String,
    pub color_label: String,
    pub default_branch: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameRepository {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color_label: String,
    #[serde(default)]
    pub default_branch: String,
    #[serde(default)]
    pub vcs: String,
    #[serde(default)]
    pub repository_url: String,
}

// ---------------------------------------------------------------------------
// Code review settings
// ---------------------------------------------------------------------------

/// Settings as returned by `GET {repository_id}/code_reviews/settings.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeReviewSettingsRecord {
    #[serde(default)]
    pub unanimous_approval: bool,
    #[serde(default)]
    pub auto_reopen: bool,
    #[serde(default)]
    pub default_assignees: Vec<CodeReviewParticipant>,
    #[serde(default)]
    pub default_watchers: Vec<CodeReviewParticipant>,
}

/// Settings as sent to `PUT {repository_id}/code_reviews/settings.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeReviewSettingsWrite {
    pub unanimous_approval: bool,
    pub auto_reopen: bool,
    pub default_assignees_user_ids: Vec<i64>,
    pub default_watchers_user_ids: Vec<i64>,
    pub default_watchers_team_ids: Vec<i64>,
}

/// A default assignee or watcher; `kind` is `"User"` or `"Team"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeReviewParticipant {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "login", default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamWrite {
    pub name: String,
    pub color_label: String,
    pub users: Vec<i64>,
    /// Keyed by repository id rendered as a string.
    pub permissions: BTreeMap<String, TeamPermissionWrite>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamPermissionWrite {
    pub write: bool,
    pub deploy: bool,
    pub configure_deployments: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamWrap {
    pub team: TeamRecord,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamRecord {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color_label: String,
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub permissions: Vec<TeamPermissionRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamPermissionRecord {
    pub repository_id: i64,
    #[serde(default)]
    pub repository_title: String,
    #[serde(default)]
    pub write: bool,
    #[serde(default)]
    pub deploy: bool,
    #[serde(default)]
    pub configure_deployments: bool,
}

// ---------------------------------------------------------------------------
// Users and invitations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWrap<T> {
    pub user: T,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub owner: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Mutable user fields, sent to `PUT users/{id}.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWrite {
    pub name: String,
    pub email: String,
    pub admin: bool,
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationWrap<T> {
    pub invitation: T,
}

/// Body of `POST invitations.json`, inside the `invitation` wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvitation {
    pub user: InvitedUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitedUser {
    pub username: String,
    pub name: String,
    pub email: String,
    pub admin: bool,
    pub timezone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvitationRecord {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

// ---------------------------------------------------------------------------
// Integrations
// ---------------------------------------------------------------------------

/// Integration payloads are built by the schema transformer, so the body is
/// an open JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrationWrap {
    pub integration: Map<String, Value>,
}
