//! In-memory stand-in for the Beanstalk REST API.
//!
//! Serves the endpoints the client uses under `/api`, with the same wrapper
//! objects and status codes. Every request must carry a Basic
//! `Authorization` header; credentials themselves are not checked.
//!
//! Member paths end in `.json` (`teams/3.json`), so handlers capture the
//! whole segment and strip the suffix.

pub mod model;

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

use crate::model::{CodeReview, Integration, Permission, Repository, Store, Team, User, INTEGRATION_TYPES};

pub type Db = Arc<RwLock<Store>>;

/// Largest page the user list serves.
pub const MAX_PER_PAGE: usize = 50;
const DEFAULT_PER_PAGE: usize = 30;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    let api = Router::new()
        .route("/repositories.json", post(create_repository))
        .route("/repositories/{id}", get(get_repository).put(update_repository))
        .route("/repositories/{id}/rename.json", put(rename_repository))
        .route("/repositories/{id}/integrations.json", post(create_integration))
        .route(
            "/repositories/{id}/integrations/{integration}",
            get(get_integration).put(update_integration).delete(delete_integration),
        )
        .route("/{id}/code_reviews/settings.json", get(get_code_review).put(update_code_review))
        .route("/teams.json", post(create_team))
        .route("/teams/{id}", get(get_team).put(update_team).delete(delete_team))
        .route("/users.json", get(list_users))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/invitations.json", post(create_invitation))
        .layer(middleware::from_fn(require_basic_auth));
    Router::new().nest("/api", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Failure responses, rendered as `{"errors": [...]}`.
#[derive(Debug)]
pub enum Failure {
    NotFound,
    Unprocessable(String),
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Failure::NotFound => (StatusCode::NOT_FOUND, "Record not found".to_owned()),
            Failure::Unprocessable(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
        };
        (status, Json(json!({"errors": [message]}))).into_response()
    }
}

type Handled<T> = Result<T, Failure>;

async fn require_basic_auth(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic "));
    if !authorized {
        tracing::warn!(uri = %request.uri(), "rejected request without basic auth");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"errors": ["Authentication required"]})),
        )
            .into_response();
    }
    next.run(request).await
}

/// `"42.json"` or `"42"` → 42. Anything else cannot name a record.
fn parse_id(segment: &str) -> Handled<i64> {
    segment
        .strip_suffix(".json")
        .unwrap_or(segment)
        .parse()
        .map_err(|_| Failure::NotFound)
}

fn unprocessable(message: &str) -> Failure {
    Failure::Unprocessable(message.to_owned())
}

// --- repositories ---

#[derive(Deserialize)]
struct CreateRepository {
    title: String,
    name: String,
    type_id: String,
    #[serde(default)]
    create_structure: bool,
}

#[derive(Deserialize)]
struct RepositoryBody<T> {
    repository: T,
}

#[derive(Deserialize)]
struct UpdateRepository {
    title: Option<String>,
    color_label: Option<String>,
    default_branch: Option<String>,
}

#[derive(Deserialize)]
struct RenameRepository {
    name: String,
}

async fn create_repository(
    State(db): State<Db>,
    Json(input): Json<CreateRepository>,
) -> Handled<(StatusCode, Json<Value>)> {
    if !matches!(input.type_id.as_str(), "git" | "subversion") {
        return Err(unprocessable("Type is not included in the list"));
    }
    let mut store = db.write().await;
    if store.repositories.values().any(|r| r.name == input.name) {
        return Err(unprocessable("Name has already been taken"));
    }

    let id = store.next_id();
    let repository = Repository {
        id,
        repository_url: format!("https://mock.git.beanstalkapp.com/{}.git", input.name),
        title: input.title,
        name: input.name,
        color_label: "white".to_owned(),
        default_branch: "master".to_owned(),
        vcs: input.type_id,
    };
    tracing::info!(id, name = %repository.name, create_structure = input.create_structure, "repository created");
    store.repositories.insert(id, repository.clone());
    store.code_reviews.insert(id, CodeReview::default());
    Ok((StatusCode::CREATED, Json(json!({"repository": repository}))))
}

async fn get_repository(State(db): State<Db>, Path(id): Path<String>) -> Handled<Json<Value>> {
    let id = parse_id(&id)?;
    let store = db.read().await;
    let repository = store.repositories.get(&id).ok_or(Failure::NotFound)?;
    Ok(Json(json!({"repository": repository})))
}

async fn update_repository(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<RepositoryBody<UpdateRepository>>,
) -> Handled<Json<Value>> {
    let id = parse_id(&id)?;
    let mut store = db.write().await;
    let repository = store.repositories.get_mut(&id).ok_or(Failure::NotFound)?;
    let update = input.repository;
    if let Some(title) = update.title {
        repository.title = title;
    }
    if let Some(color_label) = update.color_label {
        repository.color_label = color_label;
    }
    if let Some(default_branch) = update.default_branch {
        repository.default_branch = default_branch;
    }
    Ok(Json(json!({"repository": repository})))
}

async fn rename_repository(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<RepositoryBody<RenameRepository>>,
) -> Handled<Json<Value>> {
    let id = parse_id(&id)?;
    let name = input.repository.name;
    let mut store = db.write().await;
    if store.repositories.values().any(|r| r.name == name && r.id != id) {
        return Err(unprocessable("Name has already been taken"));
    }
    let repository = store.repositories.get_mut(&id).ok_or(Failure::NotFound)?;
    repository.repository_url = format!("https://mock.git.beanstalkapp.com/{name}.git");
    repository.name = name;
    Ok(Json(json!({"repository": repository})))
}

// --- code review settings ---

#[derive(Deserialize)]
struct CodeReviewWrite {
    #[serde(default)]
    unanimous_approval: bool,
    #[serde(default)]
    auto_reopen: bool,
    #[serde(default)]
    default_assignees_user_ids: Vec<i64>,
    #[serde(default)]
    default_watchers_user_ids: Vec<i64>,
    #[serde(default)]
    default_watchers_team_ids: Vec<i64>,
}

async fn get_code_review(State(db): State<Db>, Path(id): Path<String>) -> Handled<Json<Value>> {
    let id = parse_id(&id)?;
    let store = db.read().await;
    let settings = store.code_reviews.get(&id).ok_or(Failure::NotFound)?;
    Ok(Json(store.render_code_review(settings)))
}

async fn update_code_review(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<CodeReviewWrite>,
) -> Handled<Json<Value>> {
    let id = parse_id(&id)?;
    let mut store = db.write().await;
    if !store.code_reviews.contains_key(&id) {
        return Err(Failure::NotFound);
    }
    let users_known = input
        .default_assignees_user_ids
        .iter()
        .chain(&input.default_watchers_user_ids)
        .all(|u| store.users.contains_key(u));
    if !users_known {
        return Err(unprocessable("Unknown user"));
    }
    if !input.default_watchers_team_ids.iter().all(|t| store.teams.contains_key(t)) {
        return Err(unprocessable("Unknown team"));
    }

    let settings = CodeReview {
        unanimous_approval: input.unanimous_approval,
        auto_reopen: input.auto_reopen,
        assignee_ids: input.default_assignees_user_ids,
        watcher_user_ids: input.default_watchers_user_ids,
        watcher_team_ids: input.default_watchers_team_ids,
    };
    let rendered = store.render_code_review(&settings);
    store.code_reviews.insert(id, settings);
    Ok(Json(rendered))
}

// --- integrations ---

#[derive(Deserialize)]
struct IntegrationBody {
    integration: Map<String, Value>,
}

async fn create_integration(
    State(db): State<Db>,
    Path(repository_id): Path<String>,
    Json(input): Json<IntegrationBody>,
) -> Handled<(StatusCode, Json<Value>)> {
    let repository_id = parse_id(&repository_id)?;
    let mut settings = input.integration;
    let kind = match settings.remove("type") {
        Some(Value::String(kind)) if INTEGRATION_TYPES.contains(&kind.as_str()) => kind,
        _ => return Err(unprocessable("Type is not included in the list")),
    };
    settings.remove("id");

    let mut store = db.write().await;
    if !store.repositories.contains_key(&repository_id) {
        return Err(Failure::NotFound);
    }
    let id = store.next_id();
    let integration = Integration {
        id,
        repository_id,
        kind,
        settings,
    };
    tracing::info!(id, repository_id, kind = %integration.kind, "integration created");
    let rendered = integration.render();
    store.integrations.insert(id, integration);
    Ok((StatusCode::CREATED, Json(rendered)))
}

fn find_integration<'a>(
    store: &'a mut Store,
    repository_id: &str,
    id: &str,
) -> Handled<&'a mut Integration> {
    let repository_id = parse_id(repository_id)?;
    let id = parse_id(id)?;
    store
        .integrations
        .get_mut(&id)
        .filter(|i| i.repository_id == repository_id)
        .ok_or(Failure::NotFound)
}

async fn get_integration(
    State(db): State<Db>,
    Path((repository_id, id)): Path<(String, String)>,
) -> Handled<Json<Value>> {
    let mut store = db.write().await;
    let integration = find_integration(&mut store, &repository_id, &id)?;
    Ok(Json(integration.render()))
}

async fn update_integration(
    State(db): State<Db>,
    Path((repository_id, id)): Path<(String, String)>,
    Json(input): Json<IntegrationBody>,
) -> Handled<Json<Value>> {
    let mut store = db.write().await;
    let integration = find_integration(&mut store, &repository_id, &id)?;
    for (key, value) in input.integration {
        if !matches!(key.as_str(), "id" | "type" | "repository_id") {
            integration.settings.insert(key, value);
        }
    }
    Ok(Json(integration.render()))
}

async fn delete_integration(
    State(db): State<Db>,
    Path((repository_id, id)): Path<(String, String)>,
) -> Handled<StatusCode> {
    let mut store = db.write().await;
    let id = find_integration(&mut store, &repository_id, &id)?.id;
    store.integrations.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

// --- teams ---

#[derive(Deserialize)]
struct TeamWrite {
    name: String,
    #[serde(default = "white")]
    color_label: String,
    #[serde(default)]
    users: Vec<i64>,
    #[serde(default)]
    permissions: BTreeMap<String, Permission>,
}

fn white() -> String {
    "white".to_owned()
}

/// Validate `input` against the store and build the team it describes.
fn team_from_write(store: &Store, id: i64, input: TeamWrite) -> Handled<Team> {
    if !input.users.iter().all(|u| store.users.contains_key(u)) {
        return Err(unprocessable("Unknown user"));
    }
    let mut permissions = BTreeMap::new();
    for (repository_id, permission) in input.permissions {
        let repository_id: i64 = repository_id
            .parse()
            .map_err(|_| unprocessable("Unknown repository"))?;
        if !store.repositories.contains_key(&repository_id) {
            return Err(unprocessable("Unknown repository"));
        }
        permissions.insert(repository_id, permission);
    }
    let mut user_ids = input.users;
    user_ids.sort_unstable();
    user_ids.dedup();
    Ok(Team {
        id,
        name: input.name,
        color_label: input.color_label,
        user_ids,
        permissions,
    })
}

async fn create_team(
    State(db): State<Db>,
    Json(input): Json<TeamWrite>,
) -> Handled<(StatusCode, Json<Value>)> {
    let mut store = db.write().await;
    if store.teams.values().any(|t| t.name == input.name) {
        return Err(unprocessable("Name has already been taken"));
    }
    let id = store.next_id();
    let team = team_from_write(&store, id, input)?;
    tracing::info!(id, name = %team.name, "team created");
    let rendered = store.render_team(&team);
    store.teams.insert(id, team);
    Ok((StatusCode::CREATED, Json(rendered)))
}

async fn get_team(State(db): State<Db>, Path(id): Path<String>) -> Handled<Json<Value>> {
    let id = parse_id(&id)?;
    let store = db.read().await;
    let team = store.teams.get(&id).ok_or(Failure::NotFound)?;
    Ok(Json(store.render_team(team)))
}

async fn update_team(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<TeamWrite>,
) -> Handled<Json<Value>> {
    let id = parse_id(&id)?;
    let mut store = db.write().await;
    if !store.teams.contains_key(&id) {
        return Err(Failure::NotFound);
    }
    let team = team_from_write(&store, id, input)?;
    let rendered = store.render_team(&team);
    store.teams.insert(id, team);
    Ok(Json(rendered))
}

async fn delete_team(State(db): State<Db>, Path(id): Path<String>) -> Handled<StatusCode> {
    let id = parse_id(&id)?;
    let mut store = db.write().await;
    store.teams.remove(&id).ok_or(Failure::NotFound)?;
    for settings in store.code_reviews.values_mut() {
        settings.watcher_team_ids.retain(|t| *t != id);
    }
    Ok(StatusCode::NO_CONTENT)
}

// --- users and invitations ---

#[derive(Deserialize)]
struct Page {
    page: Option<usize>,
    per_page: Option<usize>,
}

#[derive(Deserialize)]
struct UserBody<T> {
    user: T,
}

#[derive(Deserialize)]
struct UpdateUser {
    name: Option<String>,
    email: Option<String>,
    admin: Option<bool>,
    timezone: Option<String>,
}

#[derive(Deserialize)]
struct InvitationBody {
    invitation: UserBody<InvitedUser>,
}

#[derive(Deserialize)]
struct InvitedUser {
    username: String,
    name: String,
    email: String,
    #[serde(default)]
    admin: bool,
    #[serde(default = "london")]
    timezone: String,
}

fn london() -> String {
    "London".to_owned()
}

async fn list_users(State(db): State<Db>, Query(page): Query<Page>) -> Json<Vec<Value>> {
    let per_page = page.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
    let skip = page.page.unwrap_or(1).saturating_sub(1) * per_page;
    let store = db.read().await;
    Json(
        store
            .users
            .values()
            .skip(skip)
            .take(per_page)
            .map(|user| json!({"user": user}))
            .collect(),
    )
}

async fn get_user(State(db): State<Db>, Path(id): Path<String>) -> Handled<Json<Value>> {
    let id = parse_id(&id)?;
    let store = db.read().await;
    let user = store.users.get(&id).ok_or(Failure::NotFound)?;
    Ok(Json(json!({"user": user})))
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<UserBody<UpdateUser>>,
) -> Handled<Json<Value>> {
    let id = parse_id(&id)?;
    let mut store = db.write().await;
    let user = store.users.get_mut(&id).ok_or(Failure::NotFound)?;
    let update = input.user;
    if let Some(name) = update.name {
        user.set_name(name);
    }
    if let Some(email) = update.email {
        user.email = email;
    }
    if let Some(admin) = update.admin {
        user.admin = admin;
    }
    if let Some(timezone) = update.timezone {
        user.timezone = timezone;
    }
    Ok(Json(json!({"user": user})))
}

async fn delete_user(State(db): State<Db>, Path(id): Path<String>) -> Handled<StatusCode> {
    let id = parse_id(&id)?;
    let mut store = db.write().await;
    let user = store.users.get(&id).ok_or(Failure::NotFound)?;
    if user.owner {
        return Err(unprocessable("The account owner cannot be deleted"));
    }
    store.users.remove(&id);
    for team in store.teams.values_mut() {
        team.user_ids.retain(|u| *u != id);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Inviting a user creates the account right away.
async fn create_invitation(
    State(db): State<Db>,
    Json(input): Json<InvitationBody>,
) -> Handled<(StatusCode, Json<Value>)> {
    let invited = input.invitation.user;
    let mut store = db.write().await;
    if store.users.values().any(|u| u.username == invited.username) {
        return Err(unprocessable("Login has already been taken"));
    }

    let user_id = store.next_id();
    let mut user = User {
        id: user_id,
        username: invited.username,
        email: invited.email,
        name: String::new(),
        first_name: String::new(),
        last_name: String::new(),
        timezone: invited.timezone,
        admin: invited.admin,
        owner: false,
    };
    user.set_name(invited.name);
    let invitation_id = store.next_id();
    let rendered = json!({"invitation": {
        "id": invitation_id,
        "user_id": user_id,
        "name": user.name,
        "email": user.email,
    }});
    tracing::info!(user_id, username = %user.username, "user invited");
    store.users.insert(user_id, user);
    Ok((StatusCode::CREATED, Json(rendered)))
}
