//! Records held by the mock account and their JSON renderings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Integration settings the service accepts but never echoes back.
pub const SECRET_SETTINGS: &[&str] = &["service_access_token", "service_login", "service_password"];

pub const INTEGRATION_TYPES: &[&str] = &[
    "HipchatIntegration",
    "JiraIntegration",
    "ModularWebHooksIntegration",
];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Repository {
    pub id: i64,
    pub title: String,
    pub name: String,
    pub color_label: String,
    pub default_branch: String,
    pub vcs: String,
    pub repository_url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeReview {
    pub unanimous_approval: bool,
    pub auto_reopen: bool,
    pub assignee_ids: Vec<i64>,
    pub watcher_user_ids: Vec<i64>,
    pub watcher_team_ids: Vec<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub timezone: String,
    pub admin: bool,
    pub owner: bool,
}

impl User {
    pub fn set_name(&mut self, name: String) {
        let (first, last) = name.split_once(' ').unwrap_or((name.as_str(), ""));
        self.first_name = first.to_owned();
        self.last_name = last.to_owned();
        self.name = name;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    #[serde(default)]
    pub write: bool,
    #[serde(default)]
    pub deploy: bool,
    #[serde(default)]
    pub configure_deployments: bool,
}

#[derive(Clone, Debug)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub color_label: String,
    pub user_ids: Vec<i64>,
    pub permissions: BTreeMap<i64, Permission>,
}

#[derive(Clone, Debug)]
pub struct Integration {
    pub id: i64,
    pub repository_id: i64,
    pub kind: String,
    pub settings: Map<String, Value>,
}

/// Everything the mock account holds. Ids come from one shared counter.
#[derive(Debug, Default)]
pub struct Store {
    last_id: i64,
    pub repositories: BTreeMap<i64, Repository>,
    pub code_reviews: BTreeMap<i64, CodeReview>,
    pub users: BTreeMap<i64, User>,
    pub teams: BTreeMap<i64, Team>,
    pub integrations: BTreeMap<i64, Integration>,
}

impl Store {
    /// An account holding only its owner.
    pub fn seeded() -> Self {
        let mut store = Store::default();
        let id = store.next_id();
        let mut owner = User {
            id,
            username: "owner".to_owned(),
            email: "owner@example.com".to_owned(),
            name: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            timezone: "London".to_owned(),
            admin: true,
            owner: true,
        };
        owner.set_name("Account Owner".to_owned());
        store.users.insert(id, owner);
        store
    }

    pub fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    pub fn render_code_review(&self, settings: &CodeReview) -> Value {
        let user = |id: &i64| {
            self.users.get(id).map(|u| {
                json!({"id": u.id, "type": "User", "name": u.name, "login": u.username, "email": u.email})
            })
        };
        let team = |id: &i64| {
            self.teams
                .get(id)
                .map(|t| json!({"id": t.id, "type": "Team", "name": t.name}))
        };
        let assignees: Vec<Value> = settings.assignee_ids.iter().filter_map(|id| user(id)).collect();
        let watchers: Vec<Value> = settings
            .watcher_user_ids
            .iter()
            .filter_map(|id| user(id))
            .chain(settings.watcher_team_ids.iter().filter_map(|id| team(id)))
            .collect();
        json!({
            "unanimous_approval": settings.unanimous_approval,
            "auto_reopen": settings.auto_reopen,
            "default_assignees": assignees,
            "default_watchers": watchers,
        })
    }

    pub fn render_team(&self, team: &Team) -> Value {
        let users: Vec<&User> = team.user_ids.iter().filter_map(|id| self.users.get(id)).collect();
        let permissions: Vec<Value> = team
            .permissions
            .iter()
            .map(|(repository_id, p)| {
                let title = self
                    .repositories
                    .get(repository_id)
                    .map(|r| r.title.as_str())
                    .unwrap_or_default();
                json!({
                    "repository_id": repository_id,
                    "repository_title": title,
                    "write": p.write,
                    "deploy": p.deploy,
                    "configure_deployments": p.configure_deployments,
                })
            })
            .collect();
        json!({"team": {
            "id": team.id,
            "name": team.name,
            "color_label": team.color_label,
            "users": users,
            "permissions": permissions,
        }})
    }
}

impl Integration {
    /// Stored settings minus secrets, with identity fields attached.
    pub fn render(&self) -> Value {
        let mut body: Map<String, Value> = self
            .settings
            .iter()
            .filter(|(key, _)| !SECRET_SETTINGS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        body.insert("id".to_owned(), json!(self.id));
        body.insert("repository_id".to_owned(), json!(self.repository_id));
        body.insert("type".to_owned(), json!(self.kind));
        json!({"integration": body})
    }
}
