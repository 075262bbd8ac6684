//! `beanstalk_team`.

use std::collections::{BTreeMap, BTreeSet};

use crate::client::BeanstalkClient;
use crate::error::ApiError;
use crate::resources::{gone_if_not_found, Resource};
use crate::transport::Transport;
use crate::types::{TeamPermissionWrite, TeamRecord, TeamWrap, TeamWrite};

pub struct Team;

/// Access a team has to one repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RepositoryPermission {
    pub repository_id: i64,
    pub can_write: bool,
    pub can_deploy: bool,
    pub can_configure_deployments: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamConfig {
    pub name: String,
    pub color_label: String,
    pub user_ids: BTreeSet<i64>,
    pub repository_permissions: BTreeSet<RepositoryPermission>,
}

impl TeamConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            color_label: "white".to_owned(),
            user_ids: BTreeSet::new(),
            repository_permissions: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamState {
    pub id: String,
    pub attributes: TeamConfig,
    /// Computed title of each repository the team has permissions on.
    pub repository_titles: BTreeMap<i64, String>,
}

impl From<&TeamConfig> for TeamWrite {
    fn from(config: &TeamConfig) -> Self {
        TeamWrite {
            name: config.name.clone(),
            color_label: config.color_label.clone(),
            users: config.user_ids.iter().copied().collect(),
            permissions: config
                .repository_permissions
                .iter()
                .map(|p| {
                    (
                        p.repository_id.to_string(),
                        TeamPermissionWrite {
                            write: p.can_write,
                            deploy: p.can_deploy,
                            configure_deployments: p.can_configure_deployments,
                        },
                    )
                })
                .collect(),
        }
    }
}

impl From<TeamRecord> for TeamState {
    fn from(team: TeamRecord) -> Self {
        let repository_titles = team
            .permissions
            .iter()
            .map(|p| (p.repository_id, p.repository_title.clone()))
            .collect();
        TeamState {
            id: team.id.to_string(),
            attributes: TeamConfig {
                name: team.name,
                color_label: team.color_label,
                user_ids: team.users.iter().map(|u| u.id).collect(),
                repository_permissions: team
                    .permissions
                    .iter()
                    .map(|p| RepositoryPermission {
                        repository_id: p.repository_id,
                        can_write: p.write,
                        can_deploy: p.deploy,
                        can_configure_deployments: p.configure_deployments,
                    })
                    .collect(),
            },
            repository_titles,
        }
    }
}

impl Resource for Team {
    const TYPE_NAME: &'static str = "beanstalk_team";

    type Config = TeamConfig;
    type State = TeamState;

    fn create<T: Transport>(
        client: &BeanstalkClient<T>,
        config: &Self::Config,
    ) -> Result<Self::State, ApiError> {
        let created: TeamWrap = client.post(&["teams"], &TeamWrite::from(config))?;
        tracing::info!(id = created.team.id, name = %config.name, "created team");
        Ok(created.team.into())
    }

    fn read<T: Transport>(
        client: &BeanstalkClient<T>,
        state: &Self::State,
    ) -> Result<Option<Self::State>, ApiError> {
        let fetched = client.get::<TeamWrap>(&["teams", &state.id], &[]);
        Ok(gone_if_not_found(fetched, Self::TYPE_NAME, &state.id)?.map(|wrap| wrap.team.into()))
    }

    fn update<T: Transport>(
        client: &BeanstalkClient<T>,
        prior: &Self::State,
        config: &Self::Config,
    ) -> Result<Self::State, ApiError> {
        let updated: TeamWrap = client.put_returning(&["teams", &prior.id], &TeamWrite::from(config))?;
        Ok(updated.team.into())
    }

    fn delete<T: Transport>(client: &BeanstalkClient<T>, state: &Self::State) -> Result<(), ApiError> {
        client.delete(&["teams", &state.id])
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn record_converts_to_state() {
        let record: TeamWrap = serde_json::from_value(json!({
            "team": {
                "id": 9,
                "name": "ops",
                "color_label": "red",
                "users": [{"id": 1, "username": "a"}, {"id": 2, "username": "b"}],
                "permissions": [{
                    "repository_id": 42,
                    "repository_title": "Demo",
                    "write": true,
                    "deploy": false,
                    "configure_deployments": true
                }]
            }
        }))
        .unwrap();
        let state = TeamState::from(record.team);
        assert_eq!(state.id, "9");
        assert_eq!(state.attributes.user_ids, BTreeSet::from([1, 2]));
        assert_eq!(
            state.attributes.repository_permissions,
            BTreeSet::from([RepositoryPermission {
                repository_id: 42,
                can_write: true,
                can_deploy: false,
                can_configure_deployments: true,
            }])
        );
        assert_eq!(state.repository_titles.get(&42).map(String::as_str), Some("Demo"));
    }

    #[test]
    fn config_converts_to_write_shape() {
        let mut config = TeamConfig::new("ops");
        config.user_ids.extend([3, 1]);
        config.repository_permissions.insert(RepositoryPermission {
            repository_id: 42,
            can_deploy: true,
            ..Default::default()
        });
        let body = serde_json::to_value(TeamWrite::from(&config)).unwrap();
        assert_eq!(body["users"], json!([1, 3]));
        assert_eq!(
            body["permissions"],
            json!({"42": {"write": false, "deploy": true, "configure_deployments": false}})
        );
    }
}
