//! Repository code-review settings.
//!
//! Used both embedded in the repository resource and as a standalone
//! resource. The settings endpoint hangs directly off the API root:
//! `{repository_id}/code_reviews/settings.json`.
//!
//! Reads and writes name the assignee list differently. Reads return
//! `default_assignees` as participant objects; writes send plain ids under
//! `default_assignees_user_ids`, matching the two watcher id lists.

use crate::client::BeanstalkClient;
use crate::error::ApiError;
use crate::resources::{gone_if_not_found, Resource};
use crate::transport::Transport;
use crate::types::{CodeReviewSettingsRecord, CodeReviewSettingsWrite};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeReviewSettings {
    pub unanimous_approval: bool,
    pub auto_reopen: bool,
    pub default_assignee_user_ids: Vec<i64>,
    pub default_watching_user_ids: Vec<i64>,
    pub default_watching_team_ids: Vec<i64>,
}

impl From<CodeReviewSettingsRecord> for CodeReviewSettings {
    fn from(record: CodeReviewSettingsRecord) -> Self {
        let mut settings = CodeReviewSettings {
            unanimous_approval: record.unanimous_approval,
            auto_reopen: record.auto_reopen,
            default_assignee_user_ids: record.default_assignees.iter().map(|a| a.id).collect(),
            ..Default::default()
        };
        for watcher in record.default_watchers {
            match watcher.kind.as_str() {
                "User" => settings.default_watching_user_ids.push(watcher.id),
                "Team" => settings.default_watching_team_ids.push(watcher.id),
                other => tracing::warn!(kind = other, id = watcher.id, "ignored watcher of unknown type"),
            }
        }
        settings
    }
}

impl From<&CodeReviewSettings> for CodeReviewSettingsWrite {
    fn from(settings: &CodeReviewSettings) -> Self {
        CodeReviewSettingsWrite {
            unanimous_approval: settings.unanimous_approval,
            auto_reopen: settings.auto_reopen,
            default_assignees_user_ids: settings.default_assignee_user_ids.clone(),
            default_watchers_user_ids: settings.default_watching_user_ids.clone(),
            default_watchers_team_ids: settings.default_watching_team_ids.clone(),
        }
    }
}

pub(crate) fn fetch<T: Transport>(
    client: &BeanstalkClient<T>,
    repository_id: &str,
) -> Result<CodeReviewSettings, ApiError> {
    let record: CodeReviewSettingsRecord =
        client.get(&[repository_id, "code_reviews", "settings"], &[])?;
    Ok(record.into())
}

pub(crate) fn store<T: Transport>(
    client: &BeanstalkClient<T>,
    repository_id: &str,
    settings: &CodeReviewSettings,
) -> Result<(), ApiError> {
    client.put(
        &[repository_id, "code_reviews", "settings"],
        &CodeReviewSettingsWrite::from(settings),
    )
}

/// `beanstalk_repository_code_review_settings`: the settings of an existing
/// repository, managed on their own. Identity is the repository id.
pub struct RepositoryCodeReview;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryCodeReviewConfig {
    pub repository_id: i64,
    pub settings: CodeReviewSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryCodeReviewState {
    pub id: String,
    pub repository_id: i64,
    pub settings: CodeReviewSettings,
}

impl Resource for RepositoryCodeReview {
    const TYPE_NAME: &'static str = "beanstalk_repository_code_review_settings";

    type Config = RepositoryCodeReviewConfig;
    type State = RepositoryCodeReviewState;

    fn create<T: Transport>(
        client: &BeanstalkClient<T>,
        config: &Self::Config,
    ) -> Result<Self::State, ApiError> {
        let adopted = RepositoryCodeReviewState {
            id: config.repository_id.to_string(),
            repository_id: config.repository_id,
            settings: CodeReviewSettings::default(),
        };
        Self::update(client, &adopted, config)
    }

    fn read<T: Transport>(
        client: &BeanstalkClient<T>,
        state: &Self::State,
    ) -> Result<Option<Self::State>, ApiError> {
        let settings = gone_if_not_found(fetch(client, &state.id), Self::TYPE_NAME, &state.id)?;
        Ok(settings.map(|settings| RepositoryCodeReviewState {
            settings,
            ..state.clone()
        }))
    }

    fn update<T: Transport>(
        client: &BeanstalkClient<T>,
        prior: &Self::State,
        config: &Self::Config,
    ) -> Result<Self::State, ApiError> {
        store(client, &prior.id, &config.settings)?;
        Ok(RepositoryCodeReviewState {
            id: prior.id.clone(),
            repository_id: config.repository_id,
            settings: config.settings.clone(),
        })
    }

    /// The settings cannot be removed, only left unmanaged.
    fn delete<T: Transport>(_client: &BeanstalkClient<T>, state: &Self::State) -> Result<(), ApiError> {
        tracing::debug!(id = %state.id, "code review settings released; no remote call");
        Ok(())
    }
}
