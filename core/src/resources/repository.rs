//! `beanstalk_repository`.
//!
//! Renaming has its own endpoint and must be issued before the general
//! update, which does not accept `name`. Repositories cannot be deleted
//! through the API.

use crate::client::BeanstalkClient;
use crate::error::ApiError;
use crate::resources::code_review::{self, CodeReviewSettings};
use crate::resources::{gone_if_not_found, Resource};
use crate::transport::Transport;
use crate::types::{
    CreateRepository, RenameRepository, RepositoryRecord, RepositoryWrap, UpdateRepository,
};

pub struct Repository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub title: String,
    pub name: String,
    pub color_label: String,
    pub default_git_branch: String,
    /// Forces replacement when changed.
    pub vcs: String,
    /// Forces replacement when changed. Never read back.
    pub create_svn_structure: bool,
    pub code_review: CodeReviewSettings,
}

impl RepositoryConfig {
    /// A git repository with the service defaults for everything optional.
    pub fn new(title: &str, name: &str) -> Self {
        Self {
            title: title.to_owned(),
            name: name.to_owned(),
            color_label: "white".to_owned(),
            default_git_branch: "master".to_owned(),
            vcs: "git".to_owned(),
            create_svn_structure: false,
            code_review: CodeReviewSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryState {
    pub id: String,
    pub url: String,
    pub attributes: RepositoryConfig,
}

impl Repository {
    pub fn requires_replacement(prior: &RepositoryState, config: &RepositoryConfig) -> bool {
        prior.attributes.vcs != config.vcs
            || prior.attributes.create_svn_structure != config.create_svn_structure
    }

    fn rename<T: Transport>(client: &BeanstalkClient<T>, id: &str, name: &str) -> Result<(), ApiError> {
        tracing::info!(%id, %name, "renaming repository");
        client.put(
            &["repositories", id, "rename"],
            &RepositoryWrap {
                repository: RenameRepository {
                    name: name.to_owned(),
                },
            },
        )
    }

    /// Everything but the name: code review settings, the general update and
    /// the read-back.
    fn apply_settings<T: Transport>(
        client: &BeanstalkClient<T>,
        prior: &RepositoryState,
        config: &RepositoryConfig,
    ) -> Result<RepositoryState, ApiError> {
        let id = prior.id.as_str();
        code_review::store(client, id, &config.code_review)?;

        client.put(
            &["repositories", id],
            &RepositoryWrap {
                repository: UpdateRepository {
                    title: config.title.clone(),
                    color_label: config.color_label.clone(),
                    default_branch: config.default_git_branch.clone(),
                },
            },
        )?;

        let expected = RepositoryState {
            id: prior.id.clone(),
            url: prior.url.clone(),
            attributes: config.clone(),
        };
        Self::read(client, &expected)?.ok_or(ApiError::NotFound)
    }
}

impl Resource for Repository {
    const TYPE_NAME: &'static str = "beanstalk_repository";

    type Config = RepositoryConfig;
    type State = RepositoryState;

    /// Creation only accepts title, name and VCS settings; everything else is
    /// applied by the update path right after. A failure past the POST comes
    /// back as `PartiallyApplied` carrying the new repository id.
    fn create<T: Transport>(
        client: &BeanstalkClient<T>,
        config: &Self::Config,
    ) -> Result<Self::State, ApiError> {
        let request = CreateRepository {
            title: config.title.clone(),
            name: config.name.clone(),
            type_id: config.vcs.clone(),
            create_structure: config.create_svn_structure,
        };
        let created: RepositoryWrap<RepositoryRecord> = client.post(&["repositories"], &request)?;

        let id = created.repository.id.to_string();
        tracing::info!(%id, name = %config.name, "created repository");

        let adopted = RepositoryState {
            id,
            url: created.repository.repository_url,
            attributes: config.clone(),
        };
        Self::update(client, &adopted, config)
            .map_err(|e| ApiError::partially_applied(Self::TYPE_NAME, &adopted.id, e))
    }

    fn read<T: Transport>(
        client: &BeanstalkClient<T>,
        state: &Self::State,
    ) -> Result<Option<Self::State>, ApiError> {
        let fetched = client.get::<RepositoryWrap<RepositoryRecord>>(&["repositories", &state.id], &[]);
        let Some(RepositoryWrap { repository }) = gone_if_not_found(fetched, Self::TYPE_NAME, &state.id)? else {
            return Ok(None);
        };

        let code_review = code_review::fetch(client, &state.id)?;

        Ok(Some(RepositoryState {
            id: repository.id.to_string(),
            url: repository.repository_url,
            attributes: RepositoryConfig {
                title: repository.title,
                name: repository.name,
                color_label: repository.color_label,
                default_git_branch: repository.default_branch,
                vcs: repository.vcs,
                create_svn_structure: state.attributes.create_svn_structure,
                code_review,
            },
        }))
    }

    fn update<T: Transport>(
        client: &BeanstalkClient<T>,
        prior: &Self::State,
        config: &Self::Config,
    ) -> Result<Self::State, ApiError> {
        let renamed = prior.attributes.name != config.name;
        if renamed {
            Self::rename(client, &prior.id, &config.name)?;
        }

        Self::apply_settings(client, prior, config).map_err(|e| {
            if renamed {
                ApiError::partially_applied(Self::TYPE_NAME, &prior.id, e)
            } else {
                e
            }
        })
    }

    fn delete<T: Transport>(_client: &BeanstalkClient<T>, state: &Self::State) -> Result<(), ApiError> {
        Err(ApiError::Unsupported(format!(
            "Beanstalk does not allow repositories to be deleted via its API. Delete repository {} \
             via the web UI, then refresh state so it is recorded as gone.",
            state.id
        )))
    }
}
