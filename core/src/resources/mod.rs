//! Resource adapters.
//!
//! Each adapter binds a declared resource type to the endpoints that manage
//! it. Operations take the client explicitly; nothing is looked up from an
//! ambient context.

mod code_review;
mod integration;
mod integration_kinds;
mod repository;
mod team;
mod user;

pub use code_review::{CodeReviewSettings, RepositoryCodeReview, RepositoryCodeReviewConfig, RepositoryCodeReviewState};
pub use integration::{Integration, IntegrationConfig, IntegrationKind, IntegrationState};
pub use integration_kinds::{
    HipchatIntegration, JiraIntegration, ModularWebhookIntegration, WebhookTriggers,
};
pub use repository::{Repository, RepositoryConfig, RepositoryState};
pub use team::{RepositoryPermission, Team, TeamConfig, TeamState};
pub use user::{User, UserConfig, UserState, USER_PAGE_LIMIT, USER_PAGE_SIZE};

use crate::client::BeanstalkClient;
use crate::error::ApiError;
use crate::transport::Transport;

/// Lifecycle of one declared resource type.
///
/// `Config` is what the operator declares; `State` is what gets recorded
/// after an operation, including identity and computed attributes.
pub trait Resource {
    const TYPE_NAME: &'static str;

    type Config;
    type State;

    fn create<T: Transport>(
        client: &BeanstalkClient<T>,
        config: &Self::Config,
    ) -> Result<Self::State, ApiError>;

    /// Current remote state, or `None` when the resource no longer exists.
    fn read<T: Transport>(
        client: &BeanstalkClient<T>,
        state: &Self::State,
    ) -> Result<Option<Self::State>, ApiError>;

    fn update<T: Transport>(
        client: &BeanstalkClient<T>,
        prior: &Self::State,
        config: &Self::Config,
    ) -> Result<Self::State, ApiError>;

    fn delete<T: Transport>(client: &BeanstalkClient<T>, state: &Self::State) -> Result<(), ApiError>;
}

/// Map the not-found signal to `None`, logging that the resource is gone.
pub(crate) fn gone_if_not_found<R>(
    result: Result<R, ApiError>,
    type_name: &str,
    id: &str,
) -> Result<Option<R>, ApiError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ApiError::NotFound) => {
            tracing::info!(resource = type_name, %id, "resource no longer exists remotely");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
