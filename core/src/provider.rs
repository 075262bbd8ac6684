//! Provider surface: the resource types on offer and client construction
//! from operator configuration.

use crate::client::BeanstalkClient;
use crate::config::ProviderConfig;
use crate::error::ApiError;
use crate::resources::{
    HipchatIntegration, IntegrationKind, JiraIntegration, ModularWebhookIntegration, Repository,
    RepositoryCodeReview, Resource, Team, User,
};
use crate::transport::UreqTransport;

/// Every resource type this provider manages, by declared name.
pub const RESOURCE_TYPES: [&str; 7] = [
    Repository::TYPE_NAME,
    RepositoryCodeReview::TYPE_NAME,
    Team::TYPE_NAME,
    User::TYPE_NAME,
    HipchatIntegration::RESOURCE_TYPE,
    JiraIntegration::RESOURCE_TYPE,
    ModularWebhookIntegration::RESOURCE_TYPE,
];

/// Whether `type_name` is one of [`RESOURCE_TYPES`].
pub fn supports(type_name: &str) -> bool {
    RESOURCE_TYPES.contains(&type_name)
}

/// Resolve credentials and build a client over the blocking HTTP transport.
pub fn configure(config: ProviderConfig) -> Result<BeanstalkClient<UreqTransport>, ApiError> {
    let resolved = config.resolve()?;
    tracing::debug!(account = %resolved.account_name, username = %resolved.username, "configuring provider");
    BeanstalkClient::new(&resolved, UreqTransport::new())
}
