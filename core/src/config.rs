//! Connection and provider configuration.
//!
//! [`ProviderConfig`] is what the orchestration host hands over: the account
//! name plus credentials that may be left out and picked up from the
//! environment instead. [`ProviderConfig::resolve`] turns it into a complete
//! [`ClientConfig`].

use std::fmt;

use serde::Deserialize;

use crate::error::ApiError;

pub const USERNAME_ENV: &str = "BEANSTALK_USERNAME";
pub const ACCESS_TOKEN_ENV: &str = "BEANSTALK_ACCESS_TOKEN";

/// Fixed connection settings for a [`BeanstalkClient`](crate::BeanstalkClient).
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub account_name: String,
    pub username: String,
    pub access_token: String,
}

impl ClientConfig {
    /// Default API base URL for the account. The account name must be a
    /// single DNS label so the credentials only ever go to beanstalkapp.com.
    pub fn base_url(&self) -> Result<String, ApiError> {
        check_account_name(&self.account_name)?;
        Ok(format!("https://{}.beanstalkapp.com/api/", self.account_name))
    }
}

/// ASCII letters, digits and inner hyphens, at most 63 characters.
fn check_account_name(name: &str) -> Result<(), ApiError> {
    let is_label = !name.is_empty()
        && name.len() <= 63
        && !name.starts_with('-')
        && !name.ends_with('-')
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-');
    if is_label {
        Ok(())
    } else {
        Err(ApiError::Config(format!(
            "account_name {name:?} must be a single host label (letters, digits, '-')"
        )))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("account_name", &self.account_name)
            .field("username", &self.username)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Provider configuration as declared by the operator.
#[derive(Clone, Default, Deserialize)]
pub struct ProviderConfig {
    pub account_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("account_name", &self.account_name)
            .field("username", &self.username)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ProviderConfig {
    /// Fill missing credentials from the process environment.
    pub fn resolve(self) -> Result<ClientConfig, ApiError> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Fill missing credentials through `lookup`, then require every value.
    pub fn resolve_with<F>(self, lookup: F) -> Result<ClientConfig, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let account_name = non_empty(Some(self.account_name))
            .ok_or_else(|| ApiError::Config("account_name is required".to_owned()))?;
        check_account_name(&account_name)?;
        let username = non_empty(self.username)
            .or_else(|| non_empty(lookup(USERNAME_ENV)))
            .ok_or_else(|| ApiError::Config(format!("username is required (or set {USERNAME_ENV})")))?;
        let access_token = non_empty(self.access_token)
            .or_else(|| non_empty(lookup(ACCESS_TOKEN_ENV)))
            .ok_or_else(|| {
                ApiError::Config(format!("access_token is required (or set {ACCESS_TOKEN_ENV})"))
            })?;

        Ok(ClientConfig {
            account_name,
            username,
            access_token,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
