//! `beanstalk_user`.
//!
//! Users are created by inviting them. The invitation response does not
//! carry the user id, so creation finishes with a bounded scan of the user
//! list for the invited username.

use crate::client::BeanstalkClient;
use crate::error::ApiError;
use crate::resources::{gone_if_not_found, Resource};
use crate::transport::Transport;
use crate::types::{
    CreateInvitation, InvitationRecord, InvitationWrap, InvitedUser, UserRecord, UserWrap, UserWrite,
};

/// Users requested per page while scanning.
pub const USER_PAGE_SIZE: usize = 50;
/// Pages scanned before giving up.
pub const USER_PAGE_LIMIT: usize = 20;

pub struct User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserConfig {
    /// Forces replacement when changed.
    pub username: String,
    pub name: String,
    pub email: String,
    pub account_admin: bool,
    pub timezone: String,
}

impl UserConfig {
    pub fn new(username: &str, name: &str, email: &str) -> Self {
        Self {
            username: username.to_owned(),
            name: name.to_owned(),
            email: email.to_owned(),
            account_admin: false,
            timezone: "London".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserState {
    pub id: String,
    pub attributes: UserConfig,
    pub first_name: String,
    pub last_name: String,
    pub account_owner: bool,
}

impl From<UserRecord> for UserState {
    fn from(user: UserRecord) -> Self {
        UserState {
            id: user.id.to_string(),
            attributes: UserConfig {
                username: user.username,
                name: user.name,
                email: user.email,
                account_admin: user.admin,
                timezone: user.timezone,
            },
            first_name: user.first_name,
            last_name: user.last_name,
            account_owner: user.owner,
        }
    }
}

impl User {
    pub fn requires_replacement(prior: &UserState, config: &UserConfig) -> bool {
        prior.attributes.username != config.username
    }

    /// Scan the user list page by page for `username`.
    ///
    /// Stops at the first short page or after [`USER_PAGE_LIMIT`] pages.
    pub fn find_by_username<T: Transport>(
        client: &BeanstalkClient<T>,
        username: &str,
    ) -> Result<Option<UserRecord>, ApiError> {
        let per_page = USER_PAGE_SIZE.to_string();
        for page in 1..=USER_PAGE_LIMIT {
            let page = page.to_string();
            let users: Vec<UserWrap<UserRecord>> =
                client.get(&["users"], &[("page", page.as_str()), ("per_page", per_page.as_str())])?;
            let fetched = users.len();

            if let Some(found) = users.into_iter().map(|w| w.user).find(|u| u.username == username) {
                return Ok(Some(found));
            }
            if fetched < USER_PAGE_SIZE {
                break;
            }
        }
        Ok(None)
    }
}

impl Resource for User {
    const TYPE_NAME: &'static str = "beanstalk_user";

    type Config = UserConfig;
    type State = UserState;

    fn create<T: Transport>(
        client: &BeanstalkClient<T>,
        config: &Self::Config,
    ) -> Result<Self::State, ApiError> {
        let request = InvitationWrap {
            invitation: CreateInvitation {
                user: InvitedUser {
                    username: config.username.clone(),
                    name: config.name.clone(),
                    email: config.email.clone(),
                    admin: config.account_admin,
                    timezone: config.timezone.clone(),
                },
            },
        };
        let invited: InvitationWrap<InvitationRecord> = client.post(&["invitations"], &request)?;
        let invitation = invited.invitation.id.to_string();
        tracing::info!(%invitation, username = %config.username, "invited user");

        let user = Self::find_by_username(client, &config.username)
            .and_then(|found| {
                found.ok_or_else(|| {
                    ApiError::UnexpectedResponse(format!(
                        "invited user {:?} does not appear in the user list",
                        config.username
                    ))
                })
            })
            .map_err(|e| ApiError::partially_applied("invitation", &invitation, e))?;
        Ok(user.into())
    }

    fn read<T: Transport>(
        client: &BeanstalkClient<T>,
        state: &Self::State,
    ) -> Result<Option<Self::State>, ApiError> {
        let fetched = client.get::<UserWrap<UserRecord>>(&["users", &state.id], &[]);
        Ok(gone_if_not_found(fetched, Self::TYPE_NAME, &state.id)?.map(|wrap| wrap.user.into()))
    }

    fn update<T: Transport>(
        client: &BeanstalkClient<T>,
        prior: &Self::State,
        config: &Self::Config,
    ) -> Result<Self::State, ApiError> {
        client.put(
            &["users", &prior.id],
            &UserWrap {
                user: UserWrite {
                    name: config.name.clone(),
                    email: config.email.clone(),
                    admin: config.account_admin,
                    timezone: config.timezone.clone(),
                },
            },
        )?;
        Self::read(client, prior)?.ok_or(ApiError::NotFound)
    }

    fn delete<T: Transport>(client: &BeanstalkClient<T>, state: &Self::State) -> Result<(), ApiError> {
        client.delete(&["users", &state.id])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_converts_to_state() {
        let record = UserRecord {
            id: 5,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            name: "Alice Liddell".to_string(),
            timezone: "London".to_string(),
            admin: true,
            owner: false,
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
        };
        let state = UserState::from(record);
        assert_eq!(state.id, "5");
        assert!(state.attributes.account_admin);
        assert_eq!(state.first_name, "Alice");
    }

    #[test]
    fn username_change_requires_replacement() {
        let state = UserState::from(UserRecord {
            id: 5,
            username: "alice".to_string(),
            ..Default::default()
        });
        assert!(User::requires_replacement(&state, &UserConfig::new("bob", "", "")));
        assert!(!User::requires_replacement(&state, &UserConfig::new("alice", "A", "a@x")));
    }
}
