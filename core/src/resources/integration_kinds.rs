//! The concrete integration types.

use crate::error::ApiError;
use crate::resources::integration::IntegrationKind;
use crate::schema::{Attrs, Field, FieldKind};

/// Room notifications in HipChat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HipchatIntegration {
    pub service_access_token: String,
    pub service_room_name: String,
    pub listen_commits: bool,
    pub listen_deployments: bool,
}

impl IntegrationKind for HipchatIntegration {
    const RESOURCE_TYPE: &'static str = "beanstalk_hipchat_integration";
    const WIRE_TYPE: &'static str = "HipchatIntegration";
    const FIELDS: &'static [Field] = &[
        Field::required("service_access_token", FieldKind::String).write_only(),
        Field::required("service_room_name", FieldKind::String),
        Field::optional("listen_commits", FieldKind::Bool),
        Field::optional("listen_deployments", FieldKind::Bool),
    ];

    fn to_attrs(&self) -> Attrs {
        Attrs::new()
            .with("service_access_token", self.service_access_token.as_str())
            .with("service_room_name", self.service_room_name.as_str())
            .with("listen_commits", self.listen_commits)
            .with("listen_deployments", self.listen_deployments)
    }

    fn from_attrs(attrs: &Attrs) -> Result<Self, ApiError> {
        Ok(Self {
            service_access_token: attrs.string("service_access_token")?,
            service_room_name: attrs.string("service_room_name")?,
            listen_commits: attrs.flag("listen_commits")?,
            listen_deployments: attrs.flag("listen_deployments")?,
        })
    }
}

/// Links commits to JIRA issues.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JiraIntegration {
    pub service_url: String,
    pub service_login: String,
    pub service_password: String,
    pub service_project_name: String,
}

impl IntegrationKind for JiraIntegration {
    const RESOURCE_TYPE: &'static str = "beanstalk_jira_integration";
    const WIRE_TYPE: &'static str = "JiraIntegration";
    const FIELDS: &'static [Field] = &[
        Field::required("service_url", FieldKind::String).force_new(),
        Field::required("service_login", FieldKind::String).write_only().force_new(),
        Field::required("service_password", FieldKind::String).write_only().force_new(),
        Field::required("service_project_name", FieldKind::String),
    ];

    fn to_attrs(&self) -> Attrs {
        Attrs::new()
            .with("service_url", self.service_url.as_str())
            .with("service_login", self.service_login.as_str())
            .with("service_password", self.service_password.as_str())
            .with("service_project_name", self.service_project_name.as_str())
    }

    fn from_attrs(attrs: &Attrs) -> Result<Self, ApiError> {
        Ok(Self {
            service_url: attrs.string("service_url")?,
            service_login: attrs.string("service_login")?,
            service_password: attrs.string("service_password")?,
            service_project_name: attrs.string("service_project_name")?,
        })
    }
}

/// Events a modular webhook fires on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WebhookTriggers {
    pub commit: bool,
    pub push: bool,
    pub deploy: bool,
    pub comment: bool,
    pub create_branch: bool,
    pub delete_branch: bool,
    pub create_tag: bool,
    pub delete_tag: bool,
}

const TRIGGER_FIELDS: &[Field] = &[
    Field::optional("commit", FieldKind::Bool),
    Field::optional("push", FieldKind::Bool),
    Field::optional("deploy", FieldKind::Bool),
    Field::optional("comment", FieldKind::Bool),
    Field::optional("create_branch", FieldKind::Bool),
    Field::optional("delete_branch", FieldKind::Bool),
    Field::optional("create_tag", FieldKind::Bool),
    Field::optional("delete_tag", FieldKind::Bool),
];

impl WebhookTriggers {
    fn to_attrs(self) -> Attrs {
        Attrs::new()
            .with("commit", self.commit)
            .with("push", self.push)
            .with("deploy", self.deploy)
            .with("comment", self.comment)
            .with("create_branch", self.create_branch)
            .with("delete_branch", self.delete_branch)
            .with("create_tag", self.create_tag)
            .with("delete_tag", self.delete_tag)
    }

    fn from_attrs(attrs: &Attrs) -> Result<Self, ApiError> {
        Ok(Self {
            commit: attrs.flag("commit")?,
            push: attrs.flag("push")?,
            deploy: attrs.flag("deploy")?,
            comment: attrs.flag("comment")?,
            create_branch: attrs.flag("create_branch")?,
            delete_branch: attrs.flag("delete_branch")?,
            create_tag: attrs.flag("create_tag")?,
            delete_tag: attrs.flag("delete_tag")?,
        })
    }
}

/// A webhook posting to `service_url` for the selected triggers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModularWebhookIntegration {
    pub name: String,
    pub service_url: String,
    pub triggers: WebhookTriggers,
}

impl IntegrationKind for ModularWebhookIntegration {
    const RESOURCE_TYPE: &'static str = "beanstalk_modular_webhook_integration";
    const WIRE_TYPE: &'static str = "ModularWebHooksIntegration";
    const FIELDS: &'static [Field] = &[
        Field::required("name", FieldKind::String),
        Field::required("service_url", FieldKind::String),
        Field::required("triggers", FieldKind::Block(TRIGGER_FIELDS)),
    ];

    fn to_attrs(&self) -> Attrs {
        Attrs::new()
            .with("name", self.name.as_str())
            .with("service_url", self.service_url.as_str())
            .with("triggers", self.triggers.to_attrs())
    }

    fn from_attrs(attrs: &Attrs) -> Result<Self, ApiError> {
        Ok(Self {
            name: attrs.string("name")?,
            service_url: attrs.string("service_url")?,
            triggers: WebhookTriggers::from_attrs(attrs.block("triggers")?)?,
        })
    }
}
