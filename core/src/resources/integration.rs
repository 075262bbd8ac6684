//! Repository integrations.
//!
//! Every integration type shares one adapter: a fixed wire type name and a
//! descriptor slice drive the transformer, and the payload lives under
//! `repositories/{repository_id}/integrations`. Concrete kinds only supply
//! their typed record and its attribute mapping.

use std::marker::PhantomData;

use serde_json::Value;

use crate::client::BeanstalkClient;
use crate::error::ApiError;
use crate::resources::{gone_if_not_found, Resource};
use crate::schema::{decode_fields, encode_fields, Attrs, Field};
use crate::state::{changed_attributes, redact_write_only};
use crate::transport::Transport;
use crate::types::IntegrationWrap;

/// One integration type.
pub trait IntegrationKind: Sized {
    /// Declared resource type name.
    const RESOURCE_TYPE: &'static str;
    /// Value of the `type` discriminator on the wire.
    const WIRE_TYPE: &'static str;
    const FIELDS: &'static [Field];

    fn to_attrs(&self) -> Attrs;
    fn from_attrs(attrs: &Attrs) -> Result<Self, ApiError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationConfig<K> {
    /// Forces replacement when changed.
    pub repository_id: String,
    pub settings: K,
}

/// Recorded integration. Write-only settings hold their hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationState<K> {
    pub id: String,
    pub repository_id: String,
    pub settings: K,
}

pub struct Integration<K>(PhantomData<K>);

impl<K: IntegrationKind> Integration<K> {
    /// Declared attributes that differ from the recorded state.
    pub fn changed_attributes(prior: &IntegrationState<K>, config: &IntegrationConfig<K>) -> Vec<&'static str> {
        changed_attributes(K::FIELDS, &prior.settings.to_attrs(), &config.settings.to_attrs())
    }

    pub fn requires_replacement(prior: &IntegrationState<K>, config: &IntegrationConfig<K>) -> bool {
        prior.repository_id != config.repository_id
            || Self::changed_attributes(prior, config)
                .iter()
                .any(|name| K::FIELDS.iter().any(|f| f.name == *name && f.force_new))
    }

    fn payload(settings: &K) -> IntegrationWrap {
        let mut integration = encode_fields(K::FIELDS, &settings.to_attrs());
        integration.insert("type".to_owned(), Value::from(K::WIRE_TYPE));
        IntegrationWrap { integration }
    }

    fn recorded(settings: &K) -> Result<K, ApiError> {
        K::from_attrs(&redact_write_only(K::FIELDS, &settings.to_attrs()))
    }
}

impl<K: IntegrationKind> Resource for Integration<K> {
    const TYPE_NAME: &'static str = K::RESOURCE_TYPE;

    type Config = IntegrationConfig<K>;
    type State = IntegrationState<K>;

    fn create<T: Transport>(
        client: &BeanstalkClient<T>,
        config: &Self::Config,
    ) -> Result<Self::State, ApiError> {
        let created: IntegrationWrap = client.post(
            &["repositories", &config.repository_id, "integrations"],
            &Self::payload(&config.settings),
        )?;
        let id = created
            .integration
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| ApiError::UnexpectedResponse("integration response carries no id".to_owned()))?;
        tracing::info!(id, kind = K::WIRE_TYPE, repository = %config.repository_id, "created integration");

        Ok(IntegrationState {
            id: id.to_string(),
            repository_id: config.repository_id.clone(),
            settings: Self::recorded(&config.settings)?,
        })
    }

    /// Write-only settings are never taken from the response.
    fn read<T: Transport>(
        client: &BeanstalkClient<T>,
        state: &Self::State,
    ) -> Result<Option<Self::State>, ApiError> {
        let fetched = client.get::<IntegrationWrap>(
            &["repositories", &state.repository_id, "integrations", &state.id],
            &[],
        );
        let Some(IntegrationWrap { integration }) = gone_if_not_found(fetched, Self::TYPE_NAME, &state.id)? else {
            return Ok(None);
        };

        let decoded = decode_fields(K::FIELDS, &integration)?;
        let mut attrs = state.settings.to_attrs();
        for field in K::FIELDS.iter().filter(|f| !f.write_only) {
            if let Some(value) = decoded.get(field.name) {
                attrs.set(field.name, value.clone());
            }
        }

        Ok(Some(IntegrationState {
            id: state.id.clone(),
            repository_id: state.repository_id.clone(),
            settings: K::from_attrs(&attrs)?,
        }))
    }

    fn update<T: Transport>(
        client: &BeanstalkClient<T>,
        prior: &Self::State,
        config: &Self::Config,
    ) -> Result<Self::State, ApiError> {
        client.put(
            &["repositories", &prior.repository_id, "integrations", &prior.id],
            &Self::payload(&config.settings),
        )?;
        Ok(IntegrationState {
            id: prior.id.clone(),
            repository_id: prior.repository_id.clone(),
            settings: Self::recorded(&config.settings)?,
        })
    }

    fn delete<T: Transport>(client: &BeanstalkClient<T>, state: &Self::State) -> Result<(), ApiError> {
        client.delete(&["repositories", &state.repository_id, "integrations", &state.id])
    }
}
