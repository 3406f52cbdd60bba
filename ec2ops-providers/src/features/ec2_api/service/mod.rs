use crate::features::ec2_api::repo::{ApiResponse, Ec2ApiRepository};
use chrono::{DateTime, Utc};
use ec2ops_core::{CoreError, Instance, InstanceState, Result, StateTransition, NAME_TAG};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

pub const API_VERSION: &str = "2016-11-15";

/// One `Filter.N` entry of a DescribeInstances call.
#[derive(Debug, Clone)]
pub struct Filter {
    pub name: String,
    pub values: Vec<String>,
}

impl Filter {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn states(states: &[InstanceState]) -> Self {
        Self::new(
            "instance-state-name",
            states.iter().map(|s| s.as_str().to_string()).collect(),
        )
    }

    pub fn name_tag(name: &str) -> Self {
        Self::new(format!("tag:{NAME_TAG}"), vec![name.to_string()])
    }
}

/// Builds Query API calls and decodes their XML replies.
pub struct Ec2ApiService {
    repo: Arc<dyn Ec2ApiRepository>,
}

impl Ec2ApiService {
    pub fn new(repo: Arc<dyn Ec2ApiRepository>) -> Self {
        Self { repo }
    }

    /// DescribeInstances, following `nextToken` until the last page.
    pub async fn describe_instances(
        &self,
        filters: &[Filter],
        instance_ids: &[&str],
    ) -> Result<Vec<Instance>> {
        let mut instances = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut params = base_params("DescribeInstances");
            for (i, filter) in filters.iter().enumerate() {
                params.push((format!("Filter.{}.Name", i + 1), filter.name.clone()));
                for (j, value) in filter.values.iter().enumerate() {
                    params.push((format!("Filter.{}.Value.{}", i + 1, j + 1), value.clone()));
                }
            }
            for (i, instance_id) in instance_ids.iter().enumerate() {
                params.push((format!("InstanceId.{}", i + 1), instance_id.to_string()));
            }
            if let Some(token) = &next_token {
                params.push(("NextToken".to_string(), token.clone()));
            }

            let page: DescribeInstancesResponse = self.send(&params).await?;
            instances.extend(
                page.reservation_set
                    .items
                    .into_iter()
                    .flat_map(|reservation| reservation.instances_set.items)
                    .map(Ec2Instance::into_instance),
            );

            match page.next_token.filter(|token| !token.is_empty()) {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        Ok(instances)
    }

    /// StartInstances or StopInstances for a single instance.
    pub async fn change_state(&self, action: &str, instance_id: &str) -> Result<StateTransition> {
        let mut params = base_params(action);
        params.push(("InstanceId.1".to_string(), instance_id.to_string()));

        let response: StateChangeResponse = self.send(&params).await?;
        let change = response
            .instances_set
            .items
            .into_iter()
            .find(|change| change.instance_id == instance_id)
            .ok_or_else(|| {
                CoreError::SerializationError(format!(
                    "{action} response did not mention instance {instance_id}"
                ))
            })?;

        Ok(StateTransition {
            instance_id: change.instance_id,
            previous: InstanceState::parse(&change.previous_state.name),
            current: InstanceState::parse(&change.current_state.name),
        })
    }

    async fn send<T: DeserializeOwned>(&self, params: &[(String, String)]) -> Result<T> {
        let response = self.repo.call(params).await?;
        if !response.is_success() {
            return Err(decode_error(&response));
        }
        quick_xml::de::from_str(&response.body)
            .map_err(|e| CoreError::SerializationError(format!("invalid EC2 response: {e}")))
    }
}

fn base_params(action: &str) -> Vec<(String, String)> {
    vec![
        ("Action".to_string(), action.to_string()),
        ("Version".to_string(), API_VERSION.to_string()),
    ]
}

fn decode_error(response: &ApiResponse) -> CoreError {
    match quick_xml::de::from_str::<ErrorDocument>(&response.body) {
        Ok(document) => match document.errors.error.into_iter().next() {
            Some(error) => CoreError::api(error.code, error.message),
            None => CoreError::api(format!("HTTP{}", response.status), "empty error document"),
        },
        Err(_) => {
            let excerpt: String = response.body.chars().take(200).collect();
            CoreError::api(format!("HTTP{}", response.status), excerpt)
        }
    }
}

#[derive(Debug, Deserialize)]
struct ItemSet<T> {
    #[serde(rename = "item", default = "Vec::new")]
    items: Vec<T>,
}

impl<T> Default for ItemSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeInstancesResponse {
    #[serde(default)]
    reservation_set: ItemSet<Reservation>,
    #[serde(default)]
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Reservation {
    #[serde(default)]
    instances_set: ItemSet<Ec2Instance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ec2Instance {
    instance_id: String,
    instance_state: StateName,
    #[serde(default)]
    instance_type: String,
    #[serde(default)]
    private_ip_address: Option<String>,
    #[serde(default)]
    ip_address: Option<String>,
    #[serde(default)]
    launch_time: Option<String>,
    #[serde(default)]
    tag_set: ItemSet<Tag>,
}

impl Ec2Instance {
    fn into_instance(self) -> Instance {
        let name_tag = self
            .tag_set
            .items
            .into_iter()
            .find(|tag| tag.key == NAME_TAG)
            .map(|tag| tag.value);
        let launch_time = self
            .launch_time
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|time| time.with_timezone(&Utc));

        let instance = Instance::new(
            self.instance_id,
            name_tag,
            InstanceState::parse(&self.instance_state.name),
            self.instance_type,
        )
        .with_addresses(self.private_ip_address, self.ip_address);

        match launch_time {
            Some(time) => instance.with_launch_time(time),
            None => instance,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StateName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Tag {
    key: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateChangeResponse {
    #[serde(default)]
    instances_set: ItemSet<StateChange>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateChange {
    instance_id: String,
    current_state: StateName,
    previous_state: StateName,
}

#[derive(Debug, Deserialize)]
struct ErrorDocument {
    #[serde(rename = "Errors")]
    errors: ErrorList,
}

#[derive(Debug, Deserialize)]
struct ErrorList {
    #[serde(rename = "Error", default = "Vec::new")]
    error: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Message", default)]
    message: String,
}
