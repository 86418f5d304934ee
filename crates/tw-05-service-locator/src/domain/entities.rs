//! # Directory Entities

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One registered service instance as returned by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstance {
    pub instance_id: String,
    #[serde(default)]
    pub version: String,
    pub endpoint_uri: String,
}

/// `searchService` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchFilter {
    pub query: SearchParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParameters {
    pub instance_id: String,
}

impl SearchFilter {
    pub fn for_instance(instance_id: &str) -> Self {
        Self {
            query: SearchParameters {
                instance_id: instance_id.to_string(),
            },
        }
    }
}

/// `searchService` response body. Directories answer either with a bare list
/// or with the list wrapped in `searchServiceResult`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    List(Vec<ServiceInstance>),
    #[serde(rename_all = "camelCase")]
    Wrapped {
        #[serde(default)]
        search_service_result: Vec<ServiceInstance>,
    },
}

impl SearchResponse {
    pub fn into_instances(self) -> Vec<ServiceInstance> {
        match self {
            Self::List(list) => list,
            Self::Wrapped {
                search_service_result,
            } => search_service_result,
        }
    }
}

/// Compare dotted versions segment by segment. Numeric segments compare as
/// numbers, anything else lexically; missing segments count as `0`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left: Vec<&str> = a.trim().split('.').collect();
    let right: Vec<&str> = b.trim().split('.').collect();

    for i in 0..left.len().max(right.len()) {
        let l = left.get(i).copied().unwrap_or("0");
        let r = right.get(i).copied().unwrap_or("0");
        let ord = match (l.parse::<u64>(), r.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            (Ok(_), Err(_)) => Ordering::Greater,
            (Err(_), Ok(_)) => Ordering::Less,
            (Err(_), Err(_)) => l.cmp(r),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// The instance with the highest version.
pub fn select_latest(instances: &[ServiceInstance]) -> Option<&ServiceInstance> {
    instances
        .iter()
        .max_by(|a, b| compare_versions(&a.version, &b.version))
}
