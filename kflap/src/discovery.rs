//! Resource type discovery.
//!
//! Walks every version of every API group, preferred version first, and
//! keeps one descriptor per resource name within a group. Of those, only the
//! types that can be polled survive: top-level, listable, not a known
//! deprecated alias, and matching the user's allow-list.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use futures::{stream::FuturesUnordered, StreamExt};
use kube::{api::ApiResource, discovery::verbs};
use tokio::{sync::Semaphore, task};

use crate::{
    cluster::{ApiGroupVersions, ApiResourceEntry, ClusterApi},
    error::PollError,
};

/// Upper bound on concurrent `APIResourceList` requests.
const MAX_CONCURRENT_GROUPS: usize = 20;

/// A pollable resource type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceTypeDescriptor {
    /// Empty for the core group.
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
    pub namespaced: bool,
}

impl ResourceTypeDescriptor {
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// `plural` for the core group, `plural.group` otherwise, as kubectl
    /// spells it.
    pub fn qualified_plural(&self) -> String {
        if self.group.is_empty() {
            self.plural.clone()
        } else {
            format!("{}.{}", self.plural, self.group)
        }
    }

    pub fn api_resource(&self) -> ApiResource {
        ApiResource {
            group: self.group.clone(),
            version: self.version.clone(),
            api_version: self.api_version(),
            kind: self.kind.clone(),
            plural: self.plural.clone(),
        }
    }
}

/// Resources that are still served but superseded by a differently named
/// resource, keyed by group-version. Listing them only yields deprecation
/// warnings and duplicates of the replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationPolicy {
    excluded: HashMap<String, HashSet<String>>,
}

impl DeprecationPolicy {
    pub fn empty() -> Self {
        Self {
            excluded: HashMap::new(),
        }
    }

    pub fn exclude<I, S>(mut self, group_version: &str, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded
            .entry(group_version.to_string())
            .or_default()
            .extend(resources.into_iter().map(Into::into));
        self
    }

    pub fn is_excluded(&self, group_version: &str, resource: &str) -> bool {
        self.excluded
            .get(group_version)
            .is_some_and(|names| names.contains(resource))
    }
}

impl Default for DeprecationPolicy {
    /// `v1 endpoints` is replaced by `discovery.k8s.io/v1 endpointslices`,
    /// `v1 componentstatuses` has been deprecated without replacement.
    fn default() -> Self {
        Self::empty().exclude("v1", ["endpoints", "componentstatuses"])
    }
}

fn split_group_version(group_version: &str) -> (&str, &str) {
    group_version.split_once('/').unwrap_or(("", group_version))
}

/// Applies the subresource, deprecation, verb and allow-list filters to one
/// group-version's resources.
pub fn select_resources(
    group_version: &str,
    entries: Vec<ApiResourceEntry>,
    filter: &BTreeSet<String>,
    policy: &DeprecationPolicy,
) -> Vec<ResourceTypeDescriptor> {
    let (group, version) = split_group_version(group_version);

    entries
        .into_iter()
        .filter(|r| !r.name.contains('/'))
        .filter(|r| !policy.is_excluded(group_version, &r.name))
        .filter(|r| r.verbs.iter().any(|v| v == verbs::LIST))
        .filter(|r| filter.is_empty() || filter.contains(&r.name) || filter.contains(&r.kind))
        .map(|r| ResourceTypeDescriptor {
            group: group.to_string(),
            version: version.to_string(),
            kind: r.kind,
            plural: r.name,
            namespaced: r.namespaced,
        })
        .collect()
}

/// Reduces one group's resource lists, given in version preference order, to
/// the first occurrence of every resource name. A resource served by several
/// versions is kept only under the most preferred one.
pub fn preferred_entries(
    lists: Vec<(String, Vec<ApiResourceEntry>)>,
) -> Vec<(String, Vec<ApiResourceEntry>)> {
    let mut seen = HashSet::new();
    lists
        .into_iter()
        .map(|(group_version, entries)| {
            let fresh = entries
                .into_iter()
                .filter(|r| seen.insert(r.name.clone()))
                .collect();
            (group_version, fresh)
        })
        .collect()
}

/// Fetches the resource list of every version of `group`, in order. A
/// version that fails is logged and skipped.
async fn fetch_group<C: ClusterApi>(
    cluster: &C,
    group: ApiGroupVersions,
) -> Vec<(String, Vec<ApiResourceEntry>)> {
    let mut lists = Vec::with_capacity(group.versions.len());
    for group_version in group.versions {
        match cluster.api_resources(&group_version).await {
            Ok(entries) => lists.push((group_version, entries)),
            Err(e) => tracing::warn!("skip discovery doc {group_version}: {e}"),
        }
    }
    lists
}

/// Discovers the resource types to poll.
///
/// Only a failure to enumerate the API groups fails the call. A group-version
/// whose resource list cannot be fetched is logged and left out, so a
/// partially unhealthy aggregated API does not blind the whole monitor.
#[tracing::instrument(skip_all, fields(filter = filter.len()))]
pub async fn discover<C: ClusterApi>(
    cluster: &C,
    filter: &BTreeSet<String>,
    policy: &DeprecationPolicy,
) -> Result<Vec<ResourceTypeDescriptor>, PollError> {
    let groups = cluster
        .api_groups()
        .await
        .map_err(PollError::DiscoveryFailed)?;

    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_GROUPS));
    let mut tasks = FuturesUnordered::new();

    for (idx, group) in groups.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        let cluster = cluster.clone();

        tasks.push(task::spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            (idx, fetch_group(&cluster, group).await)
        }));
    }

    let mut groups = Vec::new();
    while let Some(outcome) = tasks.next().await {
        match outcome {
            Ok(fetched) => groups.push(fetched),
            Err(join_err) => tracing::warn!("discovery task failed: {join_err}"),
        }
    }

    // Completion order is arbitrary; keep the apiserver's group order.
    groups.sort_by_key(|(idx, _)| *idx);

    let descriptors: Vec<ResourceTypeDescriptor> = groups
        .into_iter()
        .flat_map(|(_, lists)| preferred_entries(lists))
        .flat_map(|(gv, entries)| select_resources(&gv, entries, filter, policy))
        .collect();

    tracing::debug!(count = descriptors.len(), "discovered resource types");
    Ok(descriptors)
}
