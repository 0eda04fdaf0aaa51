//! Version-diff monitor.
//!
//! A poll cycle discovers the resource types, lists every object of each type
//! and turns the listed versions into [`Observation`]s. Merging them into the
//! [`MonitorState`] is a separate, synchronous step so the state can stay
//! owned by the event loop while the network work runs elsewhere.

mod state;

use std::sync::Arc;

use futures::{stream::FuturesUnordered, StreamExt};
use tokio::{sync::Semaphore, task};

pub use state::{MonitorState, ObjectIdentity, ObjectRecord, Observation};

use crate::{
    cluster::{ClusterApi, ObservedObject},
    config::Config,
    discovery::{discover, DeprecationPolicy, ResourceTypeDescriptor},
    error::PollError,
};

/// Upper bound on concurrent list calls within one poll.
const MAX_CONCURRENT_LISTS: usize = 16;

#[derive(Clone)]
pub struct Monitor<C> {
    cluster: C,
    config: Arc<Config>,
    policy: Arc<DeprecationPolicy>,
}

impl<C: ClusterApi> Monitor<C> {
    pub fn new(cluster: C, config: Arc<Config>, policy: DeprecationPolicy) -> Self {
        Self {
            cluster,
            config,
            policy: Arc::new(policy),
        }
    }

    /// Runs the network half of a poll cycle.
    #[tracing::instrument(skip(self))]
    pub async fn collect(&self) -> Result<Vec<Observation>, PollError> {
        let descriptors = discover(&self.cluster, &self.config.resources, &self.policy).await?;
        let namespaces = self.scan_namespaces().await?;
        Ok(collect_observations(&self.cluster, &descriptors, &namespaces).await)
    }

    /// Runs a whole poll cycle against `state`.
    pub async fn poll(&self, state: &mut MonitorState) -> Result<(), PollError> {
        let observations = self.collect().await?;
        state.apply(&observations);
        Ok(())
    }

    /// The configured namespaces, or every namespace when none are configured.
    async fn scan_namespaces(&self) -> Result<Vec<String>, PollError> {
        if !self.config.namespaces.is_empty() {
            return Ok(self.config.namespaces.iter().cloned().collect());
        }
        self.cluster
            .namespaces()
            .await
            .map_err(PollError::NamespaceEnumerationFailed)
    }
}

fn to_observations(
    descriptor: &ResourceTypeDescriptor,
    namespace: Option<&str>,
    objects: Vec<ObservedObject>,
) -> Vec<Observation> {
    objects
        .into_iter()
        .filter_map(|obj| {
            let token = obj.resource_version.unwrap_or_default();
            let identity = ObjectIdentity::new(namespace.unwrap_or(""), &descriptor.kind, obj.name)
                .with_group(&descriptor.group);
            let observation = Observation::parse(identity, &token);
            if observation.is_none() {
                tracing::trace!(kind = %descriptor.kind, %token, "skipping non-numeric resourceVersion");
            }
            observation
        })
        .collect()
}

/// Lists every `(type, namespace)` pair and returns the parsed observations.
///
/// Cluster-scoped types are listed once regardless of `namespaces`. A failing
/// list is logged and contributes nothing. The result is ordered by descriptor,
/// then namespace, then list order, independent of completion order.
pub async fn collect_observations<C: ClusterApi>(
    cluster: &C,
    descriptors: &[ResourceTypeDescriptor],
    namespaces: &[String],
) -> Vec<Observation> {
    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_LISTS));
    let mut tasks = FuturesUnordered::new();

    let targets = descriptors.iter().flat_map(|d| {
        let scopes: Vec<Option<String>> = if d.namespaced {
            namespaces.iter().cloned().map(Some).collect()
        } else {
            vec![None]
        };
        scopes.into_iter().map(move |ns| (d.clone(), ns))
    });

    for (idx, (descriptor, namespace)) in targets.enumerate() {
        let semaphore = semaphore.clone();
        let cluster = cluster.clone();

        tasks.push(task::spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            let listed = cluster
                .list_objects(&descriptor, namespace.as_deref())
                .await;
            match listed {
                Ok(objects) => Some((idx, to_observations(&descriptor, namespace.as_deref(), objects))),
                Err(e) => {
                    tracing::warn!(
                        resource = %descriptor.qualified_plural(),
                        namespace = namespace.as_deref().unwrap_or("<cluster>"),
                        "list failed: {e}"
                    );
                    None
                }
            }
        }));
    }

    let mut batches = Vec::new();
    while let Some(outcome) = tasks.next().await {
        match outcome {
            Err(join_err) => tracing::warn!("list task failed: {join_err}"),
            Ok(Some(batch)) => batches.push(batch),
            Ok(None) => {}
        }
    }

    batches.sort_by_key(|(idx, _)| *idx);
    batches.into_iter().flat_map(|(_, batch)| batch).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::fake::{entry, object, FakeCluster};

    const RW: &[&str] = &["get", "list", "watch"];

    fn config(namespaces: &[&str]) -> Arc<Config> {
        Arc::new(Config {
            namespaces: namespaces.iter().map(|s| s.to_string()).collect(),
            ..Config::default()
        })
    }

    fn cluster() -> FakeCluster {
        FakeCluster::new()
            .with_group(
                "v1",
                vec![
                    entry("pods", "Pod", true, RW),
                    entry("configmaps", "ConfigMap", true, RW),
                    entry("nodes", "Node", false, RW),
                ],
            )
            .with_namespaces(&["a", "b"])
    }

    fn monitor(cluster: &FakeCluster, namespaces: &[&str]) -> Monitor<FakeCluster> {
        Monitor::new(cluster.clone(), config(namespaces), DeprecationPolicy::default())
    }

    #[tokio::test]
    async fn test_scans_all_namespaces_when_unfiltered() {
        let cluster = cluster();
        cluster.set_objects("pods", Some("a"), vec![object("x", "10")]);
        cluster.set_objects("pods", Some("b"), vec![object("x", "11")]);

        let mut state = MonitorState::new();
        monitor(&cluster, &[]).poll(&mut state).await.unwrap();

        assert_eq!(state.len(), 2);
        assert!(state.get(&ObjectIdentity::new("a", "Pod", "x")).is_some());
        assert!(state.get(&ObjectIdentity::new("b", "Pod", "x")).is_some());

        let calls = cluster.list_calls();
        assert!(calls.contains(&("pods".to_string(), Some("a".to_string()))));
        assert!(calls.contains(&("pods".to_string(), Some("b".to_string()))));
    }

    #[tokio::test]
    async fn test_cluster_scoped_types_listed_once() {
        let cluster = cluster();
        cluster.set_objects("nodes", None, vec![object("node-1", "5")]);

        let mut state = MonitorState::new();
        monitor(&cluster, &["a"]).poll(&mut state).await.unwrap();

        let node_calls: Vec<_> = cluster
            .list_calls()
            .into_iter()
            .filter(|(plural, _)| plural == "nodes")
            .collect();
        assert_eq!(node_calls, vec![("nodes".to_string(), None)]);

        let record = state.get(&ObjectIdentity::new("", "Node", "node-1")).unwrap();
        assert!(record.identity.is_cluster_scoped());
    }

    #[tokio::test]
    async fn test_namespace_filter_is_used_verbatim() {
        let cluster = cluster();
        cluster.fail_namespace_listing();

        let mut state = MonitorState::new();
        monitor(&cluster, &["b"]).poll(&mut state).await.unwrap();

        assert!(cluster
            .list_calls()
            .iter()
            .all(|(_, ns)| ns.as_deref() != Some("a")));
    }

    #[tokio::test]
    async fn test_namespace_enumeration_failure_aborts_poll() {
        let cluster = cluster();
        cluster.set_objects("nodes", None, vec![object("node-1", "5")]);
        cluster.fail_namespace_listing();

        let mut state = MonitorState::new();
        let err = monitor(&cluster, &[]).poll(&mut state).await.unwrap_err();

        assert!(matches!(err, PollError::NamespaceEnumerationFailed(_)));
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn test_failed_list_skips_only_that_type() {
        let cluster = cluster();
        cluster.set_objects("pods", Some("a"), vec![object("p", "1")]);
        cluster.set_objects("nodes", None, vec![object("n", "2")]);
        cluster.set_objects("configmaps", Some("a"), vec![object("c", "3")]);
        cluster.fail_list("configmaps", Some("a"));

        let mut state = MonitorState::new();
        monitor(&cluster, &["a"]).poll(&mut state).await.unwrap();

        let mut kinds: Vec<String> = state
            .snapshot()
            .into_iter()
            .map(|r| r.identity.resource_type)
            .collect();
        kinds.sort();
        assert_eq!(kinds, vec!["Node", "Pod"]);
    }

    #[tokio::test]
    async fn test_non_numeric_versions_are_never_tracked() {
        let cluster = cluster();
        cluster.set_objects(
            "pods",
            Some("a"),
            vec![
                object("numeric", "100"),
                object("opaque", "v-abc"),
                ObservedObject {
                    name: "missing".to_string(),
                    resource_version: None,
                },
            ],
        );

        let monitor = monitor(&cluster, &["a"]);
        let mut state = MonitorState::new();
        for _ in 0..3 {
            monitor.poll(&mut state).await.unwrap();
        }

        assert_eq!(state.len(), 1);
        assert!(state.get(&ObjectIdentity::new("a", "Pod", "numeric")).is_some());
    }

    #[tokio::test]
    async fn test_same_kind_from_two_groups_never_flaps() {
        let cluster = FakeCluster::new()
            .with_group("v1", vec![entry("services", "Service", true, RW)])
            .with_group(
                "serving.knative.dev/v1",
                vec![entry("services", "Service", true, RW)],
            )
            .with_namespaces(&["a"]);
        cluster.set_objects("services", Some("a"), vec![object("web", "100")]);
        cluster.set_objects("services.serving.knative.dev", Some("a"), vec![object("web", "200")]);

        let monitor = monitor(&cluster, &["a"]);
        let mut state = MonitorState::new();
        for _ in 0..3 {
            monitor.poll(&mut state).await.unwrap();
        }

        let core = state.get(&ObjectIdentity::new("a", "Service", "web")).unwrap();
        let knative = state
            .get(&ObjectIdentity::new("a", "Service", "web").with_group("serving.knative.dev"))
            .unwrap();
        assert_eq!(state.len(), 2);
        assert_eq!((core.last_version, core.changes), (100, 0));
        assert_eq!((knative.last_version, knative.changes), (200, 0));
    }

    #[tokio::test]
    async fn test_version_sequence_across_polls() {
        let cluster = cluster();
        let monitor = monitor(&cluster, &["a"]);
        let mut state = MonitorState::new();

        for version in ["100", "100", "105"] {
            cluster.set_objects("pods", Some("a"), vec![object("A", version)]);
            monitor.poll(&mut state).await.unwrap();
        }

        let record = state.get(&ObjectIdentity::new("a", "Pod", "A")).unwrap();
        assert_eq!(record.changes, 1);
        assert_eq!(record.last_version, 105);
    }

    #[tokio::test]
    async fn test_observation_order_is_deterministic() {
        let cluster = cluster();
        cluster.set_objects("pods", Some("a"), vec![object("p1", "1")]);
        cluster.set_objects("pods", Some("b"), vec![object("p2", "2")]);
        cluster.set_objects("nodes", None, vec![object("n1", "3")]);

        let observations = monitor(&cluster, &[]).collect().await.unwrap();
        let names: Vec<&str> = observations
            .iter()
            .map(|o| o.identity.name.as_str())
            .collect();
        assert_eq!(names, vec!["p1", "p2", "n1"]);
    }
}
