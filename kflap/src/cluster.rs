//! Access to the Kubernetes API.
//!
//! Everything the monitor needs from a cluster goes through [`ClusterApi`], so
//! discovery and polling can run against the real apiserver or an in-memory
//! fake in tests.

use std::future::Future;

use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::{Api, ApiResource, DynamicObject, ListParams},
    config::KubeConfigOptions,
    Client, Config,
};

use crate::{discovery::ResourceTypeDescriptor, error::StartupError};

/// One entry of an `APIResourceList` as served by discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResourceEntry {
    pub name: String,
    pub kind: String,
    pub namespaced: bool,
    pub verbs: Vec<String>,
}

/// An API group and the group-versions it serves, preferred version first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiGroupVersions {
    /// Empty for the core group.
    pub group: String,
    pub versions: Vec<String>,
}

/// The part of a listed object the monitor looks at. The namespace is the
/// one that was listed, so it is not carried here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedObject {
    pub name: String,
    pub resource_version: Option<String>,
}

pub trait ClusterApi: Clone + Send + Sync + 'static {
    /// Names of every namespace in the cluster.
    fn namespaces(&self) -> impl Future<Output = Result<Vec<String>, kube::Error>> + Send;

    /// Every API group with all of its served versions, core group first.
    fn api_groups(&self) -> impl Future<Output = Result<Vec<ApiGroupVersions>, kube::Error>> + Send;

    /// Resources served under one group-version (`v1`, `apps/v1`, ...).
    fn api_resources(
        &self,
        group_version: &str,
    ) -> impl Future<Output = Result<Vec<ApiResourceEntry>, kube::Error>> + Send;

    /// Lists objects of a type, cluster wide when `namespace` is `None`.
    fn list_objects(
        &self,
        resource: &ResourceTypeDescriptor,
        namespace: Option<&str>,
    ) -> impl Future<Output = Result<Vec<ObservedObject>, kube::Error>> + Send;
}

/// [`ClusterApi`] backed by a `kube::Client`.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the named kubeconfig context, or from the
    /// ambient configuration (current context, then in-cluster) when `None`.
    #[tracing::instrument]
    pub async fn connect(context: Option<String>) -> Result<Self, StartupError> {
        let config = match context {
            Some(context) => {
                let options = KubeConfigOptions {
                    context: Some(context),
                    cluster: None,
                    user: None,
                };
                Config::from_kubeconfig(&options).await?
            }
            None => Config::infer().await?,
        };
        let client = Client::try_from(config).map_err(StartupError::Client)?;
        Ok(Self::new(client))
    }
}

impl ClusterApi for KubeCluster {
    #[tracing::instrument(skip(self))]
    async fn namespaces(&self) -> Result<Vec<String>, kube::Error> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = api.list_metadata(&ListParams::default()).await?;
        Ok(list
            .items
            .into_iter()
            .filter_map(|ns| ns.metadata.name)
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn api_groups(&self) -> Result<Vec<ApiGroupVersions>, kube::Error> {
        let core = self.client.list_core_api_versions().await?;
        let groups = self.client.list_api_groups().await?;

        let core_group = ApiGroupVersions {
            group: String::new(),
            versions: core.versions,
        };

        let named_groups = groups.groups.into_iter().map(|group| {
            let preferred = group.preferred_version.map(|v| v.group_version);
            let others = group
                .versions
                .into_iter()
                .map(|v| v.group_version)
                .filter(|gv| Some(gv) != preferred.as_ref());

            ApiGroupVersions {
                group: group.name,
                versions: preferred.clone().into_iter().chain(others).collect(),
            }
        });

        Ok(std::iter::once(core_group).chain(named_groups).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn api_resources(&self, group_version: &str) -> Result<Vec<ApiResourceEntry>, kube::Error> {
        let list = if group_version.contains('/') {
            self.client.list_api_group_resources(group_version).await?
        } else {
            self.client.list_core_api_resources(group_version).await?
        };

        Ok(list
            .resources
            .into_iter()
            .map(|r| ApiResourceEntry {
                name: r.name,
                kind: r.kind,
                namespaced: r.namespaced,
                verbs: r.verbs,
            })
            .collect())
    }

    #[tracing::instrument(skip(self, resource), fields(resource = %resource.qualified_plural()))]
    async fn list_objects(
        &self,
        resource: &ResourceTypeDescriptor,
        namespace: Option<&str>,
    ) -> Result<Vec<ObservedObject>, kube::Error> {
        let ar: ApiResource = resource.api_resource();
        let api: Api<DynamicObject> = match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &ar),
            None => Api::all_with(self.client.clone(), &ar),
        };

        let list = api.list_metadata(&ListParams::default()).await?;
        Ok(list
            .items
            .into_iter()
            .map(|obj| ObservedObject {
                name: obj.metadata.name.unwrap_or_default(),
                resource_version: obj.metadata.resource_version,
            })
            .collect())
    }
}
