//! The version table: one record per object ever observed.

use std::collections::HashMap;

/// Key of the version table.
///
/// Field order gives the derived `Ord` its meaning: namespace, then type,
/// then group, then name. The group keeps same-kind types apart, such as the
/// core `Service` and `serving.knative.dev` `Service`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectIdentity {
    /// Empty for cluster-scoped objects.
    pub namespace: String,
    pub resource_type: String,
    /// API group, empty for the core group.
    pub group: String,
    pub name: String,
}

impl ObjectIdentity {
    pub fn new(
        namespace: impl Into<String>,
        resource_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            resource_type: resource_type.into(),
            group: String::new(),
            name: name.into(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn is_cluster_scoped(&self) -> bool {
        self.namespace.is_empty()
    }
}

/// An object's version as seen by one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub identity: ObjectIdentity,
    pub version: i64,
}

impl Observation {
    /// Parses `token` as a base-10 integer. Tokens that are not integers are
    /// not tracked at all.
    pub fn parse(identity: ObjectIdentity, token: &str) -> Option<Self> {
        token
            .parse::<i64>()
            .ok()
            .map(|version| Self { identity, version })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub identity: ObjectIdentity,
    /// Most recently observed version.
    pub last_version: i64,
    /// Number of applied polls in which the version differed from the
    /// previous one. Never decreases.
    pub changes: i64,
}

/// Version table owned by the event loop.
///
/// Records are created on first sight and kept for the lifetime of the
/// process, including objects that have since been deleted from the cluster.
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    records: HashMap<ObjectIdentity, ObjectRecord>,
}

impl MonitorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one observation, counting a change when the version differs
    /// from the stored one.
    pub fn observe(&mut self, observation: &Observation) {
        match self.records.get_mut(&observation.identity) {
            Some(record) => {
                if record.last_version != observation.version {
                    record.changes += 1;
                }
                record.last_version = observation.version;
            }
            None => {
                self.records.insert(
                    observation.identity.clone(),
                    ObjectRecord {
                        identity: observation.identity.clone(),
                        last_version: observation.version,
                        changes: 0,
                    },
                );
            }
        }
    }

    /// Merges a whole poll's observations.
    pub fn apply(&mut self, observations: &[Observation]) {
        for observation in observations {
            self.observe(observation);
        }
    }

    pub fn get(&self, identity: &ObjectIdentity) -> Option<&ObjectRecord> {
        self.records.get(identity)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copies every record out for rendering.
    pub fn snapshot(&self) -> Vec<ObjectRecord> {
        self.records.values().cloned().collect()
    }
}
