//! In-memory Satellite used by the scenario tests.

#![allow(dead_code)]

use leapp_ready_core::{
    Architecture, ChannelId, ContentFacet, ContentQuery, EnableAction, EnableOutcome,
    HostDirectory, HostRecord, OrganizationId, RequiredChannel, RequiredChannelSet, Snapshot,
    SnapshotChannel, SnapshotId, TransportError, resolve,
};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

pub const HOST: &str = "web01.example.com";
pub const ORG: u64 = 1;
pub const SNAPSHOT: u64 = 22;
pub const VIEW: &str = "RHEL7-Leapp";

/// How the fake answers an enable for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnableBehavior {
    /// Enable and report success.
    Succeed,
    /// Report a conflict; the channel is present afterwards.
    Conflict,
    /// Refuse with the given reason.
    Reject(String),
    /// Report success without changing the inventory.
    Ignore,
}

pub struct FakeSatellite {
    pub hosts: BTreeMap<String, HostRecord>,
    pub inventory: RefCell<BTreeSet<String>>,
    pub snapshots: BTreeMap<u64, Snapshot>,
    pub package_counts: BTreeMap<u64, u64>,
    pub behaviors: BTreeMap<String, EnableBehavior>,
    pub enable_calls: RefCell<Vec<String>>,
    pub inventory_reads: Cell<usize>,
    pub snapshot_reads: Cell<usize>,
    pub unreachable: bool,
}

impl FakeSatellite {
    /// A server where `required` is fully enabled, published and synced.
    pub fn ready(required: &RequiredChannelSet) -> Self {
        let channels: Vec<SnapshotChannel> = required
            .channels()
            .iter()
            .enumerate()
            .map(|(i, c)| SnapshotChannel {
                id: ChannelId(100 + i as u64),
                name: c.name.clone(),
            })
            .collect();
        let package_counts = channels.iter().map(|c| (c.id.0, 1500)).collect();

        let mut snapshots = BTreeMap::new();
        snapshots.insert(
            SNAPSHOT,
            Snapshot {
                id: SnapshotId(SNAPSHOT),
                parent_view: VIEW.to_string(),
                channels,
            },
        );

        let mut hosts = BTreeMap::new();
        hosts.insert(HOST.to_string(), host_record("x86_64", "7.9", VIEW));

        Self {
            hosts,
            inventory: RefCell::new(required.names().iter().map(|n| n.to_string()).collect()),
            snapshots,
            package_counts,
            behaviors: BTreeMap::new(),
            enable_calls: RefCell::new(Vec::new()),
            inventory_reads: Cell::new(0),
            snapshot_reads: Cell::new(0),
            unreachable: false,
        }
    }

    pub fn disable(&self, name: &str) {
        self.inventory.borrow_mut().remove(name);
    }

    pub fn set_packages(&mut self, name: &str, count: u64) {
        let id = self
            .snapshots
            .values()
            .flat_map(|s| s.channels.iter())
            .find(|c| c.name == name)
            .map(|c| c.id.0);
        if let Some(id) = id {
            self.package_counts.insert(id, count);
        }
    }

    pub fn drop_from_snapshot(&mut self, name: &str) {
        if let Some(snapshot) = self.snapshots.get_mut(&SNAPSHOT) {
            snapshot.channels.retain(|c| c.name != name);
        }
    }

    pub fn use_default_view(&mut self) {
        if let Some(host) = self.hosts.get_mut(HOST) {
            if let Some(facet) = host.content_facet_attributes.as_mut() {
                facet.content_view_name = Some("Default Organization View".to_string());
                facet.content_view_default = Some(true);
            }
        }
    }
}

pub fn host_record(arch: &str, version: &str, view: &str) -> HostRecord {
    let mut facts = BTreeMap::new();
    facts.insert("distribution::version".to_string(), version.to_string());
    facts.insert("distribution::name".to_string(), "Red Hat Enterprise Linux Server".to_string());
    HostRecord {
        name: HOST.to_string(),
        architecture_name: Some(arch.to_string()),
        organization_id: Some(ORG),
        content_facet_attributes: Some(ContentFacet {
            content_view_id: Some(4),
            content_view_name: Some(view.to_string()),
            content_view_version_id: Some(SNAPSHOT),
            content_view_default: Some(false),
            lifecycle_environment_name: Some("Production".to_string()),
        }),
        lifecycle_environment_name: Some("Production".to_string()),
        subscription_status_label: Some("Simple Content Access".to_string()),
        facts: Some(facts),
    }
}

pub fn x86_64_8_6() -> RequiredChannelSet {
    resolve(Architecture::X86_64, None, "8.6").expect("catalog row")
}

impl HostDirectory for FakeSatellite {
    async fn host(&self, identifier: &str) -> Result<Option<HostRecord>, TransportError> {
        if self.unreachable {
            return Err(TransportError::Unreachable("https://satellite.test".to_string()));
        }
        Ok(self.hosts.get(identifier).cloned())
    }
}

impl ContentQuery for FakeSatellite {
    async fn organization_channels(
        &self,
        organization: OrganizationId,
    ) -> Result<BTreeSet<String>, TransportError> {
        assert_eq!(organization, OrganizationId(ORG));
        self.inventory_reads.set(self.inventory_reads.get() + 1);
        Ok(self.inventory.borrow().clone())
    }

    async fn snapshot(&self, id: SnapshotId) -> Result<Snapshot, TransportError> {
        self.snapshot_reads.set(self.snapshot_reads.get() + 1);
        self.snapshots
            .get(&id.0)
            .cloned()
            .ok_or_else(|| TransportError::Status {
                status: 404,
                path: format!("/katello/api/content_view_versions/{id}"),
                message: "not found".to_string(),
            })
    }

    async fn channel_package_count(&self, id: ChannelId) -> Result<u64, TransportError> {
        Ok(self.package_counts.get(&id.0).copied().unwrap_or(0))
    }
}

impl EnableAction for FakeSatellite {
    async fn enable_channel(
        &self,
        organization: OrganizationId,
        channel: &RequiredChannel,
    ) -> Result<EnableOutcome, TransportError> {
        assert_eq!(organization, OrganizationId(ORG));
        self.enable_calls.borrow_mut().push(channel.name.clone());
        let behavior = self
            .behaviors
            .get(&channel.name)
            .cloned()
            .unwrap_or(EnableBehavior::Succeed);
        Ok(match behavior {
            EnableBehavior::Succeed => {
                self.inventory.borrow_mut().insert(channel.name.clone());
                EnableOutcome::Enabled
            }
            EnableBehavior::Conflict => {
                self.inventory.borrow_mut().insert(channel.name.clone());
                EnableOutcome::AlreadyEnabled
            }
            EnableBehavior::Reject(reason) => EnableOutcome::Rejected(reason),
            EnableBehavior::Ignore => EnableOutcome::Enabled,
        })
    }
}
