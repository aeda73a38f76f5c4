//! Read-only view of the portfolio handed to the report computations.
//!
//! The store is the only collaborator the engine talks to. Each report call loads its own
//! snapshot, so nothing computed from it is shared across calls.

use super::domain::{
    Lease, LeaseId, LeaseStatus, Property, PropertyId, PropertyType, Tenant, TenantId, Unit,
    UnitId,
};
use std::collections::{BTreeMap, HashMap};

/// Filters a report applies when loading its snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotQuery {
    pub property_id: Option<PropertyId>,
    pub property_type: Option<PropertyType>,
}

impl SnapshotQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matches(&self, property: &Property) -> bool {
        self.property_id
            .as_ref()
            .map_or(true, |id| &property.id == id)
            && self
                .property_type
                .map_or(true, |kind| property.property_type == kind)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PortfolioSnapshot {
    pub properties: Vec<PropertySnapshot>,
}

#[derive(Debug, Clone)]
pub struct PropertySnapshot {
    pub property: Property,
    pub units: Vec<UnitSnapshot>,
}

/// A unit with every lease that has ever touched it, in store order.
#[derive(Debug, Clone)]
pub struct UnitSnapshot {
    pub unit: Unit,
    pub leases: Vec<LeaseSnapshot>,
}

#[derive(Debug, Clone)]
pub struct LeaseSnapshot {
    pub lease: Lease,
    pub tenant: Option<Tenant>,
}

impl UnitSnapshot {
    /// First lease currently flagged ACTIVE.
    pub fn active_lease(&self) -> Option<&LeaseSnapshot> {
        self.leases
            .iter()
            .find(|entry| entry.lease.status == LeaseStatus::Active)
    }

    /// Expired or terminated lease with the latest end date.
    pub fn latest_terminal_lease(&self) -> Option<&LeaseSnapshot> {
        self.leases
            .iter()
            .filter(|entry| entry.lease.status.is_terminal())
            .fold(None, |latest: Option<&LeaseSnapshot>, entry| match latest {
                Some(current) if current.lease.end_date >= entry.lease.end_date => Some(current),
                _ => Some(entry),
            })
    }
}

/// Storage abstraction so the engine can be exercised without a database.
pub trait PortfolioStore: Send + Sync {
    fn load(&self, query: &SnapshotQuery) -> Result<PortfolioSnapshot, StoreError>;
}

/// Failure surfacing from the data-access collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("portfolio store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed portfolio record: {0}")]
    Malformed(String),
}

/// Store backed by plain collections, used by the service binary and the tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPortfolioStore {
    properties: Vec<Property>,
    units: Vec<Unit>,
    tenants: HashMap<TenantId, Tenant>,
    leases: BTreeMap<LeaseId, Lease>,
    lease_units: Vec<(LeaseId, UnitId)>,
}

impl InMemoryPortfolioStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.units.push(unit);
        self
    }

    pub fn with_tenant(mut self, tenant: Tenant) -> Self {
        self.tenants.insert(tenant.id.clone(), tenant);
        self
    }

    /// Registers a lease and joins it to each of `unit_ids`.
    pub fn with_lease<I>(mut self, lease: Lease, unit_ids: I) -> Self
    where
        I: IntoIterator<Item = UnitId>,
    {
        for unit_id in unit_ids {
            self.lease_units.push((lease.id.clone(), unit_id));
        }
        self.leases.insert(lease.id.clone(), lease);
        self
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn lease_count(&self) -> usize {
        self.leases.len()
    }
}

impl PortfolioStore for InMemoryPortfolioStore {
    fn load(&self, query: &SnapshotQuery) -> Result<PortfolioSnapshot, StoreError> {
        let mut leases_by_unit: HashMap<&UnitId, Vec<LeaseSnapshot>> = HashMap::new();
        for (lease_id, unit_id) in &self.lease_units {
            let lease = self.leases.get(lease_id).ok_or_else(|| {
                StoreError::Malformed(format!("unit {unit_id} joined to unknown lease {lease_id}"))
            })?;
            leases_by_unit
                .entry(unit_id)
                .or_default()
                .push(LeaseSnapshot {
                    lease: lease.clone(),
                    tenant: self.tenants.get(&lease.tenant_id).cloned(),
                });
        }

        let properties = self
            .properties
            .iter()
            .filter(|property| query.matches(property))
            .map(|property| PropertySnapshot {
                property: property.clone(),
                units: self
                    .units
                    .iter()
                    .filter(|unit| unit.property_id == property.id)
                    .map(|unit| UnitSnapshot {
                        unit: unit.clone(),
                        leases: leases_by_unit.get(&unit.id).cloned().unwrap_or_default(),
                    })
                    .collect(),
            })
            .collect();

        Ok(PortfolioSnapshot { properties })
    }
}
