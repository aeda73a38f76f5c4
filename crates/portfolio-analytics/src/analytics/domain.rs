use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

record_id!(
    /// Store identifier of a property.
    PropertyId
);
record_id!(
    /// Store identifier of a unit.
    UnitId
);
record_id!(
    /// Store identifier of a lease.
    LeaseId
);
record_id!(
    /// Store identifier of a tenant.
    TenantId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    Residential,
    Commercial,
    Office,
    Retail,
    Industrial,
    Warehouse,
    MixedUse,
}

impl PropertyType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Residential => "Residential",
            Self::Commercial => "Commercial",
            Self::Office => "Office",
            Self::Retail => "Retail",
            Self::Industrial => "Industrial",
            Self::Warehouse => "Warehouse",
            Self::MixedUse => "Mixed Use",
        }
    }

    /// Accepts the stored tag (`MIXED_USE`) as well as loose variants (`mixed-use`, `Mixed Use`).
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw
            .trim()
            .to_ascii_uppercase()
            .replace(['-', ' '], "_");
        match normalized.as_str() {
            "RESIDENTIAL" => Some(Self::Residential),
            "COMMERCIAL" => Some(Self::Commercial),
            "OFFICE" => Some(Self::Office),
            "RETAIL" => Some(Self::Retail),
            "INDUSTRIAL" => Some(Self::Industrial),
            "WAREHOUSE" => Some(Self::Warehouse),
            "MIXED_USE" | "MIXEDUSE" => Some(Self::MixedUse),
            _ => None,
        }
    }
}

/// Current state of a unit. Not a history: past occupancy comes from leases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitStatus {
    Occupied,
    Vacant,
    Maintenance,
    Reserved,
}

impl UnitStatus {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Occupied,
            Self::Vacant,
            Self::Maintenance,
            Self::Reserved,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Occupied => "Occupied",
            Self::Vacant => "Vacant",
            Self::Maintenance => "Maintenance",
            Self::Reserved => "Reserved",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaseStatus {
    Active,
    Pending,
    Expired,
    Terminated,
}

impl LeaseStatus {
    /// Expired or terminated: the lease has run its course.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Expired | Self::Terminated)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub code: String,
    pub name: String,
    pub address: String,
    pub property_type: PropertyType,
    pub total_leasable_area: Decimal,
    /// Administrative count; may drift from the units actually on file.
    pub declared_unit_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub property_id: PropertyId,
    pub unit_number: String,
    pub total_area: Decimal,
    /// Monthly rent.
    pub total_rent: Decimal,
    pub status: UnitStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Lease dates are calendar days and both ends are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub id: LeaseId,
    pub tenant_id: TenantId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Aggregate rent across every unit the lease covers.
    pub total_rent_amount: Decimal,
    pub status: LeaseStatus,
}
