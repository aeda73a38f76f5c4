//! Loads a portfolio snapshot from CSV exports of the relational store.
//!
//! A snapshot directory holds `properties.csv`, `units.csv`, `leases.csv`, `lease_units.csv`
//! and optionally `tenants.csv`. Every reference is checked; the first broken one aborts the
//! import with the file, line and offending id.

mod rows;

use super::domain::{
    Lease, LeaseId, LeaseStatus, Property, PropertyId, PropertyType, Tenant, TenantId, Unit,
    UnitId, UnitStatus,
};
use super::snapshot::InMemoryPortfolioStore;
use rows::{parse_date, read_rows, LeaseRow, LeaseUnitRow, PropertyRow, TenantRow, UnitRow};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const PROPERTIES_FILE: &str = "properties.csv";
pub const UNITS_FILE: &str = "units.csv";
pub const TENANTS_FILE: &str = "tenants.csv";
pub const LEASES_FILE: &str = "leases.csv";
pub const LEASE_UNITS_FILE: &str = "lease_units.csv";

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid CSV data in {file}: {source}")]
    Csv {
        file: &'static str,
        source: csv::Error,
    },
    #[error("{file} line {line}: invalid {field} '{value}'")]
    InvalidValue {
        file: &'static str,
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("{file} line {line}: unknown {kind} '{id}'")]
    UnknownReference {
        file: &'static str,
        line: usize,
        kind: &'static str,
        id: String,
    },
    #[error("{file} line {line}: duplicate id '{id}'")]
    Duplicate {
        file: &'static str,
        line: usize,
        id: String,
    },
}

/// Readers for each snapshot table.
pub struct SnapshotSources<R> {
    pub properties: R,
    pub units: R,
    pub tenants: Option<R>,
    pub leases: R,
    pub lease_units: R,
}

pub struct SnapshotImporter;

impl SnapshotImporter {
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<InMemoryPortfolioStore, ImportError> {
        let dir = dir.as_ref();
        let tenants_path = dir.join(TENANTS_FILE);
        let tenants = if tenants_path.exists() {
            Some(open(&tenants_path)?)
        } else {
            None
        };

        let store = Self::from_readers(SnapshotSources {
            properties: open(&dir.join(PROPERTIES_FILE))?,
            units: open(&dir.join(UNITS_FILE))?,
            tenants,
            leases: open(&dir.join(LEASES_FILE))?,
            lease_units: open(&dir.join(LEASE_UNITS_FILE))?,
        })?;

        info!(
            dir = %dir.display(),
            properties = store.property_count(),
            units = store.unit_count(),
            leases = store.lease_count(),
            "portfolio snapshot imported"
        );
        Ok(store)
    }

    pub fn from_readers<R: Read>(
        sources: SnapshotSources<R>,
    ) -> Result<InMemoryPortfolioStore, ImportError> {
        let mut store = InMemoryPortfolioStore::new();

        let mut property_ids = HashSet::new();
        for (line, row) in rows_of::<PropertyRow, _>(PROPERTIES_FILE, sources.properties)? {
            if !property_ids.insert(row.id.clone()) {
                return Err(duplicate(PROPERTIES_FILE, line, row.id));
            }
            store = store.with_property(property_from_row(line, row)?);
        }

        let mut unit_ids = HashSet::new();
        for (line, row) in rows_of::<UnitRow, _>(UNITS_FILE, sources.units)? {
            if !property_ids.contains(&row.property_id) {
                return Err(unknown(UNITS_FILE, line, "property", row.property_id));
            }
            if !unit_ids.insert(row.id.clone()) {
                return Err(duplicate(UNITS_FILE, line, row.id));
            }
            store = store.with_unit(unit_from_row(line, row)?);
        }

        let mut tenant_ids = None;
        if let Some(reader) = sources.tenants {
            let mut ids = HashSet::new();
            for (line, row) in rows_of::<TenantRow, _>(TENANTS_FILE, reader)? {
                if !ids.insert(row.id.clone()) {
                    return Err(duplicate(TENANTS_FILE, line, row.id));
                }
                store = store.with_tenant(Tenant {
                    id: TenantId(row.id),
                    name: row.name,
                    email: row.email,
                    phone: row.phone,
                });
            }
            tenant_ids = Some(ids);
        }

        let mut leases = Vec::new();
        let mut lease_ids = HashSet::new();
        for (line, row) in rows_of::<LeaseRow, _>(LEASES_FILE, sources.leases)? {
            if !lease_ids.insert(row.id.clone()) {
                return Err(duplicate(LEASES_FILE, line, row.id));
            }
            if let Some(ids) = &tenant_ids {
                if !ids.contains(&row.tenant_id) {
                    warn!(
                        lease = %row.id,
                        tenant = %row.tenant_id,
                        "lease references unknown tenant"
                    );
                }
            }
            leases.push(lease_from_row(line, row)?);
        }

        let mut joins: Vec<Vec<UnitId>> = vec![Vec::new(); leases.len()];
        for (line, row) in rows_of::<LeaseUnitRow, _>(LEASE_UNITS_FILE, sources.lease_units)? {
            let Some(position) = leases.iter().position(|lease| lease.id.0 == row.lease_id) else {
                return Err(unknown(LEASE_UNITS_FILE, line, "lease", row.lease_id));
            };
            if !unit_ids.contains(&row.unit_id) {
                return Err(unknown(LEASE_UNITS_FILE, line, "unit", row.unit_id));
            }
            joins[position].push(UnitId(row.unit_id));
        }

        for (lease, unit_ids) in leases.into_iter().zip(joins) {
            store = store.with_lease(lease, unit_ids);
        }

        Ok(store)
    }
}

fn open(path: &Path) -> Result<File, ImportError> {
    File::open(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn rows_of<T, R>(file: &'static str, reader: R) -> Result<Vec<(usize, T)>, ImportError>
where
    T: for<'de> serde::Deserialize<'de>,
    R: Read,
{
    read_rows(reader).map_err(|source| ImportError::Csv { file, source })
}

fn duplicate(file: &'static str, line: usize, id: String) -> ImportError {
    ImportError::Duplicate { file, line, id }
}

fn unknown(file: &'static str, line: usize, kind: &'static str, id: String) -> ImportError {
    ImportError::UnknownReference {
        file,
        line,
        kind,
        id,
    }
}

fn invalid(file: &'static str, line: usize, field: &'static str, value: &str) -> ImportError {
    ImportError::InvalidValue {
        file,
        line,
        field,
        value: value.to_string(),
    }
}

fn property_from_row(line: usize, row: PropertyRow) -> Result<Property, ImportError> {
    let property_type = PropertyType::parse(&row.property_type)
        .ok_or_else(|| invalid(PROPERTIES_FILE, line, "property_type", &row.property_type))?;

    Ok(Property {
        id: PropertyId(row.id),
        code: row.code,
        name: row.name,
        address: row.address,
        property_type,
        total_leasable_area: row.total_leasable_area,
        declared_unit_count: row.declared_unit_count,
    })
}

fn unit_from_row(line: usize, row: UnitRow) -> Result<Unit, ImportError> {
    let status = match row.status.trim().to_ascii_uppercase().as_str() {
        "OCCUPIED" => UnitStatus::Occupied,
        "VACANT" => UnitStatus::Vacant,
        "MAINTENANCE" => UnitStatus::Maintenance,
        "RESERVED" => UnitStatus::Reserved,
        _ => return Err(invalid(UNITS_FILE, line, "status", &row.status)),
    };

    Ok(Unit {
        id: UnitId(row.id),
        property_id: PropertyId(row.property_id),
        unit_number: row.unit_number,
        total_area: row.total_area,
        total_rent: row.total_rent,
        status,
    })
}

fn lease_from_row(line: usize, row: LeaseRow) -> Result<Lease, ImportError> {
    let status = match row.status.trim().to_ascii_uppercase().as_str() {
        "ACTIVE" => LeaseStatus::Active,
        "PENDING" => LeaseStatus::Pending,
        "EXPIRED" => LeaseStatus::Expired,
        "TERMINATED" => LeaseStatus::Terminated,
        _ => return Err(invalid(LEASES_FILE, line, "status", &row.status)),
    };
    let start_date = parse_date(&row.start_date)
        .ok_or_else(|| invalid(LEASES_FILE, line, "start_date", &row.start_date))?;
    let end_date = parse_date(&row.end_date)
        .ok_or_else(|| invalid(LEASES_FILE, line, "end_date", &row.end_date))?;

    if end_date < start_date {
        warn!(
            lease = %row.id,
            %start_date,
            %end_date,
            "lease ends before it starts; treated as empty"
        );
    }

    Ok(Lease {
        id: LeaseId(row.id),
        tenant_id: TenantId(row.tenant_id),
        start_date,
        end_date,
        total_rent_amount: row.total_rent_amount,
        status,
    })
}
