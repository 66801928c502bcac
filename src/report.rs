use crate::resource::{Resource, ResourceStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachinerySummary {
    pub total: usize,
    pub available: usize,
    pub in_use: usize,
    pub by_type: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonnelSummary {
    pub total: usize,
    pub available: usize,
    pub assigned: usize,
    pub by_department: BTreeMap<String, usize>,
}

/// Head counts of the inventory by status and type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceReport {
    pub machinery: MachinerySummary,
    pub personnel: PersonnelSummary,
}

impl ResourceReport {
    pub fn from_resources<'a, I>(resources: I) -> Self
    where
        I: IntoIterator<Item = &'a Resource>,
    {
        let mut report = ResourceReport::default();
        for resource in resources {
            match resource {
                Resource::Machinery(m) => {
                    let summary = &mut report.machinery;
                    summary.total += 1;
                    match m.status {
                        ResourceStatus::Available => summary.available += 1,
                        ResourceStatus::InUse => summary.in_use += 1,
                        ResourceStatus::Assigned => {}
                    }
                    *summary.by_type.entry(m.machine_type.clone()).or_insert(0) += 1;
                }
                Resource::Personnel(p) => {
                    let summary = &mut report.personnel;
                    summary.total += 1;
                    match p.status {
                        ResourceStatus::Available => summary.available += 1,
                        ResourceStatus::Assigned => summary.assigned += 1,
                        ResourceStatus::InUse => {}
                    }
                    *summary.by_department.entry(p.department.clone()).or_insert(0) += 1;
                }
            }
        }
        report
    }

    pub fn to_cli_summary(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!(
            "machinery total={} available={} in_use={}",
            self.machinery.total, self.machinery.available, self.machinery.in_use
        ));
        for (machine_type, count) in &self.machinery.by_type {
            lines.push(format!("  {machine_type}: {count}"));
        }
        lines.push(format!(
            "personnel total={} available={} assigned={}",
            self.personnel.total, self.personnel.available, self.personnel.assigned
        ));
        for (department, count) in &self.personnel.by_department {
            lines.push(format!("  {department}: {count}"));
        }
        lines.join("\n")
    }
}
