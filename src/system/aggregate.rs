use std::collections::BTreeMap;

use serde::Serialize;

use super::category::Category;
use super::process::{ProcessRecord, by_cpu_desc, by_memory_desc};

pub const DEFAULT_TOP_N: usize = 5;

/// Category groups and top-N rankings derived from one cycle's records.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Aggregate {
    pub groups: BTreeMap<Category, Vec<ProcessRecord>>,
    pub top_cpu: Vec<ProcessRecord>,
    pub top_memory: Vec<ProcessRecord>,
}

pub fn empty_groups() -> BTreeMap<Category, Vec<ProcessRecord>> {
    Category::ALL.iter().map(|&c| (c, Vec::new())).collect()
}

pub fn aggregate(records: &[ProcessRecord], top_n: usize) -> Aggregate {
    let mut groups = empty_groups();
    for record in records {
        groups.entry(record.category).or_default().push(record.clone());
    }
    for members in groups.values_mut() {
        members.sort_by(by_cpu_desc);
    }

    Aggregate {
        groups,
        top_cpu: top_by(records, top_n, by_cpu_desc),
        top_memory: top_by(records, top_n, by_memory_desc),
    }
}

fn top_by<F>(records: &[ProcessRecord], n: usize, order: F) -> Vec<ProcessRecord>
where
    F: Fn(&ProcessRecord, &ProcessRecord) -> std::cmp::Ordering,
{
    let mut ranked: Vec<&ProcessRecord> = records.iter().collect();
    ranked.sort_by(|a, b| order(a, b));
    ranked.into_iter().take(n).cloned().collect()
}
