//! Serializable summary of a common attribute search
//!
//! Resolves every result into its leaf nodes so the whole tree can be written
//! out as JSON by the command-line driver.

use serde::Serialize;

use crate::commonattr::{CommonAttributeSearchResults, CommonAttributeSearcher, InstanceNode, SearchContext};

#[derive(Debug, Serialize)]
pub struct SearchReport {
    pub title: String,
    pub generated_at: String,
    pub value_count: usize,
    pub instance_count: usize,
    pub groups: Vec<InstanceCountGroup>,
}

/// Values that share the same number of instances
#[derive(Debug, Serialize)]
pub struct InstanceCountGroup {
    pub instance_count: usize,
    pub values: Vec<ValueReport>,
}

#[derive(Debug, Serialize)]
pub struct ValueReport {
    pub value: String,
    pub data_sources: String,
    pub cases: Vec<String>,
    pub nodes: Vec<InstanceNode>,
}

/// Build the report, resolving files through the results' shared cache
pub fn build_report(
    searcher: &dyn CommonAttributeSearcher,
    results: &CommonAttributeSearchResults,
    ctx: &SearchContext<'_>,
) -> SearchReport {
    let groups = results
        .instance_count_map()
        .iter()
        .map(|(&instance_count, values)| InstanceCountGroup {
            instance_count,
            values: values
                .iter()
                .map(|value| ValueReport {
                    value: value.value().to_string(),
                    data_sources: value.data_sources_display(),
                    cases: value.cases().iter().cloned().collect(),
                    nodes: value.generate_nodes(ctx),
                })
                .collect(),
        })
        .collect();

    SearchReport {
        title: searcher.tab_title(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        value_count: results.value_count(),
        instance_count: results.size(),
        groups,
    }
}
