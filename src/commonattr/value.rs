//! A shared attribute value and the file instances exhibiting it

use std::collections::BTreeSet;

use tracing::warn;

use super::node::InstanceNode;
use super::result::{CommonAttributeSearchResult, SearchContext};

#[derive(Debug)]
pub struct CommonAttributeValue {
    value: String,
    file_instances: Vec<CommonAttributeSearchResult>,
    data_sources: BTreeSet<String>,
    cases: BTreeSet<String>,
}

impl CommonAttributeValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            file_instances: Vec::new(),
            data_sources: BTreeSet::new(),
            cases: BTreeSet::new(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Attach another occurrence of this value
    pub fn add_file_instance_metadata(&mut self, metadata: CommonAttributeSearchResult, case_name: &str) {
        if !metadata.data_source().is_empty() {
            self.data_sources.insert(metadata.data_source().to_string());
        }
        if !case_name.is_empty() {
            self.cases.insert(case_name.to_string());
        }
        self.file_instances.push(metadata);
    }

    pub fn instance_count(&self) -> usize {
        self.file_instances.len()
    }

    pub fn instances(&self) -> &[CommonAttributeSearchResult] {
        &self.file_instances
    }

    pub fn data_sources(&self) -> &BTreeSet<String> {
        &self.data_sources
    }

    pub fn cases(&self) -> &BTreeSet<String> {
        &self.cases
    }

    /// Data source names joined for the results table
    pub fn data_sources_display(&self) -> String {
        self.data_sources.iter().cloned().collect::<Vec<_>>().join(", ")
    }

    /// Leaf nodes for every instance. Instances that fail to resolve are
    /// logged and left out.
    pub fn generate_nodes(&self, ctx: &SearchContext<'_>) -> Vec<InstanceNode> {
        let mut nodes = Vec::with_capacity(self.file_instances.len());
        for instance in &self.file_instances {
            match instance.generate_nodes(ctx) {
                Ok(mut generated) => nodes.append(&mut generated),
                Err(e) => warn!(value = %self.value, "Failed to build result node: {}", e),
            }
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commonattr::cache::FileCache;
    use crate::commonattr::testing::*;

    #[test]
    fn test_add_metadata_tracks_sources_and_cases() {
        let cache = FileCache::new();
        let mut value = CommonAttributeValue::new(HASH_A);
        value.add_file_instance_metadata(
            CommonAttributeSearchResult::intra_case(1, cache.clone(), "laptop.E01", "Case One"),
            "Case One",
        );
        value.add_file_instance_metadata(
            CommonAttributeSearchResult::intra_case(2, cache.clone(), "phone.zip", "Case One"),
            "Case One",
        );
        value.add_file_instance_metadata(CommonAttributeSearchResult::inter_case(9, cache), "Case Two");

        assert_eq!(value.value(), HASH_A);
        assert_eq!(value.instance_count(), 3);
        assert_eq!(value.data_sources_display(), "laptop.E01, phone.zip");
        assert_eq!(value.cases().len(), 2);
    }

    #[test]
    fn test_generate_nodes_skips_failures() {
        let mut repo = MemoryRepository::default();
        repo.add_case(1, "Case One");
        repo.add_data_source(10, 1, "laptop.E01");
        repo.add_instance(100, 10, HASH_A, "/a.txt");
        let mut store = MemoryCaseStore::default();
        store.add_file(5, (1, "laptop.E01"), "/b.txt", Some(HASH_A), None);
        let ctx = SearchContext::new(&store, "Case One").with_repository(&repo);

        let cache = FileCache::new();
        let mut value = CommonAttributeValue::new(HASH_A);
        value.add_file_instance_metadata(CommonAttributeSearchResult::inter_case(100, cache.clone()), "Case One");
        value.add_file_instance_metadata(CommonAttributeSearchResult::inter_case(404, cache.clone()), "Case One");
        value.add_file_instance_metadata(
            CommonAttributeSearchResult::intra_case(5, cache, "laptop.E01", "Case One"),
            "Case One",
        );

        let nodes = value.generate_nodes(&ctx);
        assert_eq!(nodes.len(), 2);
        assert!(!nodes[0].is_intra_case());
        assert!(nodes[1].is_intra_case());
    }
}
