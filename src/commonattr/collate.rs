//! Grouping of common attribute occurrences by value and by instance count

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use super::cache::FileCache;
use super::result::CommonAttributeSearchResult;
use super::value::CommonAttributeValue;
use crate::common::is_no_data_md5;
use crate::correlation::{CentralRepository, InterCaseValues};
use crate::error::CorrelationResult;

/// Collated output of a search: instance count -> values with that many instances
#[derive(Debug, Default)]
pub struct CommonAttributeSearchResults {
    instance_count_map: BTreeMap<usize, Vec<CommonAttributeValue>>,
}

impl CommonAttributeSearchResults {
    pub fn new(instance_count_map: BTreeMap<usize, Vec<CommonAttributeValue>>) -> Self {
        Self { instance_count_map }
    }

    pub fn instance_count_map(&self) -> &BTreeMap<usize, Vec<CommonAttributeValue>> {
        &self.instance_count_map
    }

    pub fn into_instance_count_map(self) -> BTreeMap<usize, Vec<CommonAttributeValue>> {
        self.instance_count_map
    }

    /// Total number of file instances across all values
    pub fn size(&self) -> usize {
        self.instance_count_map
            .values()
            .flatten()
            .map(CommonAttributeValue::instance_count)
            .sum()
    }

    /// Number of distinct values
    pub fn value_count(&self) -> usize {
        self.instance_count_map.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.instance_count_map.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &CommonAttributeValue> {
        self.instance_count_map.values().flatten()
    }

    /// Drop values found in more than `max_percentage` percent of the
    /// repository's data sources. Returns how many values were removed.
    /// A value whose frequency cannot be determined is kept.
    pub fn filter_by_frequency(
        &mut self,
        repository: &dyn CentralRepository,
        max_percentage: u8,
    ) -> CorrelationResult<usize> {
        let total = repository.count_unique_data_sources()?;
        if total == 0 {
            return Ok(0);
        }

        let mut removed = 0;
        for values in self.instance_count_map.values_mut() {
            values.retain(|value| {
                match repository.count_data_sources_with_value(value.value()) {
                    Ok(count) => {
                        // count / total > max / 100, kept in integers
                        let keep = count * 100 <= u64::from(max_percentage) * total;
                        if !keep {
                            removed += 1;
                        }
                        keep
                    }
                    Err(e) => {
                        warn!(value = value.value(), "Failed to get value frequency: {}", e);
                        true
                    }
                }
            });
        }
        self.instance_count_map.retain(|_, values| !values.is_empty());

        debug!(removed, max_percentage, "Applied frequency filter");
        Ok(removed)
    }
}

/// Bucket values by how many file instances each has. Values inside a
/// bucket are ordered by value.
pub fn collate_matches_by_number_of_instances(
    common_values: HashMap<String, CommonAttributeValue>,
) -> CommonAttributeSearchResults {
    let mut instance_count_map: BTreeMap<usize, Vec<CommonAttributeValue>> = BTreeMap::new();
    for value in common_values.into_values() {
        instance_count_map
            .entry(value.instance_count())
            .or_default()
            .push(value);
    }
    for values in instance_count_map.values_mut() {
        values.sort_by(|a, b| a.value().cmp(b.value()));
    }
    CommonAttributeSearchResults::new(instance_count_map)
}

/// Group central repository hits by value, then collate by instance count.
///
/// Attributes with no-data values are skipped, and so is any attribute whose
/// case cannot be resolved. Every result shares `cache`.
pub fn gather_intercase_results(
    repository: &dyn CentralRepository,
    common: &InterCaseValues,
    cache: &FileCache,
) -> CommonAttributeSearchResults {
    let mut inter_case_common_files: HashMap<String, CommonAttributeValue> = HashMap::new();

    for (&attribute_id, md5) in &common.values {
        if md5.is_empty() || is_no_data_md5(md5) {
            continue;
        }

        let Some(&case_id) = common.cases.get(&attribute_id) else {
            warn!(attribute_id, "No case recorded for attribute instance");
            continue;
        };

        let case = match repository.get_case_by_id(case_id) {
            Ok(Some(case)) => case,
            Ok(None) => {
                warn!(attribute_id, case_id, "Cannot locate case");
                continue;
            }
            Err(e) => {
                warn!(attribute_id, case_id, "Error getting artifact instances from database: {}", e);
                continue;
            }
        };

        let result = CommonAttributeSearchResult::inter_case(attribute_id, cache.clone());
        inter_case_common_files
            .entry(md5.clone())
            .or_insert_with(|| CommonAttributeValue::new(md5.clone()))
            .add_file_instance_metadata(result, &case.display_name);
    }

    collate_matches_by_number_of_instances(inter_case_common_files)
}
