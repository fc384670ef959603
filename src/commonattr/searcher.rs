//! Common attribute searchers
//!
//! Intra-case searches look only at the open case database. Inter-case
//! searches start from the central repository and resolve hits back into the
//! open case where possible.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, instrument, warn};

use super::cache::FileCache;
use super::collate::{collate_matches_by_number_of_instances, gather_intercase_results, CommonAttributeSearchResults};
use super::mime::MimeFilter;
use super::result::{CommonAttributeSearchResult, SearchContext};
use super::value::CommonAttributeValue;
use crate::case::AbstractFile;
use crate::common::audit::{log_lookup_failure, SearchAuditContext};
use crate::common::is_no_data_md5;
use crate::config::SearchConfig;
use crate::correlation::{require_case, CentralRepository, CorrelationCase};
use crate::error::{CorrelationError, CorrelationResult};

/// Shared behaviour of the intra-case and inter-case searchers
pub trait CommonAttributeSearcher {
    /// Run the search and collate the matches by instance count
    fn find_matches(&self, ctx: &SearchContext<'_>) -> CorrelationResult<CommonAttributeSearchResults>;

    /// Title of the results tab
    fn tab_title(&self) -> String;
}

fn build_tab_title(scope: &str, filter: &MimeFilter) -> String {
    let mut parts = vec![scope];
    parts.extend(filter.title_parts());
    format!("Common Files ({})", parts.join(", "))
}

/// Apply the configured frequency threshold when a repository is available
fn apply_threshold(
    results: &mut CommonAttributeSearchResults,
    ctx: &SearchContext<'_>,
    threshold: Option<u8>,
) {
    let (Some(threshold), Some(repository)) = (threshold, ctx.repository) else {
        return;
    };
    if let Err(e) = results.filter_by_frequency(repository, threshold) {
        warn!("Frequency filter skipped: {}", e);
    }
}

/// Data source picked as the anchor of an intra-case search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceFilter {
    pub id: i64,
    pub name: String,
}

/// Finds files sharing an MD5 across data sources of the open case
#[derive(Debug, Clone)]
pub struct IntraCaseSearcher {
    data_source: Option<DataSourceFilter>,
    filter: MimeFilter,
    percentage_threshold: Option<u8>,
}

impl IntraCaseSearcher {
    /// Values shared by any two data sources
    pub fn all_data_sources(config: &SearchConfig) -> Self {
        Self {
            data_source: None,
            filter: MimeFilter::new(config.filter_by_media, config.filter_by_documents),
            percentage_threshold: config.percentage_threshold,
        }
    }

    /// Values in `data_source` that also appear in another data source
    pub fn single_data_source(data_source: DataSourceFilter, config: &SearchConfig) -> Self {
        Self {
            data_source: Some(data_source),
            ..Self::all_data_sources(config)
        }
    }

    fn group_by_md5(&self, files: Vec<AbstractFile>) -> HashMap<String, Vec<AbstractFile>> {
        let mut groups: HashMap<String, Vec<AbstractFile>> = HashMap::new();
        for file in files {
            let Some(md5) = file.md5.as_deref().map(str::to_ascii_lowercase) else {
                continue;
            };
            if md5.is_empty() || is_no_data_md5(&md5) || !self.filter.allows(file.mime_type.as_deref()) {
                continue;
            }
            groups.entry(md5).or_default().push(file);
        }
        groups
    }

    fn is_common(&self, files: &[AbstractFile]) -> bool {
        let sources: BTreeSet<i64> = files.iter().map(|f| f.data_source_id).collect();
        if sources.len() < 2 {
            return false;
        }
        match &self.data_source {
            Some(selected) => sources.contains(&selected.id),
            None => true,
        }
    }
}

impl CommonAttributeSearcher for IntraCaseSearcher {
    #[instrument(skip_all, fields(title = %self.tab_title()))]
    fn find_matches(&self, ctx: &SearchContext<'_>) -> CorrelationResult<CommonAttributeSearchResults> {
        let audit = SearchAuditContext::new("intra_case");
        let cache = FileCache::new();

        let groups = self.group_by_md5(ctx.case_store.files_with_md5()?);
        let mut common_values: HashMap<String, CommonAttributeValue> = HashMap::new();

        for (md5, files) in groups {
            if !self.is_common(&files) {
                continue;
            }
            let mut value = CommonAttributeValue::new(md5.clone());
            for file in files {
                let result = CommonAttributeSearchResult::intra_case(
                    file.object_id,
                    cache.clone(),
                    file.data_source_name.clone(),
                    ctx.current_case_name,
                );
                // Already loaded, so node generation never goes back to the case db
                cache.insert_loaded(file);
                value.add_file_instance_metadata(result, ctx.current_case_name);
            }
            common_values.insert(md5, value);
        }

        let mut results = collate_matches_by_number_of_instances(common_values);
        apply_threshold(&mut results, ctx, self.percentage_threshold);

        debug!(values = results.value_count(), cached = cache.len(), "Intra-case search finished");
        audit.log_completed(results.value_count(), results.size());
        Ok(results)
    }

    fn tab_title(&self) -> String {
        let scope = match &self.data_source {
            Some(selected) => selected.name.as_str(),
            None => "All Data Sources",
        };
        build_tab_title(scope, &self.filter)
    }
}

/// Finds values in the open case that the central repository also records
/// for other cases
#[derive(Debug, Clone)]
pub struct InterCaseSearcher {
    target_case: Option<CorrelationCase>,
    filter: MimeFilter,
    percentage_threshold: Option<u8>,
}

impl InterCaseSearcher {
    /// Match against every case in the central repository
    pub fn all_cases(config: &SearchConfig) -> Self {
        Self {
            target_case: None,
            filter: MimeFilter::new(config.filter_by_media, config.filter_by_documents),
            percentage_threshold: config.percentage_threshold,
        }
    }

    /// Match only against `target_case`
    pub fn single_case(target_case: CorrelationCase, config: &SearchConfig) -> Self {
        Self {
            target_case: Some(target_case),
            ..Self::all_cases(config)
        }
    }

    /// Match only against the repository case with id `case_id`
    pub fn for_case_id(
        repository: &dyn CentralRepository,
        case_id: i64,
        config: &SearchConfig,
    ) -> CorrelationResult<Self> {
        Ok(Self::single_case(require_case(repository, case_id)?, config))
    }

    /// Drop results whose file resolves in the open case with a MIME type
    /// outside the filter. Unresolved results stay.
    fn apply_mime_filter(&self, results: CommonAttributeSearchResults, ctx: &SearchContext<'_>) -> CommonAttributeSearchResults {
        if !self.filter.is_active() {
            return results;
        }
        let mut kept: HashMap<String, CommonAttributeValue> = HashMap::new();
        for (_, values) in results.into_instance_count_map() {
            for value in values {
                let allowed = value.instances().iter().all(|instance| {
                    match instance.lookup_or_load(ctx) {
                        Ok(Some(file)) => self.filter.allows(file.mime_type.as_deref()),
                        Ok(None) => true,
                        Err(e) => {
                            warn!("Failed to resolve file for MIME filter: {}", e);
                            true
                        }
                    }
                });
                if allowed {
                    kept.insert(value.value().to_string(), value);
                }
            }
        }
        collate_matches_by_number_of_instances(kept)
    }
}

impl CommonAttributeSearcher for InterCaseSearcher {
    #[instrument(skip_all, fields(title = %self.tab_title()))]
    fn find_matches(&self, ctx: &SearchContext<'_>) -> CorrelationResult<CommonAttributeSearchResults> {
        let repository = ctx.repository()?;
        let audit = SearchAuditContext::new("inter_case");

        let current_case = repository
            .get_case_by_name(ctx.current_case_name)?
            .ok_or_else(|| CorrelationError::CaseNotRegistered(ctx.current_case_name.to_string()))?;

        let common = repository.find_intercase_values(current_case.id, self.target_case.as_ref().map(|c| c.id))?;
        for (attribute_id, _) in common.values.iter().filter(|(id, _)| !common.cases.contains_key(*id)) {
            log_lookup_failure(&audit.search_id, *attribute_id, "no case recorded");
        }

        let cache = FileCache::new();
        let results = gather_intercase_results(repository, &common, &cache);
        let mut results = self.apply_mime_filter(results, ctx);
        apply_threshold(&mut results, ctx, self.percentage_threshold);

        debug!(values = results.value_count(), cached = cache.len(), "Inter-case search finished");
        audit.log_completed(results.value_count(), results.size());
        Ok(results)
    }

    fn tab_title(&self) -> String {
        let scope = match &self.target_case {
            Some(case) => case.display_name.as_str(),
            None => "All Central Repository Cases",
        };
        build_tab_title(scope, &self.filter)
    }
}
