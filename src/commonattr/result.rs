//! Search results bound to a single attribute occurrence
//!
//! A result either points at a file in the current case database (intra-case)
//! or only at a central repository record (inter-case). Either way the file is
//! resolved lazily through the search's shared [`FileCache`], so repeated node
//! generation never goes back to the case database for the same file.

use std::cell::OnceCell;
use std::sync::Arc;

use tracing::{debug, warn};

use super::cache::FileCache;
use super::node::{create_instance, InstanceNode, InterCaseInstanceNode, IntraCaseInstanceNode};
use crate::case::{AbstractFile, CaseFileStore};
use crate::common::eq_ignore_case;
use crate::correlation::{CentralRepository, CorrelationAttributeInstance};
use crate::error::{CorrelationError, CorrelationResult};

/// Collaborators a result needs to resolve itself
#[derive(Clone, Copy)]
pub struct SearchContext<'a> {
    pub repository: Option<&'a dyn CentralRepository>,
    pub case_store: &'a dyn CaseFileStore,
    pub current_case_name: &'a str,
}

impl<'a> SearchContext<'a> {
    pub fn new(case_store: &'a dyn CaseFileStore, current_case_name: &'a str) -> Self {
        Self {
            repository: None,
            case_store,
            current_case_name,
        }
    }

    pub fn with_repository(mut self, repository: &'a dyn CentralRepository) -> Self {
        self.repository = Some(repository);
        self
    }

    pub(crate) fn repository(&self) -> CorrelationResult<&'a dyn CentralRepository> {
        self.repository.ok_or(CorrelationError::RepositoryUnavailable)
    }
}

#[derive(Debug)]
enum ResultSource {
    IntraCase {
        object_id: i64,
        case_name: String,
        data_source: String,
    },
    InterCase {
        attribute_id: i64,
        attribute: OnceCell<CorrelationAttributeInstance>,
        /// Object id of the equivalent file once looked up; `None` inside
        /// means the lookup ran and found nothing
        resolved: OnceCell<Option<i64>>,
    },
}

#[derive(Debug)]
pub struct CommonAttributeSearchResult {
    source: ResultSource,
    cache: FileCache,
}

impl CommonAttributeSearchResult {
    /// Result for an attribute found on a file in the current case database
    pub fn intra_case(
        object_id: i64,
        cache: FileCache,
        data_source: impl Into<String>,
        case_name: impl Into<String>,
    ) -> Self {
        Self {
            source: ResultSource::IntraCase {
                object_id,
                case_name: case_name.into(),
                data_source: data_source.into(),
            },
            cache,
        }
    }

    /// Result for an attribute known from the central repository
    pub fn inter_case(attribute_id: i64, cache: FileCache) -> Self {
        Self {
            source: ResultSource::InterCase {
                attribute_id,
                attribute: OnceCell::new(),
                resolved: OnceCell::new(),
            },
            cache,
        }
    }

    /// Case where the attribute appears; empty for inter-case results
    pub fn case_name(&self) -> &str {
        match &self.source {
            ResultSource::IntraCase { case_name, .. } => case_name,
            ResultSource::InterCase { .. } => "",
        }
    }

    /// Data source where the attribute appears; empty for inter-case results
    pub fn data_source(&self) -> &str {
        match &self.source {
            ResultSource::IntraCase { data_source, .. } => data_source,
            ResultSource::InterCase { .. } => "",
        }
    }

    /// Object id of the equivalent file, if known without a lookup
    pub fn object_id(&self) -> Option<i64> {
        match &self.source {
            ResultSource::IntraCase { object_id, .. } => Some(*object_id),
            ResultSource::InterCase { resolved, .. } => resolved.get().copied().flatten(),
        }
    }

    pub fn attribute_id(&self) -> Option<i64> {
        match &self.source {
            ResultSource::IntraCase { .. } => None,
            ResultSource::InterCase { attribute_id, .. } => Some(*attribute_id),
        }
    }

    pub fn is_inter_case(&self) -> bool {
        matches!(self.source, ResultSource::InterCase { .. })
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    /// Return the cached file for this result, loading it from the case
    /// database on first use
    pub fn lookup_or_load(&self, ctx: &SearchContext<'_>) -> CorrelationResult<Option<Arc<AbstractFile>>> {
        match &self.source {
            ResultSource::IntraCase { object_id, .. } => self
                .cache
                .get_or_try_load(*object_id, || ctx.case_store.get_file_by_id(*object_id)),
            ResultSource::InterCase { resolved, .. } => {
                if let Some(previous) = resolved.get() {
                    return Ok((*previous).and_then(|id| self.cache.get(id)));
                }
                let file = self.load_equivalent_file(ctx)?;
                let _ = resolved.set(file.as_ref().map(|f| f.object_id));
                Ok(file)
            }
        }
    }

    fn attribute<'s>(&'s self, ctx: &SearchContext<'_>) -> CorrelationResult<&'s CorrelationAttributeInstance> {
        let ResultSource::InterCase { attribute_id, attribute, .. } = &self.source else {
            return Err(CorrelationError::AttributeNotFound(-1));
        };
        if let Some(found) = attribute.get() {
            return Ok(found);
        }
        let found = ctx
            .repository()?
            .get_attribute_instance(*attribute_id)?
            .ok_or(CorrelationError::AttributeNotFound(*attribute_id))?;
        Ok(attribute.get_or_init(|| found))
    }

    /// Find the file in the current case that the correlation record describes.
    /// Only records from the current case can have one.
    fn load_equivalent_file(&self, ctx: &SearchContext<'_>) -> CorrelationResult<Option<Arc<AbstractFile>>> {
        let attribute = self.attribute(ctx)?;
        if !eq_ignore_case(&attribute.case.display_name, ctx.current_case_name) {
            return Ok(None);
        }

        let (parent_path, name) = attribute.parent_path_and_name();
        let candidates = ctx
            .case_store
            .find_files(&attribute.data_source.name, &parent_path, &name)?;
        if candidates.len() > 1 {
            debug!(
                attribute_id = attribute.id,
                matches = candidates.len(),
                "Multiple equivalent files, using the first"
            );
        }
        Ok(candidates
            .into_iter()
            .next()
            .map(|file| self.cache.insert_loaded(file)))
    }

    /// Build the leaf nodes displayed for this result
    pub fn generate_nodes(&self, ctx: &SearchContext<'_>) -> CorrelationResult<Vec<InstanceNode>> {
        match &self.source {
            ResultSource::IntraCase { object_id, case_name, data_source } => {
                match self.lookup_or_load(ctx)? {
                    Some(file) => Ok(vec![InstanceNode::IntraCase(IntraCaseInstanceNode {
                        file,
                        case_name: case_name.clone(),
                        data_source: data_source.clone(),
                    })]),
                    None => {
                        warn!(object_id, "File no longer present in case database");
                        Ok(Vec::new())
                    }
                }
            }
            ResultSource::InterCase { .. } => {
                let attribute = self.attribute(ctx)?;
                let node = match self.lookup_or_load(ctx)? {
                    Some(file) => create_instance(attribute, &file, ctx.current_case_name),
                    None => InstanceNode::InterCase(InterCaseInstanceNode {
                        attribute: attribute.clone(),
                        file: None,
                    }),
                };
                Ok(vec![node])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commonattr::testing::*;

    fn fixture() -> (MemoryRepository, MemoryCaseStore) {
        let mut repo = MemoryRepository::default();
        repo.add_case(1, "Case One");
        repo.add_case(2, "Case Two");
        repo.add_data_source(10, 1, "laptop.E01");
        repo.add_data_source(20, 2, "server.E01");
        repo.add_instance(100, 10, HASH_A, "\\Users\\bob\\a.txt");
        repo.add_instance(101, 20, HASH_A, "/srv/a.txt");
        repo.add_instance(102, 10, HASH_B, "/Users/bob/gone.txt");

        let mut store = MemoryCaseStore::default();
        store.add_file(7, (1, "laptop.E01"), "/Users/bob/a.txt", Some(HASH_A), None);
        (repo, store)
    }

    #[test]
    fn test_intra_case_uses_cache() {
        let (_, store) = fixture();
        let ctx = SearchContext::new(&store, "Case One");
        let cache = FileCache::new();
        let first = CommonAttributeSearchResult::intra_case(7, cache.clone(), "laptop.E01", "Case One");
        let second = CommonAttributeSearchResult::intra_case(7, cache.clone(), "laptop.E01", "Case One");

        assert_eq!(first.lookup_or_load(&ctx).unwrap().unwrap().name, "a.txt");
        assert_eq!(second.lookup_or_load(&ctx).unwrap().unwrap().name, "a.txt");
        assert_eq!(store.id_lookups.get(), 1);
        assert_eq!(first.case_name(), "Case One");
        assert_eq!(first.data_source(), "laptop.E01");
        assert_eq!(first.object_id(), Some(7));
    }

    #[test]
    fn test_inter_case_resolves_to_live_file() {
        let (repo, store) = fixture();
        let ctx = SearchContext::new(&store, "Case One").with_repository(&repo);
        let result = CommonAttributeSearchResult::inter_case(100, FileCache::new());

        assert_eq!(result.object_id(), None);
        assert_eq!(result.case_name(), "");
        let nodes = result.generate_nodes(&ctx).unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].is_intra_case());
        assert_eq!(result.object_id(), Some(7));

        // Second pass is served from the cache and the memoized record
        result.generate_nodes(&ctx).unwrap();
        assert_eq!(store.path_lookups.get(), 1);
        assert_eq!(repo.attribute_lookups.get(), 1);
    }

    #[test]
    fn test_inter_case_other_case_has_no_file() {
        let (repo, store) = fixture();
        let ctx = SearchContext::new(&store, "Case One").with_repository(&repo);
        let result = CommonAttributeSearchResult::inter_case(101, FileCache::new());

        let nodes = result.generate_nodes(&ctx).unwrap();
        match &nodes[0] {
            InstanceNode::InterCase(node) => {
                assert!(node.file.is_none());
                assert_eq!(node.attribute.case.display_name, "Case Two");
            }
            other => panic!("unexpected node {:?}", other),
        }
        assert_eq!(store.path_lookups.get(), 0);
    }

    #[test]
    fn test_inter_case_missing_file() {
        let (repo, store) = fixture();
        let ctx = SearchContext::new(&store, "Case One").with_repository(&repo);
        let result = CommonAttributeSearchResult::inter_case(102, FileCache::new());

        assert!(result.lookup_or_load(&ctx).unwrap().is_none());
        assert!(result.lookup_or_load(&ctx).unwrap().is_none());
        assert_eq!(store.path_lookups.get(), 1);
        assert!(!result.generate_nodes(&ctx).unwrap()[0].is_intra_case());
    }

    #[test]
    fn test_inter_case_requires_repository() {
        let (_, store) = fixture();
        let ctx = SearchContext::new(&store, "Case One");
        let result = CommonAttributeSearchResult::inter_case(100, FileCache::new());
        assert!(matches!(
            result.generate_nodes(&ctx),
            Err(CorrelationError::RepositoryUnavailable)
        ));
    }

    #[test]
    fn test_unknown_attribute() {
        let (repo, store) = fixture();
        let ctx = SearchContext::new(&store, "Case One").with_repository(&repo);
        let result = CommonAttributeSearchResult::inter_case(999, FileCache::new());
        assert!(matches!(
            result.lookup_or_load(&ctx),
            Err(CorrelationError::AttributeNotFound(999))
        ));
    }
}
