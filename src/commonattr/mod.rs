//! Common attribute search
//!
//! Finds files that share an attribute value (an MD5 hash) across the data
//! sources of the open case or across every case in the central repository,
//! and turns the hits into result tree leaves.

pub mod cache;
pub mod collate;
pub mod mime;
pub mod node;
pub mod result;
pub mod searcher;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::FileCache;
pub use collate::{collate_matches_by_number_of_instances, gather_intercase_results, CommonAttributeSearchResults};
pub use mime::MimeFilter;
pub use node::{create_instance, InstanceNode, InterCaseInstanceNode, IntraCaseInstanceNode};
pub use result::{CommonAttributeSearchResult, SearchContext};
pub use searcher::{CommonAttributeSearcher, DataSourceFilter, InterCaseSearcher, IntraCaseSearcher};
pub use value::CommonAttributeValue;
