//! Leaf nodes of the common attribute results tree
//!
//! A hit that maps onto a live file in the open case gets an
//! [`InstanceNode::IntraCase`] node, which supports the full content viewer.
//! Anything known only through the central repository gets an
//! [`InstanceNode::InterCase`] node carrying the correlation record.

use std::sync::Arc;

use serde::Serialize;

use crate::case::AbstractFile;
use crate::common::{eq_ignore_case, normalize_path};
use crate::correlation::CorrelationAttributeInstance;

#[derive(Debug, Clone, Serialize)]
pub struct IntraCaseInstanceNode {
    pub file: Arc<AbstractFile>,
    pub case_name: String,
    pub data_source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterCaseInstanceNode {
    pub attribute: CorrelationAttributeInstance,
    /// Equivalent file in the open case, when one was found
    pub file: Option<Arc<AbstractFile>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InstanceNode {
    IntraCase(IntraCaseInstanceNode),
    InterCase(InterCaseInstanceNode),
}

impl InstanceNode {
    pub fn is_intra_case(&self) -> bool {
        matches!(self, InstanceNode::IntraCase(_))
    }

    pub fn case_name(&self) -> &str {
        match self {
            InstanceNode::IntraCase(node) => &node.case_name,
            InstanceNode::InterCase(node) => &node.attribute.case.display_name,
        }
    }

    pub fn data_source(&self) -> &str {
        match self {
            InstanceNode::IntraCase(node) => &node.data_source,
            InstanceNode::InterCase(node) => &node.attribute.data_source.name,
        }
    }

    /// Path shown in the results table
    pub fn path(&self) -> String {
        match self {
            InstanceNode::IntraCase(node) => node.file.full_path(),
            InstanceNode::InterCase(node) => normalize_path(&node.attribute.file_path),
        }
    }

    pub fn file(&self) -> Option<&Arc<AbstractFile>> {
        match self {
            InstanceNode::IntraCase(node) => Some(&node.file),
            InstanceNode::InterCase(node) => node.file.as_ref(),
        }
    }
}

/// Pick the node type for a correlation record and its candidate file.
///
/// Case name, full path (with `\` normalized to `/`) and data source name are
/// compared case-insensitively; only a match on all three yields an
/// intra-case node.
pub fn create_instance(
    attribute: &CorrelationAttributeInstance,
    equivalent_file: &Arc<AbstractFile>,
    current_case_name: &str,
) -> InstanceNode {
    let attribute_full_path = normalize_path(&attribute.file_path);
    let file_full_path = normalize_path(&equivalent_file.full_path());

    let same_case = eq_ignore_case(&attribute.case.display_name, current_case_name);
    let same_file_name = eq_ignore_case(&attribute_full_path, &file_full_path);
    let same_data_source = eq_ignore_case(&attribute.data_source.name, &equivalent_file.data_source_name);

    if same_case && same_file_name && same_data_source {
        InstanceNode::IntraCase(IntraCaseInstanceNode {
            file: Arc::clone(equivalent_file),
            case_name: current_case_name.to_string(),
            data_source: equivalent_file.data_source_name.clone(),
        })
    } else {
        InstanceNode::InterCase(InterCaseInstanceNode {
            attribute: attribute.clone(),
            file: Some(Arc::clone(equivalent_file)),
        })
    }
}
