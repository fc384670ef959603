//! Local files data source selection
//!
//! State behind the "add local files / directories" wizard step: the set of
//! chosen paths, validation of those paths, and change notifications to the
//! hosting wizard.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::case::CaseType;
use crate::common::audit::log_data_sources_selected;

/// Separator used when the selection is handed to the data source processor
pub const FILES_SEP: &str = ",";

/// Shown when a multi-user case would read its data source from a local drive
pub const C_DRIVE_ERROR: &str =
    "Warning: Path to multi-user data source is on \"C:\" drive";

const EVENT_CAPACITY: usize = 16;

/// Notifications sent to the hosting wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
    /// Selection changed; the wizard should re-validate and refresh buttons
    UpdateUi,
}

/// External check for data source paths, e.g. one that knows which shares
/// are visible to every node of a multi-user cluster
pub trait WizardPathValidator {
    /// `Err` carries the message shown to the user
    fn validate_data_source_path(&self, path: &str) -> Result<(), String>;
}

/// Outcome of validating the selected paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathValidation {
    Valid,
    /// Nothing selected yet; no message is shown
    Empty,
    Invalid(String),
}

fn drive_letter_regex() -> &'static Regex {
    static DRIVE_LETTER: OnceLock<Regex> = OnceLock::new();
    DRIVE_LETTER.get_or_init(|| Regex::new(r"^[Cc]:.*$").expect("Invalid drive letter regex"))
}

/// Whether the path is on the `C:` drive
pub fn path_on_c_drive(path: &str) -> bool {
    drive_letter_regex().is_match(path)
}

/// Validate data source paths. When validators are registered the first one
/// decides; otherwise multi-user cases reject paths on `C:`.
pub fn validate_data_source_paths<'a, I>(
    paths: I,
    validators: &[Box<dyn WizardPathValidator>],
    case_type: CaseType,
) -> PathValidation
where
    I: IntoIterator<Item = &'a str>,
{
    let mut any = false;
    for path in paths {
        if path.is_empty() {
            continue;
        }
        any = true;

        if let Some(validator) = validators.first() {
            if let Err(message) = validator.validate_data_source_path(path) {
                if !message.is_empty() {
                    return PathValidation::Invalid(message);
                }
            }
        } else if case_type == CaseType::MultiUser && path_on_c_drive(path) {
            return PathValidation::Invalid(C_DRIVE_ERROR.to_string());
        }
    }

    if any {
        PathValidation::Valid
    } else {
        PathValidation::Empty
    }
}

/// Local files and directories chosen for a new data source
pub struct LocalFilesSelection {
    current_files: BTreeSet<PathBuf>,
    enable_next: bool,
    error_message: Option<String>,
    validators: Vec<Box<dyn WizardPathValidator>>,
    events: broadcast::Sender<PanelEvent>,
}

impl Default for LocalFilesSelection {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalFilesSelection {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            current_files: BTreeSet::new(),
            enable_next: false,
            error_message: None,
            validators: Vec::new(),
            events,
        }
    }

    pub fn with_validator(mut self, validator: Box<dyn WizardPathValidator>) -> Self {
        self.validators.push(validator);
        self
    }

    /// Receive selection change events; drop the receiver to stop listening
    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.events.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// Add files or directories chosen by the user. Duplicates are ignored.
    pub fn add_files<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut added = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let absolute = std::path::absolute(path).unwrap_or_else(|e| {
                warn!("Failed to make {:?} absolute: {}", path, e);
                path.to_path_buf()
            });
            if self.current_files.insert(absolute.clone()) {
                added.push(absolute);
            }
        }
        if !added.is_empty() {
            log_data_sources_selected(&added);
        }

        self.enable_next = !self.current_files.is_empty();
        self.fire(PanelEvent::UpdateUi);
    }

    fn fire(&self, event: PanelEvent) {
        if let Err(e) = self.events.send(event) {
            debug!("No listener for {:?}: {}", event, e);
        }
    }

    /// Selected paths, each followed by [`FILES_SEP`]
    pub fn content_paths(&self) -> String {
        let mut paths = String::new();
        for file in &self.current_files {
            paths.push_str(&file.to_string_lossy());
            paths.push_str(FILES_SEP);
        }
        paths
    }

    /// One path per line, for display
    pub fn selected_paths_text(&self) -> String {
        self.current_files
            .iter()
            .map(|f| format!("{}\n", f.display()))
            .collect()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.current_files.iter().cloned().collect()
    }

    pub fn is_next_enabled(&self) -> bool {
        self.enable_next
    }

    /// Inline error shown under the selection, if any
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Whether the wizard may advance
    pub fn validate_panel(&mut self, case_type: CaseType) -> bool {
        if !self.is_image_path_valid(case_type) {
            return false;
        }
        self.enable_next
    }

    fn is_image_path_valid(&mut self, case_type: CaseType) -> bool {
        self.error_message = None;

        let paths: Vec<String> = self
            .current_files
            .iter()
            .map(|f| f.to_string_lossy().into_owned())
            .collect();

        match validate_data_source_paths(paths.iter().map(String::as_str), &self.validators, case_type) {
            PathValidation::Valid => true,
            PathValidation::Empty => false,
            PathValidation::Invalid(message) => {
                warn!(error = %message, "Data source path rejected");
                self.error_message = Some(message);
                false
            }
        }
    }

    /// Called when the wizard step is shown
    pub fn select(&mut self) {
        self.reset();
    }

    pub fn reset(&mut self) {
        self.current_files.clear();
        self.enable_next = false;
        self.error_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct RejectAll(&'static str);

    impl WizardPathValidator for RejectAll {
        fn validate_data_source_path(&self, _path: &str) -> Result<(), String> {
            Err(self.0.to_string())
        }
    }

    struct AcceptAll;

    impl WizardPathValidator for AcceptAll {
        fn validate_data_source_path(&self, _path: &str) -> Result<(), String> {
            Ok(())
        }
    }

    #[test]
    fn test_c_drive_pattern() {
        assert!(path_on_c_drive("C:\\evidence"));
        assert!(path_on_c_drive("c:/evidence"));
        assert!(!path_on_c_drive("D:\\evidence"));
        assert!(!path_on_c_drive("\\\\server\\C:\\share"));
    }

    #[test]
    fn test_validation_rules() {
        let none: Vec<Box<dyn WizardPathValidator>> = Vec::new();
        assert_eq!(
            validate_data_source_paths(Vec::<&str>::new(), &none, CaseType::MultiUser),
            PathValidation::Empty
        );
        assert_eq!(
            validate_data_source_paths(["", ""], &none, CaseType::MultiUser),
            PathValidation::Empty
        );
        assert_eq!(
            validate_data_source_paths(["D:\\a", "C:\\b"], &none, CaseType::MultiUser),
            PathValidation::Invalid(C_DRIVE_ERROR.to_string())
        );
        assert_eq!(
            validate_data_source_paths(["C:\\b"], &none, CaseType::SingleUser),
            PathValidation::Valid
        );
    }

    #[test]
    fn test_first_validator_takes_precedence() {
        let validators: Vec<Box<dyn WizardPathValidator>> =
            vec![Box::new(AcceptAll), Box::new(RejectAll("never used"))];
        // A registered validator replaces the built-in drive check
        assert_eq!(
            validate_data_source_paths(["C:\\b"], &validators, CaseType::MultiUser),
            PathValidation::Valid
        );

        let validators: Vec<Box<dyn WizardPathValidator>> = vec![Box::new(RejectAll("not shared"))];
        assert_eq!(
            validate_data_source_paths(["/mnt/share/a"], &validators, CaseType::SingleUser),
            PathValidation::Invalid("not shared".to_string())
        );

        // An empty message counts as success
        let validators: Vec<Box<dyn WizardPathValidator>> = vec![Box::new(RejectAll(""))];
        assert_eq!(
            validate_data_source_paths(["/mnt/share/a"], &validators, CaseType::SingleUser),
            PathValidation::Valid
        );
    }

    #[test]
    fn test_selection_deduplicates_and_formats() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.txt");
        let b = temp.path().join("dir");

        let mut selection = LocalFilesSelection::new();
        assert_eq!(selection.content_paths(), "");
        assert!(!selection.validate_panel(CaseType::SingleUser));
        assert!(selection.error_message().is_none());

        selection.add_files([&a, &b]);
        selection.add_files([&a]);
        assert_eq!(selection.paths().len(), 2);
        assert_eq!(
            selection.content_paths(),
            format!("{}{}{}{}", a.display(), FILES_SEP, b.display(), FILES_SEP)
        );
        assert_eq!(selection.selected_paths_text().lines().count(), 2);
        assert!(selection.is_next_enabled());
        assert!(selection.validate_panel(CaseType::SingleUser));
    }

    #[test]
    fn test_relative_paths_made_absolute() {
        let mut selection = LocalFilesSelection::new();
        selection.add_files(["relative/file.bin"]);
        assert!(selection.paths()[0].is_absolute());
    }

    #[test]
    fn test_validator_error_is_shown_until_reset() {
        let mut selection =
            LocalFilesSelection::new().with_validator(Box::new(RejectAll("Path is not on a shared drive")));
        selection.add_files(["/evidence/a.dd"]);

        assert!(!selection.validate_panel(CaseType::MultiUser));
        assert_eq!(selection.error_message(), Some("Path is not on a shared drive"));

        selection.reset();
        assert!(selection.error_message().is_none());
        assert!(!selection.is_next_enabled());
        assert!(selection.paths().is_empty());
    }

    #[test]
    fn test_listeners_notified() {
        let mut selection = LocalFilesSelection::new();
        // No listener yet; publishing must not fail
        selection.add_files(["/evidence/a.dd"]);

        let mut rx = selection.subscribe();
        assert_eq!(selection.listener_count(), 1);
        selection.add_files(["/evidence/b.dd"]);
        assert_eq!(rx.try_recv().unwrap(), PanelEvent::UpdateUi);
        assert!(rx.try_recv().is_err());

        drop(rx);
        assert_eq!(selection.listener_count(), 0);
    }

    #[test]
    fn test_select_resets() {
        let mut selection = LocalFilesSelection::new();
        selection.add_files(["/evidence/a.dd"]);
        selection.select();
        assert!(selection.paths().is_empty());
        assert!(!selection.validate_panel(CaseType::SingleUser));
    }
}
