use tracing::{debug, info, warn};

use crate::api::{AnalysisBackend, AnalyzeRequest, AnalyzeResponse, PackageRequest, SelectedPath};
use crate::db::LastAnalysis;
use crate::panels::PanelLayout;
use crate::paths::{looks_like_uuid, package_relative_path, strip_session_prefix, zip_name_from_url};
use crate::results::{AnalysisResultRecord, ResultStore};
use crate::session::{failure_message, Navigation, Notice, Outcome, ReturnState, DEFAULT_ARCHIVE_NAME};
use crate::tree::{adapt, is_java, FileTree, TreeViewNode};
use crate::viewer::{ImageHint, ImageViewer, ListenerRegistry};

/// Contents of the method-source panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourcePanel {
    #[default]
    Empty,
    Source(String),
    Error(String),
}

impl SourcePanel {
    pub fn source(&self) -> Option<&str> {
        match self {
            SourcePanel::Source(src) => Some(src),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SourcePanel::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Controller for the analysis view of one session.
///
/// Flow: select a Java file (lists its methods), select a method, show its
/// source, analyze paths, toggle paths, confirm to package them.
#[derive(Debug)]
pub struct AnalysisController {
    session_id: String,
    file_tree: Option<FileTree>,
    archive_name: Option<String>,
    tree: Vec<TreeViewNode>,
    selected_file: Option<String>,
    methods: Vec<String>,
    selected_method: Option<String>,
    source: SourcePanel,
    analysis: Option<AnalyzeResponse>,
    selected_paths: Vec<SelectedPath>,
    loading_methods: bool,
    loading_source: bool,
    analyzing: bool,
    packaging: bool,
    layout: PanelLayout,
}

impl AnalysisController {
    pub fn new(session_id: impl Into<String>, file_tree: Option<FileTree>) -> Self {
        let tree = file_tree.as_ref().map(adapt).unwrap_or_default();
        Self {
            session_id: session_id.into(),
            file_tree,
            archive_name: None,
            tree,
            selected_file: None,
            methods: Vec::new(),
            selected_method: None,
            source: SourcePanel::Empty,
            analysis: None,
            selected_paths: Vec::new(),
            loading_methods: false,
            loading_source: false,
            analyzing: false,
            packaging: false,
            layout: PanelLayout::default(),
        }
    }

    /// Builder-style helper to attach the uploaded archive's file name.
    pub fn with_archive_name(mut self, archive_name: Option<String>) -> Self {
        self.archive_name = archive_name;
        self
    }

    /// The view is only usable with both a session id and a file tree.
    pub fn is_ready(&self) -> bool {
        !self.session_id.is_empty() && self.file_tree.is_some()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn tree(&self) -> &[TreeViewNode] {
        &self.tree
    }

    pub fn selected_file(&self) -> Option<&str> {
        self.selected_file.as_deref()
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn selected_method(&self) -> Option<&str> {
        self.selected_method.as_deref()
    }

    pub fn source(&self) -> &SourcePanel {
        &self.source
    }

    pub fn analysis(&self) -> Option<&AnalyzeResponse> {
        self.analysis.as_ref()
    }

    pub fn selected_paths(&self) -> &[SelectedPath] {
        &self.selected_paths
    }

    pub fn is_loading_methods(&self) -> bool {
        self.loading_methods
    }

    pub fn is_loading_source(&self) -> bool {
        self.loading_source
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn is_packaging(&self) -> bool {
        self.packaging
    }

    pub fn layout(&self) -> &PanelLayout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut PanelLayout {
        &mut self.layout
    }

    fn selected_java_file(&self) -> Option<&str> {
        self.selected_file.as_deref().filter(|path| is_java(path))
    }

    /// Selected file relative to the session's upload root.
    pub fn relative_selected_file(&self) -> Option<&str> {
        self.selected_file.as_deref().map(|path| strip_session_prefix(path, &self.session_id))
    }

    /// Whether the method dropdown / source button are usable.
    pub fn can_choose_method(&self) -> bool {
        self.selected_java_file().is_some() && !self.loading_methods
    }

    pub fn can_analyze(&self) -> bool {
        self.source.source().is_some_and(|s| !s.is_empty()) && !self.analyzing
    }

    pub fn can_package(&self) -> bool {
        !self.selected_paths.is_empty() && !self.packaging
    }

    /// Select a tree node by id.
    pub fn select_node(&mut self, backend: &dyn AnalysisBackend, id: &str) -> Outcome {
        match crate::tree::find(&self.tree, id) {
            Some(node) if !node.is_dir => {
                let path = node.path.clone().unwrap_or_else(|| node.id.clone());
                self.select_file(backend, &path)
            }
            _ => Outcome::Ignored,
        }
    }

    /// Select a file. Java files also get their method list fetched.
    pub fn select_file(&mut self, backend: &dyn AnalysisBackend, path: &str) -> Outcome {
        if self.loading_methods {
            return Outcome::Busy;
        }
        self.selected_file = Some(path.to_string());
        self.selected_method = None;
        self.source = SourcePanel::Empty;
        self.methods.clear();

        if !is_java(path) {
            return Outcome::Done;
        }
        let relative = strip_session_prefix(path, &self.session_id).to_string();
        debug!(selected = path, relative = %relative, "file selected");
        self.list_methods(backend, &relative)
    }

    fn list_methods(&mut self, backend: &dyn AnalysisBackend, relative: &str) -> Outcome {
        self.loading_methods = true;
        let result = backend.list_methods(&self.session_id, relative);
        self.loading_methods = false;

        match result {
            Ok(methods) => {
                info!(file = relative, count = methods.len(), "methods listed");
                self.methods = methods;
                Outcome::Done
            }
            Err(err) => {
                warn!(file = relative, error = %err, "listing methods failed");
                self.methods.clear();
                let msg = failure_message("Failed to list methods", &err);
                self.source = SourcePanel::Error(msg.clone());
                Outcome::Notice(Notice::Inline(msg))
            }
        }
    }

    /// Choose a method from the dropdown. Clears any shown source.
    pub fn select_method(&mut self, method: &str) -> Outcome {
        if !self.can_choose_method() {
            return Outcome::Ignored;
        }
        self.selected_method = (!method.is_empty()).then(|| method.to_string());
        self.source = SourcePanel::Empty;
        Outcome::Done
    }

    /// Fetch and show the selected method's source.
    pub fn show_source(&mut self, backend: &dyn AnalysisBackend) -> Outcome {
        if self.loading_source {
            return Outcome::Busy;
        }
        let (Some(_), Some(method)) = (self.selected_java_file(), self.selected_method.clone())
        else {
            return Outcome::Ignored;
        };
        let relative = self.relative_selected_file().unwrap_or_default().to_string();

        self.loading_source = true;
        self.source = SourcePanel::Empty;
        let result = backend.method_source(&self.session_id, &relative, &method);
        self.loading_source = false;

        match result {
            Ok(source) => {
                self.source =
                    if source.is_empty() { SourcePanel::Empty } else { SourcePanel::Source(source) };
                Outcome::Done
            }
            Err(err) => {
                warn!(file = %relative, method = %method, error = %err, "fetching source failed");
                let msg = failure_message("Failed to fetch source", &err);
                self.source = SourcePanel::Error(msg.clone());
                Outcome::Notice(Notice::Inline(msg))
            }
        }
    }

    /// Run path analysis for the current selection.
    ///
    /// Any previously shown result and path selection is cleared first, so a
    /// failed analysis never leaves stale data on screen.
    pub fn analyze(&mut self, backend: &dyn AnalysisBackend) -> Outcome {
        if self.analyzing {
            return Outcome::Busy;
        }
        if !self.can_analyze() {
            return Outcome::Ignored;
        }

        self.analyzing = true;
        self.analysis = None;
        self.selected_paths.clear();
        let request = AnalyzeRequest {
            session_id: self.session_id.clone(),
            file_path: self.relative_selected_file().map(str::to_string),
            method_name: self.selected_method.clone(),
        };
        let result = backend.analyze_paths(&request);
        self.analyzing = false;

        match result {
            Ok(response) => {
                info!(paths = response.paths.len(), "path analysis complete");
                self.analysis = Some(response);
                Outcome::Done
            }
            Err(err) => {
                warn!(error = %err, "path analysis failed");
                Outcome::Notice(Notice::Alert(failure_message("Analysis failed", &err)))
            }
        }
    }

    /// Snapshot of the current analysis, for persisting across processes.
    pub fn last_analysis(&self) -> Option<LastAnalysis> {
        self.analysis.as_ref().map(|response| LastAnalysis {
            file_path: self.selected_file.clone(),
            method_name: self.selected_method.clone(),
            response: response.clone(),
        })
    }

    /// Restore a previously saved analysis without contacting the backend.
    pub fn restore_analysis(&mut self, last: LastAnalysis) {
        self.selected_file = last.file_path;
        self.selected_method = last.method_name;
        self.analysis = Some(last.response);
        self.selected_paths.clear();
    }

    /// Toggle selection of the path at `index`. Returns whether it is now selected.
    pub fn toggle_path(&mut self, index: usize) -> Option<bool> {
        let entry = self.analysis.as_ref()?.paths.get(index)?.selection();
        match self.selected_paths.iter().position(|p| *p == entry) {
            Some(pos) => {
                self.selected_paths.remove(pos);
                Some(false)
            }
            None => {
                self.selected_paths.push(entry);
                Some(true)
            }
        }
    }

    pub fn is_path_selected(&self, index: usize) -> bool {
        self.analysis
            .as_ref()
            .and_then(|a| a.paths.get(index))
            .is_some_and(|entry| self.selected_paths.contains(&entry.selection()))
    }

    /// Name of the uploaded archive for display.
    ///
    /// Falls back to the tree's root name, then the first top-level
    /// directory. UUID-shaped names are session directories, not archive
    /// names, and are replaced with a generic label.
    pub fn original_file_name(&self) -> String {
        let from_tree = || {
            let tree = self.file_tree.as_ref()?;
            tree.root_name().map(str::to_string).or_else(|| {
                tree.top_level()
                    .iter()
                    .find(|child| child.is_effective_dir() && !child.name.is_empty())
                    .map(|child| child.name.clone())
            })
        };
        let name = self.archive_name.clone().filter(|n| !n.is_empty()).or_else(from_tree);
        match name {
            Some(name) if !looks_like_uuid(&name) => name,
            _ => DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }

    /// Package the selected paths, record the package in `store`, and
    /// navigate back to the upload view.
    pub fn confirm_save(
        &mut self,
        backend: &dyn AnalysisBackend,
        store: &mut dyn ResultStore,
    ) -> Outcome {
        if self.packaging {
            return Outcome::Busy;
        }
        if self.session_id.is_empty() || self.selected_paths.is_empty() {
            return Outcome::Ignored;
        }

        let relative = |value: &Option<String>| {
            value
                .as_deref()
                .map(|v| package_relative_path(v, &self.session_id).to_string())
                .filter(|v| !v.is_empty())
        };
        let selected: Vec<SelectedPath> = self
            .selected_paths
            .iter()
            .map(|p| SelectedPath { png: relative(&p.png), json: relative(&p.json), dot: relative(&p.dot) })
            .collect();
        let request = PackageRequest { session_id: self.session_id.clone(), selected_paths: selected };

        self.packaging = true;
        let result = backend.package(&request);
        self.packaging = false;

        let zip_url = match result {
            Ok(url) => url,
            Err(err) => {
                warn!(error = %err, "packaging failed");
                return Outcome::Notice(Notice::Alert(failure_message("Packaging failed", &err)));
            }
        };

        let zip_name = zip_name_from_url(&zip_url).to_string();
        let file_name = self.original_file_name();
        let method_name = self.selected_method.clone().unwrap_or_default();
        let timestamp = chrono::Utc::now().to_rfc3339();
        let record = AnalysisResultRecord {
            zip_url: zip_url.clone(),
            zip_name: zip_name.clone(),
            file_name: file_name.clone(),
            method_name: method_name.clone(),
            file_path: self.relative_selected_file().unwrap_or_default().to_string(),
            unique_id: crate::results::derive_unique_id(&method_name, &timestamp),
            timestamp,
            selected_paths_count: request.selected_paths.len(),
            paths_info: request.selected_paths,
        };
        if let Err(err) = store.put(&self.session_id, record) {
            warn!(error = %err, "failed to store analysis result");
            return Outcome::Notice(Notice::Alert(format!("Failed to save result: {err}")));
        }
        info!(session_id = %self.session_id, zip = %zip_url, "analysis result packaged");

        Outcome::Navigate(Navigation::ToUpload(ReturnState {
            zip_url,
            zip_name,
            file_name,
            session_id: self.session_id.clone(),
            file_tree: self.file_tree.clone(),
        }))
    }

    /// URL under which an image from the current analysis is served.
    pub fn image_src(image_url: &str) -> String {
        format!("/{}", image_url.trim_start_matches('/'))
    }

    /// Sizing hint for an image from the current analysis.
    pub fn image_hint(&self, src: &str) -> ImageHint {
        self.analysis.as_ref().map(|a| ImageHint::from_analysis(src, a)).unwrap_or_default()
    }

    /// Open the viewer on an image from the current analysis.
    pub fn view_image(&self, src: &str, registry: &ListenerRegistry) -> Option<ImageViewer> {
        ImageViewer::open(src, self.image_hint(src), registry)
    }
}
