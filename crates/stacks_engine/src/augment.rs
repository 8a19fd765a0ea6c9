use std::collections::HashSet;

use agent_logging::{agent_debug, agent_warn};
use ego_tree::NodeId;
use scraper::{ElementRef, Selector};
use stacks_core::{extract_job_id, ControlId, ControlView, JobId, PageMode, SourceTag};

use crate::document::{DocumentError, PageDocument};
use crate::markup::{control_html, CONTROL_SEPARATOR};

/// CSS hooks into the host's markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelectors {
    /// One search result.
    pub result_row: String,
    /// The link carrying the `/md5/<id>` href inside a result.
    pub primary_link: String,
    /// Candidates for the reference ("Save") control.
    pub anchor_candidates: String,
    /// Substring of a class on the reference control's icon.
    pub anchor_icon: String,
    /// Visible label of the reference control.
    pub anchor_label: String,
    /// Class of the metadata line a result's reference control must sit in.
    pub metadata_class: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            result_row: ".flex.pt-3.pb-3.border-b".to_string(),
            primary_link: "a.js-vim-focus.custom-a".to_string(),
            anchor_candidates: r##"a[href="#"]"##.to_string(),
            anchor_icon: "bookmark".to_string(),
            anchor_label: "Save".to_string(),
            metadata_class: "text-gray-800".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid selector {selector:?}: {message}")]
pub struct SelectorError {
    pub selector: String,
    pub message: String,
}

struct CompiledSelectors {
    result_row: Selector,
    primary_link: Selector,
    anchor_candidates: Selector,
}

fn compile(raw: &str) -> Result<Selector, SelectorError> {
    Selector::parse(raw).map_err(|err| SelectorError {
        selector: raw.to_string(),
        message: err.to_string(),
    })
}

/// A control injected by a scan pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectedControl {
    pub control_id: ControlId,
    pub job_id: JobId,
    pub source: SourceTag,
    pub node: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanReport {
    /// Nodes seen for the first time in this pass.
    pub visited: usize,
    pub skipped_no_id: usize,
    pub skipped_no_anchor: usize,
    pub injected: Vec<InjectedControl>,
}

/// Finds insertion points and injects one control into each.
///
/// Every visited node is marked processed before anything is extracted from
/// it, so repeated scans over the same content are no-ops.
pub struct Augmenter {
    selectors: PageSelectors,
    compiled: CompiledSelectors,
    mode: PageMode,
    processed: HashSet<NodeId>,
    detail_processed: bool,
    next_control_id: ControlId,
    extraction_attempts: usize,
}

impl Augmenter {
    pub fn new(mode: PageMode, selectors: PageSelectors) -> Result<Self, SelectorError> {
        let compiled = CompiledSelectors {
            result_row: compile(&selectors.result_row)?,
            primary_link: compile(&selectors.primary_link)?,
            anchor_candidates: compile(&selectors.anchor_candidates)?,
        };
        Ok(Self {
            selectors,
            compiled,
            mode,
            processed: HashSet::new(),
            detail_processed: false,
            next_control_id: 1,
            extraction_attempts: 0,
        })
    }

    pub fn mode(&self) -> &PageMode {
        &self.mode
    }

    /// Number of nodes an identifier was ever extracted from.
    pub fn extraction_attempts(&self) -> usize {
        self.extraction_attempts
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// One bounded pass over the document.
    pub fn scan(&mut self, document: &mut PageDocument) -> ScanReport {
        match self.mode.clone() {
            PageMode::List => self.scan_list(document),
            PageMode::Detail(job_id) => self.scan_detail(document, job_id),
            PageMode::Unsupported => ScanReport::default(),
        }
    }

    fn scan_list(&mut self, document: &mut PageDocument) -> ScanReport {
        // Markers of nodes the host dropped go with them.
        self.processed.retain(|node| document.contains(*node));

        let mut report = ScanReport::default();
        for row in document.select_all(&self.compiled.result_row) {
            if !self.processed.insert(row) {
                continue;
            }
            report.visited += 1;

            let Some(job_id) = self.extract_row_job_id(document, row) else {
                report.skipped_no_id += 1;
                continue;
            };
            let Some(anchor) = self.find_anchor(document, row, true) else {
                agent_debug!("no reference control in result for {}", job_id);
                report.skipped_no_anchor += 1;
                continue;
            };
            match self.inject(document, anchor, job_id, SourceTag::SearchPage) {
                Ok(control) => report.injected.push(control),
                Err(err) => agent_warn!("failed to inject control: {}", err),
            }
        }
        report
    }

    fn scan_detail(&mut self, document: &mut PageDocument, job_id: JobId) -> ScanReport {
        if self.detail_processed {
            return ScanReport::default();
        }
        self.detail_processed = true;

        let mut report = ScanReport {
            visited: 1,
            ..ScanReport::default()
        };
        let Some(anchor) = self.find_anchor_in_document(document) else {
            agent_debug!("no reference control on detail page for {}", job_id);
            report.skipped_no_anchor = 1;
            return report;
        };
        match self.inject(document, anchor, job_id, SourceTag::DetailPage) {
            Ok(control) => report.injected.push(control),
            Err(err) => agent_warn!("failed to inject control: {}", err),
        }
        report
    }

    fn extract_row_job_id(&mut self, document: &PageDocument, row: NodeId) -> Option<JobId> {
        self.extraction_attempts += 1;
        let row = document.element(row)?;
        let link = row.select(&self.compiled.primary_link).next()?;
        extract_job_id(link.value().attr("href")?)
    }

    fn find_anchor(
        &self,
        document: &PageDocument,
        scope: NodeId,
        require_metadata: bool,
    ) -> Option<NodeId> {
        let scope = document.element(scope)?;
        let anchor = scope
            .select(&self.compiled.anchor_candidates)
            .find(|candidate| self.is_reference_control(*candidate))?;
        if require_metadata && !self.in_metadata_line(anchor) {
            return None;
        }
        Some((*anchor).id())
    }

    fn find_anchor_in_document(&self, document: &PageDocument) -> Option<NodeId> {
        document
            .select_all(&self.compiled.anchor_candidates)
            .into_iter()
            .find(|id| {
                document
                    .element(*id)
                    .is_some_and(|candidate| self.is_reference_control(candidate))
            })
    }

    /// Matched by icon class and label, never by position.
    fn is_reference_control(&self, candidate: ElementRef<'_>) -> bool {
        let label = candidate.text().collect::<String>();
        if !label.contains(self.selectors.anchor_label.as_str()) {
            return false;
        }
        candidate
            .descendants()
            .filter_map(ElementRef::wrap)
            .any(|element| {
                element
                    .value()
                    .classes()
                    .any(|class| class.contains(self.selectors.anchor_icon.as_str()))
            })
    }

    fn in_metadata_line(&self, anchor: ElementRef<'_>) -> bool {
        std::iter::once(*anchor)
            .chain(anchor.ancestors())
            .filter_map(ElementRef::wrap)
            .any(|element| {
                element
                    .value()
                    .classes()
                    .any(|class| class == self.selectors.metadata_class)
            })
    }

    fn inject(
        &mut self,
        document: &mut PageDocument,
        anchor: NodeId,
        job_id: JobId,
        source: SourceTag,
    ) -> Result<InjectedControl, DocumentError> {
        let control_id = self.next_control_id;
        let markup = format!(
            "{CONTROL_SEPARATOR}{}",
            control_html(&ControlView::idle(control_id))
        );
        let inserted = document.insert_html_after(anchor, &markup)?;
        let node = inserted
            .into_iter()
            .rev()
            .find(|id| document.element(*id).is_some())
            .ok_or(DocumentError::EmptyFragment)?;
        self.next_control_id += 1;
        agent_debug!("injected control {} for {}", control_id, job_id);
        Ok(InjectedControl {
            control_id,
            job_id,
            source,
            node,
        })
    }
}
