//! Reporting of classified nodes.
//!
//! [`publish`] walks a [`DiffResult`] and feeds a [`Reporter`]. Reporters
//! decide where entries go; the engine never formats output itself.

use crate::result::{Ambiguity, DiffResult, DiffSummary};
use graphdelta_core::{ApplicationId, ContentId};
use serde::{Deserialize, Serialize};

/// Change category label used in report lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    /// Present only in the test graph
    Added,
    /// Present only in the reference graph
    Deleted,
    /// Correlated but different
    Modified,
    /// Identity-less node without content match
    Changed,
}

impl EntryKind {
    /// Upper-case label
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "ADDED",
            Self::Deleted => "DELETED",
            Self::Modified => "MODIFIED",
            Self::Changed => "CHANGED",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render one report line
///
/// An absent application id renders as empty parentheses.
#[must_use]
pub fn format_entry(
    kind: EntryKind,
    type_tag: &str,
    node_id: &ContentId,
    app_id: Option<&ApplicationId>,
) -> String {
    format!(
        "{} {} object: id({}), appId({})",
        kind,
        type_tag,
        node_id,
        app_id.map_or("", ApplicationId::as_str)
    )
}

/// Sink for diff entries
pub trait Reporter {
    /// A test node with no reference counterpart
    fn record_added(&mut self, node_id: &ContentId, app_id: Option<&ApplicationId>, type_tag: &str);

    /// A reference node with no test counterpart
    fn record_deleted(&mut self, node_id: &ContentId, app_id: Option<&ApplicationId>, type_tag: &str);

    /// A correlated pair whose content differs
    fn record_modified(
        &mut self,
        node_id: &ContentId,
        app_id: Option<&ApplicationId>,
        type_tag: &str,
        changes: &str,
    );

    /// An identity-less test node whose content has no match
    fn record_changed_without_identity(&mut self, node_id: &ContentId, type_tag: &str);

    /// A heuristic correlation
    fn record_ambiguity(&mut self, _ambiguity: &Ambiguity) {}

    /// Aggregate counts; returns whether the run passed
    fn record_summary(&mut self, summary: &DiffSummary) -> bool;
}

/// Feed every entry of a result to a reporter
///
/// Returns the reporter's pass verdict.
pub fn publish(result: &DiffResult, reporter: &mut dyn Reporter) -> bool {
    for node in &result.added {
        reporter.record_added(&node.content_id, node.application_id.as_ref(), &node.type_tag);
    }
    for modified in &result.modified {
        let node = &modified.node;
        reporter.record_modified(
            &node.content_id,
            node.application_id.as_ref(),
            &node.type_tag,
            &modified.changes.to_string(),
        );
    }
    for node in &result.deleted {
        reporter.record_deleted(&node.content_id, node.application_id.as_ref(), &node.type_tag);
    }
    for node in &result.changed_without_identity {
        reporter.record_changed_without_identity(&node.content_id, &node.type_tag);
    }
    for ambiguity in &result.ambiguities {
        reporter.record_ambiguity(ambiguity);
    }
    reporter.record_summary(&result.summary())
}

/// Reporter that emits entries through `tracing`
#[derive(Debug, Clone)]
pub struct LogReporter {
    reference_label: String,
}

impl LogReporter {
    /// Create a reporter naming the reference in its summary
    #[must_use]
    pub fn new(reference_label: impl Into<String>) -> Self {
        Self {
            reference_label: reference_label.into(),
        }
    }
}

impl Reporter for LogReporter {
    fn record_added(&mut self, node_id: &ContentId, app_id: Option<&ApplicationId>, type_tag: &str) {
        tracing::info!("{}", format_entry(EntryKind::Added, type_tag, node_id, app_id));
    }

    fn record_deleted(&mut self, node_id: &ContentId, app_id: Option<&ApplicationId>, type_tag: &str) {
        tracing::info!("{}", format_entry(EntryKind::Deleted, type_tag, node_id, app_id));
    }

    fn record_modified(
        &mut self,
        node_id: &ContentId,
        app_id: Option<&ApplicationId>,
        type_tag: &str,
        changes: &str,
    ) {
        tracing::info!("{}", format_entry(EntryKind::Modified, type_tag, node_id, app_id));
        tracing::info!("{}", changes);
    }

    fn record_changed_without_identity(&mut self, node_id: &ContentId, type_tag: &str) {
        tracing::info!("{}", format_entry(EntryKind::Changed, type_tag, node_id, None));
    }

    fn record_ambiguity(&mut self, ambiguity: &Ambiguity) {
        tracing::warn!("{}", ambiguity);
    }

    fn record_summary(&mut self, summary: &DiffSummary) -> bool {
        let passed = summary.passed();
        let message = summary.message(&self.reference_label);
        if passed {
            tracing::info!("{}", message);
        } else {
            tracing::info!(
                net_content_delta = summary.net_content_delta,
                ambiguities = summary.ambiguity_count,
                "{}",
                message
            );
        }
        passed
    }
}

/// One recorded reporter call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReportEvent {
    /// Entry for an added, deleted, modified or changed node
    Entry {
        /// Category
        kind: EntryKind,
        /// Content id
        node_id: ContentId,
        /// Application id
        app_id: Option<ApplicationId>,
        /// Type tag
        type_tag: String,
        /// Property-change summary, for modified entries
        #[serde(default, skip_serializing_if = "Option::is_none")]
        changes: Option<String>,
    },
    /// Heuristic correlation
    Ambiguity {
        /// The ambiguity record
        ambiguity: Ambiguity,
    },
    /// Aggregate counts
    Summary {
        /// Counts at the end of the run
        summary: DiffSummary,
    },
}

/// Reporter that keeps every call in memory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingReporter {
    events: Vec<ReportEvent>,
}

impl RecordingReporter {
    /// Create an empty recording reporter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events in call order
    #[must_use]
    pub fn events(&self) -> &[ReportEvent] {
        &self.events
    }

    /// Rendered report lines for every recorded entry
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ReportEvent::Entry {
                    kind,
                    node_id,
                    app_id,
                    type_tag,
                    ..
                } => Some(format_entry(*kind, type_tag, node_id, app_id.as_ref())),
                _ => None,
            })
            .collect()
    }

    /// The recorded summary, if any
    #[must_use]
    pub fn summary(&self) -> Option<&DiffSummary> {
        self.events.iter().rev().find_map(|event| match event {
            ReportEvent::Summary { summary } => Some(summary),
            _ => None,
        })
    }

    fn entry(
        &mut self,
        kind: EntryKind,
        node_id: &ContentId,
        app_id: Option<&ApplicationId>,
        type_tag: &str,
        changes: Option<&str>,
    ) {
        self.events.push(ReportEvent::Entry {
            kind,
            node_id: node_id.clone(),
            app_id: app_id.cloned(),
            type_tag: type_tag.to_string(),
            changes: changes.map(str::to_string),
        });
    }
}

impl Reporter for RecordingReporter {
    fn record_added(&mut self, node_id: &ContentId, app_id: Option<&ApplicationId>, type_tag: &str) {
        self.entry(EntryKind::Added, node_id, app_id, type_tag, None);
    }

    fn record_deleted(&mut self, node_id: &ContentId, app_id: Option<&ApplicationId>, type_tag: &str) {
        self.entry(EntryKind::Deleted, node_id, app_id, type_tag, None);
    }

    fn record_modified(
        &mut self,
        node_id: &ContentId,
        app_id: Option<&ApplicationId>,
        type_tag: &str,
        changes: &str,
    ) {
        self.entry(EntryKind::Modified, node_id, app_id, type_tag, Some(changes));
    }

    fn record_changed_without_identity(&mut self, node_id: &ContentId, type_tag: &str) {
        self.entry(EntryKind::Changed, node_id, None, type_tag, None);
    }

    fn record_ambiguity(&mut self, ambiguity: &Ambiguity) {
        self.events.push(ReportEvent::Ambiguity {
            ambiguity: ambiguity.clone(),
        });
    }

    fn record_summary(&mut self, summary: &DiffSummary) -> bool {
        self.events.push(ReportEvent::Summary { summary: *summary });
        summary.passed()
    }
}
