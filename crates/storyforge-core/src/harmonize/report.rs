//! Phase 5: validation report over the current tree.

use crate::config::HarmonizeConfig;
use crate::epic::EpicDescriptor;
use crate::io;
use crate::snapshot::DocTree;
use crate::types::{EpicSide, EpicType};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt::Write as _;

// ---------------------------------------------------------------------------
// Report model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct HarmonizationReport {
    pub generated: DateTime<Utc>,
    pub threshold: usize,
    pub summary: ReportSummary,
    pub epics: Vec<EpicSummary>,
    pub stories: Vec<StorySummary>,
    pub distribution: LineDistribution,
    pub quality: QualityMetrics,
    pub issues: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportSummary {
    pub total_epics: usize,
    pub frontend_epics: usize,
    pub backend_epics: usize,
    /// Epics that are neither frontend nor backend.
    pub infrastructure_epics: usize,
    pub total_stories: usize,
    pub average_lines: usize,
    pub validation_issues: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EpicSummary {
    pub file_name: String,
    pub id: String,
    pub title: String,
    pub kind: EpicType,
    pub story_count: usize,
    pub story_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorySummary {
    pub file_name: String,
    pub lines: usize,
    pub has_epic_link: bool,
    pub has_acceptance_criteria: bool,
    pub has_technical_specs: bool,
}

impl StorySummary {
    pub fn inspect(file_name: &str, content: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            lines: io::line_count(content),
            has_epic_link: content.contains("../epics/"),
            has_acceptance_criteria: content.contains("## Acceptance Criteria"),
            has_technical_specs: content.contains("## Technical Specifications"),
        }
    }
}

/// Stories bucketed against the threshold. The middle band starts at three
/// quarters of it (600 for the default 800).
#[derive(Debug, Clone, Default, Serialize)]
pub struct LineDistribution {
    pub at_target: usize,
    pub near_target: usize,
    pub short: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QualityMetrics {
    pub with_epic_link: usize,
    pub with_acceptance_criteria: usize,
    pub with_technical_specs: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueLevel {
    Warning,
}

impl IssueLevel {
    fn label(&self) -> &'static str {
        match self {
            IssueLevel::Warning => "WARNING",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub level: IssueLevel,
    pub file_name: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

fn near_floor(threshold: usize) -> usize {
    threshold * 3 / 4
}

/// Aggregate the tree. Archived (`-SPLIT`) epics are left out.
pub fn build(tree: &DocTree, config: &HarmonizeConfig, now: DateTime<Utc>) -> HarmonizationReport {
    let threshold = config.min_story_lines;
    let mut summary = ReportSummary::default();

    let epics: Vec<EpicSummary> = tree
        .epics
        .iter()
        .map(|(name, content)| EpicDescriptor::parse(name, content))
        .filter(|e| !e.is_archived())
        .map(|e| {
            match e.side {
                EpicSide::Frontend => summary.frontend_epics += 1,
                EpicSide::Backend => summary.backend_epics += 1,
                EpicSide::FullStack => summary.infrastructure_epics += 1,
            }
            EpicSummary {
                id: e.display_id(),
                story_count: e.story_refs.len(),
                story_ids: e.story_refs.into_iter().collect(),
                file_name: e.file_name,
                title: e.title,
                kind: e.kind,
            }
        })
        .collect();
    summary.total_epics = epics.len();

    let stories: Vec<StorySummary> = tree
        .stories
        .iter()
        .map(|(name, content)| StorySummary::inspect(name, content))
        .collect();
    summary.total_stories = stories.len();

    let total_lines: usize = stories.iter().map(|s| s.lines).sum();
    summary.average_lines = match stories.len() {
        0 => 0,
        n => (2 * total_lines + n) / (2 * n),
    };

    let mut distribution = LineDistribution::default();
    let mut quality = QualityMetrics::default();
    let mut issues = Vec::new();
    for story in &stories {
        if story.lines >= threshold {
            distribution.at_target += 1;
        } else {
            if story.lines >= near_floor(threshold) {
                distribution.near_target += 1;
            } else {
                distribution.short += 1;
            }
            issues.push(ValidationIssue {
                level: IssueLevel::Warning,
                file_name: story.file_name.clone(),
                message: format!("Story has only {} lines (target: {threshold}+)", story.lines),
            });
        }
        quality.with_epic_link += usize::from(story.has_epic_link);
        quality.with_acceptance_criteria += usize::from(story.has_acceptance_criteria);
        quality.with_technical_specs += usize::from(story.has_technical_specs);
    }
    summary.validation_issues = issues.len();

    HarmonizationReport {
        generated: now,
        threshold,
        summary,
        epics,
        stories,
        distribution,
        quality,
        issues,
    }
}

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------

pub fn render(report: &HarmonizationReport) -> String {
    let s = &report.summary;
    let total = s.total_stories;
    let threshold = report.threshold;
    let floor = near_floor(threshold);
    let mut out = String::new();

    let _ = write!(
        out,
        "# Epic and Story Harmonization Report\n\n\
         Generated: {}\n\n\
         ## Executive Summary\n\n\
         - **Total Epics**: {}\n  \
         - Frontend Epics: {}\n  \
         - Backend Epics: {}\n  \
         - Infrastructure Epics: {}\n\
         - **Total Stories**: {total}\n\
         - **Average Lines per Story**: {}\n\
         - **Validation Issues**: {}\n\n\
         ## Epic Analysis\n\n",
        report.generated.to_rfc3339_opts(SecondsFormat::Millis, true),
        s.total_epics,
        s.frontend_epics,
        s.backend_epics,
        s.infrastructure_epics,
        s.average_lines,
        s.validation_issues,
    );

    let blocks: Vec<String> = report
        .epics
        .iter()
        .map(|e| {
            format!(
                "\n### {}\n- **ID**: {}\n- **Title**: {}\n- **Type**: {}\n- **Stories**: {}\n- **Story IDs**: {}\n",
                e.file_name,
                e.id,
                e.title,
                e.kind,
                e.story_count,
                e.story_ids.join(", ")
            )
        })
        .collect();
    out.push_str(&blocks.join("\n"));

    let q = &report.quality;
    let d = &report.distribution;
    let _ = write!(
        out,
        "\n\n## Story Analysis\n\n\
         ### Line Count Distribution\n\
         - Stories with {threshold}+ lines: {}\n\
         - Stories with {floor}-{} lines: {}\n\
         - Stories with <{floor} lines: {}\n\n\
         ### Quality Metrics\n\
         - Stories with epic links: {}/{total}\n\
         - Stories with acceptance criteria: {}/{total}\n\
         - Stories with technical specs: {}/{total}\n\n\
         ## Validation Issues\n\n",
        d.at_target,
        threshold.saturating_sub(1),
        d.near_target,
        d.short,
        q.with_epic_link,
        q.with_acceptance_criteria,
        q.with_technical_specs,
    );

    if report.issues.is_empty() {
        out.push_str("No validation issues found! ✅");
    } else {
        let lines: Vec<String> = report
            .issues
            .iter()
            .map(|i| format!("- **{}**: {} - {}", i.level.label(), i.file_name, i.message))
            .collect();
        out.push_str(&lines.join("\n"));
    }

    let first = if report.issues.is_empty() {
        "Continue with implementation phase"
    } else {
        "Address validation issues listed above"
    };
    let _ = write!(
        out,
        "\n\n## Recommendations\n\n\
         1. {first}\n\
         2. Review epic-story mappings for completeness\n\
         3. Ensure all stories have comprehensive technical specifications\n\
         4. Validate acceptance criteria with stakeholders\n\
         5. Begin sprint planning with high-priority stories\n\n\
         ## Next Steps\n\n\
         1. Commit all changes to version control\n\
         2. Share report with team for review\n\
         3. Create Jira/Azure DevOps items from stories\n\
         4. Begin implementation of highest priority stories\n\
         5. Set up continuous validation pipeline\n"
    );
    out
}
