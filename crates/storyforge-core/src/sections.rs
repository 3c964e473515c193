//! Section content for generated stories.
//!
//! Each story slot is filled from an ordered list of fn-pointer rules; the
//! first rule whose condition holds supplies the fragment, and every slot
//! carries an explicit fallback. Fragments are markdown with `{{var}}`
//! placeholders, rendered by [`crate::template`].

use crate::epic::EpicDescriptor;
use crate::story::StoryDescriptor;
use crate::types::StoryType;
use std::fmt;

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

/// Every placeholder the story template may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Title,
    EpicLink,
    StoryType,
    Priority,
    Effort,
    Description,
    UserType,
    Goal,
    Benefit,
    AcceptanceCriteria,
    AcceptanceExtras,
    AcceptanceScenarios,
    Guidance,
    Architecture,
    ComponentDesign,
    DataFlow,
    ApiDesign,
    StateManagement,
    Phase1Steps,
    Phase2Steps,
    Phase3Steps,
    Phase4Steps,
    TaskBreakdown,
    Dependencies,
    Interfaces,
    Configuration,
    Security,
    Performance,
    UnitTests,
    IntegrationTests,
    E2eTests,
    PerformanceTests,
    Monitoring,
    Documentation,
    Rollout,
    Blockers,
    RelatedStories,
    Notes,
}

impl Slot {
    pub fn all() -> &'static [Slot] {
        &[
            Slot::Title,
            Slot::EpicLink,
            Slot::StoryType,
            Slot::Priority,
            Slot::Effort,
            Slot::Description,
            Slot::UserType,
            Slot::Goal,
            Slot::Benefit,
            Slot::AcceptanceCriteria,
            Slot::AcceptanceExtras,
            Slot::AcceptanceScenarios,
            Slot::Guidance,
            Slot::Architecture,
            Slot::ComponentDesign,
            Slot::DataFlow,
            Slot::ApiDesign,
            Slot::StateManagement,
            Slot::Phase1Steps,
            Slot::Phase2Steps,
            Slot::Phase3Steps,
            Slot::Phase4Steps,
            Slot::TaskBreakdown,
            Slot::Dependencies,
            Slot::Interfaces,
            Slot::Configuration,
            Slot::Security,
            Slot::Performance,
            Slot::UnitTests,
            Slot::IntegrationTests,
            Slot::E2eTests,
            Slot::PerformanceTests,
            Slot::Monitoring,
            Slot::Documentation,
            Slot::Rollout,
            Slot::Blockers,
            Slot::RelatedStories,
            Slot::Notes,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Title => "title",
            Slot::EpicLink => "epic_link",
            Slot::StoryType => "story_type",
            Slot::Priority => "priority",
            Slot::Effort => "effort",
            Slot::Description => "description",
            Slot::UserType => "user_type",
            Slot::Goal => "goal",
            Slot::Benefit => "benefit",
            Slot::AcceptanceCriteria => "acceptance_criteria",
            Slot::AcceptanceExtras => "acceptance_extras",
            Slot::AcceptanceScenarios => "acceptance_scenarios",
            Slot::Guidance => "guidance",
            Slot::Architecture => "architecture",
            Slot::ComponentDesign => "component_design",
            Slot::DataFlow => "data_flow",
            Slot::ApiDesign => "api_design",
            Slot::StateManagement => "state_management",
            Slot::Phase1Steps => "phase_1_steps",
            Slot::Phase2Steps => "phase_2_steps",
            Slot::Phase3Steps => "phase_3_steps",
            Slot::Phase4Steps => "phase_4_steps",
            Slot::TaskBreakdown => "task_breakdown",
            Slot::Dependencies => "dependencies",
            Slot::Interfaces => "interfaces",
            Slot::Configuration => "configuration",
            Slot::Security => "security",
            Slot::Performance => "performance",
            Slot::UnitTests => "unit_tests",
            Slot::IntegrationTests => "integration_tests",
            Slot::E2eTests => "e2e_tests",
            Slot::PerformanceTests => "performance_tests",
            Slot::Monitoring => "monitoring",
            Slot::Documentation => "documentation",
            Slot::Rollout => "rollout",
            Slot::Blockers => "blockers",
            Slot::RelatedStories => "related_stories",
            Slot::Notes => "notes",
        }
    }

    pub fn from_name(name: &str) -> Option<Slot> {
        Slot::all().iter().copied().find(|s| s.as_str() == name)
    }

    /// Slots computed directly from the descriptors rather than selected
    /// from the rule table.
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            Slot::Title | Slot::EpicLink | Slot::StoryType | Slot::Priority | Slot::Effort
        )
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SectionContext
// ---------------------------------------------------------------------------

pub struct SectionContext<'a> {
    pub story: &'a StoryDescriptor,
    pub epic: &'a EpicDescriptor,
    title_lower: String,
    epic_file_lower: String,
}

impl<'a> SectionContext<'a> {
    pub fn new(story: &'a StoryDescriptor, epic: &'a EpicDescriptor) -> Self {
        Self {
            title_lower: story.title.to_lowercase(),
            epic_file_lower: epic.file_name.to_lowercase(),
            story,
            epic,
        }
    }

    /// Case-insensitive substring test on the story title.
    pub fn title_has(&self, keyword: &str) -> bool {
        self.title_lower.contains(keyword)
    }

    /// Whole-word test on the story title, for short tokens such as `ui`
    /// that would otherwise match inside words like `build`.
    pub fn title_has_word(&self, word: &str) -> bool {
        self.title_lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|w| w == word)
    }

    pub fn epic_file_has(&self, keyword: &str) -> bool {
        self.epic_file_lower.contains(keyword)
    }

    pub fn is_frontend(&self) -> bool {
        self.epic.is_frontend()
    }

    pub fn is_backend(&self) -> bool {
        self.epic.is_backend()
    }

    pub fn kind(&self) -> StoryType {
        self.story.kind
    }
}

// ---------------------------------------------------------------------------
// SectionRule / SlotRules / SectionTable
// ---------------------------------------------------------------------------

/// A fn-pointer rule, first match wins within its slot.
pub struct SectionRule {
    pub id: &'static str,
    pub condition: fn(&SectionContext) -> bool,
    pub body: &'static str,
}

pub struct SlotRules {
    pub slot: Slot,
    pub rules: Vec<SectionRule>,
    /// Rule id and body used when no condition holds.
    pub fallback: (&'static str, &'static str),
}

/// What [`SectionTable::select`] picked for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub rule_id: &'static str,
    pub body: &'static str,
}

pub struct SectionTable {
    slots: Vec<SlotRules>,
}

impl SectionTable {
    pub fn new(slots: Vec<SlotRules>) -> Self {
        Self { slots }
    }

    /// `None` when the table has no entry for `slot`.
    pub fn select(&self, slot: Slot, ctx: &SectionContext) -> Option<Selection> {
        let entry = self.slots.iter().find(|s| s.slot == slot)?;
        for rule in &entry.rules {
            if (rule.condition)(ctx) {
                return Some(Selection {
                    rule_id: rule.id,
                    body: rule.body,
                });
            }
        }
        let (rule_id, body) = entry.fallback;
        Some(Selection { rule_id, body })
    }

    pub fn covers(&self, slot: Slot) -> bool {
        self.slots.iter().any(|s| s.slot == slot)
    }
}

impl Default for SectionTable {
    fn default() -> Self {
        default_sections()
    }
}

// ---------------------------------------------------------------------------
// Condition helpers
// ---------------------------------------------------------------------------

fn is_component_story(ctx: &SectionContext) -> bool {
    ctx.title_has("component") || ctx.title_has_word("ui")
}

fn is_api_story(ctx: &SectionContext) -> bool {
    ctx.title_has_word("api") || ctx.title_has("endpoint")
}

// ---------------------------------------------------------------------------
// Default table
// ---------------------------------------------------------------------------

macro_rules! fragment {
    ($path:literal) => {
        include_str!(concat!("../templates/sections/", $path))
    };
}

macro_rules! slot {
    ($slot:expr, [$($id:literal => $cond:expr, $body:expr;)*], $fb_id:literal => $fb_body:expr) => {
        SlotRules {
            slot: $slot,
            rules: vec![$(SectionRule { id: $id, condition: $cond, body: $body },)*],
            fallback: ($fb_id, $fb_body),
        }
    };
}

const BACKEND_NOT_APPLICABLE: &str = "N/A - Backend service story";

pub fn default_sections() -> SectionTable {
    SectionTable::new(vec![
        slot!(Slot::Description, [
            "timeline" => |ctx| ctx.title_has("timeline"), fragment!("description/timeline.md");
            "search" => |ctx| ctx.title_has("search"), fragment!("description/search.md");
            "admin_dashboard" => |ctx| ctx.title_has("admin") && ctx.title_has("dashboard"),
                fragment!("description/admin_dashboard.md");
        ], "default" => fragment!("description/default.md")),
        slot!(Slot::UserType, [
            "admin" => |ctx| ctx.epic_file_has("admin") || ctx.title_has("admin"), "System Administrator";
            "content" => |ctx| ctx.epic_file_has("content"), "Content Manager";
            "auth" => |ctx| ctx.epic_file_has("auth"), "Registered User";
        ], "fan" => "MMA Fan"),
        slot!(Slot::Goal, [
            "technical" => |ctx| ctx.kind() == StoryType::Technical,
                "ensure the system operates efficiently and reliably";
            "documentation" => |ctx| ctx.kind() == StoryType::Documentation,
                "understand how to use and maintain this feature";
        ], "feature" => "have access to this functionality in the application"),
        slot!(Slot::Benefit, [
            "performance" => |ctx| ctx.title_has("performance"),
                "I can have a fast and responsive experience";
            "filter" => |ctx| ctx.title_has("filter"), "I can find relevant events quickly";
            "theme" => |ctx| ctx.title_has("theme"), "I can see organization-specific branding";
            "admin" => |ctx| ctx.title_has("admin"), "I can manage content efficiently";
            "auth" => |ctx| ctx.title_has("auth"), "I can securely access the system";
            "monitoring" => |ctx| ctx.title_has("monitoring"),
                "I can track system health and performance";
            "technical" => |ctx| ctx.kind() == StoryType::Technical,
                "the system maintains high performance and reliability standards";
            "documentation" => |ctx| ctx.kind() == StoryType::Documentation,
                "knowledge is preserved and accessible to the team";
        ], "feature" => "I can perform my tasks more efficiently and effectively"),
        slot!(Slot::AcceptanceCriteria, [], "checklist" => fragment!("acceptance_criteria/checklist.md")),
        slot!(Slot::AcceptanceExtras, [
            "timeline" => |ctx| ctx.title_has("timeline"), fragment!("acceptance_extras/timeline.md");
            "search" => |ctx| ctx.title_has("search"), fragment!("acceptance_extras/search.md");
        ], "none" => ""),
        slot!(Slot::AcceptanceScenarios, [
            "component" => is_component_story, fragment!("acceptance_scenarios/component.md");
            "api" => is_api_story, fragment!("acceptance_scenarios/api.md");
        ], "default" => fragment!("acceptance_scenarios/default.md")),
        slot!(Slot::Guidance, [
            "frontend" => |ctx| ctx.is_frontend(), fragment!("guidance/frontend.md");
            "backend" => |ctx| ctx.is_backend(), fragment!("guidance/backend.md");
        ], "full_stack" => fragment!("guidance/full_stack.md")),
        slot!(Slot::Architecture, [
            "frontend" => |ctx| ctx.is_frontend(), fragment!("architecture/frontend.md");
        ], "service" => fragment!("architecture/service.md")),
        slot!(Slot::ComponentDesign, [
            "frontend" => |ctx| ctx.is_frontend(), fragment!("component_design/frontend.md");
        ], "not_applicable" => BACKEND_NOT_APPLICABLE),
        slot!(Slot::DataFlow, [], "default" => fragment!("data_flow/default.md")),
        slot!(Slot::ApiDesign, [
            "client" => |ctx| ctx.is_frontend(), fragment!("api_design/client.md");
        ], "rest" => fragment!("api_design/rest.md")),
        slot!(Slot::StateManagement, [
            "frontend" => |ctx| ctx.is_frontend(), fragment!("state_management/frontend.md");
        ], "not_applicable" => BACKEND_NOT_APPLICABLE),
        slot!(Slot::Phase1Steps, [], "default" => fragment!("phase_1_steps/default.md")),
        slot!(Slot::Phase2Steps, [], "default" => fragment!("phase_2_steps/default.md")),
        slot!(Slot::Phase3Steps, [], "default" => fragment!("phase_3_steps/default.md")),
        slot!(Slot::Phase4Steps, [], "default" => fragment!("phase_4_steps/default.md")),
        slot!(Slot::TaskBreakdown, [
            "component" => is_component_story, fragment!("task_breakdown/component.md");
            "api" => is_api_story, fragment!("task_breakdown/api.md");
        ], "default" => fragment!("task_breakdown/default.md")),
        slot!(Slot::Dependencies, [
            "frontend" => |ctx| ctx.is_frontend(), fragment!("dependencies/frontend.md");
        ], "backend" => fragment!("dependencies/backend.md")),
        slot!(Slot::Interfaces, [], "default" => fragment!("interfaces/default.md")),
        slot!(Slot::Configuration, [], "default" => fragment!("configuration/default.md")),
        slot!(Slot::Security, [], "default" => fragment!("security/default.md")),
        slot!(Slot::Performance, [], "default" => fragment!("performance/default.md")),
        slot!(Slot::UnitTests, [], "default" => fragment!("unit_tests/default.md")),
        slot!(Slot::IntegrationTests, [], "default" => fragment!("integration_tests/default.md")),
        slot!(Slot::E2eTests, [], "default" => fragment!("e2e_tests/default.md")),
        slot!(Slot::PerformanceTests, [], "default" => fragment!("performance_tests/default.md")),
        slot!(Slot::Monitoring, [], "default" => fragment!("monitoring/default.md")),
        slot!(Slot::Documentation, [], "default" => fragment!("documentation/default.md")),
        slot!(Slot::Rollout, [], "default" => fragment!("rollout/default.md")),
        slot!(Slot::Blockers, [], "default" => fragment!("blockers/default.md")),
        slot!(Slot::RelatedStories, [], "default" => fragment!("related_stories/default.md")),
        slot!(Slot::Notes, [], "default" => fragment!("notes/default.md")),
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
