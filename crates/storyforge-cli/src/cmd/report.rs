use crate::output::{print_json, print_metrics, print_table};
use anyhow::Context;
use chrono::Utc;
use storyforge_core::config::Config;
use storyforge_core::harmonize::Harmonizer;
use storyforge_core::notify::notifier_for;
use storyforge_core::sections::default_sections;

pub fn run(config: &Config, speak: bool, json: bool) -> anyhow::Result<()> {
    let tunables = super::load_tunables(config)?;
    let sections = default_sections();
    let notifier = notifier_for(&config.speak_command, speak);

    let report = Harmonizer::new(&config.layout, &tunables, &sections, notifier.as_ref())
        .report(&config.report_path, Utc::now())
        .context("failed to build report")?;

    if json {
        return print_json(&report);
    }

    let s = &report.summary;
    print_metrics(&[
        ("Total Epics", s.total_epics.to_string()),
        ("Frontend Epics", s.frontend_epics.to_string()),
        ("Backend Epics", s.backend_epics.to_string()),
        ("Infrastructure Epics", s.infrastructure_epics.to_string()),
        ("Total Stories", s.total_stories.to_string()),
        ("Average Lines per Story", s.average_lines.to_string()),
        ("Validation Issues", s.validation_issues.to_string()),
    ]);

    if !report.epics.is_empty() {
        println!();
        let rows = report
            .epics
            .iter()
            .map(|e| {
                vec![
                    e.id.clone(),
                    e.kind.to_string(),
                    e.story_count.to_string(),
                    e.title.clone(),
                ]
            })
            .collect();
        print_table(&["ID", "TYPE", "STORIES", "TITLE"], rows);
    }

    println!("\nReport: {}", config.report_path.display());
    Ok(())
}
