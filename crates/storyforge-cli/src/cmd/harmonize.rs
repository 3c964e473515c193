use crate::output::{print_json, print_metrics};
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

    let harmonizer = Harmonizer::new(&config.layout, &tunables, &sections, notifier.as_ref());
    let summary = match harmonizer.run(&config.report_path, Utc::now()) {
        Ok(summary) => summary,
        Err(e) => {
            notifier.notify("Harmonization failed. Check logs for details.");
            return Err(e).context("harmonization failed");
        }
    };

    if json {
        return print_json(&summary);
    }

    println!("Harmonization completed successfully!\n");
    let mut rows: Vec<(&str, String)> = summary
        .phases
        .iter()
        .map(|p| (p.phase.headline(), p.changed.to_string()))
        .collect();
    rows.push(("Total Epics", summary.report.summary.total_epics.to_string()));
    rows.push(("Total Stories", summary.report.summary.total_stories.to_string()));
    print_metrics(&rows);
    println!("\nReport: {}", summary.report_path.display());
    println!("Backup: {}", summary.backup_path.display());
    println!("Log:    {}", config.log_file.display());
    Ok(())
}
