use crate::output::{print_json, print_metrics};
use anyhow::Context;
use chrono::Utc;
use std::path::Path;
use storyforge_core::catalog::{self, BuiltinCatalog, CatalogSource, FileCatalog};
use storyforge_core::config::Config;
use storyforge_core::sections::default_sections;

pub fn run(config: &Config, catalog_file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let source: Box<dyn CatalogSource> = match catalog_file {
        Some(path) => Box::new(FileCatalog::new(path)),
        None => Box::new(BuiltinCatalog),
    };
    let table = source
        .load()
        .with_context(|| format!("failed to load {}", source.describe()))?;
    tracing::info!(source = %source.describe(), "catalog loaded");

    let tunables = super::load_tunables(config)?;
    let summary = catalog::generate(
        &table,
        &config.layout,
        &default_sections(),
        &tunables,
        Utc::now(),
    )
    .context("story generation failed")?;

    if json {
        return print_json(&summary);
    }

    println!("STORY GENERATION COMPLETE\n");
    print_metrics(&[
        ("Total Epics Processed", summary.epics.to_string()),
        ("Total Stories Expected", summary.expected.to_string()),
        ("Stories Created", summary.created.to_string()),
        ("Stories Skipped (already exist)", summary.skipped.to_string()),
    ]);
    println!("\nMapping: {}", summary.mapping_path.display());
    Ok(())
}
