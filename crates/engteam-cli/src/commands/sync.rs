use anyhow::Result;
use engteam_catalog::{install_all, Materializer};
use engteam_persistence::ProjectStore;
use owo_colors::OwoColorize;
use std::path::Path;
use tracing::{info, warn};

use super::{Context, Outcome};
use crate::error::CommandError;
use crate::render;

/// Re-copy every stored agent and skill from the current catalog
pub async fn run(ctx: &Context, project_dir: &Path, materializer: &dyn Materializer) -> Result<Outcome> {
    let Some(store) = ProjectStore::open_existing(project_dir, &ctx.db_file_name).await? else {
        return Err(CommandError::NotConfigured {
            dir: project_dir.to_path_buf(),
        }
        .into());
    };

    let Some(project) = store.get_project(project_dir).await? else {
        return Err(CommandError::ProjectMissing {
            dir: project_dir.to_path_buf(),
        }
        .into());
    };

    let agents = store.agents(project.id).await?;
    let skills = store.skills(project.id).await?;

    if agents.is_empty() && skills.is_empty() {
        println!(
            "{}",
            "No agents or skills configured. Nothing to sync.".yellow()
        );
        store.close().await;
        return Ok(Outcome::Completed);
    }

    println!("{}\n", "Syncing agents and skills...".bold());
    let registry = ctx.load_registry();
    let report = install_all(
        materializer,
        &registry,
        &agents,
        &skills,
        &ctx.install_root(project_dir),
    )?;
    print!("{}", render::install_text(&report, project_dir, "~"));

    if report.has_missing() {
        warn!(
            "{} stored names are missing from catalog {:?}",
            report.missing_agents.len() + report.missing_skills.len(),
            ctx.catalog_root
        );
    }

    store.touch(project.id).await?;
    store.set_agents(project.id, &agents).await?;
    store.set_skills(project.id, &skills).await?;
    store.close().await;

    info!(
        "Synced {} agents and {} skills for {:?}",
        report.agents.len(),
        report.skills.len(),
        project_dir
    );
    println!("\n{}", "Sync complete!".green().bold());
    Ok(Outcome::Completed)
}
