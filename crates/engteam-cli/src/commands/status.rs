use anyhow::Result;
use engteam_persistence::ProjectStore;
use std::path::Path;

use super::{Context, Outcome};
use crate::error::CommandError;
use crate::render::{self, ProjectStatus};

/// Stored state of `project_dir` joined with the current catalog
pub async fn collect(ctx: &Context, project_dir: &Path) -> Result<ProjectStatus> {
    let Some(store) = ProjectStore::open_existing(project_dir, &ctx.db_file_name).await? else {
        return Err(CommandError::NotConfigured {
            dir: project_dir.to_path_buf(),
        }
        .into());
    };

    let Some(project) = store.get_project(project_dir).await? else {
        store.close().await;
        return Err(CommandError::ProjectMissing {
            dir: project_dir.to_path_buf(),
        }
        .into());
    };

    let agents = store.agents(project.id).await?;
    let skills = store.skills(project.id).await?;
    let stack = store.stack(project.id).await?;
    store.close().await;

    let registry = ctx.load_registry();
    Ok(ProjectStatus::new(project, &registry, &agents, &skills, stack))
}

pub async fn run(ctx: &Context, project_dir: &Path, json: bool) -> Result<Outcome> {
    let status = collect(ctx, project_dir).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print!("{}", render::status_text(&status));
    }
    Ok(Outcome::Completed)
}
