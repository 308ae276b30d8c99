use anyhow::Result;
use engteam_catalog::{install_all, resolve_skill_dependencies, Materializer};
use engteam_persistence::ProjectStore;
use engteam_types::{Registry, StackItem};
use owo_colors::OwoColorize;
use std::path::Path;
use tracing::{info, warn};

use super::{Context, Outcome};
use crate::error::CommandError;
use crate::prompts::SelectionUi;
use crate::render;

/// Flags for `init` that are not answered through the selection UI
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Skip the reconfigure question
    pub force: bool,
    /// Replacement stack; `None` leaves a stored stack untouched
    pub stack: Option<Vec<StackItem>>,
}

/// Parse `type:name[@version]` items
pub fn parse_stack(items: &[String]) -> Result<Vec<StackItem>, CommandError> {
    items
        .iter()
        .map(|raw| StackItem::parse(raw).ok_or_else(|| CommandError::InvalidStackItem(raw.clone())))
        .collect()
}

/// Reject selected names the catalog does not know
fn check_known(registry: &Registry, agents: &[String], skills: &[String]) -> Result<(), CommandError> {
    let unknown = |kind, name: &String| CommandError::UnknownName {
        kind,
        name: name.clone(),
    };
    if let Some(name) = agents.iter().find(|n| registry.get_agent(n).is_none()) {
        return Err(unknown("agent", name));
    }
    if let Some(name) = skills.iter().find(|n| registry.get_skill(n).is_none()) {
        return Err(unknown("skill", name));
    }
    Ok(())
}

/// Previously stored agents and skills, empty when the store has no project yet
async fn previous_selection(
    store: &ProjectStore,
    project_dir: &Path,
) -> Result<(Vec<String>, Vec<String>)> {
    match store.get_project(project_dir).await? {
        Some(project) => Ok((
            store.agents(project.id).await?,
            store.skills(project.id).await?,
        )),
        None => Ok((Vec::new(), Vec::new())),
    }
}

pub async fn run(
    ctx: &Context,
    project_dir: &Path,
    options: &InitOptions,
    ui: &dyn SelectionUi,
    materializer: &dyn Materializer,
) -> Result<Outcome> {
    let existing = ProjectStore::open_existing(project_dir, &ctx.db_file_name).await?;

    let (previous_agents, previous_skills) = match &existing {
        Some(store) => {
            if !options.force && !ui.confirm_reconfigure()? {
                return Ok(Outcome::Aborted);
            }
            previous_selection(store, project_dir).await?
        }
        None => (Vec::new(), Vec::new()),
    };

    let registry = ctx.load_registry();
    if registry.is_empty() {
        return Err(CommandError::EmptyCatalog {
            root: ctx.catalog_root.clone(),
        }
        .into());
    }

    let Some(agents) = ui.choose_agents(&registry.agents, &previous_agents)? else {
        return Ok(Outcome::Aborted);
    };

    let requirements = resolve_skill_dependencies(&registry, &agents);
    let Some(skills) = ui.choose_skills(&registry, &requirements, &previous_skills)? else {
        return Ok(Outcome::Aborted);
    };
    check_known(&registry, &agents, &skills)?;

    for (skill, needed_by) in requirements.missing_from(&skills) {
        warn!("Required skill '{}' deselected", skill);
        println!(
            "{} skill '{}' is required by {} but was not selected",
            "Warning:".yellow(),
            skill,
            needed_by.join(", ")
        );
    }

    if !ui.confirm_installation(&agents, &skills)? {
        return Ok(Outcome::Aborted);
    }

    let store = match existing {
        Some(store) => store,
        None => ProjectStore::open(project_dir, &ctx.db_file_name).await?,
    };
    store.initialize().await?;

    let project = store.get_or_create_project(project_dir).await?;
    store.set_agents(project, &agents).await?;
    store.set_skills(project, &skills).await?;
    if let Some(stack) = &options.stack {
        store.set_stack(project, stack).await?;
    }
    store.touch(project).await?;
    println!("{} {}", "Saved".green(), store.path().display());
    store.close().await;

    info!(
        "Installing {} agents and {} skills into {:?}",
        agents.len(),
        skills.len(),
        project_dir
    );
    let report = install_all(
        materializer,
        &registry,
        &agents,
        &skills,
        &ctx.install_root(project_dir),
    )?;
    print!("{}", render::install_text(&report, project_dir, "+"));

    println!("\n{}", "Done!".green().bold());
    println!("Run `engineering-team sync` to update to the latest versions.");
    Ok(Outcome::Completed)
}
