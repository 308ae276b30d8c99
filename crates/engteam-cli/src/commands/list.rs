use anyhow::Result;

use super::{Context, Outcome};
use crate::render;

/// Which catalog sections to show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub agents_only: bool,
    pub skills_only: bool,
}

impl ListFilter {
    pub fn show_agents(&self) -> bool {
        !self.skills_only
    }

    pub fn show_skills(&self) -> bool {
        !self.agents_only
    }
}

pub fn run(ctx: &Context, filter: ListFilter, json: bool) -> Result<Outcome> {
    let registry = ctx.load_registry();

    if json {
        let value = render::catalog_json(&registry, filter.show_agents(), filter.show_skills());
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!(
            "{}",
            render::catalog_text(&registry, filter.show_agents(), filter.show_skills())
        );
    }
    Ok(Outcome::Completed)
}
