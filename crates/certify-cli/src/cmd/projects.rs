use crate::output::{print_json, print_table};
use anyhow::Context;
use certify_core::catalog::{Catalog, Project, ProjectStatus};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ProjectsSubcommand {
    /// List projects, optionally filtered
    List {
        /// Certification type (exact, case-sensitive)
        #[arg(long = "type", value_name = "TYPE")]
        certification_type: Option<String>,
        /// Status: draft, in_progress, under_review, certified
        #[arg(long)]
        status: Option<String>,
    },

    /// Show one project
    Show { id: String },
}

pub fn run(subcmd: ProjectsSubcommand, json: bool) -> anyhow::Result<()> {
    let catalog = Catalog::builtin().context("failed to load project catalog")?;
    match subcmd {
        ProjectsSubcommand::List {
            certification_type,
            status,
        } => list(&catalog, certification_type.as_deref(), status.as_deref(), json),
        ProjectsSubcommand::Show { id } => show(&catalog, &id, json),
    }
}

fn list(
    catalog: &Catalog,
    certification_type: Option<&str>,
    status: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let status = status.map(str::parse::<ProjectStatus>).transpose()?;

    let matching: Vec<&Project> = match certification_type {
        Some(ty) => catalog.by_certification_type(ty).collect(),
        None => catalog.all().iter().collect(),
    };
    let projects: Vec<&Project> = matching
        .into_iter()
        .filter(|p| status.map_or(true, |s| p.status == s))
        .collect();

    if json {
        return print_json(&projects);
    }

    if projects.is_empty() {
        println!("No projects.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = projects
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.name.clone(),
                p.certification_type.clone(),
                p.status.to_string(),
                format!("{}%", p.progress),
                p.updated_at.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect();
    print_table(
        &["ID", "NAME", "TYPE", "STATUS", "PROGRESS", "UPDATED"],
        rows,
    );
    Ok(())
}

fn show(catalog: &Catalog, id: &str, json: bool) -> anyhow::Result<()> {
    let project = catalog.get(id)?;

    if json {
        return print_json(project);
    }

    println!("{} ({})", project.name, project.id);
    println!("  Organization: {}", project.organization);
    println!("  Type:         {}", project.certification_type);
    println!("  Status:       {}", project.status);
    println!("  Progress:     {}%", project.progress);
    println!("  Location:     {}", project.location);
    println!("  Created:      {}", project.created_at.format("%Y-%m-%d %H:%M UTC"));
    println!("  Updated:      {}", project.updated_at.format("%Y-%m-%d %H:%M UTC"));
    println!();
    println!("{}", project.description);
    Ok(())
}
