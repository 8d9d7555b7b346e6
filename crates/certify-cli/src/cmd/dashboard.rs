use crate::output::{print_json, print_table, progress_bar};
use anyhow::Context;
use certify_core::config::Config;
use certify_core::dashboard::{Dashboard, DashboardOptions};
use certify_core::storage::FileStore;
use certify_core::types::Tab;
use certify_core::wizard::Handoff;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum DashboardSubcommand {
    /// Show the fields on one tab (default: overview)
    Show {
        #[arg(long, default_value = "overview")]
        tab: String,
    },

    /// Show completion for every tab
    Tabs,

    /// Set one field
    Set {
        key: String,
        value: String,
        /// Tab the edit is made from; switching tabs flushes pending writes
        #[arg(long)]
        tab: Option<String>,
    },

    /// Save the project record and confirm
    Save,

    /// Delete the stored project record
    Clear,
}

pub fn run(root: &Path, subcmd: DashboardSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        DashboardSubcommand::Show { tab } => show(root, &tab, json),
        DashboardSubcommand::Tabs => tabs(root, json),
        DashboardSubcommand::Set { key, value, tab } => {
            set(root, &key, &value, tab.as_deref(), json)
        }
        DashboardSubcommand::Save => save(root, json),
        DashboardSubcommand::Clear => clear(root, json),
    }
}

fn mount(root: &Path) -> anyhow::Result<Dashboard<FileStore>> {
    let config = Config::load(root).context("failed to load config")?;
    let store = FileStore::new(config.store_dir(root));
    let handoff = Handoff::load(root).context("failed to read handoff")?;
    let dashboard = Dashboard::load_on_mount(
        store,
        handoff.as_ref().map(|h| &h.record),
        DashboardOptions::from(&config),
    )
    .context("failed to load project data")?;
    Ok(dashboard)
}

fn parse_tab(tab: &str) -> anyhow::Result<Tab> {
    tab.parse::<Tab>().with_context(|| {
        let names: Vec<&str> = Tab::all().iter().map(|t| t.as_str()).collect();
        format!("unknown tab '{tab}' (expected one of: {})", names.join(", "))
    })
}

// ---------------------------------------------------------------------------
// show / tabs
// ---------------------------------------------------------------------------

fn show(root: &Path, tab: &str, json: bool) -> anyhow::Result<()> {
    let tab = parse_tab(tab)?;
    let mut dashboard = mount(root)?;
    dashboard.select_tab(tab)?;

    if json {
        let fields: serde_json::Map<String, serde_json::Value> = dashboard
            .tab_fields(tab)
            .into_iter()
            .map(|(spec, value)| (spec.key.to_string(), serde_json::json!(value)))
            .collect();
        print_json(&serde_json::json!({
            "tab": tab,
            "source": dashboard.source(),
            "progress": dashboard.tab_progress(tab),
            "fields": fields,
        }))?;
        return Ok(());
    }

    let progress = dashboard.tab_progress(tab);
    println!("{}  {}", tab.title(), progress_bar(progress.percent()));
    let rows: Vec<Vec<String>> = dashboard
        .tab_fields(tab)
        .into_iter()
        .map(|(spec, value)| {
            vec![
                spec.key.to_string(),
                spec.label.to_string(),
                value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    print_table(&["FIELD", "LABEL", "VALUE"], rows);
    Ok(())
}

fn tabs(root: &Path, json: bool) -> anyhow::Result<()> {
    let dashboard = mount(root)?;
    let progress = dashboard.progress();

    if json {
        return print_json(&progress);
    }

    let rows: Vec<Vec<String>> = progress
        .iter()
        .map(|p| {
            vec![
                p.tab.to_string(),
                format!("{}/{}", p.filled, p.total),
                progress_bar(p.percent()),
            ]
        })
        .collect();
    print_table(&["TAB", "FILLED", "PROGRESS"], rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// set / save / clear
// ---------------------------------------------------------------------------

fn set(root: &Path, key: &str, value: &str, tab: Option<&str>, json: bool) -> anyhow::Result<()> {
    let mut dashboard = mount(root)?;
    if let Some(tab) = tab {
        dashboard.select_tab(parse_tab(tab)?)?;
    }
    dashboard
        .set_field_raw(key, value)
        .with_context(|| format!("failed to set '{key}'"))?;
    let stored = dashboard.record().get(key).cloned();
    dashboard.close().context("failed to write project data")?;

    if json {
        print_json(&serde_json::json!({ "key": key, "value": stored }))?;
    } else if let Some(v) = stored {
        println!("{key} = {v}");
    } else {
        println!("Ignored unknown field '{key}'.");
    }
    Ok(())
}

fn save(root: &Path, json: bool) -> anyhow::Result<()> {
    let mut dashboard = mount(root)?;
    let confirmation = dashboard
        .save_explicit()
        .context("failed to save project data")?;

    if json {
        print_json(&confirmation)?;
    } else {
        println!(
            "Project data saved ({} bytes under '{}').",
            confirmation.bytes, confirmation.key
        );
    }
    Ok(())
}

fn clear(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let store = FileStore::new(config.store_dir(root));
    let removed = store
        .remove(&config.storage.dashboard_key)
        .context("failed to remove project data")?;

    if json {
        print_json(&serde_json::json!({ "removed": removed }))?;
    } else if removed {
        println!("Stored project data removed.");
    } else {
        println!("No stored project data.");
    }
    Ok(())
}
