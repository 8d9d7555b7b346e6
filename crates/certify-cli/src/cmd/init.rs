use anyhow::Context;
use certify_core::{config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let project_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());

    println!("Initializing certify in: {}", root.display());

    let certify_dir = paths::certify_dir(root);
    io::ensure_dir(&certify_dir)
        .with_context(|| format!("failed to create {}", certify_dir.display()))?;

    let config_path = paths::config_path(root);
    let config = if !config_path.exists() {
        let cfg = Config::new(&project_name);
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
        cfg
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
        Config::load(root).context("failed to load config")?
    };

    let store_dir = config.store_dir(root);
    io::ensure_dir(&store_dir)
        .with_context(|| format!("failed to create {}", store_dir.display()))?;
    println!("  store:   {}", store_dir.display());

    println!("\nNext: certify wizard start");
    Ok(())
}
