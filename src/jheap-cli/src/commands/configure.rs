//! Configuration command handler

use crate::config::Config;
use anyhow::Result;

pub fn handle(
    target_class: Option<String>,
    parent_fields: Option<String>,
    show: bool,
) -> Result<()> {
    let mut config = Config::load()?;
    let mut changed = false;

    if let Some(target) = target_class {
        config.target_class = Some(target);
        changed = true;
    }

    if let Some(fields) = parent_fields {
        let fields: Vec<String> = fields
            .split(',')
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        config.parent_fields = Some(fields);
        changed = true;
    }

    if changed {
        config.save()?;
        println!("Configuration saved to {}", Config::config_path()?.display());
    }

    if show || !changed {
        println!(
            "target_class:  {}",
            config.target_class.as_deref().unwrap_or("char[] (default)")
        );
        println!(
            "parent_fields: {}",
            config
                .parent_fields
                .map(|f| f.join(","))
                .unwrap_or_else(|| "compositeParent,parent (default)".to_string())
        );
    }

    Ok(())
}
