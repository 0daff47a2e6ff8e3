mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Summary {
            scan,
            group_threshold,
            value_limit,
            by_size,
            json,
        } => {
            commands::summary::handle(&scan, group_threshold, value_limit, by_size, json)?;
        }

        Commands::Tree {
            scan,
            cluster_threshold,
            all,
            top,
        } => {
            commands::tree::handle(&scan, cluster_threshold, all, top)?;
        }

        Commands::Classes {
            input,
            filter,
            counts,
            json,
        } => {
            commands::classes::handle(&input, filter.as_deref(), counts, json)?;
        }

        Commands::Histogram { input, top, json } => {
            commands::histogram::handle(&input, top, json)?;
        }

        Commands::Fields {
            input,
            object_id,
            class,
        } => {
            commands::fields::handle(&input, object_id.as_deref(), class.as_deref())?;
        }

        Commands::Info { input } => {
            commands::info::handle(&input)?;
        }

        Commands::Configure {
            target_class,
            parent_fields,
            show,
        } => {
            commands::configure::handle(target_class, parent_fields, show)?;
        }
    }

    Ok(())
}
