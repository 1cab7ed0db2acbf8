//! `wordflow` binary: runs the upload server and manages the project store.

use std::net::SocketAddr;

use anyhow::{Context, Result, bail};
use clap::Parser;
use wf_core::store::{ProjectStore, export_file_name};
use wf_core::{LintSeverity, emit_outline, lint_project};
use wf_server::{Cli, Command, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level())).init();

    match cli.command {
        Command::Serve {
            host,
            port,
            max_upload_mb,
        } => {
            let config = ServerConfig::from_data_dir(&cli.data_dir).with_max_upload_mb(max_upload_mb);
            wf_server::serve(config, SocketAddr::new(host, port))
                .await
                .context("upload server failed")?;
        }
        Command::List => {
            let store = ProjectStore::open(&cli.store);
            let current = store.data().current_project_id.as_deref();
            for project in store.projects() {
                let marker = if current == Some(project.id.as_str()) { "*" } else { " " };
                println!(
                    "{marker} {:<32} {:<30} {}  updated {}",
                    project.id,
                    project.name,
                    project.flow_data.kind_counts(),
                    project.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Command::New { name, description } => {
            let mut store = ProjectStore::open(&cli.store);
            let project = store.create_project(&name, &description)?;
            println!("{}", project.id);
        }
        Command::Delete { id } => {
            let mut store = ProjectStore::open(&cli.store);
            if !store.delete_project(&id)? {
                bail!("no project with id `{id}`");
            }
        }
        Command::Export { id, out } => {
            let store = ProjectStore::open(&cli.store);
            let json = store.export_project(&id)?;
            let out = match out {
                Some(path) => path,
                None => {
                    let project = store.get(&id).context("project vanished during export")?;
                    export_file_name(&project.name).into()
                }
            };
            std::fs::write(&out, json).with_context(|| format!("writing {}", out.display()))?;
            println!("{}", out.display());
        }
        Command::Import { path } => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            let mut store = ProjectStore::open(&cli.store);
            let project = store.import_project(&json)?;
            println!("{} {}", project.id, project.name);
        }
        Command::Lint { id } => {
            let store = ProjectStore::open(&cli.store);
            let project = store.get(&id).with_context(|| format!("no project with id `{id}`"))?;
            let diags = lint_project(project);
            for diag in &diags {
                let level = match diag.severity {
                    LintSeverity::Warning => "warning",
                    LintSeverity::Info => "info",
                };
                println!("{level}[{}] {}: {}", diag.rule, diag.node_id, diag.message);
            }
            if diags.iter().any(|d| d.severity == LintSeverity::Warning) {
                std::process::exit(1);
            }
        }
        Command::Outline { id } => {
            let store = ProjectStore::open(&cli.store);
            let project = store.get(&id).with_context(|| format!("no project with id `{id}`"))?;
            print!("{}", emit_outline(project));
        }
    }
    Ok(())
}
