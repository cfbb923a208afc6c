mod config;
mod render;

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    results::{canned_script_path, raw_record_path},
    HttpStructureService, PageController, StatusView, StructureService,
};
use shared::domain::{Identifier, SearchMode};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pdb-explorer", about = "Search protein structures and align selections")]
struct Args {
    /// Overrides `server_url` from the config file and environment.
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Config file to read instead of `explorer.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a search, then optionally select results and act on them.
    Search(SearchArgs),
    /// Open one record in the visualization tool.
    Open { id: String },
    /// Start the visualization tool on a previously exported script.
    LaunchScript { filename: String },
    /// Download the raw record (or its canned script with `--script`).
    Download {
        id: String,
        #[arg(long)]
        script: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Download any server-relative file, e.g. an artifact link.
    Fetch {
        path: String,
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct SearchArgs {
    #[arg(value_enum)]
    mode: ModeArg,
    /// Keyword, protein name, organism, identifier or resolution, depending
    /// on the mode. In advanced mode this is the protein name.
    text: Option<String>,
    /// Advanced mode only.
    #[arg(long)]
    organism: Option<String>,
    /// Advanced mode only.
    #[arg(long)]
    resolution: Option<String>,
    #[arg(long)]
    max: Option<u32>,
    /// Adds a structure to the selection; repeatable.
    #[arg(long = "select")]
    select: Vec<String>,
    #[arg(long)]
    select_all: bool,
    #[arg(long, value_enum)]
    align: Option<AlignArg>,
    /// Export the whole result set.
    #[arg(long)]
    export: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Keyword,
    Name,
    Organism,
    Id,
    Resolution,
    Advanced,
}

impl From<ModeArg> for SearchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Keyword => SearchMode::Keyword,
            ModeArg::Name => SearchMode::Name,
            ModeArg::Organism => SearchMode::Organism,
            ModeArg::Id => SearchMode::Id,
            ModeArg::Resolution => SearchMode::Resolution,
            ModeArg::Advanced => SearchMode::Advanced,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AlignArg {
    Session,
    Script,
    Launch,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(url) = args.server_url {
        settings.server_url = url;
    }
    info!(server = %settings.server_url, "using structure service");

    let service: Arc<dyn StructureService> = Arc::new(
        HttpStructureService::new(&settings.server_url)
            .with_context(|| format!("invalid server url '{}'", settings.server_url))?,
    );
    let controller = PageController::new(service.clone(), settings.controller_options());

    match args.command {
        Command::Search(search) => run_search(&controller, search).await,
        Command::Open { id } => {
            let outcome = controller
                .orchestrator
                .open_single_record(&Identifier::new(id))
                .await;
            finish(&controller, outcome.map(|_| ())).await
        }
        Command::LaunchScript { filename } => {
            let outcome = controller.orchestrator.launch_prepared_script(&filename).await;
            finish(&controller, outcome.map(|_| ())).await
        }
        Command::Download { id, script, out } => {
            let id = Identifier::new(id);
            let (path, default_name) = if script {
                (canned_script_path(&id), format!("{id}.pml"))
            } else {
                (raw_record_path(&id), format!("{id}.pdb"))
            };
            let out = out.unwrap_or_else(|| PathBuf::from(default_name));
            save(service.as_ref(), &path, out).await
        }
        Command::Fetch { path, out } => save(service.as_ref(), &path, out).await,
    }
}

async fn run_search(controller: &PageController, args: SearchArgs) -> Result<()> {
    let mode = SearchMode::from(args.mode);
    controller.select_mode(mode).await;
    controller
        .update_form(|form| {
            let text = args.text.clone().unwrap_or_default();
            match mode {
                SearchMode::Keyword => form.keyword = text,
                SearchMode::Name => form.protein_name = text,
                SearchMode::Organism => form.organism = text,
                SearchMode::Id => form.pdb_id = text,
                SearchMode::Resolution => form.resolution = text,
                SearchMode::Advanced => {
                    form.advanced.protein_name = text;
                    form.advanced.organism = args.organism.clone().unwrap_or_default();
                    form.advanced.resolution = args.resolution.clone().unwrap_or_default();
                }
            }
            if let Some(max) = args.max {
                form.set_limit(mode, max);
            }
        })
        .await;

    let searched = controller.search.submit().await;
    print!("{}", render::status(&controller.status().await));
    if let Err(err) = searched {
        bail!("search failed: {err}");
    }
    print!("{}", render::results_table(&controller.results_table().await));

    if args.select_all {
        controller.set_all_selected(true).await;
    }
    let already = controller.selected().await;
    for id in additions(args.select, &already) {
        if let Err(err) = controller.toggle(&id).await {
            eprintln!("skipping {id}: {err}");
        }
    }
    if let Some(line) = render::selection_summary(&controller.selection_summary().await) {
        println!("{line}");
    }

    if let Some(align) = args.align {
        let orchestrator = &controller.orchestrator;
        let outcome = match align {
            AlignArg::Session => orchestrator.create_session().await,
            AlignArg::Script => orchestrator.export_script().await,
            AlignArg::Launch => orchestrator.align_and_launch().await,
        };
        finish(controller, outcome.map(|_| ())).await?;
    }

    if args.export {
        let outcome = controller.search.export_results().await;
        finish(controller, outcome.map(|_| ())).await?;
    }
    Ok(())
}

/// `--select` only ever adds, so it composes with `--select-all` and
/// repeating an id is harmless.
fn additions(requested: Vec<String>, already: &[Identifier]) -> Vec<Identifier> {
    let mut picked: Vec<Identifier> = Vec::new();
    for id in requested.into_iter().map(Identifier::new) {
        if !already.contains(&id) && !picked.contains(&id) {
            picked.push(id);
        }
    }
    picked
}

/// Prints whatever the controller left in the status area and turns a
/// failed action into a non-zero exit.
async fn finish(
    controller: &PageController,
    outcome: Result<(), client_core::ClientError>,
) -> Result<()> {
    let status = controller.status().await;
    print!("{}", render::status(&status));
    match outcome {
        Ok(()) => Ok(()),
        Err(err) if matches!(status, StatusView::OpenFallback { .. }) => {
            info!(error = %err, "open fell back to raw download");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

async fn save(service: &dyn StructureService, path: &str, out: PathBuf) -> Result<()> {
    let bytes = service.fetch_file(path).await?;
    tokio::fs::write(&out, &bytes)
        .await
        .with_context(|| format!("failed to write '{}'", out.display()))?;
    println!("saved {} ({} bytes)", out.display(), bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn select_skips_ids_already_selected_by_select_all() {
        let already = vec![Identifier::from("1ABC"), Identifier::from("2XYZ")];
        assert!(additions(owned(&["1ABC", "2XYZ"]), &already).is_empty());
    }

    #[test]
    fn repeated_select_adds_once_in_order() {
        let picked = additions(owned(&["3DEF", "1ABC", "3DEF"]), &[]);
        assert_eq!(picked, vec![Identifier::from("3DEF"), Identifier::from("1ABC")]);
    }

    #[test]
    fn select_all_and_select_parse_together() {
        let args = Args::try_parse_from([
            "pdb-explorer",
            "search",
            "keyword",
            "kinase",
            "--select-all",
            "--select",
            "1ABC",
            "--align",
            "session",
        ])
        .expect("parse");
        let Command::Search(search) = args.command else {
            panic!("expected search command");
        };
        assert!(search.select_all);
        assert_eq!(search.select, vec!["1ABC".to_string()]);
        assert!(matches!(search.align, Some(AlignArg::Session)));
    }
}
