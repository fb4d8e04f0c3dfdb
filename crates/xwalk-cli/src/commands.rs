use anyhow::Result;
use comfy_table::{Cell, CellAlignment, Table};

use xwalk_cli::config::{BuildOverrides, BuildSettings, ConfigFile};
use xwalk_cli::pipeline::{run_build, shared_task_texts};
use xwalk_cli::types::BuildResult;
use xwalk_model::OccupationCode;

use crate::cli::{BuildArgs, DuplicatesArgs};
use crate::summary::{apply_table_style, header_cell};

fn overrides_from_args(args: &BuildArgs) -> BuildOverrides {
    BuildOverrides {
        usage: args.usage.clone(),
        onet_dir: args.onet_dir.clone(),
        wages: args.wages.clone(),
        task_ratings: args.task_ratings.clone(),
        output_dir: args.output_dir.clone(),
        threshold: args.threshold,
        scorer: args.scorer.map(Into::into),
        allocation: args.allocation.map(Into::into),
        no_parallel: args.no_parallel,
        dry_run: args.dry_run,
    }
}

pub fn run_build_command(args: &BuildArgs) -> Result<BuildResult> {
    let file = match &args.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let settings = BuildSettings::resolve(file, overrides_from_args(args))?;
    run_build(&settings)
}

pub fn run_duplicates(args: &DuplicatesArgs) -> Result<()> {
    let shared = shared_task_texts(&args.onet_dir)?;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Task text"),
        header_cell("Occupations"),
        header_cell("Tasks"),
        header_cell("Codes"),
    ]);
    apply_table_style(&mut table);
    for text in shared.iter().take(args.limit) {
        let codes: Vec<&str> = text.occupation_codes.iter().map(OccupationCode::as_str).collect();
        table.add_row(vec![
            Cell::new(&text.normalized_text),
            Cell::new(text.occupation_count()).set_alignment(CellAlignment::Right),
            Cell::new(text.task_ids.len()).set_alignment(CellAlignment::Right),
            Cell::new(codes.join(", ")),
        ]);
    }
    println!("{table}");
    println!(
        "{} of {} shared texts shown",
        shared.len().min(args.limit),
        shared.len()
    );
    Ok(())
}
