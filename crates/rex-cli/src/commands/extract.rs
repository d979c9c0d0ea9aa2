//! The `rex extract` command: scan a corpus, then synchronize manifests
//!
//! Two-phase by construction: the scan fills the accumulator, which is then
//! consumed read-only by planning and writing. Interrupting the scan leaves
//! no partial manifest behind because nothing is written until the plan is
//! applied.

use colored::Colorize;
use std::path::PathBuf;

use rex_ast::TestSourceScanner;
use rex_config::Config;
use rex_logger as logger;
use rex_manifest::{Accumulator, SyncPlan, WriteAction};

use crate::GlobalOpts;

pub struct ExtractArgs {
    pub path: Option<String>,
    pub dry_run: bool,
    pub check: bool,
    pub no_parallel: bool,
}

pub fn handle_extract(args: ExtractArgs, opts: GlobalOpts) -> i32 {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            logger::warn(&format!("Failed to load config, using defaults: {}", e));
            Config::default()
        }
    };

    let corpus_root = args
        .path
        .clone()
        .or_else(|| config.corpus_root.clone())
        .map_or_else(|| PathBuf::from("."), PathBuf::from);

    if !corpus_root.is_dir() {
        logger::error(&format!("Corpus root is not a directory: {:?}", corpus_root));
        return 2;
    }

    let scanner = TestSourceScanner::new(corpus_root.clone())
        .with_license_file_name(config.license_file_name())
        .with_parallel(config.parallel_enabled() && !args.no_parallel);

    let acc = Accumulator::new();
    let stats = match scanner.scan(&acc) {
        Ok(stats) => stats,
        Err(e) => {
            logger::error(&format!("Scan failed: {}", e));
            return 2;
        }
    };

    logger::info(&format!(
        "Scanned {} test files ({} examples, {} existing manifests)",
        stats.files_scanned, stats.examples_recorded, stats.manifests_seen
    ));

    let examples = acc.into_examples();
    let plan = rex_manifest::plan(&examples);

    if args.check {
        return finish_check(&plan);
    }

    if args.dry_run {
        return finish_dry_run(&plan, opts);
    }

    let outcome = rex_manifest::apply(plan);

    for diagnostic in &outcome.diagnostics {
        logger::warn(&format!(
            "{}: {}",
            diagnostic.path.display(),
            diagnostic.message
        ));
    }

    logger::success(&format!(
        "Manifests: {} created, {} updated, {} unchanged",
        outcome.created.len(),
        outcome.updated.len(),
        outcome.unchanged
    ));
    if opts.verbosity_level() > 0 {
        for path in outcome.created.iter().chain(outcome.updated.iter()) {
            println!("  {}", path.display());
        }
    }

    0
}

/// CI gate: report pending changes and fail without writing anything
fn finish_check(plan: &SyncPlan) -> i32 {
    for diagnostic in &plan.diagnostics {
        logger::warn(&format!(
            "{}: {}",
            diagnostic.path.display(),
            diagnostic.message
        ));
    }

    if plan.has_changes() {
        println!("{}", "Manifests out of date:".bold().red());
        for action in &plan.actions {
            let label = match action {
                WriteAction::Create { .. } => "create",
                WriteAction::Update { .. } => "update",
            };
            println!("  {} {}", label.yellow(), action.path().display());
        }
        1
    } else {
        logger::success("All example manifests are up to date");
        0
    }
}

fn finish_dry_run(plan: &SyncPlan, opts: GlobalOpts) -> i32 {
    println!(
        "{} {} to create, {} to update, {} unchanged",
        "Dry run:".bold().cyan(),
        plan.actions
            .iter()
            .filter(|a| matches!(a, WriteAction::Create { .. }))
            .count(),
        plan.actions
            .iter()
            .filter(|a| matches!(a, WriteAction::Update { .. }))
            .count(),
        plan.unchanged
    );
    for action in &plan.actions {
        println!("  {}", action.path().display());
        if opts.verbosity_level() > 0 {
            println!("{}", action.content());
        }
    }
    for diagnostic in &plan.diagnostics {
        logger::warn(&format!(
            "{}: {}",
            diagnostic.path.display(),
            diagnostic.message
        ));
    }
    0
}
