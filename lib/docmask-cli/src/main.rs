#![allow(missing_docs)]
use anyhow::{Context, Result};
use docmask_core::{BatchPipeline, DocumentMasker, FakeGenerator, FieldMap, RunReport, Store};
use tracing::{Level, debug, info, warn};

mod args;
use self::args::{AppArgs, Command, HELP};

#[tokio::main]
async fn main() -> Result<()> {
    let args = match Command::parse().context("parsing arguments")? {
        Command::Help => {
            print_help();
            return Ok(());
        }
        Command::Run(args) => args,
    };

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    if !args.remaining.is_empty() {
        warn!(remaining = ?args.remaining, "Warning: unused arguments left");
    }

    let report = run(&args).await?;
    print_summary(&args, &report);

    info!("Bye!");
    Ok(())
}

async fn run(args: &AppArgs) -> Result<RunReport> {
    let field_map = FieldMap::from_path(&args.fields)
        .with_context(|| format!("loading field map {}", args.fields.display()))?;
    for rule in field_map.unknown_tags() {
        warn!(path = %rule.path, tag = %rule.tag, "unknown type tag, a random word is used");
    }
    debug!(rules = field_map.len(), "field map loaded");

    let store = Store::connect(&args.uri)
        .await
        .context("connecting to the store")?;
    let mut source = store
        .source(&args.source)
        .await
        .with_context(|| format!("opening source collection {}", args.source))?;
    let mut sink = store
        .sink(&args.target)
        .await
        .with_context(|| format!("opening target collection {}", args.target))?;

    let generator = args
        .seed
        .map_or_else(FakeGenerator::new, FakeGenerator::seeded);
    let masker = DocumentMasker::with_config(field_map, args.masker_config());
    let mut pipeline = BatchPipeline::with_config(masker, generator, args.pipeline_config());

    let report = pipeline
        .run_with_progress(&mut source, &mut sink, |progress| {
            info!(
                processed = progress.processed,
                total = progress.total,
                "{} documents processed",
                progress.processed
            );
        })
        .await
        .with_context(|| format!("masking {} into {}", args.source, args.target))?;

    Ok(report)
}

#[allow(clippy::print_stdout)]
fn print_help() {
    print!("{HELP}");
}

#[allow(clippy::print_stdout)]
fn print_summary(args: &AppArgs, report: &RunReport) {
    println!(
        "Masked {} of {} documents from {} into {}",
        report.processed, report.total, args.source, args.target
    );
    if report.diagnostics > 0 {
        println!(
            "{} fields could not be masked{}",
            report.diagnostics,
            if args.show_warnings {
                ""
            } else {
                " (use --show-warnings for details)"
            }
        );
    }
}
