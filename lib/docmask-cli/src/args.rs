use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use docmask_core::{
    CollectionRef, DEFAULT_BATCH_SIZE, DEFAULT_MAX_ATTEMPTS, MaskerConfig, PipelineConfig,
};

pub const HELP: &str = "\
Copy a document collection while masking sensitive fields

USAGE:
  docmask [OPTIONS] <URI> <SOURCE_DB> <SOURCE_COLLECTION> <TARGET_DB> <TARGET_COLLECTION> <FIELDS>

ARGS:
  <URI>                 Connection URI (file:///path/to/dir, mongodb://...)
  <SOURCE_DB>           Source database
  <SOURCE_COLLECTION>   Source collection
  <TARGET_DB>           Target database
  <TARGET_COLLECTION>   Target collection
  <FIELDS>              Field map file (JSON object of path -> type tag)

OPTIONS:
  --batch-size <N>      Documents per bulk insert [default: 100]
  --show-warnings       Log fields that could not be masked
  --strict-paths        Also report missing intermediate keys
  --seed <N>            Seed the generator for reproducible output
  --max-attempts <N>    Retries to get a value different from the original [default: 32]
  -v, --verbose         Debug logging
  -h, --help            Print this help
";

/// Parsed command line.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Run(AppArgs),
}

#[derive(Debug, PartialEq, Eq)]
pub struct AppArgs {
    pub uri: String,
    pub source: CollectionRef,
    pub target: CollectionRef,
    pub fields: PathBuf,
    pub batch_size: usize,
    pub show_warnings: bool,
    pub strict_paths: bool,
    pub seed: Option<u64>,
    pub max_attempts: usize,
    pub verbose: bool,
    pub remaining: Vec<OsString>,
}

impl AppArgs {
    pub fn masker_config(&self) -> MaskerConfig {
        MaskerConfig {
            max_attempts: self.max_attempts,
            report_missing_intermediate: self.strict_paths,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            batch_size: self.batch_size,
            show_warnings: self.show_warnings,
        }
    }
}

impl Command {
    pub fn parse() -> Result<Self> {
        Self::parse_from(pico_args::Arguments::from_env())
    }

    pub fn parse_from(mut pargs: pico_args::Arguments) -> Result<Self> {
        if pargs.contains(["-h", "--help"]) {
            return Ok(Self::Help);
        }

        let verbose = pargs.contains(["-v", "--verbose"]);
        let show_warnings = pargs.contains("--show-warnings");
        let strict_paths = pargs.contains("--strict-paths");
        let batch_size = pargs
            .opt_value_from_str("--batch-size")
            .context("parsing batch size argument")?
            .unwrap_or(DEFAULT_BATCH_SIZE);
        let seed = pargs
            .opt_value_from_str("--seed")
            .context("parsing seed argument")?;
        let max_attempts = pargs
            .opt_value_from_str("--max-attempts")
            .context("parsing max attempts argument")?
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);

        let uri = pargs.free_from_str().context("missing <URI>")?;
        let source_db: String = pargs.free_from_str().context("missing <SOURCE_DB>")?;
        let source_collection: String = pargs
            .free_from_str()
            .context("missing <SOURCE_COLLECTION>")?;
        let target_db: String = pargs.free_from_str().context("missing <TARGET_DB>")?;
        let target_collection: String = pargs
            .free_from_str()
            .context("missing <TARGET_COLLECTION>")?;
        let fields = pargs.free_from_str().context("missing <FIELDS>")?;

        Ok(Self::Run(AppArgs {
            uri,
            source: CollectionRef::new(source_db, source_collection),
            target: CollectionRef::new(target_db, target_collection),
            fields,
            batch_size,
            show_warnings,
            strict_paths,
            seed,
            max_attempts,
            verbose,
            remaining: pargs.finish(),
        }))
    }
}
