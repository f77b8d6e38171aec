//! concepticon CLI: map wordlists to concept sets and compare them.

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use concepticon::catalog::Concepticon;
use concepticon::config::CatalogConfig;
use concepticon::error::ConcepticonResult;
use concepticon::gloss::{Similarity, parse_constituents};
use concepticon::graph::{RelationKind, RelationMode};
use concepticon::mapping::{MapMode, MappingConfig};

#[derive(Parser)]
#[command(name = "concepticon", version, about = "Concept list mapping and comparison")]
struct Cli {
    /// Root of the concepticon-data checkout.
    #[arg(long, global = true)]
    repos: Option<PathBuf>,

    /// TOML config file; `--repos` overrides its `repos` key.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Mapper flags shared by `lookup` and `map-concepts`.
#[derive(Args)]
struct MapArgs {
    /// Language of the glosses.
    #[arg(long)]
    language: Option<String>,

    /// Worst similarity accepted as a match (1-10).
    #[arg(long)]
    similarity: Option<u8>,

    /// Score every pair instead of using token buckets.
    #[arg(long)]
    full_search: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse glosses and print their normalised form.
    Parse {
        glosses: Vec<String>,

        #[arg(long, default_value = "en")]
        language: String,
    },

    /// Look up the best concept sets for search terms.
    Lookup {
        #[arg(required = true)]
        terms: Vec<String>,

        #[command(flatten)]
        map: MapArgs,
    },

    /// Map a concept list file and print the report.
    MapConcepts {
        /// Concept list TSV with ID, NUMBER and GLOSS or a language column.
        clist: PathBuf,

        /// Map against another concept list instead of the reference.
        #[arg(long)]
        otherlist: Option<PathBuf>,

        /// Leave out rows with several candidates.
        #[arg(long)]
        skip_multiple: bool,

        #[command(flatten)]
        map: MapArgs,
    },

    /// Concept sets linked by any of the given lists.
    Union {
        /// Concept list ids or paths.
        #[arg(required = true)]
        lists: Vec<String>,

        #[arg(long)]
        search_depth: Option<usize>,
    },

    /// Concept sets linked directly by all of the given lists.
    Intersection {
        #[arg(required = true)]
        lists: Vec<String>,

        #[arg(long)]
        search_depth: Option<usize>,
    },

    /// Walk relations from a concept set id or gloss.
    Related {
        concept: String,

        #[arg(long, default_value = "narrower")]
        relation: String,

        #[arg(long, default_value = "2")]
        max_depth: usize,

        /// Follow every label of a pair, not only the last one recorded.
        #[arg(long)]
        multiple: bool,
    },

    /// Report structural problems in the catalogue.
    Check,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let stdout = std::io::stdout();

    match cli.command {
        Commands::Parse { glosses, language } => {
            let mut out = stdout.lock();
            for raw in &glosses {
                match parse_constituents(raw, &language) {
                    Ok(parsed) => {
                        for gloss in &parsed {
                            writeln!(out, "{raw}\t{}", serde_json::to_string(gloss).into_diagnostic()?)
                                .into_diagnostic()?;
                        }
                    }
                    Err(e) => writeln!(out, "{raw}\t# {e}").into_diagnostic()?,
                }
            }
        }

        Commands::Lookup { terms, map } => {
            let catalog = open(&config)?;
            let mapping = mapping_config(&config, &map);
            let found = catalog.lookup(&terms, &mapping)?;
            let mut out = stdout.lock();
            for (term, hits) in terms.iter().zip(&found) {
                if hits.is_empty() {
                    writeln!(out, "{term}\t\t???\t").into_diagnostic()?;
                }
                for hit in hits {
                    writeln!(out, "{}\t{}\t{}\t{}", hit.term, hit.id, hit.gloss, hit.similarity)
                        .into_diagnostic()?;
                }
            }
        }

        Commands::MapConcepts {
            clist,
            otherlist,
            skip_multiple,
            map,
        } => {
            let catalog = open(&config)?;
            let mapping = mapping_config(&config, &map);
            catalog.map(&clist, otherlist.as_deref(), &mapping, skip_multiple, stdout.lock())?;
        }

        Commands::Union { lists, search_depth } => {
            let catalog = open(&config)?;
            let refs: Vec<&str> = lists.iter().map(String::as_str).collect();
            let rows = catalog.union(&refs, search_depth.unwrap_or(config.search_depth))?;
            let mut out = stdout.lock();
            for row in &rows {
                writeln!(out, "{row}").into_diagnostic()?;
            }
        }

        Commands::Intersection { lists, search_depth } => {
            let catalog = open(&config)?;
            let refs: Vec<&str> = lists.iter().map(String::as_str).collect();
            let rows = catalog.intersection(&refs, search_depth.unwrap_or(config.search_depth))?;
            let mut out = stdout.lock();
            for row in &rows {
                writeln!(out, "{row}").into_diagnostic()?;
            }
        }

        Commands::Related {
            concept,
            relation,
            max_depth,
            multiple,
        } => {
            let catalog = open(&config)?;
            let relation = RelationKind::from(relation);
            let mode = if multiple {
                RelationMode::Multiple
            } else {
                RelationMode::Single
            };
            let mut out = stdout.lock();
            for (key, depth) in catalog.related_in(mode, &concept, relation, max_depth) {
                writeln!(out, "{depth}\t{key}").into_diagnostic()?;
            }
        }

        Commands::Check => {
            let catalog = open(&config)?;
            let issues = catalog.check()?;
            let mut out = stdout.lock();
            for issue in &issues {
                writeln!(out, "{issue}").into_diagnostic()?;
            }
            if !issues.is_empty() {
                miette::bail!("{} problem(s) found in {}", issues.len(), config.repos.display());
            }
        }
    }

    Ok(())
}

fn open(config: &CatalogConfig) -> ConcepticonResult<Concepticon> {
    Ok(Concepticon::open(config)?)
}

fn load_config(cli: &Cli) -> ConcepticonResult<CatalogConfig> {
    let mut config = match &cli.config {
        Some(path) => CatalogConfig::load(path)?,
        None => CatalogConfig::default(),
    };
    if let Some(repos) = &cli.repos {
        config.repos = repos.clone();
    }
    Ok(config)
}

fn mapping_config(config: &CatalogConfig, args: &MapArgs) -> MappingConfig {
    let mut mapping = config.mapping_config();
    if let Some(language) = &args.language {
        mapping.language = language.clone();
    }
    if let Some(level) = args.similarity {
        mapping.similarity_level = Similarity::new(level);
    }
    if args.full_search {
        mapping.mode = MapMode::Exhaustive;
    }
    mapping
}
