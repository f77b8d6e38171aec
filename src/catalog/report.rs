//! Mapping report: the source table with three mapping columns appended.
//!
//! ```text
//! ID  NUMBER  ENGLISH   CONCEPTICON_ID  CONCEPTICON_GLOSS  SIMILARITY
//! L-1 1       the dog   2009            DOG                2
//! L-2 2       xyz                       ???
//! #<<<
//! L-3 3       hand      1277            HAND               2
//! L-3 3       hand      2121            ARM OR HAND        2
//! #>>>
//! #   2/3     67%
//! ```

use std::io::Write;

use serde::Serialize;

use crate::mapping::{ConceptMapping, MapTarget, MappingConfig, map_concepts};

use super::error::CatalogResult;
use super::tsv::{Table, TsvWriter};

/// Columns appended to every report row.
pub const MAPPING_COLUMNS: [&str; 3] = ["CONCEPTICON_ID", "CONCEPTICON_GLOSS", "SIMILARITY"];

/// Placeholder gloss for unmatched rows.
pub const NO_MATCH_GLOSS: &str = "???";

/// Column holding source glosses in a given language, when there is no GLOSS column.
pub fn gloss_column(language: &str) -> &'static str {
    match language {
        "fr" => "FRENCH",
        "en" => "ENGLISH",
        "es" => "SPANISH",
        "de" => "GERMAN",
        "pl" => "POLISH",
        "lt" => "LATIN",
        "zh" => "CHINESE",
        "pt" => "PORTUGUESE",
        "ru" => "RUSSIAN",
        "it" => "ITALIAN",
        _ => "GLOSS",
    }
}

/// Summary line of a mapping report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MapSummary {
    pub total: usize,
    /// Rows matched within the similarity level.
    pub good: usize,
}

impl MapSummary {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.good as f64 / self.total as f64
        }
    }
}

/// Source glosses of a table: GLOSS if the table has it, else the language column.
pub fn source_glosses<'a>(table: &'a Table, language: &str) -> Vec<&'a str> {
    let column = table
        .column("GLOSS")
        .or_else(|| table.column(gloss_column(language)));
    table
        .rows()
        .iter()
        .map(|row| column.map_or("", |i| row.get(i)))
        .collect()
}

/// Map the rows of `source` onto `targets` and write the report.
///
/// Rows with several distinct candidates are written as a `#<<<`/`#>>>`
/// block, or left out when `skip_multiple` is set.
pub fn write_map_report<W: Write>(
    source: &Table,
    targets: &[MapTarget],
    config: &MappingConfig,
    skip_multiple: bool,
    out: W,
) -> CatalogResult<MapSummary> {
    let glosses = source_glosses(source, &config.language);
    let mapping = map_concepts(&glosses, targets, config);
    let summary = render(source, targets, &mapping, config, skip_multiple, out)?;
    tracing::info!(
        source = source.origin(),
        good = summary.good,
        total = summary.total,
        "mapping report written"
    );
    Ok(summary)
}

fn render<W: Write>(
    source: &Table,
    targets: &[MapTarget],
    mapping: &ConceptMapping,
    config: &MappingConfig,
    skip_multiple: bool,
    out: W,
) -> CatalogResult<MapSummary> {
    let width = source.header().len() + MAPPING_COLUMNS.len();
    let marker = |text: &str| {
        let mut row = vec![text.to_string()];
        row.resize(width, String::new());
        row
    };

    let mut writer = TsvWriter::new(out, source.origin());
    writer.write_row(
        source
            .header()
            .iter()
            .map(String::as_str)
            .chain(MAPPING_COLUMNS),
    )?;

    let mut good = 0;
    for (i, row) in source.rows().iter().enumerate() {
        let found = mapping.get(i);
        let similarity = found.map(|m| m.similarity).unwrap_or_default();
        if similarity.within(config.similarity_level) {
            good += 1;
        }
        let candidates = found.map(|m| m.distinct_targets(targets)).unwrap_or_default();
        let with = |id: &str, gloss: &str, similarity: String| {
            let mut values = row.values.clone();
            values.resize(source.header().len(), String::new());
            values.extend([id.to_string(), gloss.to_string(), similarity]);
            values
        };

        match candidates.as_slice() {
            [] => writer.write_row(with("", NO_MATCH_GLOSS, String::new()))?,
            [(id, gloss)] => writer.write_row(with(id, gloss, similarity.to_string()))?,
            many if !skip_multiple => {
                writer.write_row(marker("#<<<"))?;
                for (id, gloss) in many {
                    writer.write_row(with(id, gloss, similarity.to_string()))?;
                }
                writer.write_row(marker("#>>>"))?;
            }
            _ => {
                tracing::debug!(row = i, candidates = candidates.len(), "skipping ambiguous row");
            }
        }
    }

    let summary = MapSummary {
        total: source.len(),
        good,
    };
    let mut footer = vec![
        "#".to_string(),
        format!("{}/{}", summary.good, summary.total),
        format!("{:.0}%", summary.percentage()),
    ];
    footer.resize(width.max(footer.len()), String::new());
    writer.write_row(footer)?;
    writer.flush()?;
    Ok(summary)
}
