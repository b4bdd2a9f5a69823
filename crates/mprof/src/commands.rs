use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use melody_profile::{
    pitch_class, write_csv, write_json, Corpus, CorpusAnalysis, CorpusOptions, DistributionView,
    ModeSummary,
};
use profconf::{ConfigSources, OutputFormat, ProfileConfig};
use tracing::info;

use crate::render;

fn corpus_options(config: &ProfileConfig) -> CorpusOptions {
    CorpusOptions {
        delimiter: config.input.delimiter,
        key_column: config.input.key_column.clone(),
        pitches_column: config.input.pitches_column.clone(),
        id_column: config.input.id_column.clone(),
    }
}

fn load(config: &ProfileConfig, input: &Path) -> Result<(Corpus, CorpusAnalysis)> {
    let corpus = Corpus::open(input, &corpus_options(config))
        .with_context(|| format!("loading corpus {}", input.display()))?;
    let analysis = corpus
        .analyze()
        .with_context(|| format!("analyzing corpus {}", input.display()))?;
    Ok((corpus, analysis))
}

pub fn analyze(
    config: &ProfileConfig,
    input: &Path,
    output: Option<&Path>,
    format: OutputFormat,
    view: DistributionView,
) -> Result<()> {
    let (corpus, analysis) = load(config, input)?;

    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    match format {
        OutputFormat::Csv => write_csv(&corpus, &analysis, view, writer)?,
        OutputFormat::Json => write_json(&analysis, writer)?,
    }

    info!(
        pieces = analysis.pieces.len(),
        excluded = analysis.excluded.len(),
        format = format.as_str(),
        "wrote analysis"
    );
    Ok(())
}

pub fn summary(config: &ProfileConfig, input: &Path, width: usize, json: bool) -> Result<()> {
    let (_, analysis) = load(config, input)?;
    let summaries = ModeSummary::from_pieces(&analysis.pieces);

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for (i, summary) in summaries.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{}", render::mode_chart(summary, width));
    }
    if !analysis.excluded.is_empty() {
        println!();
        println!("{} piece(s) excluded", analysis.excluded.len());
        for exclusion in &analysis.excluded {
            println!("  {}: {}", exclusion.id, exclusion.reason);
        }
    }
    Ok(())
}

pub fn pitch(tokens: &[String]) -> Result<()> {
    for token in tokens {
        let pc = pitch_class(token).with_context(|| format!("parsing {:?}", token))?;
        println!("{}\t{}\t{}", token, pc, pc.name());
    }
    Ok(())
}

pub fn show_config(config: &ProfileConfig, sources: &ConfigSources) {
    print!("{}", config.to_toml());
    println!();
    if sources.files.is_empty() {
        println!("# no config files loaded");
    }
    for file in &sources.files {
        println!("# loaded {}", file.display());
    }
    for var in &sources.env_overrides {
        println!("# overridden by ${}", var);
    }
}
