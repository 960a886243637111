use anyhow::{bail, Context};
use bitext_align::services::alignment::{AlignmentChecker, LlmChecker};
use bitext_align::services::corpus_builder::{CorpusBuilder, CorpusError};
use bitext_align::{
    BuildOptions, ConfigStore, CorpusStatistics, RowRecord, SegmenterConfig, SentencePair,
};
use serde::Serialize;

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

/// Parse a two-column tab-separated table. Blank lines are kept as empty
/// rows so the row numbers in the report match the input file.
fn parse_rows(input: &str) -> Result<Vec<RowRecord>, CorpusError> {
    let mut rows = Vec::new();
    for line in input.lines() {
        if line.trim().is_empty() {
            rows.push(RowRecord {
                source: String::new(),
                target: String::new(),
            });
            continue;
        }
        let (source, target) = line
            .split_once('\t')
            .ok_or_else(|| CorpusError::MissingColumn("target".to_string()))?;
        rows.push(RowRecord {
            source: source.to_string(),
            target: target.to_string(),
        });
    }
    if rows.is_empty() {
        return Err(CorpusError::EmptyTable);
    }
    Ok(rows)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage:\n  corpus_report <table.tsv> [--source-lang <code>] [--target-lang <code>] [--sample <n>] [--pairs <n>] [--llm] [--no-check] [--out <json_path>]\n\nNotes:\n  - Input is tab-separated, one row per line: source<TAB>target.\n  - Alignment scoring uses surface heuristics unless --llm is given.\n  - --llm requires an OpenAI API key (OPENAI_API_KEY or the config store)."
        );
        return Ok(());
    }

    let path = args[1].clone();
    let source_lang = parse_arg_value(&args, "--source-lang").unwrap_or_else(|| "en".to_string());
    let target_lang = parse_arg_value(&args, "--target-lang").unwrap_or_else(|| "cs".to_string());
    let sample_size: usize = parse_arg_value(&args, "--sample")
        .and_then(|s| s.parse().ok())
        .unwrap_or(50);
    let pairs_n: usize = parse_arg_value(&args, "--pairs")
        .and_then(|s| s.parse().ok())
        .unwrap_or(20);
    let use_llm = has_flag(&args, "--llm");
    let check_alignment = !has_flag(&args, "--no-check");
    let out_path = parse_arg_value(&args, "--out");

    let input = std::fs::read_to_string(&path)
        .with_context(|| format!("read input table {}", path))?;
    let rows = parse_rows(&input).context("parse input table")?;

    let checker = if use_llm {
        match LlmChecker::from_config() {
            Some(judge) => AlignmentChecker::Model(judge),
            None => bail!("--llm requires an OpenAI API key (OPENAI_API_KEY or the config store)"),
        }
    } else {
        AlignmentChecker::Heuristic
    };

    let options = BuildOptions {
        source_lang: source_lang.clone(),
        target_lang: target_lang.clone(),
        check_alignment,
        sample_size,
    };

    println!("File: {}", path);
    println!("Rows: {}", rows.len());
    println!("Language pair: {} -> {}", source_lang, target_lang);
    println!("Scorer: {}", if use_llm { "llm" } else { "heuristic" });
    println!();

    // Deployments can extend the abbreviation stems through the config store.
    let segmenter_config = ConfigStore::default_config_dir()
        .map(ConfigStore::new)
        .map(|store| store.segmenter_config())
        .unwrap_or_else(SegmenterConfig::default);

    let builder = CorpusBuilder::with_segmenter_config(options, &segmenter_config, checker);
    let (pairs, stats) = builder.build(&rows).await;

    println!(
        "Rows: {} total, {} processed, {} skipped, {} mismatched",
        stats.total_rows, stats.processed_rows, stats.skipped_rows, stats.mismatched_rows
    );
    println!("Sentence pairs: {}", stats.total_pairs);
    if let Some(ref alignment) = stats.alignment {
        println!(
            "Alignment: {} checked, {} failed, mean {:.3}, {:.1}% aligned, {} poorly aligned",
            alignment.checked_count,
            alignment.failed_count,
            alignment.mean_score,
            alignment.aligned_percentage,
            alignment.poorly_aligned_count
        );
    }
    println!();

    for (i, pair) in pairs.iter().take(pairs_n).enumerate() {
        let score = pair
            .alignment_score
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "[P{:04}] row={} score={}  {}  ||  {}",
            i,
            pair.origin_row,
            score,
            preview(&pair.source, 60),
            preview(&pair.target, 60)
        );
        if !pair.issues.is_empty() {
            println!("        issues: {}", pair.issues);
        }
    }
    if pairs.len() > pairs_n {
        println!("... ({} more pairs)", pairs.len() - pairs_n);
    }

    if let Some(out_path) = out_path {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Output {
            file: String,
            source_lang: String,
            target_lang: String,
            statistics: CorpusStatistics,
            pairs: Vec<SentencePair>,
        }

        let out = Output {
            file: path.clone(),
            source_lang,
            target_lang,
            statistics: stats,
            pairs,
        };

        let json = serde_json::to_string_pretty(&out).context("serialize report")?;
        std::fs::write(&out_path, json)
            .with_context(|| format!("write report {}", out_path))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}
