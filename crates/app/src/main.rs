//! codec-lab: command-line front end for the codec engine.

mod config;
mod detect;
mod input_gen;
mod logger;

use codec_lab_core::{
    analysis::analyze,
    compress_with, decompress_auto,
    harness::{benchmark_with, summary_text, HarnessConfig},
    Algorithm, Codec, DictionaryPolicy, LzwCoder, Result,
};
use config::{Command, Config};
use detect::FileCategory;
use std::fs;
use std::process::ExitCode;

/// Bytes of a file examined by `detect`.
const DETECT_SAMPLE_BYTES: usize = 1024 * 1024;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("run with --help for usage");
            return ExitCode::from(2);
        }
    };

    if let Err(e) = logger::init(config.verbose) {
        eprintln!("warning: logger not installed: {e}");
    }

    if config.print_config {
        config.print();
    }

    match run(&config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<ExitCode> {
    match config.command {
        Command::Compress => run_compress(config),
        Command::Decompress => run_decompress(config),
        Command::Analyze => {
            let data = load_input(config)?;
            analyze(&data).print_summary();
            Ok(ExitCode::SUCCESS)
        }
        Command::Benchmark => run_benchmark(config),
        Command::Detect => run_detect(config),
    }
}

/// Codec for an algorithm, honoring the configured LZW policy.
fn codec_for(algorithm: Algorithm, policy: DictionaryPolicy) -> Box<dyn Codec> {
    match algorithm {
        Algorithm::Lzw => Box::new(LzwCoder::new(policy)),
        other => Box::new(other),
    }
}

/// Read `--in`, or generate the seeded sample.
fn load_input(config: &Config) -> Result<Vec<u8>> {
    match &config.input_file {
        Some(path) => {
            let data = fs::read(path)?;
            log::info!("read {} bytes from {}", data.len(), path.display());
            Ok(data)
        }
        None => {
            println!(
                "Generating {} byte sample (seed {})",
                config.sample_bytes, config.seed
            );
            Ok(input_gen::generate_sample_data(config.seed, config.sample_bytes))
        }
    }
}

fn output_path(config: &Config) -> Result<std::path::PathBuf> {
    config
        .resolved_output()
        .ok_or_else(|| codec_lab_core::Error::Config("no output path".to_string()))
}

fn run_compress(config: &Config) -> Result<ExitCode> {
    let data = load_input(config)?;
    let algorithm = config.algorithms.first().copied().unwrap_or(Algorithm::Huffman);
    let codec = codec_for(algorithm, config.lzw_policy);

    let (container, stats) = compress_with(codec.as_ref(), &data)?;
    let out = output_path(config)?;
    fs::write(&out, &container)?;

    stats.print_summary();
    println!("Wrote {}", out.display());
    Ok(ExitCode::SUCCESS)
}

fn run_decompress(config: &Config) -> Result<ExitCode> {
    let container = load_input(config)?;
    let output = decompress_auto(&container)?;
    let out = output_path(config)?;
    fs::write(&out, &output)?;

    println!(
        "Decompressed {} -> {} bytes, wrote {}",
        container.len(),
        output.len(),
        out.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn run_benchmark(config: &Config) -> Result<ExitCode> {
    let data = load_input(config)?;
    let codecs: Vec<Box<dyn Codec>> = config
        .algorithms
        .iter()
        .map(|&a| codec_for(a, config.lzw_policy))
        .collect();
    let refs: Vec<&dyn Codec> = codecs.iter().map(|c| c.as_ref()).collect();

    let harness = HarnessConfig {
        parallel: !config.sequential,
    };
    let results = benchmark_with(&data, &refs, &harness);

    println!("\n=== Benchmark ({} bytes) ===", data.len());
    print!("{}", summary_text(&results));

    let report = analyze(&data);
    println!("Analyzer recommends: {} ({})", report.recommendation, report.reason);

    if results.iter().all(|r| r.integrity_ok) {
        println!("✓ All round trips verified");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("✗ Round-trip failures detected");
        Ok(ExitCode::FAILURE)
    }
}

fn run_detect(config: &Config) -> Result<ExitCode> {
    let Some(path) = &config.input_file else {
        return Err(codec_lab_core::Error::Config("detect requires --in".to_string()));
    };
    let data = fs::read(path)?;
    let sample = &data[..data.len().min(DETECT_SAMPLE_BYTES)];

    let category = FileCategory::from_path(path);
    let report = analyze(sample);

    println!("=== Detection ===");
    println!("File: {}", path.display());
    println!("Size: {} bytes", data.len());
    println!("Category: {}", category.name());
    match category.suggested() {
        Some(a) => println!("Category suggests: {a}"),
        None => println!("Category suggests: skip (already compressed)"),
    }
    report.print_summary();
    Ok(ExitCode::SUCCESS)
}
