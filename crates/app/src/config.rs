//! Configuration for the codec-lab application.
//!
//! Handles parsing command-line arguments and generating sensible defaults
//! (including randomized defaults that are reproducible with a seed).
//!
//! # Philosophy
//!
//! The tool should work with ZERO arguments: it benchmarks every codec on a
//! generated sample. All defaults are printed so runs are reproducible.

use codec_lab_core::{Algorithm, DictionaryPolicy};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};

/// What the run should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Compress,
    Decompress,
    Analyze,
    Benchmark,
    Detect,
}

impl Command {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "compress" => Some(Command::Compress),
            "decompress" => Some(Command::Decompress),
            "analyze" => Some(Command::Analyze),
            "benchmark" | "bench" => Some(Command::Benchmark),
            "detect" => Some(Command::Detect),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::Compress => "compress",
            Command::Decompress => "decompress",
            Command::Analyze => "analyze",
            Command::Benchmark => "benchmark",
            Command::Detect => "detect",
        }
    }
}

/// Complete configuration for a run.
#[derive(Debug, Clone)]
pub struct Config {
    pub command: Command,

    // === Files ===
    /// Input file path (None = generate sample)
    pub input_file: Option<PathBuf>,

    /// Output file path
    pub output_file: Option<PathBuf>,

    // === Codecs ===
    /// Algorithms to use; `compress` takes the first
    pub algorithms: Vec<Algorithm>,

    /// LZW dictionary-full policy
    pub lzw_policy: DictionaryPolicy,

    // === Sample generation ===
    /// Seed for the generated sample
    pub seed: u64,

    /// Generated sample size in bytes
    pub sample_bytes: usize,

    // === Behavior ===
    /// Run benchmark codecs one after another
    pub sequential: bool,

    /// Log codec decisions to stderr
    pub verbose: bool,

    /// Whether to print detailed config
    pub print_config: bool,
}

impl Config {
    /// Parse configuration from command-line arguments.
    ///
    /// The first argument may name a subcommand; without one the run is a
    /// benchmark. If no seed is given, a time-based seed is used (and
    /// printed), so any run can be repeated with `--seed`.
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let mut command = Command::Benchmark;
        let mut input_file: Option<PathBuf> = None;
        let mut output_file: Option<PathBuf> = None;
        let mut algorithms: Vec<Algorithm> = Vec::new();
        let mut lzw_policy = DictionaryPolicy::default();
        let mut seed: Option<u64> = None;
        let mut sample_bytes: Option<usize> = None;
        let mut sequential = false;
        let mut verbose = false;
        let mut print_config = false;

        let mut i = 0;
        if let Some(first) = args.first() {
            if !first.starts_with('-') {
                command = Command::parse(first).ok_or_else(|| format!("unknown command: {first}"))?;
                i = 1;
            }
        }

        while i < args.len() {
            match args[i].as_str() {
                "--in" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--in requires a path".to_string());
                    }
                    input_file = Some(PathBuf::from(&args[i]));
                }
                "--out" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--out requires a path".to_string());
                    }
                    output_file = Some(PathBuf::from(&args[i]));
                }
                "--algo" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--algo requires a name".to_string());
                    }
                    for name in args[i].split(',') {
                        let algorithm: Algorithm = name.parse().map_err(|e| format!("{e}"))?;
                        if !algorithms.contains(&algorithm) {
                            algorithms.push(algorithm);
                        }
                    }
                }
                "--lzw-policy" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--lzw-policy requires freeze or reset".to_string());
                    }
                    lzw_policy = match args[i].as_str() {
                        "freeze" => DictionaryPolicy::Freeze,
                        "reset" => DictionaryPolicy::Reset,
                        other => return Err(format!("invalid lzw-policy: {other}")),
                    };
                }
                "--seed" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--seed requires a number".to_string());
                    }
                    seed = Some(args[i].parse().map_err(|_| "invalid seed")?);
                }
                "--size" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--size requires a number".to_string());
                    }
                    sample_bytes = Some(args[i].parse().map_err(|_| "invalid size")?);
                }
                "--sequential" => {
                    sequential = true;
                }
                "--verbose" | "-v" => {
                    verbose = true;
                }
                "--print-config" => {
                    print_config = true;
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                _ => {
                    return Err(format!("unknown argument: {}", args[i]));
                }
            }
            i += 1;
        }

        let needs_input = matches!(command, Command::Compress | Command::Decompress | Command::Detect);
        if needs_input && input_file.is_none() {
            return Err(format!("{} requires --in <PATH>", command.name()));
        }

        // Determine seed (explicit or time-based)
        let seed = seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });

        // Generate defaults using seed
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        if algorithms.is_empty() {
            algorithms = match command {
                Command::Compress => vec![Algorithm::Huffman],
                _ => Algorithm::ALL.to_vec(),
            };
        }

        let config = Config {
            command,
            input_file,
            output_file,
            algorithms,
            lzw_policy,
            seed,
            sample_bytes: sample_bytes.unwrap_or_else(|| rng.gen_range(64..=256) * 1024),
            sequential,
            verbose,
            print_config,
        };

        Ok(config)
    }

    /// Where `compress`/`decompress` write their result.
    ///
    /// Defaults: `<in>.clab` when compressing; when decompressing, `<in>`
    /// without its `.clab` extension, or `<in>.out`.
    pub fn resolved_output(&self) -> Option<PathBuf> {
        if let Some(out) = &self.output_file {
            return Some(out.clone());
        }
        let input = self.input_file.as_deref()?;
        match self.command {
            Command::Compress => Some(append_extension(input, "clab")),
            Command::Decompress => {
                if input.extension().is_some_and(|e| e == "clab") {
                    Some(input.with_extension(""))
                } else {
                    Some(append_extension(input, "out"))
                }
            }
            _ => None,
        }
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        let names: Vec<&str> = self.algorithms.iter().map(|a| a.name()).collect();
        println!("=== Configuration ===");
        println!("Command: {}", self.command.name());
        match &self.input_file {
            Some(p) => println!("Input file:  {}", p.display()),
            None => println!("Input file:  (generate sample)"),
        }
        if let Some(p) = self.resolved_output() {
            println!("Output file: {}", p.display());
        }
        println!();
        println!("Algorithms: {}", names.join(", "));
        println!("LZW policy: {:?}", self.lzw_policy);
        println!("Parallel benchmark: {}", !self.sequential);
        println!();
        println!("=== Sample Generation ===");
        println!("Seed: {}", self.seed);
        println!("Sample size: {} bytes ({} KiB)", self.sample_bytes, self.sample_bytes / 1024);
        println!();
    }
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn print_help() {
    println!("codec-lab: Huffman, LZW and arithmetic coding workbench");
    println!();
    println!("USAGE:");
    println!("    codec-lab [COMMAND] [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    benchmark               Round-trip and time every codec (default)");
    println!("    compress                Compress --in into a .clab container");
    println!("    decompress              Decompress a .clab container");
    println!("    analyze                 Entropy/redundancy report and recommendation");
    println!("    detect                  Classify a file and analyze its contents");
    println!();
    println!("OPTIONS:");
    println!("    --in <PATH>             Input file (default: generate sample)");
    println!("    --out <PATH>            Output file (default: derived from --in)");
    println!("    --algo <NAMES>          huffman, lzw, arithmetic; comma-separated");
    println!("    --lzw-policy <P>        freeze or reset when the dictionary fills (default: freeze)");
    println!();
    println!("    --seed <N>              Random seed for the generated sample");
    println!("    --size <N>              Generated sample size (default: random 64-256 KiB)");
    println!("    --sequential            Benchmark codecs one at a time");
    println!();
    println!("    --verbose, -v           Log codec decisions to stderr");
    println!("    --print-config          Print resolved configuration");
    println!("    --help, -h              Print this help");
    println!();
    println!("EXAMPLES:");
    println!("    codec-lab                                      # Benchmark a random sample");
    println!("    codec-lab --seed 42                            # Deterministic sample");
    println!("    codec-lab compress --in notes.txt --algo lzw   # Writes notes.txt.clab");
    println!("    codec-lab decompress --in notes.txt.clab       # Writes notes.txt");
    println!("    codec-lab analyze --in photo.bmp");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_zero_args_benchmarks_everything() {
        let config = Config::from_args(&[]).unwrap();
        assert_eq!(config.command, Command::Benchmark);
        assert_eq!(config.algorithms, Algorithm::ALL.to_vec());
        assert!(config.input_file.is_none());
        assert!((64 * 1024..=256 * 1024).contains(&config.sample_bytes));
    }

    #[test]
    fn test_seed_makes_defaults_reproducible() {
        let a = Config::from_args(&args(&["--seed", "42"])).unwrap();
        let b = Config::from_args(&args(&["--seed", "42"])).unwrap();
        assert_eq!(a.seed, 42);
        assert_eq!(a.sample_bytes, b.sample_bytes);
    }

    #[test]
    fn test_compress_options() {
        let config = Config::from_args(&args(&[
            "compress", "--in", "notes.txt", "--algo", "LZW", "--lzw-policy", "reset",
        ]))
        .unwrap();
        assert_eq!(config.command, Command::Compress);
        assert_eq!(config.algorithms, vec![Algorithm::Lzw]);
        assert_eq!(config.lzw_policy, DictionaryPolicy::Reset);
        assert_eq!(config.resolved_output(), Some(PathBuf::from("notes.txt.clab")));
    }

    #[test]
    fn test_decompress_output_name() {
        let config = Config::from_args(&args(&["decompress", "--in", "notes.txt.clab"])).unwrap();
        assert_eq!(config.resolved_output(), Some(PathBuf::from("notes.txt")));

        let config = Config::from_args(&args(&["decompress", "--in", "blob"])).unwrap();
        assert_eq!(config.resolved_output(), Some(PathBuf::from("blob.out")));
    }

    #[test]
    fn test_algorithm_list_deduplicated() {
        let config = Config::from_args(&args(&["--algo", "lzw,huffman,lzw"])).unwrap();
        assert_eq!(config.algorithms, vec![Algorithm::Lzw, Algorithm::Huffman]);
    }

    #[test]
    fn test_errors() {
        assert!(Config::from_args(&args(&["explode"])).is_err());
        assert!(Config::from_args(&args(&["--algo", "zip"])).is_err());
        assert!(Config::from_args(&args(&["--seed"])).is_err());
        assert!(Config::from_args(&args(&["--lzw-policy", "sometimes"])).is_err());
        assert!(Config::from_args(&args(&["compress"])).is_err());
        assert!(Config::from_args(&args(&["--bogus"])).is_err());
    }
}
