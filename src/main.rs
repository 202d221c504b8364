//! Raceway Reward command-line evaluator
//!
//! Scores simulator params dumped as JSON, or sweeps sampled contexts on a
//! test track to inspect the shape of the reward.
//!
//! Usage:
//!   raceway-reward [--tuning FILE] [--breakdown] [PARAMS_FILE | -]
//!   raceway-reward sweep [--seed N] [--count N] [--tuning FILE]

use std::collections::HashMap;
use std::io::Read;
use std::process::ExitCode;

use thiserror::Error;

use raceway_reward::{
    ContextSampler, Curvature, RewardError, RewardTuning, StepContext, Track, evaluate,
};

const USAGE: &str = "usage: raceway-reward [--tuning FILE] [--breakdown] [PARAMS_FILE | -]
       raceway-reward sweep [--seed N] [--count N] [--tuning FILE]";

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Reward(#[from] RewardError),
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Reward(err.into())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Reward(err.into())
    }
}

#[derive(Debug, Default)]
struct ScoreOptions {
    tuning: Option<String>,
    breakdown: bool,
    input: Option<String>,
}

#[derive(Debug)]
struct SweepOptions {
    tuning: Option<String>,
    seed: u64,
    count: usize,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            tuning: None,
            seed: 12345,
            count: 10_000,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        Some("sweep") => parse_sweep(&args[1..]).and_then(|opts| run_sweep(&opts)),
        _ => parse_score(&args).and_then(|opts| run_score(&opts)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("error: {}", err);
            if matches!(err, CliError::Usage(_)) {
                eprintln!("{}", USAGE);
            }
            ExitCode::FAILURE
        }
    }
}

fn flag_value<'a>(
    flag: &str,
    iter: &mut impl Iterator<Item = &'a String>,
) -> Result<&'a String, CliError> {
    iter.next()
        .ok_or_else(|| CliError::Usage(format!("{} expects a value", flag)))
}

fn parse_score(args: &[String]) -> Result<ScoreOptions, CliError> {
    let mut opts = ScoreOptions::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--tuning" => opts.tuning = Some(flag_value(arg, &mut iter)?.clone()),
            "--breakdown" => opts.breakdown = true,
            "-h" | "--help" => return Err(CliError::Usage("help requested".to_string())),
            other if other.starts_with("--") => {
                return Err(CliError::Usage(format!("unknown option {}", other)));
            }
            path => {
                if opts.input.is_some() {
                    return Err(CliError::Usage(
                        "only one params file may be given".to_string(),
                    ));
                }
                opts.input = Some(path.to_string());
            }
        }
    }
    Ok(opts)
}

fn parse_sweep(args: &[String]) -> Result<SweepOptions, CliError> {
    let mut opts = SweepOptions::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--tuning" => opts.tuning = Some(flag_value(arg, &mut iter)?.clone()),
            "--seed" => {
                let value = flag_value(arg, &mut iter)?;
                opts.seed = value
                    .parse()
                    .map_err(|_| CliError::Usage(format!("invalid seed {}", value)))?;
            }
            "--count" => {
                let value = flag_value(arg, &mut iter)?;
                opts.count = value
                    .parse()
                    .map_err(|_| CliError::Usage(format!("invalid count {}", value)))?;
            }
            other => return Err(CliError::Usage(format!("unknown sweep option {}", other))),
        }
    }
    Ok(opts)
}

fn load_tuning(path: Option<&String>) -> Result<RewardTuning, CliError> {
    match path {
        Some(path) => Ok(RewardTuning::load(path)?),
        None => Ok(RewardTuning::default()),
    }
}

/// Score every params object in the input (one object, or a stream of them)
fn run_score(opts: &ScoreOptions) -> Result<(), CliError> {
    let tuning = load_tuning(opts.tuning.as_ref())?;

    let text = match opts.input.as_deref() {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
        Some(path) => std::fs::read_to_string(path)?,
    };

    let mut scored = 0usize;
    for value in serde_json::Deserializer::from_str(&text).into_iter::<serde_json::Value>() {
        let ctx = StepContext::from_value(value?)?;
        let breakdown = evaluate(&ctx, &tuning);
        if opts.breakdown {
            println!("{}", serde_json::to_string(&breakdown)?);
        } else {
            println!("{}", breakdown.total);
        }
        scored += 1;
    }

    log::info!("Scored {} step contexts", scored);
    Ok(())
}

/// Score sampled contexts on a rectangular test track and summarize
fn run_sweep(opts: &SweepOptions) -> Result<(), CliError> {
    if opts.count == 0 {
        return Err(CliError::Usage("--count must be at least 1".to_string()));
    }
    let tuning = load_tuning(opts.tuning.as_ref())?;
    let track = Track::rectangle(6.0, 4.0, 0.25);
    log::info!(
        "Sweeping {} contexts over {} waypoints (seed {})",
        opts.count,
        track.waypoint_count(),
        opts.seed
    );

    let mut by_class: HashMap<Curvature, usize> = HashMap::new();
    let mut off_track = 0usize;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for ctx in ContextSampler::new(track, opts.seed).take(opts.count) {
        let breakdown = evaluate(&ctx, &tuning);
        match breakdown.curvature {
            Some(curvature) => *by_class.entry(curvature.class).or_default() += 1,
            None => off_track += 1,
        }
        sum += breakdown.total;
        min = min.min(breakdown.total);
        max = max.max(breakdown.total);
    }

    println!("samples:   {}", opts.count);
    println!("mean:      {:.4}", sum / opts.count as f64);
    println!("min:       {:.4}", min);
    println!("max:       {:.4}", max);
    for class in Curvature::ALL {
        println!(
            "{:<10} {}",
            format!("{}:", class.as_str()),
            by_class.get(&class).copied().unwrap_or(0)
        );
    }
    println!("off track: {}", off_track);
    Ok(())
}
