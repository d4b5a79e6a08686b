//! Encoding throughput tool.
//!
//! Times the hot paths of the input side: spike encoding, pattern
//! unification, a continuous feeding step and a full patterned feeding cycle.
//!
//! Usage:
//!   cargo run --release --bin encode_bench -- [OPTIONS]
//!
//! Options:
//!   --quick                  Fewer iterations
//!   --verbose                Print every measurement as it completes
//!   --fields <n>             Number of external fields (default 16)
//!   --params <file>          Encoder parameters to time (requires `serde`)

use resin::prelude::*;
use std::time::Instant;

/// Number of warmup iterations before measurement.
const WARMUP_ITERATIONS: usize = 10;

/// Number of measurement iterations.
const MEASURE_ITERATIONS: usize = 200;

/// Quick mode measurement iterations.
const QUICK_ITERATIONS: usize = 30;

/// Length of the synthetic patterns.
const PATTERN_LEN: usize = 128;

#[derive(Debug, Clone)]
struct BenchResult {
    name: String,
    mean_ns: f64,
    std_dev_ns: f64,
    min_ns: f64,
    throughput: Option<f64>,
}

impl BenchResult {
    fn new(name: &str, times_ns: &[f64], elements: Option<u64>) -> Self {
        let n = times_ns.len() as f64;
        let mean = times_ns.iter().sum::<f64>() / n;
        let variance = times_ns.iter().map(|&t| (t - mean).powi(2)).sum::<f64>() / n;
        Self {
            name: name.to_string(),
            mean_ns: mean,
            std_dev_ns: variance.sqrt(),
            min_ns: times_ns.iter().copied().fold(f64::INFINITY, f64::min),
            throughput: elements.map(|e| e as f64 / (mean / 1e9)),
        }
    }
}

struct BenchRunner {
    iterations: usize,
    verbose: bool,
}

impl BenchRunner {
    fn run<F>(&self, name: &str, elements: Option<u64>, mut f: F) -> BenchResult
    where
        F: FnMut(),
    {
        for _ in 0..WARMUP_ITERATIONS {
            f();
        }
        let times_ns: Vec<f64> = (0..self.iterations)
            .map(|_| {
                let start = Instant::now();
                f();
                start.elapsed().as_nanos() as f64
            })
            .collect();

        let result = BenchResult::new(name, &times_ns, elements);
        if self.verbose {
            println!("  {name}: {:.0} ns/op (±{:.0})", result.mean_ns, result.std_dev_ns);
        }
        result
    }
}

fn random_series(rng: &mut Random, len: usize) -> Vec<Real> {
    let range = Interval::SYMMETRIC_UNIT;
    (0..len).map(|_| rng.uniform(&range)).collect()
}

fn bench_spike_code(runner: &BenchRunner, rng: &mut Random) -> Vec<BenchResult> {
    let values = random_series(rng, 1024);
    let configs = [
        ("spike_code/signal", SpikeCodeParams::default()),
        (
            "spike_code/signal+delta+binary",
            SpikeCodeParams {
                delta_component: true,
                binary_component: true,
                ..Default::default()
            },
        ),
    ];

    configs
        .into_iter()
        .filter_map(|(name, params)| {
            let mut code = SpikeCode::new(&params).ok()?;
            Some(runner.run(name, Some(values.len() as u64), || {
                for &v in &values {
                    std::hint::black_box(code.encode(v));
                }
            }))
        })
        .collect()
}

fn bench_unification(runner: &BenchRunner, rng: &mut Random) -> Vec<BenchResult> {
    let pattern = match InputPattern::new((0..4).map(|_| random_series(rng, PATTERN_LEN)).collect()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Cannot build pattern: {e}");
            return Vec::new();
        }
    };
    let unifier = PatternUnifier::new(UnificationParams {
        detrend: true,
        unify_amplitudes: true,
        resampling: Some(ResamplingParams {
            signal_begin_threshold: 0.05,
            signal_end_threshold: 0.05,
            target_time_points: 64,
            ..Default::default()
        }),
    });

    match unifier {
        Ok(unifier) => vec![runner.run("unify/4x128->64", Some(PATTERN_LEN as u64 * 4), || {
            std::hint::black_box(unifier.unify(&pattern, None).ok());
        })],
        Err(e) => {
            eprintln!("Cannot build unifier: {e}");
            Vec::new()
        }
    }
}

fn bench_encoder(
    runner: &BenchRunner,
    rng: &mut Random,
    params: &InputEncoderParams,
) -> resin::Result<BenchResult> {
    let num_external = params.num_external_fields();
    let mut encoder = InputEncoder::new(params)?;

    let (name, vector_len) = match &params.feeding {
        FeedingParams::Continuous(_) => ("encoder/continuous_step", num_external),
        FeedingParams::Patterned(p) => (
            "encoder/patterned_cycle",
            p.steady_fields.len() + num_external * PATTERN_LEN,
        ),
    };
    let samples: Vec<Vec<Real>> = (0..32).map(|_| random_series(rng, vector_len)).collect();
    encoder.initialize(&samples)?;

    let mut next = 0;
    let mut failure = None;
    let result = runner.run(name, Some(encoder.num_input_neurons() as u64), || {
        next = (next + 1) % samples.len();
        if let Err(e) = encoder.store_new_data(&samples[next]) {
            failure = Some(e);
            return;
        }
        while let Ok(true) = encoder.encode_next_input_data(true) {}
    });
    match failure {
        Some(e) => Err(e),
        None => Ok(result),
    }
}

fn default_params(num_fields: usize, feeding: FeedingParams) -> InputEncoderParams {
    InputEncoderParams {
        feeding,
        fields: (0..num_fields)
            .map(|i| FieldParams::external(format!("f{i}")))
            .collect(),
        ..Default::default()
    }
}

#[cfg(feature = "serde")]
fn load_params(path: &str) -> resin::Result<InputEncoderParams> {
    InputEncoderParams::load_validated(path)
}

#[cfg(not(feature = "serde"))]
fn load_params(_path: &str) -> resin::Result<InputEncoderParams> {
    Err(resin::ResinError::Configuration {
        name: "params",
        message: "Loading parameters requires the `serde` feature".to_string(),
    })
}

fn print_results(results: &[BenchResult]) {
    println!();
    println!("{:<36} {:>14} {:>14} {:>16}", "benchmark", "mean ns", "min ns", "elements/s");
    println!("{}", "-".repeat(83));
    for r in results {
        let throughput = r
            .throughput
            .map_or_else(|| "-".to_string(), |t| format!("{t:.3e}"));
        println!(
            "{:<36} {:>14.0} {:>14.0} {:>16}",
            r.name, r.mean_ns, r.min_ns, throughput
        );
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut quick = false;
    let mut verbose = false;
    let mut num_fields = 16;
    let mut params_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--quick" => quick = true,
            "--verbose" => verbose = true,
            "--fields" => {
                i += 1;
                match args.get(i).and_then(|v| v.parse().ok()) {
                    Some(n) if n > 0 => num_fields = n,
                    _ => eprintln!("--fields expects a positive number"),
                }
            }
            "--params" => {
                i += 1;
                params_path = args.get(i).cloned();
            }
            "--help" | "-h" => {
                println!("Usage: encode_bench [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --quick                  Fewer iterations");
                println!("  --verbose                Print every measurement as it completes");
                println!("  --fields <n>             Number of external fields (default 16)");
                println!("  --params <file>          Encoder parameters to time");
                println!("  --help, -h               Show this help message");
                return;
            }
            other => eprintln!("Unknown option: {other}"),
        }
        i += 1;
    }

    let runner = BenchRunner {
        iterations: if quick { QUICK_ITERATIONS } else { MEASURE_ITERATIONS },
        verbose,
    };
    let mut rng = Random::new(42);

    println!("Resin encoding benchmarks (v{})", resin::VERSION);

    let mut results = Vec::new();
    results.extend(bench_spike_code(&runner, &mut rng));
    results.extend(bench_unification(&runner, &mut rng));

    let encoder_params = match &params_path {
        Some(path) => match load_params(path) {
            Ok(params) => vec![params],
            Err(e) => {
                eprintln!("Cannot load {path}: {e}");
                std::process::exit(1);
            }
        },
        None => vec![
            default_params(num_fields, FeedingParams::Continuous(Default::default())),
            default_params(num_fields, FeedingParams::Patterned(Default::default())),
        ],
    };
    for params in &encoder_params {
        match bench_encoder(&runner, &mut rng, params) {
            Ok(result) => results.push(result),
            Err(e) => eprintln!("Encoder benchmark failed: {e}"),
        }
    }

    print_results(&results);
}
