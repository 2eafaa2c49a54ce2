use clustersim::{bench_tick, Scenario, ScenarioConfig};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file, looked up in `scenarios/` unless the path exists as given
    #[arg(short, default_value = "default.yaml")]
    file_name: String,

    /// Number of ticks to run, overrides the scenario's `t_end`
    #[arg(long)]
    steps: Option<u64>,

    /// Log a stats line every N ticks
    #[arg(long, default_value_t = 100)]
    report_every: u64,

    /// Time a tick for growing body counts instead of running a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let given = PathBuf::from(file_name);
    let config_path = if given.exists() {
        given
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };

    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)
        .with_context(|| format!("failed to parse scenario {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    if args.bench {
        bench_tick()?;
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let mut scenario = Scenario::build_scenario(&scenario_cfg).context("invalid scenario")?;

    let steps = args.steps.or_else(|| scenario.steps()).unwrap_or(1000);
    let report_every = args.report_every.max(1);

    for step in 1..=steps {
        scenario.engine.tick(&scenario.parameters);

        if step % report_every == 0 || step == steps {
            let s = scenario.engine.stats();
            info!(
                tick = s.tick,
                t = s.t,
                clusters = s.clusters,
                largest = s.largest_cluster,
                clustered = s.clustered,
                repulsing = s.repulsing,
                mean_mass = s.mean_mass,
                "stats"
            );
        }
    }

    Ok(())
}
