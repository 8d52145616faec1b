//! Conformance suite runner: registers every suite, opens the configured
//! device, dispatches tests, and prints the summary (optionally mirrored
//! to a JSON report).

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use clcts_harness::{DeviceType, HarnessConfig, ResultsReport, TestEnv, TestRegistry};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "clcts", about = "OpenCL conformance test suites", version)]
struct Cli {
    /// Run only the named test (e.g. `buffers.fill`).
    #[arg(long)]
    test: Option<String>,

    /// List registered tests and exit.
    #[arg(long)]
    list: bool,

    /// Write a JSON results report to this path.
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Platform index (overrides CL_PLATFORM_INDEX).
    #[arg(long)]
    platform: Option<usize>,

    /// Device index (overrides CL_DEVICE_INDEX).
    #[arg(long)]
    device: Option<usize>,

    /// Device type: cpu, gpu, accelerator, custom, or default
    /// (overrides CL_DEVICE_TYPE).
    #[arg(long)]
    device_type: Option<DeviceType>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    let mut registry = TestRegistry::new();
    clcts_suites::register_all(&mut registry)?;

    if cli.list {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let mut config = HarnessConfig::from_env()?;
    if let Some(platform) = cli.platform {
        config.platform_index = platform;
    }
    if let Some(device) = cli.device {
        config.device_index = device;
    }
    if let Some(device_type) = cli.device_type {
        config.device_type = device_type;
    }

    let env = open_env(config)?;
    let summary = registry.run(&env, cli.test.as_deref())?;
    print!("{}", summary.render());

    if let Some(path) = &cli.json {
        ResultsReport::new("clcts", &summary).save(path)?;
    }
    if !summary.all_passed() {
        anyhow::bail!("{} of {} tests failed", summary.failed(), summary.total());
    }
    Ok(())
}

#[cfg(feature = "driver")]
fn open_env(config: HarnessConfig) -> Result<TestEnv> {
    let handles = clcts_harness::device::DriverHandles::open(&config)?;
    Ok(TestEnv { config, cl: Some(handles) })
}

#[cfg(not(feature = "driver"))]
fn open_env(_config: HarnessConfig) -> Result<TestEnv> {
    anyhow::bail!(
        "this binary was built without the `driver` feature; rebuild with --features driver to run tests"
    )
}
