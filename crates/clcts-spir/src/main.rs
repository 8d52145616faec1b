//! Portable-IR conformance driver binary.

use anyhow::Result;
use clcts_spir::SpirCli;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = SpirCli::parse(&args)?;

    if cli.list {
        print!("{}", SpirCli::usage("clcts-spir"));
        return Ok(());
    }

    run(cli)
}

#[cfg(feature = "driver")]
fn run(cli: SpirCli) -> Result<()> {
    use anyhow::bail;
    use clcts_harness::device::DriverHandles;
    use clcts_harness::{TestOutcome, TestStatus};
    use clcts_spir::runner::TestRunner;
    use clcts_spir::{find_suite, KernelBundle, KhrSupport, OclExtensions, SUITES};

    let handles = DriverHandles::open(&cli.config)?;
    let dev_ext =
        OclExtensions::device_capabilities(&handles.extensions()?, &handles.profile()?);
    if !dev_ext.supports(OclExtensions::CL_KHR_SPIR) {
        println!("The SPIR extension is not supported by the device.");
        return Ok(());
    }

    // Bundles and the side table sit next to the executable.
    let base = std::env::current_exe()?
        .parent()
        .map(std::path::Path::to_path_buf)
        .unwrap_or_default();
    let khr = KhrSupport::load(&base.join("khr.csv"))?;
    let runner = TestRunner::new(&khr, dev_ext);

    let selected: Vec<_> = match &cli.suite {
        Some(name) => vec![find_suite(name)?],
        None => SUITES.to_vec(),
    };

    let mut summary = clcts_harness::RunSummary::new();
    for suite in selected {
        let bundle = KernelBundle::new(&base, suite.folder);
        let tests = match &cli.test {
            Some(test) => vec![test.clone()],
            None => bundle.tests()?,
        };
        for test in tests {
            let full_name = format!("{}.{}", suite.name, test);
            let (status, message) = match runner.run_build_test(
                &handles,
                &bundle,
                suite.folder,
                &test,
                1,
                0.0,
            ) {
                Ok(status) => (status, None),
                Err(e) => (TestStatus::Fail, Some(e.to_string())),
            };
            if let Some(msg) = &message {
                eprintln!("{full_name}: {msg}");
            }
            summary.record(TestOutcome { name: full_name, status, message });
        }
    }

    print!("{}", summary.render());
    if !summary.all_passed() {
        bail!("{} of {} tests failed", summary.failed(), summary.total());
    }
    Ok(())
}

#[cfg(not(feature = "driver"))]
fn run(_cli: SpirCli) -> Result<()> {
    anyhow::bail!("this binary was built without the `driver` feature; rebuild with --features driver to run tests")
}
