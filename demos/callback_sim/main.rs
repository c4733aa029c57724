use callsim::{run_sweep, ParameterFile, ReportWriter, SimulationConfig};
use std::fs::File;
use std::io::BufWriter;

const DEFAULT_INPUT: &str = "Inputs.in";
const DEFAULT_OUTPUT: &str = "Simulation Statistics.csv";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger without timestamps
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .init();

    let mut args = std::env::args().skip(1);
    let input = args.next().unwrap_or_else(|| DEFAULT_INPUT.to_string());
    let output = args.next().unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    println!("📞 Starting Call Center Callback Simulation");

    let config = SimulationConfig::default();
    config.validate()?;

    println!("Configuration:");
    println!(
        "  Customers: {} per pass, {} warm-up, {} iterations",
        config.customer_target, config.transient, config.iterations
    );
    println!(
        "  Servers: {}..={} step {}, policies {}..={}",
        config.servers.lowest,
        config.servers.highest,
        config.servers.step,
        config.policies.lowest,
        config.policies.highest
    );
    println!(
        "  Population: {} callers, period {}s, seed {}",
        config.population, config.period_length_secs, config.seed
    );
    println!();

    let params = ParameterFile::load(&input, config.service_cdf_size)?;
    let rows = run_sweep(&config, &params.service_cdf)?;

    let mut writer = ReportWriter::new(BufWriter::new(File::create(&output)?))?;
    for row in &rows {
        writer.write_row(row)?;
    }
    let written = writer.rows_written();
    writer.finish()?;

    println!("✅ Wrote {} rows to {}", written, output);
    Ok(())
}
