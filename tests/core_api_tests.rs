use callsim::core::model::{ChoiceModel, ClassUtility, LatentClass};
use callsim::core::report::REPORT_HEADER;
use callsim::{
    run_sweep, ConcurrencyMode, ParameterFile, PolicySweep, ReportWriter, ServerSweep, SimulationConfig,
    SimulationError,
};

fn frequent_callers() -> ChoiceModel {
    let utility = ClassUtility {
        reward: 4.0,
        online_cost: 0.03,
        offline_cost: 0.01,
        offline_preference: 0.2,
    };
    ChoiceModel::new(vec![
        LatentClass {
            prior_share: 0.3,
            daily_rate: 3.0,
            day: utility,
            evening: utility,
        },
        LatentClass {
            prior_share: 0.7,
            daily_rate: 6.0,
            day: utility,
            evening: utility,
        },
    ])
}

fn parameter_text(size: usize) -> String {
    (1..=size)
        .map(|i| format!("{:.6}", i as f64 / size as f64))
        .collect::<Vec<_>>()
        .join("\n")
}

fn small_sweep() -> SimulationConfig {
    SimulationConfig::new()
        .with_customers(300, 30)
        .with_iterations(2)
        .with_servers(ServerSweep { lowest: 2, highest: 4, step: 2 })
        .with_policies(PolicySweep { lowest: 4, highest: 5 })
        .with_population(250)
        .with_tables(120, 75, 180)
        .with_service_cdf_size(24)
        .with_choice_model(frequent_callers())
}

#[test]
fn test_sweep_writes_one_row_per_pass() {
    let config = small_sweep();
    let params = ParameterFile::parse(&parameter_text(24), config.service_cdf_size).unwrap();

    let rows = run_sweep(&config, &params.service_cdf).unwrap();
    assert_eq!(rows.len(), 2 * 2 * 2);

    let mut writer = ReportWriter::new(Vec::new()).unwrap();
    for row in &rows {
        writer.write_row(row).unwrap();
    }
    assert_eq!(writer.rows_written(), rows.len());
    let output = String::from_utf8(writer.finish().unwrap()).unwrap();

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), rows.len() + 1);
    assert_eq!(lines[0], REPORT_HEADER);
    for line in &lines[1..] {
        assert_eq!(line.split(',').count(), 30);
    }
    assert!(lines[1].starts_with("1,2,4,"));
    assert!(lines[8].starts_with("2,4,5,"));
}

#[test]
fn test_rayon_sweep_reproduces_sequential_rows() {
    let config = small_sweep().with_iterations(1);
    let params = ParameterFile::parse(&parameter_text(24), config.service_cdf_size).unwrap();

    let sequential = run_sweep(&config, &params.service_cdf).unwrap();
    let parallel = run_sweep(
        &config.clone().with_concurrency(ConcurrencyMode::Rayon),
        &params.service_cdf,
    )
    .unwrap();

    assert_eq!(sequential, parallel);
}

#[test]
fn test_rows_report_sane_statistics() {
    let config = small_sweep();
    let params = ParameterFile::parse(&parameter_text(24), config.service_cdf_size).unwrap();

    for row in run_sweep(&config, &params.service_cdf).unwrap() {
        assert_eq!(row.received_total, row.received_online + row.received_offline);
        assert_eq!(
            row.received_total,
            row.answered_total + row.abandoned + row.callbacks_not_answered
        );
        assert_eq!(row.not_serviced, row.abandoned + row.callbacks_not_answered);
        assert!(row.measured_time > 0.0);
        if let Some(utilization) = row.utilization {
            assert!((0.0..=1.0 + 1e-9).contains(&utilization));
        }
    }
}

#[test]
fn test_invalid_sweep_is_rejected_before_running() {
    let params = ParameterFile::parse(&parameter_text(24), 24).unwrap();

    let config = small_sweep().with_policies(PolicySweep { lowest: 1, highest: 6 });
    assert!(matches!(
        run_sweep(&config, &params.service_cdf),
        Err(SimulationError::InvalidConfig(_))
    ));

    let config = small_sweep().with_customers(100, 100);
    assert!(matches!(
        run_sweep(&config, &params.service_cdf),
        Err(SimulationError::InvalidConfig(_))
    ));
}

#[test]
fn test_parameter_input_errors() {
    assert!(matches!(
        ParameterFile::parse("0.5 1.0", 3),
        Err(SimulationError::MissingParameters { expected: 3, found: 2 })
    ));
    assert!(matches!(
        ParameterFile::parse("0.9 0.4 1.0", 3),
        Err(SimulationError::InvalidCdf { index: 2 })
    ));
}
