use super::support::{service_cdf, small_config};
use crate::core::execution::sweep::run_pass;
use crate::core::model::{HazardTables, Policy};
use crate::core::random::RandomStream;
use crate::core::types::{QueueKind, TimeOfDay};

/// Run one pass of `policy_number` and turn its counts into estimates
fn estimated_tables(policy_number: u32) -> HazardTables {
    let config = small_config(2, policy_number).with_customers(800, 50);
    let policy = Policy::preset(policy_number, config.max_wait_minutes, config.window).unwrap();
    let mut hazard = HazardTables::new(config.message_subsets, config.horizon_periods);
    let mut stream = RandomStream::new(config.seed);

    hazard.begin_iteration(1, &config.availability, config.periods_per_minute());
    run_pass(&config, &policy, 2, &service_cdf(), &mut hazard, &mut stream).unwrap();
    hazard.begin_iteration(2, &config.availability, config.periods_per_minute());
    hazard
}

#[test]
fn test_survival_cdf_is_monotone_and_bounded() {
    let hazard = estimated_tables(4);
    for message in 0..hazard.message_count() {
        for queue in QueueKind::ALL {
            let curve = hazard.curve(message, queue);
            let mut previous = 0.0;
            let mut pdf_total = 0.0;
            for period in 1..=hazard.horizon() {
                let cdf = curve.cdf(period);
                assert!((0.0..=1.0).contains(&cdf), "cdf {} at period {}", cdf, period);
                assert!(cdf >= previous - 1e-12);
                assert!(curve.pdf(period) >= -1e-12);
                pdf_total += curve.pdf(period);
                previous = cdf;
            }
            assert!(pdf_total <= 1.0 + 1e-9);
        }
    }
}

#[test]
fn test_observed_waits_produce_predictions() {
    let hazard = estimated_tables(4);
    let fed = (0..hazard.message_count())
        .flat_map(|message| QueueKind::ALL.into_iter().map(move |queue| (message, queue)))
        .filter(|&(message, queue)| (1..=hazard.horizon()).any(|k| hazard.curve(message, queue).hazard(k) > 0.0))
        .count();
    assert!(fed > 0);

    let predicted = (0..hazard.message_count())
        .any(|message| hazard.expected_wait(message, QueueKind::Online, 1) > 0.0);
    assert!(predicted);

    for message in 0..hazard.message_count() {
        let p = hazard.answer_probability(message, TimeOfDay::Day);
        assert!((0.0..=1.0 + 1e-9).contains(&p));
    }
}

#[test]
fn test_counts_are_consumed_by_estimation() {
    let hazard = estimated_tables(1);
    for message in 0..hazard.message_count() {
        let curve = hazard.curve(message, QueueKind::Online);
        assert!((1..=hazard.horizon()).all(|k| curve.at_risk(k) == 0.0 && curve.service_count(k) == 0.0));
    }
}
