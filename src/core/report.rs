//! One output row per (iteration, servers, policy) pass.

use super::errors::SimResult;
use super::execution::config::SimulationConfig;
use super::policy_engine::PassSummary;
use super::types::ratio;
use serde::Serialize;
use std::io::Write;

pub const REPORT_HEADER: &str = "Iteration, Servers, Policy, Throughput, AWT_All, AWT_On, Rho_On, Rho_All, \
AWT(Online),AWT(Offline),AWT(All),\
CALLS_RECEIVED(Online),CALLS_RECEIVED(Offline),CALLS_RECEIVED(All),CALLS_ANSWERED(Online),CALLS_ANSWERED(Offline),\
CALLS_ANSWERED(All),CALLS_ABANDONED(Online),CALLBACKS_NOT_ANSWERED(Offline),CALLS_NOT_SERVICED(All),ABANDON_RATE(Online),\
CALLBACK_NOT_ANSWER_RATE(Offline),NO_SERVICE_RATE(All),AVG_QUEUE_LENGTH(Online),AVG_QUEUE_LENGTH(Offline),AVG_QUEUE_LENGTH(All),\
SERVER_UTILIZATION,Sim_Time,Percent_Accepting_Callback,Percent_Answering_Callback";

/// Performance measures of one pass. Waits are in seconds; rates whose
/// denominator is zero are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub iteration: usize,
    pub servers: usize,
    pub policy: u32,
    pub throughput: Option<f64>,
    /// Online wait spread over every received call
    pub awt_all: Option<f64>,
    pub awt_online: Option<f64>,
    pub rho_online: Option<f64>,
    pub rho_all: Option<f64>,
    pub awt_offline: Option<f64>,
    pub awt_total: Option<f64>,
    pub received_online: f64,
    pub received_offline: f64,
    pub received_total: f64,
    pub answered_online: f64,
    pub answered_offline: f64,
    pub answered_total: f64,
    pub abandoned: f64,
    pub callbacks_not_answered: f64,
    pub not_serviced: f64,
    pub abandon_rate: Option<f64>,
    pub callback_not_answer_rate: Option<f64>,
    pub no_service_rate: Option<f64>,
    pub avg_queue_online: Option<f64>,
    pub avg_queue_offline: Option<f64>,
    pub avg_queue_total: Option<f64>,
    pub utilization: Option<f64>,
    /// Simulated time since the end of the warm-up, in periods
    pub measured_time: f64,
    pub percent_accepting_callback: Option<f64>,
    pub percent_answering_callback: Option<f64>,
}

impl ReportRow {
    pub fn from_summary(iteration: usize, summary: &PassSummary, config: &SimulationConfig) -> Self {
        let stats = &summary.stats;
        let period_length = config.period_length_secs as f64;
        let measured_time = summary.end_time - stats.start_time;

        let wait_online = stats.wait_time.online;
        let wait_offline = stats.wait_time.offline;
        let received_online = stats.received.online as f64;
        let received_offline = stats.received.offline as f64;
        let received_total = stats.received_total() as f64;
        let answered_offline = stats.answered.offline as f64;
        let answered_total = stats.answered_total() as f64;

        let seconds = |wait: f64, calls: f64| ratio(wait, calls).map(|w| w * period_length);

        // Service capacity in calls per period
        let capacity = summary.servers as f64 / (config.avg_service_minutes * config.periods_per_minute() as f64);
        let rate = |count: f64| ratio(count, measured_time);
        let rho_online = match (rate(received_online), rate(answered_offline)) {
            (Some(arrivals), Some(callbacks)) => ratio(arrivals, capacity - callbacks),
            _ => None,
        };
        let rho_all = rate(received_total).and_then(|arrivals| ratio(arrivals, capacity));

        let avg_queue_total = match (summary.mean_queue_length.online, summary.mean_queue_length.offline) {
            (Some(online), Some(offline)) => Some(online + offline),
            _ => None,
        };

        Self {
            iteration,
            servers: summary.servers,
            policy: summary.policy,
            throughput: rate(answered_total),
            awt_all: seconds(wait_online, received_total),
            awt_online: seconds(wait_online, received_online),
            rho_online,
            rho_all,
            awt_offline: seconds(wait_offline, received_offline),
            awt_total: seconds(wait_online + wait_offline, received_total),
            received_online,
            received_offline,
            received_total,
            answered_online: stats.answered.online as f64,
            answered_offline,
            answered_total,
            abandoned: stats.abandoned as f64,
            callbacks_not_answered: stats.callbacks_not_answered as f64,
            not_serviced: stats.not_serviced() as f64,
            abandon_rate: ratio(stats.abandoned as f64, received_online),
            callback_not_answer_rate: ratio(stats.callbacks_not_answered as f64, received_offline),
            no_service_rate: ratio(stats.not_serviced() as f64, received_total),
            avg_queue_online: summary.mean_queue_length.online,
            avg_queue_offline: summary.mean_queue_length.offline,
            avg_queue_total,
            utilization: summary.utilization,
            measured_time,
            percent_accepting_callback: ratio(stats.callbacks_accepted as f64, stats.callbacks_offered as f64),
            percent_answering_callback: ratio(answered_offline, stats.callbacks_accepted as f64),
        }
    }

    /// Values after the three identifying columns, in header order
    fn values(&self) -> [Option<f64>; 27] {
        [
            self.throughput,
            self.awt_all,
            self.awt_online,
            self.rho_online,
            self.rho_all,
            self.awt_online,
            self.awt_offline,
            self.awt_total,
            Some(self.received_online),
            Some(self.received_offline),
            Some(self.received_total),
            Some(self.answered_online),
            Some(self.answered_offline),
            Some(self.answered_total),
            Some(self.abandoned),
            Some(self.callbacks_not_answered),
            Some(self.not_serviced),
            self.abandon_rate,
            self.callback_not_answer_rate,
            self.no_service_rate,
            self.avg_queue_online,
            self.avg_queue_offline,
            self.avg_queue_total,
            self.utilization,
            Some(self.measured_time),
            self.percent_accepting_callback,
            self.percent_answering_callback,
        ]
    }

    /// Comma-separated row without a trailing newline
    pub fn to_csv(&self) -> String {
        let mut line = format!("{},{},{}", self.iteration, self.servers, self.policy);
        for value in self.values() {
            match value {
                Some(v) => line.push_str(&format!(",{:16.10}", v)),
                None => line.push_str(&format!(",{:>16}", "NA")),
            }
        }
        line
    }
}

/// Writes the header once, then one line per row
pub struct ReportWriter<W: Write> {
    out: W,
    rows_written: usize,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(mut out: W) -> SimResult<Self> {
        writeln!(out, "{}", REPORT_HEADER)?;
        Ok(Self { out, rows_written: 0 })
    }

    pub fn write_row(&mut self, row: &ReportRow) -> SimResult<()> {
        writeln!(self.out, "{}", row.to_csv())?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn finish(mut self) -> SimResult<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
