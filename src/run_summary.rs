use std::process::ExitCode;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct OperationOutcome {
    pub name: &'static str,
    pub succeeded: bool,
    pub elapsed: Duration,
}

/// Tracks how each top-level operation ended.
#[derive(Debug, Default)]
pub struct RunSummary {
    outcomes: Vec<OperationOutcome>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Await `operation`, recording its name, result and duration.
    pub async fn track<T, E, Fut>(&mut self, name: &'static str, operation: Fut) -> Option<T>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let started = Instant::now();
        let result = operation.await;
        self.record(name, result.is_ok(), started.elapsed());
        result.ok()
    }

    pub fn record(&mut self, name: &'static str, succeeded: bool, elapsed: Duration) {
        self.outcomes.push(OperationOutcome {
            name,
            succeeded,
            elapsed,
        });
    }

    pub fn outcomes(&self) -> &[OperationOutcome] {
        &self.outcomes
    }

    pub fn failed(&self) -> Vec<&'static str> {
        self.outcomes
            .iter()
            .filter(|o| !o.succeeded)
            .map(|o| o.name)
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| !o.succeeded)
    }

    pub fn exit_code(&self) -> ExitCode {
        if !self.has_failures() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }

    pub fn print_summary(&self) {
        let total: Duration = self.outcomes.iter().map(|o| o.elapsed).sum();
        let failed = self.failed();

        tracing::info!(
            "RUN SUMMARY | Operations: {} | Succeeded: {} | Failed: {} | Elapsed: {:.2}s",
            self.outcomes.len(),
            self.outcomes.len() - failed.len(),
            failed.len(),
            total.as_secs_f64()
        );

        for name in failed {
            tracing::error!("{} did not complete", name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_successes_exit_cleanly() {
        let mut summary = RunSummary::new();
        summary.record("queries", true, Duration::from_millis(5));
        summary.record("aggregations", true, Duration::from_millis(5));

        assert!(summary.failed().is_empty());
        assert!(!summary.has_failures());
    }

    #[test]
    fn any_failure_sets_failure_exit() {
        let mut summary = RunSummary::new();
        summary.record("queries", true, Duration::ZERO);
        summary.record("indexes", false, Duration::ZERO);

        assert_eq!(summary.failed(), vec!["indexes"]);
        assert!(summary.has_failures());
    }

    #[tokio::test]
    async fn track_records_result_and_passes_value_through() {
        let mut summary = RunSummary::new();

        let ok = summary.track("first", async { Ok::<_, String>(7) }).await;
        let err = summary.track("second", async { Err::<u32, _>("boom".to_string()) }).await;

        assert_eq!(ok, Some(7));
        assert_eq!(err, None);
        assert_eq!(summary.outcomes().len(), 2);
        assert_eq!(summary.failed(), vec!["second"]);
    }
}
