use cd_metrics_core::{DispatchOutcome, LogLine, LogSink, TracingSink};
use console::style;
use indicatif::ProgressBar;
use tokio::sync::mpsc;

/// Prints log lines above the spinner (or into `tracing`) and hands terminal
/// outcomes back to `main`.
pub struct CliSink {
    spinner: ProgressBar,
    trace: bool,
    done: mpsc::UnboundedSender<DispatchOutcome>,
}

impl CliSink {
    pub fn new(
        spinner: ProgressBar,
        trace: bool,
    ) -> (Self, mpsc::UnboundedReceiver<DispatchOutcome>) {
        let (done, done_rx) = mpsc::unbounded_channel();
        (
            Self {
                spinner,
                trace,
                done,
            },
            done_rx,
        )
    }
}

impl LogSink for CliSink {
    fn log(&self, line: &LogLine) {
        if self.trace {
            TracingSink.log(line);
        } else {
            self.spinner.println(format!("{}", style(line).dim()));
        }

        if let Some(outcome) = &line.outcome {
            let _ = self.done.send(outcome.clone());
        }
    }
}
