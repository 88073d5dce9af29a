use crate::importer::ImportProgress;
use crate::ui::progress_message::ProgressMessage;
use crate::ui::theme;
use crate::ui::Icons;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::thread;
use std::time::Duration;

/// Renders import progress on a background thread, fed over a channel
pub struct ProgressManager {
    sheets: ProgressBar,
    tx: crossbeam::channel::Sender<ProgressMessage>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ProgressManager {
    pub fn new(hidden: bool) -> Self {
        let (tx, rx) = crossbeam::channel::unbounded::<ProgressMessage>();

        let sheets = if hidden || !console::Term::stdout().is_term() {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(0);
            if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}") {
                pb.set_style(style.progress_chars("=> "));
            }
            pb
        };

        let sheets_clone = sheets.clone();
        let handle = thread::spawn(move || {
            for msg in rx {
                match msg {
                    ProgressMessage::Started { total } => {
                        sheets_clone.set_length(total as u64);
                        sheets_clone.enable_steady_tick(Duration::from_millis(100));
                    }
                    ProgressMessage::Progress { current, percentage, label } => {
                        sheets_clone.set_position(current as u64);
                        sheets_clone.set_message(format!("{}% {}", percentage, label));
                    }
                    ProgressMessage::Finished => {
                        sheets_clone.finish_with_message("Done");
                        break;
                    }
                }
            }
        });

        Self {
            sheets,
            tx,
            handle: Some(handle),
        }
    }

    /// Callback suitable for [`Importer::import_workbook`](crate::importer::Importer::import_workbook)
    pub fn reporter(&self) -> impl FnMut(ImportProgress) + use<> {
        let tx = self.tx.clone();
        let mut started = false;
        move |progress: ImportProgress| {
            if !started {
                let _ = tx.send(ProgressMessage::Started { total: progress.total });
                started = true;
            }
            let _ = tx.send(ProgressMessage::Progress {
                current: progress.current,
                percentage: progress.percentage,
                label: progress.unit_label,
            });
        }
    }

    pub fn finish_with_summary(mut self, duration: Duration, imported: usize, failed: usize) {
        let _ = self.tx.send(ProgressMessage::Finished);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        self.sheets.finish_and_clear();
        println!();
        println!(
            "{} {}",
            Icons::CHECK.style(theme().ok.clone()),
            format!("Complete in {}", HumanDuration(duration)).style(theme().ok.clone())
        );
        println!(
            "  {} {}  {} {}",
            Icons::FLASK.style(theme().note.clone()),
            imported,
            Icons::CROSS.style(theme().failure.clone()),
            failed
        );
    }
}

pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_message(message.to_string());
        if console::Term::stdout().is_term() && !crate::config::is_quiet() {
            pb.enable_steady_tick(Duration::from_millis(100));
        }
        Self { pb }
    }

    pub fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }
}
