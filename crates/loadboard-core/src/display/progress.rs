//! Batch progress lines.

use std::fmt;

use crate::models::Progress;

/// `Processing: x of y` while running; the final tally once complete.
pub struct ProgressLine(pub Progress);

impl fmt::Display for ProgressLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let progress = &self.0;
        if progress.is_complete {
            write!(
                f,
                "Completed: {} successful, {} failed",
                progress.completed, progress.failed
            )?;
            if progress.completed > 0 {
                write!(f, " - Refreshing mirror...")?;
            }
            Ok(())
        } else {
            write!(f, "Processing: {} of {}", progress.processed(), progress.total)
        }
    }
}

/// Fixed-width text bar with a percentage, e.g. `[#####-----]  50%`.
pub struct ProgressBar {
    pub progress: Progress,
    pub width: usize,
}

impl ProgressBar {
    pub fn new(progress: Progress) -> Self {
        Self {
            progress,
            width: 20,
        }
    }
}

impl fmt::Display for ProgressBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let percent = usize::from(self.progress.percent());
        let filled = self.width * percent / 100;
        write!(
            f,
            "[{}{}] {percent:>3}%",
            "#".repeat(filled),
            "-".repeat(self.width - filled)
        )
    }
}
