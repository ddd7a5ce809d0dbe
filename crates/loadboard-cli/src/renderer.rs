//! Terminal rendering module for rich markdown output
//!
//! Listings and summaries are markdown rendered with termimad; progress is a
//! single line per event, with a bar in rich mode.

use anyhow::Result;
use loadboard_core::{display::ProgressBar, OperationStatus, Progress, ProgressLine};
use termimad::{crossterm::style::Color, MadSkin};

/// Terminal renderer that can switch between rich and plain text output
#[derive(Clone)]
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();

        skin.set_headers_fg(Color::Blue);
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::Magenta);
        skin.inline_code.set_bg(Color::AnsiValue(238));

        Self { rich_enabled, skin }
    }

    /// Render markdown text to terminal
    pub fn render(&self, markdown: &str) -> Result<()> {
        if self.rich_enabled {
            // Headers keep their hash marks
            for line in markdown.lines() {
                if line.starts_with('#') {
                    println!("\x1b[34m{line}\x1b[0m");
                } else {
                    self.skin.print_inline(line);
                    println!();
                }
            }
        } else {
            print!("{markdown}");
        }
        Ok(())
    }

    pub fn progress(&self, progress: Progress) {
        if self.rich_enabled {
            println!("{} {}", ProgressBar::new(progress), ProgressLine(progress));
        } else {
            println!("{}", ProgressLine(progress));
        }
    }

    pub fn status(&self, status: &OperationStatus) -> Result<()> {
        if self.rich_enabled {
            let color = if status.success { "32" } else { "31" };
            print!("\x1b[{color}m{status}\x1b[0m");
            Ok(())
        } else {
            self.render(&status.to_string())
        }
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_renderer() {
        let renderer = TerminalRenderer::new(false);
        assert!(!renderer.rich_enabled);
    }

    #[test]
    fn test_default_is_rich() {
        let renderer = TerminalRenderer::default();
        assert!(renderer.rich_enabled);
    }

    #[test]
    fn test_clone_keeps_mode() {
        let renderer = TerminalRenderer::new(false);
        let copy = renderer.clone();
        assert_eq!(copy.rich_enabled, renderer.rich_enabled);
    }
}
