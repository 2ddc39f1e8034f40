//! Terminal rendering: keyword highlights, per-video matches, progress and
//! the closing summary.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use ytts_core::{BatchObserver, BatchResult, Highlight, Rejected, VideoId, VideoMatches};

/// Background colors per keyword slot, black text on top.
pub struct ConsoleHighlight;

impl Highlight for ConsoleHighlight {
    fn palette_size(&self) -> usize {
        4
    }

    fn mark(&self, slot: usize, text: &str) -> String {
        let base = style(text).black();
        let styled = match slot % 4 {
            0 => base.on_cyan(),
            1 => base.on_green().on_bright(),
            2 => base.on_red(),
            _ => base.on_green(),
        };
        styled.to_string()
    }
}

pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
                .expect("progress template is valid")
                .progress_chars("=> "),
        );
        bar.set_message("Processing");
        Self { bar }
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

impl BatchObserver for ProgressReporter {
    fn video_started(&mut self, _index: usize, _total: usize, video: &VideoId) {
        tracing::debug!("Searching transcript of {}", video);
    }

    fn video_finished(&mut self, index: usize, _total: usize, matches: Option<&VideoMatches>) {
        if let Some(found) = matches {
            self.bar.suspend(|| print_video(found));
        }
        self.bar.set_position(index as u64);
    }
}

fn print_video(found: &VideoMatches) {
    println!("\n{}\n", style(&found.title).blue().bold());
    for m in &found.matches {
        println!(
            "{}  ({})\n  …{}…\n",
            m.link,
            style(&m.timestamp).yellow(),
            m.context
        );
    }
}

pub fn print_rejected(rejected: &Rejected) {
    eprintln!(
        "{} {}: {}",
        style("Skipped").yellow().bold(),
        rejected.reason,
        rejected.input
    );
}

pub fn print_summary(result: &BatchResult) {
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{} {}  {} {}  {} {}",
        style("Scanned:").dim(),
        style(result.scanned).cyan().bold(),
        style("With matches:").dim(),
        style(result.videos.len()).cyan().bold(),
        style("Matches:").dim(),
        style(result.total_matches()).green().bold()
    );

    if !result.missing.is_empty() {
        println!("\nKeywords not found:");
        for keyword in &result.missing {
            println!("  - {}", keyword);
        }
    }

    if !result.errors.is_empty() {
        println!("\n{}", style("Errors:").red());
        for error in &result.errors {
            println!("  {}", error.message);
        }
    }
}
