use indicatif::{ProgressBar, ProgressStyle};

/// Returns a styled progress bar, or `None` when progress output is disabled.
pub fn progress_bar(len: u64, msg: String, enabled: bool) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }

    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise} / {eta_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
            .ok()?
            .progress_chars("##-")
    );
    bar.set_message(msg);

    Some(bar)
}
