use crate::indicator::IndicatorSlot;
use crate::relay::RelayStatus;
use indicatif::{ProgressBar, ProgressStyle};

pub fn create_lamp_spinner(slot: IndicatorSlot) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{prefix:.bold} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_prefix(format!("{:<6}", slot.label()));
    pb
}

pub fn create_status_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_prefix("Relay");
    pb
}

pub fn format_status(status: &RelayStatus) -> String {
    let bpm = status
        .bpm
        .map_or_else(|| "---".to_string(), |bpm| format!("{:.1}", bpm));
    format!(
        "BPM: {}, Inject: {} @ {} ms, Remaining: {}{}, Fwd: {}, Sup: {}, Inj: {}+{}",
        bpm,
        status.config.target_count,
        status.config.delay_ms,
        status.remaining,
        if status.suppress_pending { " (suppress armed)" } else { "" },
        status.stats.forwarded,
        status.stats.suppressed,
        status.stats.auto_injected,
        status.stats.manual_injected,
    )
}
