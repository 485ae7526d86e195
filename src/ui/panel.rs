use super::progress::{create_lamp_spinner, create_status_spinner, format_status};
use crate::indicator::{IndicatorSink, IndicatorSlot};
use crate::relay::RelayStatus;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget};

const LAMP_ON: &str = "●";
const LAMP_OFF: &str = "○";

/// Indicator sink that draws both lamps and a status line on stderr
pub struct PanelIndicators {
    #[allow(dead_code)]
    multi_progress: MultiProgress,
    count_pb: ProgressBar,
    delay_pb: ProgressBar,
    status_pb: ProgressBar,
}

impl PanelIndicators {
    pub fn new() -> Self {
        let multi_progress = MultiProgress::with_draw_target(ProgressDrawTarget::stderr());
        let count_pb = multi_progress.add(create_lamp_spinner(IndicatorSlot::Count));
        let delay_pb = multi_progress.add(create_lamp_spinner(IndicatorSlot::Delay));
        let status_pb = multi_progress.add(create_status_spinner());

        count_pb.set_message(LAMP_OFF);
        delay_pb.set_message(LAMP_OFF);

        PanelIndicators {
            multi_progress,
            count_pb,
            delay_pb,
            status_pb,
        }
    }
}

impl Default for PanelIndicators {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorSink for PanelIndicators {
    fn set(&mut self, slot: IndicatorSlot, on: bool) {
        let pb = match slot {
            IndicatorSlot::Count => &self.count_pb,
            IndicatorSlot::Delay => &self.delay_pb,
        };
        pb.set_message(if on { LAMP_ON } else { LAMP_OFF });
    }

    fn report(&mut self, status: &RelayStatus) {
        self.status_pb.set_message(format_status(status));
        // Tick the spinner to animate it.
        self.status_pb.tick();
    }
}

impl Drop for PanelIndicators {
    fn drop(&mut self) {
        self.count_pb.finish();
        self.delay_pb.finish();
        self.status_pb.finish();
    }
}
