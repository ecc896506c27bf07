//! Short-lived notices shown over the application.

use std::collections::VecDeque;
use std::time::Duration;

use web_time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
}

#[derive(Debug, Clone)]
pub struct StatusMsg {
    pub kind: StatusKind,
    pub text: String,
    pub at: Instant,
    pub timeout: Duration,
}

impl StatusMsg {
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.at) > self.timeout
    }
}

#[derive(Debug, Default)]
pub struct StatusQueue {
    q: VecDeque<StatusMsg>,
}

impl StatusQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_custom(&mut self, kind: StatusKind, text: impl Into<String>, timeout: Duration) {
        self.q.push_back(StatusMsg {
            kind,
            text: text.into(),
            at: Instant::now(),
            timeout,
        });
    }

    pub fn push_info(&mut self, text: impl Into<String>) {
        self.push_custom(StatusKind::Info, text, Duration::from_millis(3000));
    }

    pub fn push_success(&mut self, text: impl Into<String>) {
        self.push_custom(StatusKind::Success, text, Duration::from_millis(3500));
    }

    pub fn retain_active(&mut self) {
        self.retain_active_now(Instant::now());
    }

    pub fn retain_active_now(&mut self, now: Instant) {
        self.q.retain(|m| !m.is_expired_at(now));
    }

    /// Most recent message still queued.
    pub fn latest(&self) -> Option<&StatusMsg> {
        self.q.back()
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    /// Paints the latest message as a toast in the bottom-right corner.
    pub fn show(&mut self, ctx: &egui::Context) {
        self.retain_active();
        let Some(msg) = self.latest() else {
            return;
        };
        let color = match msg.kind {
            StatusKind::Info => ctx.style().visuals.text_color(),
            StatusKind::Success => egui::Color32::from_rgb(60, 170, 90),
        };
        let offset = crate::ui_consts::TOAST_OFFSET;
        egui::Area::new(egui::Id::new("graph_studio_status_toast"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-offset, -offset))
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.colored_label(color, &msg.text);
                });
            });
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_and_latest() {
        let mut sq = StatusQueue::new();
        sq.push_custom(StatusKind::Info, "i1", Duration::from_millis(100));
        sq.push_custom(StatusKind::Success, "ok1", Duration::from_millis(200));

        let now = Instant::now() + Duration::from_millis(150);
        sq.retain_active_now(now);

        assert_eq!(sq.len(), 1);
        let latest = sq.latest().unwrap();
        assert_eq!(latest.kind, StatusKind::Success);
        assert_eq!(latest.text, "ok1");

        sq.retain_active_now(Instant::now() + Duration::from_millis(250));
        assert!(sq.is_empty());
    }
}
