use tokio::sync::mpsc;

/// Consumer of "now playing" titles.
///
/// Called from the status reader task, one title at a time.  An empty title
/// means the backend announced a track without naming it.
pub trait OutputSink: Send + Sync + 'static {
    fn write(&self, title: &str);
}

/// Forwards titles into a channel; a closed receiver drops them.
impl OutputSink for mpsc::UnboundedSender<String> {
    fn write(&self, title: &str) {
        let _ = self.send(title.to_string());
    }
}

/// Discards every title.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn write(&self, _title: &str) {}
}
