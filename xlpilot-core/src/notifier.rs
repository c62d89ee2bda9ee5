/// User-facing notification surface.
///
/// The store and the dispatcher report failures here before returning them,
/// so front ends decide how a message is shown.
pub trait Notifier {
    fn error(&self, message: &str);

    fn info(&self, message: &str) {
        log::info!("{message}");
    }
}

/// Notifier that only writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, message: &str) {
        log::error!("{message}");
    }
}
