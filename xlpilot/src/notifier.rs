use xlpilot_core::Notifier;

/// Shows user-facing messages on the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn error(&self, message: &str) {
        eprintln!("error: {message}");
    }

    fn info(&self, message: &str) {
        println!("{message}");
    }
}
