use crate::ports::{Notice, NoticeSink};

/// Prints notices to stderr so stdout stays clean for `--format json`
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotices;

impl ConsoleNotices {
    pub fn format(notice: &Notice) -> String {
        match notice {
            Notice::Info(m) => format!("ℹ {}", m),
            Notice::Success(m) => format!("✓ {}", m),
            Notice::Error(m) => format!("✗ {}", m),
        }
    }
}

impl NoticeSink for ConsoleNotices {
    fn notify(&self, notice: Notice) {
        eprintln!("{}", Self::format(&notice));
    }
}
