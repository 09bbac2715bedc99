use crate::capabilities::TabOpener;
use crate::error::NotifyError;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenerKind {
    Open,
    /// `rundll32 url.dll,FileProtocolHandler`, which takes the URL verbatim.
    /// Going through `cmd /C start` would split chat links at `&`.
    Rundll32,
    XdgOpen,
}

impl OpenerKind {
    pub fn for_platform() -> Self {
        if cfg!(target_os = "macos") {
            OpenerKind::Open
        } else if cfg!(windows) {
            OpenerKind::Rundll32
        } else {
            OpenerKind::XdgOpen
        }
    }

    pub fn program(&self) -> &'static str {
        match self {
            OpenerKind::Open => "open",
            OpenerKind::Rundll32 => "rundll32",
            OpenerKind::XdgOpen => "xdg-open",
        }
    }

    pub fn args(&self, url: &str) -> Vec<String> {
        match self {
            OpenerKind::Rundll32 => vec!["url.dll,FileProtocolHandler".to_string(), url.to_string()],
            OpenerKind::Open | OpenerKind::XdgOpen => vec![url.to_string()],
        }
    }
}

/// Opens URLs in the user's default browser through the platform opener.
pub struct SystemBrowser {
    kind: OpenerKind,
    opener: Option<PathBuf>,
}

impl SystemBrowser {
    pub fn detect() -> Self {
        let kind = OpenerKind::for_platform();
        let opener = which::which(kind.program()).ok();
        if opener.is_none() {
            warn!(operation = "detect_browser", program = kind.program(), "No browser opener found on PATH");
        }
        Self { kind, opener }
    }

    pub fn is_available(&self) -> bool {
        self.opener.is_some()
    }
}

impl TabOpener for SystemBrowser {
    fn open_tab(&self, url: &str) -> Result<(), NotifyError> {
        let Some(opener) = &self.opener else {
            return Err(NotifyError::NoProgram("open a browser"));
        };

        let mut child = Command::new(opener)
            .args(self.kind.args(url))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| NotifyError::Launch {
                program: opener.display().to_string(),
                source,
            })?;
        // Reap the opener once it hands off to the browser
        std::thread::spawn(move || {
            let _ = child.wait();
        });

        info!(operation = "open_tab", url = %url, "Opened in browser");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_opener_is_reported() {
        let browser = SystemBrowser {
            kind: OpenerKind::XdgOpen,
            opener: None,
        };
        assert!(!browser.is_available());
        assert!(matches!(
            browser.open_tab("https://in.bookmyshow.com"),
            Err(NotifyError::NoProgram(_))
        ));
    }

    #[test]
    fn test_chat_link_reaches_the_opener_as_one_argument() {
        let link = crate::notify::chat_link("fan@example.com", "Tickets & popcorn");
        assert!(link.contains("&message="));

        for kind in [OpenerKind::Open, OpenerKind::Rundll32, OpenerKind::XdgOpen] {
            let args = kind.args(&link);
            assert_eq!(args.last(), Some(&link), "{:?}", kind);
            assert!(args.iter().all(|a| a != "/C" && a != "start"));
        }
        assert_eq!(
            OpenerKind::Rundll32.args(&link),
            ["url.dll,FileProtocolHandler".to_string(), link.clone()]
        );
        assert_eq!(OpenerKind::Rundll32.program(), "rundll32");
    }
}
