//! Hand-off of a finished document to the desktop.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

/// Opens a finished document.
pub trait Viewer: Send + Sync {
    fn open(&self, path: &Path) -> io::Result<()>;
}

/// The platform's default "open file" action.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemViewer;

impl SystemViewer {
    fn command(path: &Path) -> Command {
        if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg("start").arg("").arg(path);
            cmd
        } else if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(path);
            cmd
        } else {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(path);
            cmd
        }
    }
}

impl Viewer for SystemViewer {
    fn open(&self, path: &Path) -> io::Result<()> {
        let mut cmd = Self::command(path);
        debug!(command = ?cmd, "opening document");
        // Detached: the viewer outlives the job.
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
    }
}
