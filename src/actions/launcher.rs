//! Helper process launcher over `std::process`

use std::process::{Child, Command, Stdio};

use tracing::{debug, warn};

use super::{Launched, Launcher};
use crate::error::{Error, Result};

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, program: &str, args: &[String]) -> Result<Box<dyn Launched>> {
        let child = Command::new(program)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Launch(format!("{}: {}", program, e)))?;
        debug!(program, pid = child.id(), "launched");
        Ok(Box::new(ChildProcess { child }))
    }
}

struct ChildProcess {
    child: Child,
}

impl Launched for ChildProcess {
    fn has_exited(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(status) => status.is_some(),
            Err(e) => {
                warn!("cannot poll helper process: {}", e);
                true
            }
        }
    }

    fn stop(&mut self) {
        if let Err(e) = self.child.kill() {
            debug!("helper already gone: {}", e);
        }
        // Reap to avoid a zombie
        let _ = self.child.wait();
    }
}
