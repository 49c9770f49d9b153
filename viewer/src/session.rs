//! Viewer application session control.

use crate::{common::*, config::AppConfig};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The capability that starts viewer application sessions.
pub trait SessionProvider
where
    Self: Debug,
{
    /// Starts one session of the viewer application.
    fn launch(&self) -> Result<AppSession>;
}

/// Launches the viewer application by spawning an external command.
#[derive(Debug, Clone)]
pub struct CommandSessionProvider {
    command: String,
    args: Vec<String>,
}

impl CommandSessionProvider {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
        }
    }
}

impl SessionProvider for CommandSessionProvider {
    fn launch(&self) -> Result<AppSession> {
        let child = Command::new(&self.command)
            .args(&self.args)
            .spawn()
            .with_context(|| format!("failed to launch viewer command '{}'", self.command))?;
        info!("launched viewer session, pid {}", child.id());

        Ok(AppSession { child })
    }
}

/// The handle to a running viewer application session.
#[derive(Debug)]
pub struct AppSession {
    child: Child,
}

impl AppSession {
    /// Waits for the session to close. A negative duration blocks forever;
    /// otherwise `None` is returned if the session is still alive at the
    /// deadline.
    pub fn wait(&mut self, secs: f64) -> Result<Option<ExitStatus>> {
        if secs < 0.0 {
            let status = self.child.wait()?;
            return Ok(Some(status));
        }

        let deadline = Instant::now() + Duration::from_secs_f64(secs);
        loop {
            if let Some(status) = self.child.try_wait()? {
                return Ok(Some(status));
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            thread::sleep(remaining.min(POLL_INTERVAL));
        }
    }

    /// Terminates the session process.
    pub fn close(&mut self) -> Result<()> {
        self.child.kill()?;
        self.child.wait()?;
        Ok(())
    }
}
