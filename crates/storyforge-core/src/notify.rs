use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Progress announcements. Failures never reach the caller.
pub trait Notifier {
    fn notify(&self, text: &str);
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _text: &str) {}
}

/// Hands each announcement to an external speech program as its single
/// argument. The caller never waits; a background thread reaps the child.
pub struct SpeakNotifier {
    program: PathBuf,
}

impl SpeakNotifier {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve `command` on `PATH` (or as a path). `None` when it can't be
    /// found, so callers fall back to [`NoopNotifier`].
    pub fn discover(command: &str) -> Option<Self> {
        which::which(command).ok().map(Self::new)
    }

    fn spawn_reaped(&self, text: &str) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
        let mut child = Command::new(&self.program)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(thread::spawn(move || child.wait()))
    }
}

impl Notifier for SpeakNotifier {
    fn notify(&self, text: &str) {
        if let Err(e) = self.spawn_reaped(text) {
            debug!(program = %self.program.display(), error = %e, "speech notifier failed");
        }
    }
}

/// Speech when enabled and resolvable, silence otherwise.
pub fn notifier_for(command: &str, enabled: bool) -> Box<dyn Notifier> {
    if !enabled {
        return Box::new(NoopNotifier);
    }
    match SpeakNotifier::discover(command) {
        Some(speaker) => Box::new(speaker),
        None => {
            debug!(command, "speech program not found; announcements disabled");
            Box::new(NoopNotifier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_swallowed() {
        let speaker = SpeakNotifier::new("/definitely/not/a/real/speaker");
        speaker.notify("phase 1 complete");
    }

    #[cfg(unix)]
    #[test]
    fn spawned_child_is_reaped() {
        let speaker = SpeakNotifier::discover("true").unwrap();
        let status = speaker.spawn_reaped("hi").unwrap().join().unwrap().unwrap();
        assert!(status.success());
    }

    #[test]
    fn unresolvable_command_is_not_discovered() {
        assert!(SpeakNotifier::discover("storyforge-no-such-speaker-xyz").is_none());
    }

    #[test]
    fn disabled_speech_uses_noop() {
        let notifier = notifier_for("sh", false);
        notifier.notify("quiet");
    }
}
