use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::thread;

use log::warn;
use rodio::{Decoder, OutputStream, Sink};

use crate::notify::AudioPort;

/// Plays the configured alarm file through the default output device.
///
/// Each play gets a dedicated short-lived thread: the output stream handle
/// is not Send and must outlive the playback.
pub struct AlarmSound {
    path: Option<PathBuf>,
}

impl AlarmSound {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl AudioPort for AlarmSound {
    fn play(&self) -> Result<(), Box<dyn Error>> {
        let Some(path) = self.path.clone() else {
            // No alarm configured; the visual alert stands alone.
            return Ok(());
        };
        // Open eagerly so a missing file surfaces to the caller.
        let file = File::open(&path)?;
        thread::Builder::new()
            .name("chime-audio".to_string())
            .spawn(move || {
                if let Err(e) = play_file(file) {
                    warn!("alarm playback failed for {}: {e}", path.display());
                }
            })?;
        Ok(())
    }
}

fn play_file(file: File) -> Result<(), Box<dyn Error>> {
    let (_stream, handle) = OutputStream::try_default()?;
    let sink = Sink::try_new(&handle)?;
    sink.append(Decoder::new(BufReader::new(file))?);
    sink.sleep_until_end();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_path_is_a_noop() {
        assert!(AlarmSound::new(None).play().is_ok());
    }

    #[test]
    fn missing_file_surfaces_an_error() {
        let sound = AlarmSound::new(Some(PathBuf::from("/nonexistent/alarm.ogg")));
        assert!(sound.play().is_err());
    }
}
