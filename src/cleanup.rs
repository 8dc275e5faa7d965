//! Frame cleanup.
//!
//! Once a video's PDF exists its frames are only taking disk space.
//! [`remove_frames`] deletes them and then tries to remove the directory.
//! Nothing here fails: problems are logged and reported in the return value.

use std::fs;
use std::path::Path;

use crate::extract::images_in;

/// What [`remove_frames`] managed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cleanup {
    /// Frame images deleted.
    pub frames_removed: usize,
    /// Whether the frame directory no longer exists.
    pub directory_removed: bool,
}

/// Delete every `*.jpg` in `frame_directory`, then remove the directory if
/// it is empty.
///
/// Best effort: an undeletable frame, a leftover unrelated file, or a
/// permission problem is logged at warn level and otherwise ignored.
pub fn remove_frames(frame_directory: &Path) -> Cleanup {
    let mut cleanup = Cleanup::default();

    match images_in(frame_directory) {
        Ok(frames) => {
            for frame in frames {
                match fs::remove_file(&frame) {
                    Ok(()) => cleanup.frames_removed += 1,
                    Err(error) => {
                        log::warn!("Could not delete frame {}: {}", frame.display(), error);
                    }
                }
            }
        }
        Err(error) => {
            log::warn!(
                "Could not list frames in {}: {}",
                frame_directory.display(),
                error
            );
        }
    }

    cleanup.directory_removed = match fs::remove_dir(frame_directory) {
        Ok(()) => true,
        Err(error) => {
            if frame_directory.exists() {
                log::warn!(
                    "Could not remove frame directory {}: {}",
                    frame_directory.display(),
                    error
                );
                false
            } else {
                true
            }
        }
    };

    log::debug!(
        "Removed {} frames from {}",
        cleanup.frames_removed,
        frame_directory.display()
    );
    cleanup
}
