//! Edit decision list export for mpv.
//!
//! Two renderings of the same [`EditDecisionList`]:
//!
//! - an EDL file (`# mpv EDL v0` header, then `source,start,duration` lines)
//!   named `<video>.<purpose>.edl`;
//! - an inline `edl://` descriptor (`source,length=D,start=S;` per entry)
//!   handed straight to `mpv` for playback.
//!
//! Entry order is kept as given; nothing is sorted or deduplicated.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use camflow_common::error::{CamflowError, CamflowResult};
use camflow_motion_model::interval::EditDecisionList;

pub const EDL_HEADER: &str = "# mpv EDL v0";

/// What an exported list is for; part of the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdlPurpose {
    #[default]
    Preview,
    Final,
}

impl EdlPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            EdlPurpose::Preview => "preview",
            EdlPurpose::Final => "final",
        }
    }
}

impl fmt::Display for EdlPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdlPurpose {
    type Err = CamflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preview" => Ok(EdlPurpose::Preview),
            "final" => Ok(EdlPurpose::Final),
            other => Err(CamflowError::config(format!(
                "unknown EDL purpose `{other}` (expected preview or final)"
            ))),
        }
    }
}

/// `<video>.<purpose>.edl`, placed in `out_dir` when given, otherwise next to
/// the video.
pub fn edl_path_for(video: &Path, purpose: EdlPurpose, out_dir: Option<&Path>) -> PathBuf {
    let file_name = video
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| video.as_os_str().to_os_string());

    let mut name = file_name;
    name.push(format!(".{purpose}.edl"));

    match (out_dir, video.parent()) {
        (Some(dir), _) => dir.join(name),
        (None, Some(parent)) => parent.join(name),
        (None, None) => PathBuf::from(name),
    }
}

/// Source field of an EDL entry. mpv's `%len%` form quotes names containing
/// separators.
fn edl_source(source: &str) -> String {
    if source.contains([',', ';', '%', '\n']) {
        format!("%{}%{source}", source.len())
    } else {
        source.to_string()
    }
}

/// EDL file content.
pub fn format_edl_file(edl: &EditDecisionList) -> String {
    let mut lines = Vec::with_capacity(edl.len() + 1);
    lines.push(EDL_HEADER.to_string());
    for entry in &edl.entries {
        lines.push(format!(
            "{},{},{}",
            edl_source(&entry.source),
            entry.offset_secs,
            entry.duration_secs
        ));
    }
    lines.join("\n")
}

/// Inline descriptor for `mpv edl://…`.
pub fn format_inline_descriptor(edl: &EditDecisionList) -> String {
    edl.entries
        .iter()
        .map(|entry| {
            format!(
                "{},length={},start={};",
                edl_source(&entry.source),
                entry.duration_secs,
                entry.offset_secs
            )
        })
        .collect()
}

/// Writes EDL files and hands lists to mpv.
#[derive(Debug, Clone, Default)]
pub struct EditDecisionExporter {
    out_dir: Option<PathBuf>,
}

impl EditDecisionExporter {
    pub fn new(out_dir: Option<PathBuf>) -> Self {
        Self { out_dir }
    }

    /// Where the list for `video` would be written.
    pub fn path_for(&self, video: &Path, purpose: EdlPurpose) -> PathBuf {
        edl_path_for(video, purpose, self.out_dir.as_deref())
    }

    /// Write `edl` for `video`, replacing any earlier file.
    pub fn write_file(
        &self,
        video: &Path,
        purpose: EdlPurpose,
        edl: &EditDecisionList,
    ) -> CamflowResult<PathBuf> {
        let path = self.path_for(video, purpose);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&path, format_edl_file(edl)).map_err(|e| {
            CamflowError::export(format!("failed to write {}: {e}", path.display()))
        })?;

        tracing::info!(
            path = %path.display(),
            entries = edl.len(),
            total_secs = edl.total_duration_secs(),
            "EDL written"
        );
        Ok(path)
    }

    /// Play `edl` with mpv and wait for the player to exit.
    pub fn play_inline(&self, edl: &EditDecisionList) -> CamflowResult<()> {
        if edl.is_empty() {
            return Err(CamflowError::export("nothing to play: the list is empty"));
        }

        let descriptor = format!("edl://{}", format_inline_descriptor(edl));
        tracing::debug!(entries = edl.len(), %descriptor, "Starting mpv");

        let status = Command::new("mpv")
            .arg(&descriptor)
            .status()
            .map_err(|e| CamflowError::export(format!("failed to start mpv: {e}")))?;

        if !status.success() {
            return Err(CamflowError::export(format!("mpv exited with {status}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camflow_motion_model::interval::Interval;

    fn list() -> EditDecisionList {
        EditDecisionList::from_intervals(&[
            Interval::new(0.7, 1.35, "clip.mp4").unwrap(),
            Interval::new(4.0, 6.5, "clip.mp4").unwrap(),
        ])
    }

    #[test]
    fn test_edl_file_format() {
        let content = format_edl_file(&list());
        let lines: Vec<&str> = content.split('\n').collect();
        assert_eq!(lines[0], "# mpv EDL v0");
        assert_eq!(lines[2], "clip.mp4,4,2.5");
        assert!(lines[1].starts_with("clip.mp4,0.7,0.6"));
        assert_eq!(lines.len(), 3);
        assert!(!content.ends_with('\n'));
    }

    #[test]
    fn test_empty_edl_is_header_only() {
        assert_eq!(format_edl_file(&EditDecisionList::default()), EDL_HEADER);
        assert_eq!(format_inline_descriptor(&EditDecisionList::default()), "");
    }

    #[test]
    fn test_inline_descriptor() {
        let edl = EditDecisionList::from_intervals(&[
            Interval::new(1.0, 3.0, "a.mp4").unwrap(),
            Interval::new(0.5, 1.0, "a.mp4").unwrap(),
        ]);
        assert_eq!(
            format_inline_descriptor(&edl),
            "a.mp4,length=2,start=1;a.mp4,length=0.5,start=0.5;"
        );
    }

    #[test]
    fn test_separator_in_source_is_quoted() {
        let edl = EditDecisionList::from_intervals(&[Interval::new(1.0, 2.0, "a,b.mp4").unwrap()]);
        assert_eq!(format_inline_descriptor(&edl), "%7%a,b.mp4,length=1,start=1;");
    }

    #[test]
    fn test_edl_path_naming() {
        let video = Path::new("/videos/trip.mp4");
        assert_eq!(
            edl_path_for(video, EdlPurpose::Preview, None),
            PathBuf::from("/videos/trip.mp4.preview.edl")
        );
        assert_eq!(
            edl_path_for(video, EdlPurpose::Final, Some(Path::new("/out"))),
            PathBuf::from("/out/trip.mp4.final.edl")
        );
    }

    #[test]
    fn test_purpose_parse() {
        assert_eq!("final".parse::<EdlPurpose>().unwrap(), EdlPurpose::Final);
        assert_eq!("Preview".parse::<EdlPurpose>().unwrap(), EdlPurpose::Preview);
        assert!("draft".parse::<EdlPurpose>().is_err());
    }

    #[test]
    fn test_write_file_replaces_previous() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        let exporter = EditDecisionExporter::default();

        let first = exporter.write_file(&video, EdlPurpose::Preview, &list()).unwrap();
        let second = exporter
            .write_file(&video, EdlPurpose::Preview, &EditDecisionList::default())
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(std::fs::read_to_string(second).unwrap(), EDL_HEADER);
    }

    #[test]
    fn test_play_rejects_empty_list() {
        let exporter = EditDecisionExporter::default();
        assert!(matches!(
            exporter.play_inline(&EditDecisionList::default()),
            Err(CamflowError::Export { .. })
        ));
    }
}
