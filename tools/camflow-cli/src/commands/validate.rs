//! Check stored metrics files against the schema.

use std::path::PathBuf;

use camflow_metrics_store::writer::part_path_for;
use camflow_metrics_store::MetricsStore;

pub fn run(videos: Vec<PathBuf>) -> anyhow::Result<()> {
    super::for_each_input(&videos, |video| {
        let store = MetricsStore::for_video(video);
        let part = part_path_for(store.path());
        if part.exists() {
            println!(
                "{}: unfinished extraction left at {}",
                video.display(),
                part.display()
            );
        }

        let samples = store.read_all()?;
        println!(
            "{}: valid, {} sample(s) in {}",
            video.display(),
            samples.len(),
            store.path().display()
        );
        Ok(())
    })
}
