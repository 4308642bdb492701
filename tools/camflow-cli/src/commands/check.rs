//! Check for required external tools.

use camflow_media::probe::command_exists;

pub fn run() -> anyhow::Result<()> {
    println!("camflow System Check");
    println!("{}", "=".repeat(50));

    let tools = [
        ("ffmpeg", true, "decodes frames for `camflow extract`"),
        ("ffprobe", true, "reads dimensions and frame rates"),
        ("mpv", false, "plays segments with --play"),
    ];

    let mut all_required_ok = true;
    for (binary, required, purpose) in tools {
        let found = command_exists(binary);
        let tag = match (found, required) {
            (true, _) => "[OK]",
            (false, true) => "[MISSING]",
            (false, false) => "[WARN]",
        };
        println!("{tag} {binary}: {purpose}");
        all_required_ok &= found || !required;
    }

    println!();
    if all_required_ok {
        println!("All required tools are available. camflow is ready.");
        Ok(())
    } else {
        anyhow::bail!("Some required tools are missing. Install ffmpeg (includes ffprobe).")
    }
}
