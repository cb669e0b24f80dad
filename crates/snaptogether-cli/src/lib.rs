use anyhow::Context;
use serde::Serialize;
use snaptogether_core::Pose;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// One row of `snaptogether poses`
#[derive(Debug, Serialize)]
pub struct PoseSummary {
    pub tag: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

pub fn pose_catalog() -> Vec<PoseSummary> {
    Pose::ALL
        .iter()
        .map(|pose| PoseSummary {
            tag: pose.tag(),
            label: pose.label(),
            description: pose.description(),
        })
        .collect()
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

/// Initialize tracing for the CLI binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
