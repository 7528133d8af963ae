//! fuzzpatch -- apply a V4A patch document to a workspace.
//!
//! Usage: fuzzpatch [--workspace <path>] [patch-file]
//!
//! Reads the patch from `patch-file` or stdin, applies it rooted at the
//! workspace directory, and prints the apply report as JSON. Exits
//! nonzero when any operation failed.

use std::io::Read;

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the JSON report owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut workspace = ".".to_owned();
    let mut patch_file = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--workspace" {
            workspace = args.next().context("--workspace requires a path")?;
        } else {
            patch_file = Some(arg);
        }
    }

    let patch = match patch_file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read patch file {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read patch from stdin")?;
            buf
        }
    };

    let mut fs = fuzzpatch::WorkspaceFs::new(workspace)?;
    let report = fuzzpatch::apply_patch(&patch, &mut fs);

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.success {
        std::process::exit(1);
    }
    Ok(())
}
