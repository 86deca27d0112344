//! `shaderbin list` and `shaderbin clear`: cache directory maintenance.

use std::fmt::Write as _;

use shaderbin_cache::{CacheEntry, EntryKind};

use crate::{settings, GlobalArgs, ListArgs, ReportFormat};

/// Runs the `shaderbin list` command.
pub fn list(args: &ListArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let resolved = settings::resolve(global)?;
    let cache = settings::cache(&resolved);
    let entries = cache.entries()?;

    match args.format {
        ReportFormat::Text => {
            if !global.quiet {
                eprintln!("   Listing {}", cache.root().display());
            }
            print!("{}", render_text(&entries));
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
    }
    Ok(0)
}

/// Runs the `shaderbin clear` command.
pub fn clear(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let resolved = settings::resolve(global)?;
    let cache = settings::cache(&resolved);
    let removed = cache.purge()?;
    if !global.quiet {
        eprintln!("    Removed {removed} entr{} from {}", plural(removed), cache.root().display());
    }
    Ok(0)
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        "y"
    } else {
        "ies"
    }
}

fn render_text(entries: &[CacheEntry]) -> String {
    let mut out = String::new();
    let mut total = 0;
    for entry in entries {
        let kind = match entry.kind {
            EntryKind::Program => "program",
            EntryKind::Shader => "shader",
        };
        let _ = writeln!(out, "{:<7} {:>10}  {}", kind, entry.size, entry.key);
        total += entry.size;
    }
    let _ = writeln!(out, "{} entr{}, {} bytes", entries.len(), plural(entries.len()), total);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entry(key: &str, kind: EntryKind, size: u64) -> CacheEntry {
        CacheEntry {
            key: key.to_string(),
            kind,
            path: PathBuf::from(format!("/cache/{key}")),
            size,
        }
    }

    #[test]
    fn text_lists_entries_and_total() {
        let text = render_text(&[
            entry("1234567", EntryKind::Program, 100),
            entry("7654321", EntryKind::Shader, 20),
        ]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "program        100  1234567");
        assert_eq!(lines[1], "shader          20  7654321");
        assert_eq!(lines[2], "2 entries, 120 bytes");
    }

    #[test]
    fn empty_listing() {
        assert_eq!(render_text(&[]), "0 entries, 0 bytes\n");
    }

    #[test]
    fn clear_purges_the_flagged_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1234567.bin"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"keep").unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
            cache_dir: Some(dir.path().to_path_buf()),
        };

        assert_eq!(clear(&global).unwrap(), 0);
        assert!(!dir.path().join("1234567.bin").exists());
        assert!(dir.path().join("notes.txt").exists());
    }
}
