//! `shaderbin key`: cache key of shader sources.

use std::path::PathBuf;

use shaderbin_cache::CacheKey;
use shaderbin_common::KeyScheme;

use crate::{settings, GlobalArgs, KeyArgs};

/// Runs the `shaderbin key` command.
///
/// Prints the key and returns 0, or returns 1 when the sources have no
/// usable key.
pub fn run(args: &KeyArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let scheme = match args.scheme {
        Some(scheme) => scheme,
        None => settings::load(global)?.cache.key,
    };

    match key_of_files(&args.files, scheme)? {
        Some(key) => {
            println!("{key}");
            Ok(0)
        }
        None => {
            if !global.quiet {
                eprintln!("no cache key: a source is empty or the key is too short");
            }
            Ok(1)
        }
    }
}

/// Reads each file and derives the key of their contents in order.
fn key_of_files(files: &[PathBuf], scheme: KeyScheme) -> std::io::Result<Option<CacheKey>> {
    let sources = files
        .iter()
        .map(std::fs::read_to_string)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CacheKey::derive(
        sources.iter().map(|s| Some(s.as_str())),
        scheme,
    ))
}
