// src/feed/config.rs
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::feed::types::Platform;

const ENV_PATH: &str = "CONTEST_SOURCES_PATH";

/// Load the enabled-platform list from an explicit path. Supports TOML or
/// JSON formats.
pub fn load_sources_from(path: &Path) -> Result<Vec<Platform>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_sources(&content, ext.as_str())
}

/// Load the enabled-platform list using env var + fallbacks:
/// 1) $CONTEST_SOURCES_PATH
/// 2) config/contest_sources.toml
/// 3) config/contest_sources.json
/// 4) every supported platform
pub fn load_sources_default() -> Result<Vec<Platform>> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        } else {
            return Err(anyhow!("CONTEST_SOURCES_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/contest_sources.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from("config/contest_sources.json");
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    Ok(Platform::ALL.to_vec())
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<Platform>> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("sources");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    // Try JSON array
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    // Fallback: also try TOML if not attempted
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported sources format"))
}

fn parse_toml(s: &str) -> Result<Vec<Platform>> {
    #[derive(serde::Deserialize)]
    struct TomlSources {
        sources: Vec<String>,
    }
    let v: TomlSources = toml::from_str(s)?;
    Ok(clean_list(v.sources))
}

fn parse_json(s: &str) -> Result<Vec<Platform>> {
    let v: Vec<String> = serde_json::from_str(s)?;
    Ok(clean_list(v))
}

/// Trim, drop empties and repeats, and resolve names to the closed platform
/// set; unknown names are logged and ignored rather than failing the load.
fn clean_list(items: Vec<String>) -> Vec<Platform> {
    let mut out: Vec<Platform> = Vec::new();
    for it in items {
        let t = it.trim();
        if t.is_empty() {
            continue;
        }
        match Platform::from_name(t) {
            Some(p) if !out.contains(&p) => out.push(p),
            Some(_) => {}
            None => tracing::warn!(source = t, "unknown source name in config, ignoring"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn dedup_trim_and_formats_work() {
        let toml = r#"sources = [" Codeforces ", "", "LeetCode", "leetcode"]"#;
        let json = r#"["gfg", "  Codeforces  ", "", "kaggle"]"#;
        let toml_out = parse_toml(toml).unwrap();
        assert_eq!(toml_out, vec![Platform::Codeforces, Platform::LeetCode]);
        let json_out = parse_json(json).unwrap();
        assert_eq!(json_out, vec![Platform::GeeksforGeeks, Platform::Codeforces]);
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        // Isolate CWD into a temp dir so a real config/ in the repo cannot
        // interfere.
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        env::remove_var(ENV_PATH);

        // No files in the temp CWD: every platform enabled.
        let v = load_sources_default().unwrap();
        assert_eq!(v, Platform::ALL.to_vec());

        // Env var takes precedence.
        let p_json = tmp.path().join("contest_sources.json");
        fs::write(&p_json, r#"["leetcode"]"#).unwrap();
        env::set_var(ENV_PATH, p_json.display().to_string());
        let v2 = load_sources_default().unwrap();
        assert_eq!(v2, vec![Platform::LeetCode]);
        env::remove_var(ENV_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
