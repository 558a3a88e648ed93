//! tsconfig.json lookup
//!
//! Only two facts matter here: whether a project type-configuration exists at
//! all (it gates the type-check step), and where the type checker writes its
//! declaration output (`compilerOptions.outDir`). tsconfig files routinely
//! carry comments, so the content is treated as JSONC and comments are
//! stripped before parsing. A file that still fails to parse falls back to
//! the default output root rather than aborting the build.

use std::fs;
use std::path::Path;

/// Declaration output root used when the tsconfig does not configure one
pub const DEFAULT_OUT_DIR: &str = ".types";

/// tsconfig filename at the project root
pub const TSCONFIG_FILE: &str = "tsconfig.json";

/// Resolved type configuration
#[derive(Debug, Clone)]
pub struct TsConfig {
    /// Declaration output root, relative to the project root
    pub out_dir: String,
}

/// Load the project's tsconfig, if one exists at the root.
pub fn load(project_root: &Path) -> Option<TsConfig> {
    let path = project_root.join(TSCONFIG_FILE);
    if !path.is_file() {
        return None;
    }
    let out_dir = fs::read_to_string(&path)
        .ok()
        .and_then(|content| {
            let json = strip_jsonc_comments(&content);
            serde_json::from_str::<serde_json::Value>(&json).ok()
        })
        .and_then(|value| {
            value
                .get("compilerOptions")
                .and_then(|opts| opts.get("outDir"))
                .and_then(|dir| dir.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_OUT_DIR.to_string());
    Some(TsConfig { out_dir })
}

/// Strip JSONC comments from content
fn strip_jsonc_comments(content: &str) -> String {
    let mut result = String::new();
    let mut in_string = false;
    let mut in_single_comment = false;
    let mut in_multi_comment = false;
    let chars: Vec<char> = content.chars().collect();
    let len = chars.len();
    let mut i = 0;

    while i < len {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if in_single_comment {
            if c == '\n' {
                in_single_comment = false;
                result.push(c);
            }
        } else if in_multi_comment {
            if c == '*' && next == Some('/') {
                in_multi_comment = false;
                i += 1;
            }
        } else if in_string {
            result.push(c);
            if c == '"' && (i == 0 || chars[i - 1] != '\\') {
                in_string = false;
            }
        } else {
            match (c, next) {
                ('/', Some('/')) => {
                    in_single_comment = true;
                    i += 1;
                }
                ('/', Some('*')) => {
                    in_multi_comment = true;
                    i += 1;
                }
                ('"', _) => {
                    in_string = true;
                    result.push(c);
                }
                _ => {
                    result.push(c);
                }
            }
        }

        i += 1;
    }

    result
}
