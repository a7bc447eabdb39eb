//! YAML frontmatter parsing
//!
//! Content files look like:
//! ```markdown
//! ---
//! title: "Example"
//! date: "2024-05-01"
//! tags: [rust, web]
//! ---
//!
//! Body here
//! ```

use serde::de::DeserializeOwned;
use thiserror::Error;

const FRONTMATTER_DELIMITER: &str = "---";

/// Frontmatter parsing errors
#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("no frontmatter found - file must start with ---")]
    NoFrontmatter,

    #[error("unclosed frontmatter - missing second ---")]
    Unclosed,

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Split a document into its parsed frontmatter and the markdown body
pub fn parse_frontmatter<T: DeserializeOwned>(content: &str) -> Result<(T, String), FrontmatterError> {
    let trimmed = content.trim_start_matches('\u{feff}').trim_start();

    let rest = trimmed
        .strip_prefix(FRONTMATTER_DELIMITER)
        .ok_or(FrontmatterError::NoFrontmatter)?;

    // The closing delimiter has to sit on its own line
    let mut offset = 0;
    let mut yaml_end = None;
    for line in rest.split_inclusive('\n') {
        if offset > 0 && line.trim_end() == FRONTMATTER_DELIMITER {
            yaml_end = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }
    let (yaml_end, body_start) = yaml_end.ok_or(FrontmatterError::Unclosed)?;

    let frontmatter: T = serde_yaml::from_str(rest[..yaml_end].trim())?;
    let body = rest[body_start..].trim().to_string();

    Ok((frontmatter, body))
}
