use std::fmt::Write;

use colored::{ColoredString, Colorize};
use fwdiff_sdk::{ArchiveComparison, Category};

pub const BANNER: &str = "--- Comparison Results ---";

fn paint(category: Category) -> ColoredString {
    let label = format!("{}:", category.label());
    match category {
        Category::Added => label.green().bold(),
        Category::Removed => label.red().bold(),
        Category::Changed => label.yellow().bold(),
        Category::Unchanged => label.dimmed(),
    }
}

/// Banner, then one section per category in fixed order.
pub fn text(comparison: &ArchiveComparison) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", BANNER.bold());
    for (category, paths) in comparison.result.iter() {
        let _ = writeln!(out, "\n{}", paint(category));
        for path in paths {
            let _ = writeln!(out, "  {path}");
        }
    }
    out
}

pub fn json(comparison: &ArchiveComparison) -> serde_json::Result<String> {
    let mut out = serde_json::to_string_pretty(comparison)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwdiff_sdk::ComparisonResult;
    use std::path::PathBuf;

    fn comparison() -> ArchiveComparison {
        ArchiveComparison {
            left: PathBuf::from("old.npk"),
            right: PathBuf::from("new.npk"),
            result: ComparisonResult {
                added: vec!["y".into()],
                removed: vec![],
                changed: vec!["etc/version".into()],
                unchanged: vec!["bin/ash".into(), "x".into()],
            },
        }
    }

    #[test]
    fn text_layout() {
        colored::control::set_override(false);
        let expected = "\
--- Comparison Results ---

ADDED:
  y

REMOVED:

CHANGED:
  etc/version

UNCHANGED:
  bin/ash
  x
";
        assert_eq!(text(&comparison()), expected);
    }

    #[test]
    fn json_has_all_sections() {
        let out = json(&comparison()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["right"], "new.npk");
        assert_eq!(value["changed"][0], "etc/version");
        assert!(value["removed"].as_array().unwrap().is_empty());
        assert!(out.ends_with('\n'));
    }
}
