use anyhow::Context;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Wordlist {
    pub name: String,
    pub entries: Vec<String>,
}

/// Load one candidate per line. Invalid UTF-8 is decoded lossily rather
/// than failing the whole file.
pub fn load_wordlist<P: AsRef<Path>>(path: P) -> anyhow::Result<Wordlist> {
    let path = path.as_ref();
    let bytes =
        fs::read(path).with_context(|| format!("cannot read wordlist {}", path.display()))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    Ok(Wordlist {
        name,
        entries: parse_lines(&String::from_utf8_lossy(&bytes)),
    })
}

pub fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_and_whitespace_are_dropped() {
        let entries = parse_lines("alpha\n\n  beta  \r\n\t\ngamma");
        assert_eq!(entries, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_invalid_utf8_is_tolerated() {
        let path = std::env::temp_dir().join(format!("authsmith-wordlist-{}.txt", std::process::id()));
        fs::write(&path, b"first\n\xff\xfebroken\nlast\n").unwrap();

        let wordlist = load_wordlist(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(wordlist.entries.len(), 3);
        assert_eq!(wordlist.entries[0], "first");
        assert!(wordlist.entries[1].ends_with("broken"));
        assert_eq!(wordlist.entries[2], "last");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_wordlist("/nonexistent/authsmith/words.txt").is_err());
    }
}
