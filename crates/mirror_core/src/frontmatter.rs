use std::collections::BTreeMap;

const DELIMITER: &str = "---";

/// Key/value metadata from a leading `---` delimited block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frontmatter {
    entries: BTreeMap<String, String>,
}

impl Frontmatter {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Like [`Frontmatter::get`] but treats an empty value as absent.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Splits a leading frontmatter block off `input`.
///
/// Returns `None` and the whole input when the first line is not a delimiter
/// or the closing delimiter is missing.
pub fn split_frontmatter(input: &str) -> (Option<Frontmatter>, &str) {
    let mut lines = input.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return (None, input);
    };
    if first.trim() != DELIMITER {
        return (None, input);
    }

    let mut offset = first.len();
    let mut entries = BTreeMap::new();
    for line in lines {
        offset += line.len();
        let trimmed = line.trim();
        if trimmed == DELIMITER {
            return (Some(Frontmatter { entries }), &input[offset..]);
        }
        if let Some((key, value)) = parse_entry(trimmed) {
            entries.insert(key, value);
        }
    }

    (None, input)
}

fn parse_entry(line: &str) -> Option<(String, String)> {
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once(':')?;
    Some((key.trim().to_string(), unquote(value.trim()).to_string()))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
