/// Ordered text lines split from one multi-line block.
///
/// Empty lines are kept; they still produce an output image. An entirely empty block has no
/// lines at all.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextLines(Vec<String>);

impl TextLines {
    /// Split `block` on `\n`. A trailing `\r` is dropped from each line so CRLF files behave
    /// like LF files; nothing else is trimmed.
    pub fn parse(block: &str) -> Self {
        if block.is_empty() {
            return Self(Vec::new());
        }
        Self(
            block
                .split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
                .collect(),
        )
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when there are no lines.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The line shown in a preview: the first line, or `""` when there are none.
    pub fn first_or_empty(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or("")
    }

    /// Borrow the lines in input order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Iterate the lines in input order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for TextLines {
    fn from(lines: Vec<String>) -> Self {
        Self(lines)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/form/lines.rs"]
mod tests;
