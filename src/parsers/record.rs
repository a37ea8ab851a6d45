use crate::models::Field;

/// Label prefix for lines that carry no `label: value` structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinePrefix {
    Price,
    Detail,
}

impl LinePrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinePrefix::Price => "Price",
            LinePrefix::Detail => "Detail",
        }
    }
}

/// Parse a block of loosely line-structured text into ordered fields.
///
/// Lines containing a colon split on the first one. Other lines get a synthesized
/// `"<prefix> <n>"` label where `n` is the 1-based position among non-blank lines.
pub fn parse_record_block(block: &str, prefix: LinePrefix) -> Vec<Field> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(index, line)| match line.split_once(':') {
            Some((label, value)) => Field::new(label.trim(), value.trim()),
            None => Field::new(format!("{} {}", prefix.as_str(), index + 1), line),
        })
        .collect()
}
