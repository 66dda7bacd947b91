use grove_core::UsageEntry;

pub struct TableFormatter {
    tool_width: usize,
    session_width: usize,
    model_width: usize,
    mode_width: usize,
    used_width: usize,
}

impl TableFormatter {
    pub fn new(entries: &[UsageEntry]) -> Self {
        let tool_width = entries
            .iter()
            .map(|e| e.tool_label.chars().count())
            .max()
            .unwrap_or(10)
            .clamp(4, 24);

        Self {
            tool_width,
            session_width: 36,
            model_width: 12,
            mode_width: 12,
            used_width: 20,
        }
    }

    pub fn print_table(&self, entries: &[UsageEntry]) {
        self.print_header();
        for entry in entries {
            self.print_row(entry);
        }
        self.print_footer();
    }

    fn print_header(&self) {
        println!("{}", self.top_border());
        println!("{}", self.header_row());
        println!("{}", self.separator());
    }

    fn print_footer(&self) {
        println!("{}", self.bottom_border());
    }

    fn print_row(&self, entry: &UsageEntry) {
        let session = entry.session_id.as_deref().unwrap_or("-");
        let model = entry.model.as_deref().unwrap_or("-");
        let used = entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();

        println!(
            "│ {} │ {} │ {} │ {} │ {} │",
            truncate(&entry.tool_label, self.tool_width),
            truncate(session, self.session_width),
            truncate(model, self.model_width),
            truncate(&entry.mode, self.mode_width),
            truncate(&used, self.used_width),
        );
    }

    fn top_border(&self) -> String {
        format!(
            "┌{}┬{}┬{}┬{}┬{}┐",
            "─".repeat(self.tool_width + 2),
            "─".repeat(self.session_width + 2),
            "─".repeat(self.model_width + 2),
            "─".repeat(self.mode_width + 2),
            "─".repeat(self.used_width + 2),
        )
    }

    fn header_row(&self) -> String {
        format!(
            "│ {} │ {} │ {} │ {} │ {} │",
            truncate("Tool", self.tool_width),
            truncate("Session", self.session_width),
            truncate("Model", self.model_width),
            truncate("Mode", self.mode_width),
            truncate("Last Used", self.used_width),
        )
    }

    fn separator(&self) -> String {
        format!(
            "├{}┼{}┼{}┼{}┼{}┤",
            "─".repeat(self.tool_width + 2),
            "─".repeat(self.session_width + 2),
            "─".repeat(self.model_width + 2),
            "─".repeat(self.mode_width + 2),
            "─".repeat(self.used_width + 2),
        )
    }

    fn bottom_border(&self) -> String {
        format!(
            "└{}┴{}┴{}┴{}┴{}┘",
            "─".repeat(self.tool_width + 2),
            "─".repeat(self.session_width + 2),
            "─".repeat(self.model_width + 2),
            "─".repeat(self.mode_width + 2),
            "─".repeat(self.used_width + 2),
        )
    }
}

/// Truncate a string to a maximum display width, adding "..." if truncated.
///
/// Uses character count (not byte count) to safely handle UTF-8 strings
/// including emoji and multi-byte characters.
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        format!("{:<width$}", s, width = max_len)
    } else {
        // Safely truncate at character boundaries, not byte boundaries
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_pads() {
        assert_eq!(truncate("ab", 5), "ab   ");
    }

    #[test]
    fn test_truncate_long_string_adds_ellipsis() {
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
    }

    #[test]
    fn test_truncate_multibyte_safe() {
        let result = truncate("日本語のテキストです", 6);
        assert_eq!(result.chars().count(), 6);
        assert!(result.ends_with("..."));
    }
}
