//! 贪心按词换行。

/// 按词换行，返回各行文本。
///
/// - 先去掉内嵌的 `\n` / `\r`，再按单个空格切词；
/// - 追加“分隔符 + 下一个词”后长度不超过 `max_chars` 就留在当前行，否则另起一行；
/// - 单个超长词独占一行，不截断；
/// - 长度按字符计。
///
/// # 示例
/// ```rust
/// use portal_feed::text::wrap;
///
/// assert_eq!(wrap("The quick brown fox", 10), vec!["The quick", "brown fox"]);
/// ```
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let cleaned: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();

    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_chars = 0usize;

    for word in cleaned.split(' ') {
        let word_chars = word.chars().count();

        // 首行开头隐含一个分隔符位置，最后统一去掉
        if line_chars + 1 + word_chars <= max_chars {
            line.push(' ');
            line.push_str(word);
            line_chars += 1 + word_chars;
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
            line_chars = word_chars;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }

    if let Some(head) = lines.first_mut() {
        if head.starts_with(' ') {
            head.remove(0);
        }
    }

    // 首词即超长时会先推入一个空行，这里去掉它
    if lines.len() > 1 && lines[0].is_empty() {
        lines.remove(0);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(wrap("The quick brown fox", 10), vec!["The quick", "brown fox"]);
    }

    #[test]
    fn strips_embedded_newlines() {
        assert_eq!(wrap("one\ntwo\r three", 20), vec!["onetwo three"]);
    }

    #[test]
    fn overlong_word_gets_its_own_line() {
        assert_eq!(
            wrap("a supercalifragilistic word", 8),
            vec!["a", "supercalifragilistic", "word"]
        );
    }

    #[test]
    fn overlong_first_word_does_not_leave_empty_line() {
        assert_eq!(wrap("extraordinary day", 5), vec!["extraordinary", "day"]);
    }

    #[test]
    fn empty_input_yields_single_empty_line() {
        assert_eq!(wrap("", 10), vec![String::new()]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(wrap("größe über alles", 10), vec!["größe", "über alles"]);
    }
}
