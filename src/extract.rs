/// Returns the text following the first occurrence of `prefix`, up to but not
/// including the next line feed or the next occurrence of `prefix`, whichever
/// comes first. No trimming is applied.
pub fn extract_value<'a>(prefix: &str, text: &'a str) -> Option<&'a str> {
    let (_, rest) = text.split_once(prefix)?;
    let segment = rest.split(prefix).next().unwrap_or(rest);
    Some(segment.split('\n').next().unwrap_or(segment))
}
