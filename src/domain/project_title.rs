use unicode_segmentation::UnicodeSegmentation;

const MAX_CHAR_LENGHT: usize = 256;
const FORBIDDEN_CHARS: [char; 6] = ['{', '}', '"', '>', '<', '\\'];

#[derive(Debug, Clone, serde::Serialize)]
pub struct ProjectTitle(String);

impl ProjectTitle {
    pub fn parse(title: String) -> Result<ProjectTitle, String> {
        let title = title.trim().to_string();
        let is_empty = title.is_empty();
        let is_too_long = title.graphemes(true).count() > MAX_CHAR_LENGHT;
        let contains_forbidden_chars = title.chars().any(|char| FORBIDDEN_CHARS.contains(&char));

        if is_empty || is_too_long || contains_forbidden_chars {
            return Err(format!("{} is not a valid project title", title));
        }

        Ok(Self(title))
    }
}

impl AsRef<str> for ProjectTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
