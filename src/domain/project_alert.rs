use serde::Deserialize;

/// Display fields of a project, as rendered in a new-project alert email.
#[derive(Debug, Clone)]
pub struct ProjectAlert {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub category: String,
    pub link: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ProjectAlertBody {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    pub category: String,
    #[serde(default)]
    pub link: Option<String>,
}

impl TryFrom<ProjectAlertBody> for ProjectAlert {
    type Error = String;

    fn try_from(body: ProjectAlertBody) -> Result<Self, Self::Error> {
        Ok(ProjectAlert {
            title: required_text("title", body.title)?,
            description: required_text("description", body.description)?,
            image: optional_text(body.image),
            category: required_text("category", body.category)?,
            link: optional_text(body.link),
        })
    }
}

pub(crate) fn required_text(field: &str, value: String) -> Result<String, String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(format!("{} cannot be empty", field));
    }

    Ok(value.to_string())
}

/// Blank strings are treated as absent.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
