use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::project_alert::{optional_text, required_text, ProjectAlert};
use crate::domain::project_title::ProjectTitle;

/// A row of the `projects` table as the data store returns it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub techstack: Vec<String>,
    pub image: Option<String>,
    pub demolink: Option<String>,
    pub codelink: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated project fields, serialized as-is for inserts and full updates.
#[derive(Debug, serde::Serialize)]
pub struct NewProject {
    pub title: ProjectTitle,
    pub category: String,
    pub description: String,
    pub techstack: Vec<String>,
    pub image: Option<String>,
    pub demolink: Option<String>,
    pub codelink: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ProjectBody {
    pub title: String,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub techstack: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub demolink: Option<String>,
    #[serde(default)]
    pub codelink: Option<String>,
    #[serde(default)]
    pub notify_subscribers: bool,
}

impl TryFrom<ProjectBody> for NewProject {
    type Error = String;

    fn try_from(body: ProjectBody) -> Result<Self, Self::Error> {
        let techstack = body
            .techstack
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();

        Ok(NewProject {
            title: ProjectTitle::parse(body.title)?,
            category: required_text("category", body.category)?,
            description: required_text("description", body.description)?,
            techstack,
            image: optional_text(body.image),
            demolink: optional_text(body.demolink),
            codelink: optional_text(body.codelink),
        })
    }
}

impl NewProject {
    /// Alert fields for subscribers; the demo link (if any) is the call to action.
    pub fn alert(&self) -> ProjectAlert {
        ProjectAlert {
            title: self.title.as_ref().to_string(),
            description: self.description.clone(),
            image: self.image.clone(),
            category: self.category.clone(),
            link: self.demolink.clone(),
        }
    }
}
