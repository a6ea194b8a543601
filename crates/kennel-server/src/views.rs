use std::borrow::Cow;
use std::path::{Path, PathBuf};

use kennel_core::Dog;
use minijinja::{context, Environment};
use serde::Serialize;

use crate::error::Result;

/// Bundled copy of the index view.
pub const INDEX_TEMPLATE: &str = include_str!("../views/index.html");

/// The `.html` suffix turns on minijinja's HTML auto-escaping.
const INDEX_NAME: &str = "index.html";

/// Where the index template comes from.
#[derive(Debug, Clone, Default)]
pub struct Views {
    reload_dir: Option<PathBuf>,
}

impl Views {
    /// Always serve the template compiled into the binary.
    pub fn bundled() -> Self {
        Self { reload_dir: None }
    }

    /// Re-read `<dir>/index.html` on every render.
    pub fn live(dir: impl Into<PathBuf>) -> Self {
        Self {
            reload_dir: Some(dir.into()),
        }
    }

    pub fn reload_dir(&self) -> Option<&Path> {
        self.reload_dir.as_deref()
    }

    pub async fn index_template(&self) -> Result<Cow<'static, str>> {
        match &self.reload_dir {
            Some(dir) => {
                let path = dir.join(INDEX_NAME);
                tracing::debug!(path = %path.display(), "reloading index template");
                Ok(Cow::Owned(tokio::fs::read_to_string(&path).await?))
            }
            None => Ok(Cow::Borrowed(INDEX_TEMPLATE)),
        }
    }
}

/// Template-facing view of a dog. `NULL` columns are already blanked.
#[derive(Debug, Serialize)]
struct DogRow<'a> {
    id: Option<i64>,
    name: &'a str,
    breed: &'a str,
    age: String,
    good_boy: &'static str,
}

impl<'a> From<&'a Dog> for DogRow<'a> {
    fn from(dog: &'a Dog) -> Self {
        Self {
            id: dog.id,
            name: dog.display_name(),
            breed: dog.display_breed(),
            age: dog.display_age(),
            good_boy: dog.display_good_boy(),
        }
    }
}

/// Render the index template over `dogs`.
pub fn render_index(template: &str, dogs: &[Dog]) -> Result<String> {
    let mut env = Environment::new();
    env.add_template(INDEX_NAME, template)?;

    let rows: Vec<DogRow<'_>> = dogs.iter().map(DogRow::from).collect();
    let html = env
        .get_template(INDEX_NAME)?
        .render(context! { dogs => rows })?;
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty() {
        let html = render_index(INDEX_TEMPLATE, &[]).unwrap();
        assert!(html.contains("No dogs yet."));
        assert!(!html.contains("class=\"dog\""));
    }

    #[test]
    fn test_render_one_dog() {
        let html = render_index(INDEX_TEMPLATE, &[Dog::new("Rex", "Lab", 3, true)]).unwrap();
        assert!(html.contains("<span class=\"name\">Rex</span>"));
        assert!(html.contains("<span class=\"breed\">Lab</span>"));
        assert!(html.contains("<span class=\"age\">3</span>"));
        assert!(html.contains("<span class=\"good-boy\">yes</span>"));
        assert!(!html.contains("No dogs yet."));
    }

    #[test]
    fn test_render_null_columns_blank() {
        let dog = Dog {
            id: Some(1),
            name: Some("Ghost".to_string()),
            breed: None,
            age: None,
            is_good_boy: None,
        };
        let html = render_index(INDEX_TEMPLATE, &[dog]).unwrap();
        assert!(html.contains("<span class=\"breed\"></span>"));
        assert!(html.contains("<span class=\"age\"></span>"));
        assert!(!html.contains("none"));
    }

    #[test]
    fn test_render_escapes_text() {
        let html = render_index(
            INDEX_TEMPLATE,
            &[Dog::new("<script>alert(1)</script>", "A & B", 1, false)],
        )
        .unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("A &amp; B"));
    }

    #[test]
    fn test_render_custom_template() {
        let html = render_index(
            "{% for dog in dogs %}[{{ dog.name }}]{% endfor %}",
            &[Dog::new("Rex", "Lab", 3, true), Dog::new("Fido", "Pug", 2, false)],
        )
        .unwrap();
        assert_eq!(html, "[Rex][Fido]");
    }

    #[test]
    fn test_render_syntax_error() {
        assert!(render_index("{% for dog in %}", &[]).is_err());
    }

    #[tokio::test]
    async fn test_bundled_template() {
        let template = Views::bundled().index_template().await.unwrap();
        assert_eq!(template, INDEX_TEMPLATE);
    }

    #[tokio::test]
    async fn test_live_template_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<main>{{ dogs|length }}</main>").unwrap();

        let views = Views::live(dir.path());
        let template = views.index_template().await.unwrap();
        assert_eq!(template, "<main>{{ dogs|length }}</main>");
    }

    #[tokio::test]
    async fn test_live_template_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Views::live(dir.path()).index_template().await.is_err());
    }
}
