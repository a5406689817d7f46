use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub fn validate_name(name: &str) -> bool {
    let len = name.chars().count();
    (2..=50).contains(&len)
}

pub fn validate_description(description: &str) -> bool {
    description.chars().count() <= 500
}
