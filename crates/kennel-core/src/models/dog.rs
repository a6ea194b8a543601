use serde::{Deserialize, Serialize};

/// One row of the `dogs` table. Every column besides `id` is nullable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dog {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub breed: Option<String>,
    pub age: Option<i64>,
    pub is_good_boy: Option<bool>,
}

impl Dog {
    pub fn new(name: &str, breed: &str, age: i64, is_good_boy: bool) -> Self {
        Self {
            id: None,
            name: Some(name.to_string()),
            breed: Some(breed.to_string()),
            age: Some(age),
            is_good_boy: Some(is_good_boy),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn display_breed(&self) -> &str {
        self.breed.as_deref().unwrap_or("")
    }

    pub fn display_age(&self) -> String {
        self.age.map(|a| a.to_string()).unwrap_or_default()
    }

    pub fn display_good_boy(&self) -> &'static str {
        match self.is_good_boy {
            Some(true) => "yes",
            Some(false) => "no",
            None => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_unsaved() {
        let dog = Dog::new("Rex", "Lab", 3, true);
        assert_eq!(dog.id, None);
        assert_eq!(dog.display_name(), "Rex");
        assert_eq!(dog.display_good_boy(), "yes");
    }

    #[test]
    fn test_display_null_columns() {
        let dog = Dog {
            id: Some(1),
            name: None,
            breed: None,
            age: None,
            is_good_boy: None,
        };
        assert_eq!(dog.display_name(), "");
        assert_eq!(dog.display_breed(), "");
        assert_eq!(dog.display_age(), "");
        assert_eq!(dog.display_good_boy(), "");
    }
}
