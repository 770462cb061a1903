use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Icon reference stored with every user. A fixed value for now.
pub const DEFAULT_AVATAR: &str = "person.crop.circle.fill";

/// A single entry in the roster.
///
/// Never mutated after creation; the id is the only stable reference used
/// for selection and deletion.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub title: String,
    pub localisation: String,
    #[serde(rename = "avatarSystemImage")]
    pub avatar_system_image: String,
}

impl User {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        localisation: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            title: title.into(),
            localisation: localisation.into(),
            avatar_system_image: DEFAULT_AVATAR.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_users_get_distinct_ids() {
        let a = User::new("Ana", "Eng", "Paris");
        let b = User::new("Ana", "Eng", "Paris");
        assert_ne!(a.id, b.id);
        assert_ne!(a, b);
    }

    #[test]
    fn test_equality_is_structural() {
        let a = User::new("Ana", "Eng", "Paris");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn test_serialized_field_names_match_the_file_format() {
        let user = User::new("Ana", "Eng", "Paris");
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains(r#""avatarSystemImage":"person.crop.circle.fill""#));
        assert!(json.contains(r#""localisation":"Paris""#));
        assert!(json.contains(&format!(r#""id":"{}""#, user.id)));
    }
}
