//! Ordered user collection with a single-selection toggle
//!
//! The roster is the one owner of in-memory user state; the UI reads it and
//! persists a snapshot after every mutation of the collection.

use uuid::Uuid;

use crate::user::User;

#[derive(Debug, Default)]
pub struct Roster {
    users: Vec<User>,
    selected: Option<Uuid>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a loaded collection. Selection starts empty.
    pub fn from_users(users: Vec<User>) -> Self {
        Self {
            users,
            selected: None,
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn selected(&self) -> Option<Uuid> {
        self.selected
    }

    pub fn is_selected(&self, id: Uuid) -> bool {
        self.selected == Some(id)
    }

    pub fn append(&mut self, user: User) {
        self.users.push(user);
    }

    /// Remove the user with `id`. No-op (returns `false`) if absent.
    /// Removing the selected user clears the selection.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.users.len();
        self.users.retain(|u| u.id != id);
        let removed = self.users.len() != before;
        if removed && self.selected == Some(id) {
            self.selected = None;
        }
        removed
    }

    /// Select `id`, or clear the selection if `id` is already selected.
    pub fn toggle_select(&mut self, id: Uuid) {
        if self.selected == Some(id) {
            self.selected = None;
        } else {
            self.selected = Some(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster_of(names: &[&str]) -> Roster {
        Roster::from_users(
            names
                .iter()
                .map(|n| User::new(*n, "Eng", "Paris"))
                .collect(),
        )
    }

    #[test]
    fn test_toggle_select_cycles() {
        let mut roster = roster_of(&["Ana", "Ben"]);
        let a = roster.users()[0].id;
        let b = roster.users()[1].id;

        roster.toggle_select(a);
        assert_eq!(roster.selected(), Some(a));

        // Toggling the selected id clears it
        roster.toggle_select(a);
        assert_eq!(roster.selected(), None);

        // Selecting another id replaces the current selection
        roster.toggle_select(a);
        roster.toggle_select(b);
        assert_eq!(roster.selected(), Some(b));
    }

    #[test]
    fn test_remove_selected_clears_selection() {
        let mut roster = roster_of(&["Ana", "Ben"]);
        let a = roster.users()[0].id;
        roster.toggle_select(a);

        assert!(roster.remove(a));
        assert_eq!(roster.selected(), None);
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_remove_other_keeps_selection() {
        let mut roster = roster_of(&["Ana", "Ben"]);
        let a = roster.users()[0].id;
        let b = roster.users()[1].id;
        roster.toggle_select(a);

        assert!(roster.remove(b));
        assert_eq!(roster.selected(), Some(a));
    }

    #[test]
    fn test_remove_absent_id_is_a_noop() {
        let mut roster = roster_of(&["Ana"]);
        let a = roster.users()[0].id;
        roster.toggle_select(a);

        assert!(!roster.remove(Uuid::new_v4()));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.selected(), Some(a));
    }

    #[test]
    fn test_append_preserves_order() {
        let mut roster = Roster::new();
        roster.append(User::new("Ana", "Eng", "Paris"));
        roster.append(User::new("Ben", "Ops", "Lyon"));
        let names: Vec<_> = roster.users().iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["Ana", "Ben"]);
    }
}
