//! Session identity types.
//!
//! There is no server-side session; the logged-in user exists only in the
//! client's session store and is a UI hint, not an authorization boundary.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    pub email: String,
    pub is_logged_in: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_uses_wire_names() {
        let user = User {
            name: "jane".to_string(),
            email: "jane@example.com".to_string(),
            is_logged_in: true,
        };

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["isLoggedIn"], true);
    }
}
