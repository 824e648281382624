use serde_json::Value;
use vitrine_axum::RestOptions;
use vitrine_core::{ServiceCapabilities, ServiceMethodKind};

pub const COLLECTION: &str = "contacts";
pub const NOTIFY_SUBJECT: &str = "New contact request";

pub fn capabilities() -> ServiceCapabilities {
    ServiceCapabilities::from_methods(vec![
        ServiceMethodKind::Find,
        ServiceMethodKind::Create,
        ServiceMethodKind::Update,
        ServiceMethodKind::Remove,
    ])
}

pub fn rest_options() -> RestOptions {
    RestOptions::new()
        .created_text(201, "Contact saved successfully")
        .removed_text("Contact deleted")
        .with_content_range()
}

/// The six contact fields as a human-readable message body.
pub fn notification_body(record: &Value) -> String {
    let field = |key: &str| {
        record
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or("-")
            .to_string()
    };

    format!(
        "Name: {} {}\nEmail: {}\nCountry: {}\nProblems: {}\nAbout: {}",
        field("firstName"),
        field("lastName"),
        field("email"),
        field("country"),
        field("problems"),
        field("about"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn notification_body_lists_all_six_fields() {
        let body = notification_body(&json!({
            "firstName": "A", "lastName": "B", "email": "a@b.com",
            "country": "X", "problems": "p", "about": "a",
        }));
        assert_eq!(
            body,
            "Name: A B\nEmail: a@b.com\nCountry: X\nProblems: p\nAbout: a"
        );
    }

    #[test]
    fn notification_body_dashes_missing_fields() {
        let body = notification_body(&json!({"email": "a@b.com"}));
        assert!(body.contains("Name: - -"));
        assert!(body.contains("Country: -"));
    }
}
