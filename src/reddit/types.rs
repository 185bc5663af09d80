use serde::Deserialize;
use serde_json::Value;

/// Reddit's `Listing` envelope: a page of items plus the cursor for the next
/// page. Item payloads stay untyped; the assembler applies the field mapping.
#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingData {
    pub after: Option<String>,
    #[serde(default)]
    pub children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
pub struct Thing {
    pub data: Value,
}

/// Outcome of a token grant (authorization code or password flow).
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: u64,
}

/// Script-app credentials for the session-less variant.
#[derive(Debug, Clone, Deserialize)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_listing_deserializes_reddit_shape() {
        let raw = json!({
            "kind": "Listing",
            "data": {
                "after": "t3_abc",
                "children": [
                    {"kind": "t3", "data": {"title": "hello", "score": 5}},
                    {"kind": "t3", "data": {"title": "world"}}
                ]
            }
        });

        let listing: Listing = serde_json::from_value(raw).unwrap();
        assert_eq!(listing.data.after.as_deref(), Some("t3_abc"));
        assert_eq!(listing.data.children.len(), 2);
        assert_eq!(listing.data.children[0].data["title"], "hello");
    }

    #[test]
    fn test_listing_tolerates_null_cursor_and_missing_children() {
        let raw = json!({"kind": "Listing", "data": {"after": null}});
        let listing: Listing = serde_json::from_value(raw).unwrap();
        assert!(listing.data.after.is_none());
        assert!(listing.data.children.is_empty());
    }
}
