/// Message rendering for the notify command.
///
/// One private message per giver, naming only their own recipient. Delivery
/// (mailing the file, pasting it into a chat) is outside the tool; writing
/// the rendered text per giver is the hand-off boundary.
use std::path::Path;

use crate::bail;
use crate::roster::Member;

/// Template variables: $giver, $recipient, $hint, $wishlist.
pub const DEFAULT_TEMPLATE: &str = "\
Hello $giver!

You are the Secret Santa for: $recipient

Gift hint: $hint

Wishlist:
$wishlist

Keep it to yourself — nobody else knows who gives to whom.
";

/// Render one giver's message. Only the giver's own recipient is visible;
/// the rest of the pairing never reaches the template.
pub fn render_message(template: &str, giver: &Member, recipient: &Member) -> String {
    let hint = recipient.hint.as_deref().unwrap_or("(none given)");
    let wishlist = if recipient.wishlist.is_empty() {
        "(empty wishlist)".to_string()
    } else {
        recipient
            .wishlist
            .iter()
            .map(|item| format!("- {item}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    template
        .replace("$wishlist", &wishlist)
        .replace("$recipient", &recipient.name)
        .replace("$giver", &giver.name)
        .replace("$hint", hint)
}

/// Load a custom template file. Must mention $recipient, or every rendered
/// message would be useless.
pub fn load_template(path: &Path) -> String {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| bail(format!("Failed to read template {}: {e}", path.display())));
    if !content.contains("$recipient") {
        bail(format!(
            "Template {} does not contain $recipient",
            path.display()
        ));
    }
    content
}

/// File name for a giver's message: the name with anything outside
/// `[A-Za-z0-9._-]` replaced, plus the member id. The id keeps files apart
/// when two names sanitize to the same string (or are simply the same name,
/// which is legal — identity is by id), so no giver's message can overwrite
/// another's.
pub fn message_filename(giver: &Member) -> String {
    let cleaned: String = giver
        .name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.chars().all(|c| c == '_' || c == '.') {
        format!("member-{}.txt", giver.id)
    } else {
        format!("{cleaned}-{}.txt", giver.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: i64, name: &str) -> Member {
        Member {
            id,
            name: name.to_string(),
            email: None,
            wishlist: Vec::new(),
            hint: None,
            group: None,
            recipient: None,
        }
    }

    #[test]
    fn test_default_template_renders_all_parts() {
        let giver = member(1, "Alice");
        let mut recipient = member(2, "Bob");
        recipient.hint = Some("size M sweaters".to_string());
        recipient.wishlist = vec!["a kettle".to_string(), "wool socks".to_string()];

        let body = render_message(DEFAULT_TEMPLATE, &giver, &recipient);
        assert!(body.contains("Hello Alice!"));
        assert!(body.contains("Secret Santa for: Bob"));
        assert!(body.contains("Gift hint: size M sweaters"));
        assert!(body.contains("- a kettle\n- wool socks"));
        assert!(!body.contains('$'), "unreplaced variable in {body}");
    }

    #[test]
    fn test_missing_hint_and_wishlist_get_placeholders() {
        let body = render_message(DEFAULT_TEMPLATE, &member(1, "Alice"), &member(2, "Bob"));
        assert!(body.contains("Gift hint: (none given)"));
        assert!(body.contains("(empty wishlist)"));
    }

    #[test]
    fn test_message_names_only_the_givers_recipient() {
        // Render Alice's message in a three-person exchange; Carol must not
        // appear anywhere in it.
        let body = render_message(DEFAULT_TEMPLATE, &member(1, "Alice"), &member(2, "Bob"));
        assert!(body.contains("Bob"));
        assert!(!body.contains("Carol"));
    }

    #[test]
    fn test_filenames_are_sanitized() {
        assert_eq!(message_filename(&member(1, "Alice")), "Alice-1.txt");
        assert_eq!(
            message_filename(&member(2, "Bob the 2nd!")),
            "Bob_the_2nd_-2.txt"
        );
        assert_eq!(message_filename(&member(3, "???")), "member-3.txt");
    }

    #[test]
    fn test_givers_with_colliding_names_get_distinct_files() {
        // "Bob!" and "Bob?" both sanitize to "Bob_"; without the id one
        // giver's message would overwrite the other's on disk.
        let first = message_filename(&member(1, "Bob!"));
        let second = message_filename(&member(2, "Bob?"));
        assert_ne!(first, second);

        // Same for two members who genuinely share a name.
        assert_ne!(
            message_filename(&member(4, "Alex")),
            message_filename(&member(5, "Alex"))
        );

        // Unusable names fall back to the id, distinct by the same logic.
        assert_ne!(
            message_filename(&member(6, "???")),
            message_filename(&member(7, "!!!"))
        );
    }
}
