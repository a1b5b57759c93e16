/// Replace `${ENV_VAR}` and `${ENV_VAR:-fallback}` placeholders.
///
/// Unresolvable variables without a fallback are left as-is so the config
/// parser reports them in context.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find("${") {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 2..];
        let Some(close) = after.find('}') else {
            // Unterminated placeholder: keep the remainder verbatim.
            out.push_str(&rest[pos..]);
            return out;
        };

        let body = &after[..close];
        let (name, fallback) = match body.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (body, None),
        };

        match (name.is_empty(), lookup(name), fallback) {
            (false, Some(value), _) => out.push_str(&value),
            (false, None, Some(fallback)) => out.push_str(fallback),
            _ => {
                out.push_str("${");
                out.push_str(body);
                out.push('}');
            },
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "TOOBY_TEST_TOKEN" => Some("oauth:abc123".to_string()),
            _ => None,
        }
    }

    #[test]
    fn substitutes_known_var() {
        assert_eq!(
            substitute_env_with("oauth_token = \"${TOOBY_TEST_TOKEN}\"", lookup),
            "oauth_token = \"oauth:abc123\""
        );
    }

    #[test]
    fn leaves_unknown_var() {
        assert_eq!(
            substitute_env_with("${TOOBY_NOT_SET}", lookup),
            "${TOOBY_NOT_SET}"
        );
    }

    #[test]
    fn uses_fallback_for_unknown_var() {
        assert_eq!(
            substitute_env_with("botnick = \"${TOOBY_NOT_SET:-toobybot}\"", lookup),
            "botnick = \"toobybot\""
        );
    }

    #[test]
    fn known_var_wins_over_fallback() {
        assert_eq!(
            substitute_env_with("${TOOBY_TEST_TOKEN:-nope}", lookup),
            "oauth:abc123"
        );
    }

    #[test]
    fn unterminated_placeholder_is_literal() {
        assert_eq!(substitute_env_with("a ${OPEN", lookup), "a ${OPEN");
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(substitute_env("plain text"), "plain text");
    }
}
