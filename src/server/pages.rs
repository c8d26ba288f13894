//! Minimal inline HTML shells for the GUI. Display glue only; nothing here
//! carries invariants.

/// Index page: input area, edit instruction, and the htmx form wired to
/// `/aidiff/`.
pub const INDEX_PAGE: &str = r##"<!DOCTYPE html>
<html>
<head>
  <title>AgentSmith</title>
  <script src="https://unpkg.com/htmx.org@1.9.12"></script>
  <link rel="stylesheet" href="/static/style.css">
</head>
<body>
  <h1>AgentSmith</h1>
  <form hx-post="/aidiff/" hx-target="#aitext">
    <textarea name="inputdata" rows="12" cols="80" placeholder="Paste text to edit"></textarea><br>
    <input name="prompttext" size="80" placeholder="Describe the edit">
    <button type="submit">Edit</button>
    <button hx-get="/delete/" hx-target="#aitext">Clear</button>
  </form>
  <div id="aitext"></div>
</body>
</html>
"##;

/// Authentication challenge page.
pub const AUTH_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>AgentSmith - Sign in</title>
  <script src="https://unpkg.com/htmx.org@1.9.12"></script>
</head>
<body>
  <h1>Authorization required</h1>
  <form hx-post="/auth/">
    <input type="password" name="auth" placeholder="Shared secret">
    <button type="submit">Submit</button>
  </form>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_page_is_complete_and_targets_the_output_div() {
        // The htmx target selector contains `"#`, which must not terminate
        // the literal early.
        assert!(INDEX_PAGE.contains(r##"hx-target="#aitext""##));
        assert!(INDEX_PAGE.trim_end().ends_with("</html>"));
    }

    #[test]
    fn auth_page_posts_the_secret_field() {
        assert!(AUTH_PAGE.contains(r#"hx-post="/auth/""#));
        assert!(AUTH_PAGE.contains(r#"name="auth""#));
    }
}
