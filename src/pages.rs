//! Server-rendered HTML pages.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::db::models::user::User;

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{}</title>
</head>
<body>
{}
</body>
</html>"#,
        encode_text(title),
        body
    )
}

fn render_hidden_input(name: &str, value: &str) -> String {
    format!(
        "<input type=\"hidden\" name=\"{}\" value=\"{}\" />",
        encode_double_quoted_attribute(name),
        encode_double_quoted_attribute(value)
    )
}

fn render_error(error: Option<&str>) -> String {
    error
        .map(|msg| format!("  <p class=\"error\">{}</p>\n", encode_text(msg)))
        .unwrap_or_default()
}

fn render_next(next: Option<&str>) -> String {
    next.map(|n| render_hidden_input("next", n)).unwrap_or_default()
}

/// Landing page. Anonymous visitors get the sign-in links,
/// signed-in users their email and a logout button.
pub fn home(user: Option<&User>) -> String {
    let account = match user {
        Some(user) => format!(
            r#"  <p>Signed in as <strong>{}</strong></p>
  <form method="post" action="/accounts/logout/">
    <button type="submit">Logout</button>
  </form>"#,
            encode_text(&user.to_string())
        ),
        None => r#"  <p>Sign in with Google or email to get started.</p>
  <p>
    <a href="/accounts/login/">Login</a>
    <a href="/accounts/signup/">Sign Up</a>
    <a href="/accounts/google/login/">Sign in with Google</a>
  </p>"#
            .to_string(),
    };

    let body = format!(
        r#"  <h1>Welcome to Your Web App Template</h1>
{account}
  <h2>API</h2>
  <ul>
    <li><a href="/api/example/">/api/example/</a> (public)</li>
    <li><a href="/api/protected/">/api/protected/</a> (login required)</li>
  </ul>
  <footer>webapp-template {}</footer>"#,
        env!("CARGO_PKG_VERSION")
    );

    layout("Web App Template", &body)
}

pub fn login_form(next: Option<&str>, login: &str, error: Option<&str>) -> String {
    let body = format!(
        r#"  <h1>Sign In</h1>
{}  <form method="post" action="/accounts/login/">
    {}
    <label>Username or email <input type="text" name="login" value="{}" required /></label>
    <label>Password <input type="password" name="password" required /></label>
    <button type="submit">Sign In</button>
  </form>
  <p><a href="/accounts/google/login/">Sign in with Google</a></p>
  <p>No account yet? <a href="/accounts/signup/">Sign Up</a></p>"#,
        render_error(error),
        render_next(next),
        encode_double_quoted_attribute(login)
    );

    layout("Sign In", &body)
}

pub fn signup_form(next: Option<&str>, username: &str, email: &str, error: Option<&str>) -> String {
    let body = format!(
        r#"  <h1>Sign Up</h1>
{}  <form method="post" action="/accounts/signup/">
    {}
    <label>Username <input type="text" name="username" value="{}" required /></label>
    <label>Email <input type="email" name="email" value="{}" required /></label>
    <label>Password <input type="password" name="password1" required /></label>
    <label>Password (again) <input type="password" name="password2" required /></label>
    <button type="submit">Sign Up</button>
  </form>
  <p>Already have an account? <a href="/accounts/login/">Sign In</a></p>"#,
        render_error(error),
        render_next(next),
        encode_double_quoted_attribute(username),
        encode_double_quoted_attribute(email)
    );

    layout("Sign Up", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> User {
        User {
            id: 7,
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: None,
            is_superuser: false,
            is_staff: false,
            is_active: true,
            date_joined: Utc::now().naive_utc(),
            last_login: None,
        }
    }

    #[test]
    fn anonymous_home_links_to_login_and_signup() {
        let html = home(None);
        assert!(html.contains("Welcome to Your Web App Template"));
        assert!(html.contains("Login"));
        assert!(html.contains("Sign Up"));
        assert!(!html.contains("Logout"));
    }

    #[test]
    fn signed_in_home_shows_email_and_logout() {
        let html = home(Some(&user()));
        assert!(html.contains("ada@example.com"));
        assert!(html.contains("Logout"));
        assert!(!html.contains("Sign Up"));
    }

    #[test]
    fn forms_escape_user_input() {
        let html = login_form(Some("/x\"y"), "<script>", Some("Bad <b>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Bad &lt;b&gt;"));
        assert!(html.contains("value=\"/x&quot;y\""));
    }

    #[test]
    fn signup_form_keeps_entered_values() {
        let html = signup_form(None, "ada", "ada@example.com", None);
        assert!(html.contains("value=\"ada\""));
        assert!(html.contains("value=\"ada@example.com\""));
        assert!(!html.contains("name=\"next\""));
    }
}
