// handlers/pages.rs - GET /login, GET /portal/*
//
// Static shells; the browser client signs in against the hosted platform and
// talks to /api/* with the resulting session.

use axum::response::Html;

const LOGIN_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Sign in</title></head>
<body>
  <main>
    <h1>Sign in</h1>
    <p>Sign in with your organization account to manage AI system assessments.</p>
    <p>Sign-in happens in the platform client; once it sets your session cookie,
      continue to the <a href="/portal">governance portal</a>.</p>
  </main>
</body>
</html>
"#;

const PORTAL_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Governance portal</title></head>
<body>
  <main>
    <h1>Governance portal</h1>
    <nav>
      <a href="/portal/orgs">Organizations</a>
      <a href="/portal/systems">AI systems</a>
      <a href="/portal/assessments">Assessments</a>
    </nav>
    <div id="app"></div>
  </main>
</body>
</html>
"#;

pub async fn login() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

pub async fn portal() -> Html<&'static str> {
    Html(PORTAL_PAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn login_page_posts_nowhere() {
        let Html(page) = login().await;
        assert!(!page.contains("<form"));
        assert!(page.contains(r#"href="/portal""#));
    }
}
