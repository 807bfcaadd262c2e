//! Home page handler.

use axum::response::Html;

/// Display the home page.
pub async fn index() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Pawprint</title>
  <link rel="stylesheet" href="/static/style.css">
</head>
<body>
  <h1>Pawprint</h1>
  <p>Everything your pet needs, delivered.</p>
  <nav>
    <a href="/auth">Sign in</a>
    <a href="/personal/profile">My profile</a>
  </nav>
</body>
</html>"#,
    )
}
