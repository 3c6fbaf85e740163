// `/webgui` — spec.md §4.1, §6.1: static file serving from a configured
// web root, with `__APP_NAME__`/`__APP_VERSION__`/`__COMMAND_LIST__`/
// `__DATA_LIST__` template placeholders substituted into the index page
// (supplemented from `karen/brain.py`'s `processFileRequest`, which did
// the same substitution against a bundled template).

use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use std::sync::Arc;

use crate::brain::Brain;

const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><title>__APP_NAME__ v__APP_VERSION__</title></head>
<body>
<h1>__APP_NAME__</h1>
<p>Version: __APP_VERSION__</p>
<h2>Commands</h2>
<ul>__COMMAND_LIST__</ul>
<h2>Data types</h2>
<ul>__DATA_LIST__</ul>
</body>
</html>
"#;

fn render_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("<li>{item}</li>"))
        .collect::<Vec<_>>()
        .join("")
}

pub async fn handle_index(State(brain): State<Arc<Brain>>) -> Response {
    let template = match &brain.webgui_root {
        Some(root) => tokio::fs::read_to_string(root.join("index.html"))
            .await
            .unwrap_or_else(|_| DEFAULT_TEMPLATE.to_string()),
        None => DEFAULT_TEMPLATE.to_string(),
    };

    let html = template
        .replace("__APP_NAME__", "Karen")
        .replace("__APP_VERSION__", env!("CARGO_PKG_VERSION"))
        .replace("__COMMAND_LIST__", &render_list(&brain.commands))
        .replace("__DATA_LIST__", &render_list(&brain.data_types));

    Html(html).into_response()
}
