//! Full-page document.

use super::gallery::gallery;
use super::transcript::{composer, message, typing_indicator};
use super::escape;
use crate::config::AssetsConfig;
use crate::widget::{ChatWidget, Phase};

/// Render the whole page for a widget session.
#[must_use]
pub fn page(widget: &ChatWidget, session_id: &str, assets: &AssetsConfig) -> String {
    let mut transcript: String = widget.transcript().iter().map(message).collect();
    if let Phase::AwaitingResponse { seq } = widget.phase() {
        transcript.push_str(&typing_indicator(session_id, seq));
    }

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="AI coaching for educators">
    <title>AI Teaching Coach</title>
    <script src="{htmx_src}"></script>
    <link rel="stylesheet" href="/static/app.css">
</head>
<body>
    <header class="site-header">
        <a href="/" class="brand">AI Teaching Coach</a>
        <nav>
            <a href="#chat">Chat</a>
            <a href="#resources">Resources</a>
        </nav>
    </header>

    <section id="hero" class="hero">
        <h1>Empowering Educators with AI</h1>
        <p>Ask about teaching strategies, classroom tools or professional workshops and get tailored recommendations.</p>
        <a id="start-coaching" href="#chat" class="btn btn-primary">Start Coaching</a>
    </section>

    <section id="chat" class="chat-section">
        <div class="chat-container" data-session-id="{session}">
            <div id="chat-messages" class="chat-messages" aria-live="polite">{transcript}</div>
            {composer}
        </div>
    </section>

    <section id="resources" class="resources-section">
        <h2>Recommended Resources</h2>
        {gallery}
    </section>
</body>
</html>"##,
        htmx_src = escape(&assets.htmx_src),
        session = escape(session_id),
        composer = composer(session_id, !widget.is_awaiting(), false),
        gallery = gallery(widget.resources(), false),
    )
}
