use axum::{response::Html, routing::get, Router};

pub fn router() -> Router {
    Router::new().route("/", get(index))
}

async fn index() -> Html<&'static str> {
    Html(r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Study Mode</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 0; color: #1d1d1f; display: flex; min-height: 100vh; }
    aside { width: 240px; padding: 1rem; background: #f5f7fa; border-right: 1px solid #e0e0e0; }
    aside h3 { color: #1E88E5; margin-top: 0; }
    aside button { width: 100%; padding: 0.5rem; }
    main { flex: 1; padding: 1rem 2rem; max-width: 900px; }
    header { text-align: center; }
    header h1 { color: #1E88E5; margin: 0.5rem 0 0; }
    header p { color: #607D8B; margin-top: 6px; }
    .banner { padding: 0.6rem 1rem; border-radius: 6px; margin: 0.5rem 0; display: none; }
    .banner.success { display: block; background: #e8f5e9; color: #2e7d32; }
    .banner.warning, .banner.error { display: block; background: #ffebee; color: #c62828; }
    .card { border: 1px solid #ddd; padding: 1rem; border-radius: 8px; margin-bottom: 1rem; }
    .msg { padding: 0.6rem 0.8rem; border-radius: 8px; margin: 0.4rem 0; white-space: pre-wrap; }
    .msg.user { background: #e3f2fd; }
    .msg.assistant { background: #f6f8fa; }
    form.ask { display: flex; gap: 0.5rem; }
    form.ask input { flex: 1; padding: 0.6rem; }
  </style>
</head>
<body>
  <aside>
    <h3>Controls</h3>
    <button id="resetBtn">Reset Chat</button>
    <p><label><input id="useDocument" type="checkbox" checked /> Use study material</label></p>
  </aside>
  <main>
    <header>
      <h1>Study Mode</h1>
      <p>Simple, smart, student-friendly</p>
    </header>
    <hr />
    <div id="configBanner" class="banner"></div>

    <div class="card">
      <label for="fileInput">Upload study material</label>
      <input id="fileInput" type="file" accept=".pdf,.docx,.txt,.md" />
      <div id="uploadBanner" class="banner"></div>
    </div>

    <div id="transcript"></div>
    <div id="chatBanner" class="banner"></div>

    <form class="ask" id="askForm">
      <input id="question" placeholder="Ask your study question..." autocomplete="off" />
      <button type="submit" id="askBtn">Send</button>
    </form>
  </main>

  <script>
    const transcript = document.getElementById('transcript');
    let sessionId = sessionStorage.getItem('studyModeSession');
    let messages = [];

    function showBanner(id, kind, text) {
      const el = document.getElementById(id);
      el.className = 'banner ' + (kind || '');
      el.textContent = text || '';
    }

    function render(next) {
      messages = next;
      transcript.innerHTML = '';
      for (const msg of messages) {
        const div = document.createElement('div');
        div.className = 'msg ' + msg.role;
        div.textContent = (msg.role === 'user' ? '\u{1F464} ' : '\u{1F916} ') + msg.content;
        transcript.appendChild(div);
      }
    }

    async function ensureSession() {
      if (sessionId) {
        const res = await fetch(`/api/sessions/${sessionId}`);
        if (res.ok) {
          render((await res.json()).messages);
          return;
        }
      }
      const res = await fetch('/api/sessions', { method: 'POST' });
      sessionId = (await res.json()).session_id;
      sessionStorage.setItem('studyModeSession', sessionId);
      render([]);
    }

    async function checkHealth() {
      const health = await (await fetch('/api/health')).json();
      if (!health.llm_configured) {
        showBanner('configBanner', 'error', health.configuration_error);
        document.getElementById('askBtn').disabled = true;
      }
    }

    document.getElementById('fileInput').addEventListener('change', async (event) => {
      const file = event.target.files[0];
      if (!file) return;
      const form = new FormData();
      form.append('file', file);
      const res = await fetch(`/api/sessions/${sessionId}/document`, { method: 'POST', body: form });
      const json = await res.json();
      showBanner('uploadBanner', res.ok ? json.status : 'error', res.ok ? json.message : json.details);
    });

    document.getElementById('askForm').addEventListener('submit', async (event) => {
      event.preventDefault();
      const input = document.getElementById('question');
      const question = input.value.trim();
      if (!question) return;
      input.value = '';
      showBanner('chatBanner');
      render(messages.concat([{ role: 'user', content: question }]));
      const res = await fetch(`/api/sessions/${sessionId}/messages`, {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({
          question,
          use_document: document.getElementById('useDocument').checked,
        }),
      });
      const json = await res.json();
      if (!res.ok) {
        showBanner('chatBanner', 'error', json.details);
        return;
      }
      render(json.messages);
      if (json.status === 'error') {
        showBanner('chatBanner', 'error', json.error.message);
      }
    });

    document.getElementById('resetBtn').addEventListener('click', async () => {
      await fetch(`/api/sessions/${sessionId}/messages`, { method: 'DELETE' });
      showBanner('chatBanner');
      render([]);
    });

    ensureSession().then(checkHealth);
  </script>
</body>
</html>"#)
}
