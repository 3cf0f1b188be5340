//! UI Routes - prediction form page
//!
//! Vanilla HTML/JS, no frameworks. The page posts the raw field values to
//! `/predict` and renders whatever `/events` reports. Drawing the chart is
//! the chart widget's business; the page lists the points it would receive.

use axum::response::{Html, IntoResponse};
use axum::{routing::get, Router};

use crate::AppState;

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new().route("/", get(root_page))
}

/// GET /
///
/// Prediction form with result panel
pub async fn root_page() -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>House Price Prediction</title>
    <style>
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background-color: #1a1a1a;
            color: #e0e0e0;
            max-width: 720px;
            margin: 0 auto;
            padding: 20px;
        }}
        h1 {{ color: #4a9eff; font-size: 26px; }}
        label {{ display: block; margin-top: 12px; }}
        input {{ padding: 6px; width: 200px; }}
        button {{ margin-top: 16px; padding: 8px 20px; }}
        .error {{ color: #ff6b6b; }}
        .price {{ font-size: 22px; color: #7bd88f; }}
        table {{ margin-top: 12px; border-collapse: collapse; }}
        td, th {{ padding: 4px 12px; border-bottom: 1px solid #3a3a3a; text-align: right; }}
        tr.highlight {{ color: #ffd166; }}
        .version {{ color: #888; font-size: 12px; }}
    </style>
</head>
<body>
    <h1>House Price Prediction</h1>
    <div class="version">v{version}</div>
    <form id="predict-form">
        <label>Square footage
            <input id="square_footage" name="square_footage" type="number" step="any" required>
        </label>
        <label>Bedrooms
            <input id="bedrooms" name="bedrooms" type="number" step="any" required>
        </label>
        <button id="submit" type="submit">Predict Price</button>
    </form>
    <div id="result"></div>
    <script>
        const form = document.getElementById('predict-form');
        const button = document.getElementById('submit');
        const result = document.getElementById('result');

        function showError(message) {{
            result.innerHTML = '<p class="error"></p>';
            result.firstChild.textContent = message;
        }}

        form.addEventListener('submit', async (event) => {{
            event.preventDefault();
            const response = await fetch('/predict', {{
                method: 'POST',
                headers: {{ 'Content-Type': 'application/json' }},
                body: JSON.stringify({{
                    square_footage: document.getElementById('square_footage').value,
                    bedrooms: document.getElementById('bedrooms').value,
                }}),
            }});
            if (!response.ok) {{
                const body = await response.json().catch(() => null);
                showError(body && body.error ? body.error.message : response.statusText);
            }}
        }});

        function render(snapshot) {{
            button.disabled = snapshot.state === 'loading';
            button.textContent = snapshot.state === 'loading' ? 'Predicting...' : 'Predict Price';

            if (snapshot.state === 'failure') {{
                showError(snapshot.message);
            }} else if (snapshot.state === 'success') {{
                const rows = snapshot.chart.reference.points
                    .map(p => `<tr><td>${{p.x}}</td><td>${{p.y.toFixed(2)}}</td></tr>`)
                    .join('');
                const mine = snapshot.chart.highlighted.points
                    .map(p => `<tr class="highlight"><td>${{p.x}}</td><td>${{p.y.toFixed(2)}}</td></tr>`)
                    .join('');
                result.innerHTML =
                    `<p class="price">Predicted price: $${{snapshot.price.toFixed(2)}}</p>` +
                    `<table><tr><th>Sq. ft.</th><th>${{snapshot.chart.reference.label}}</th></tr>${{rows}}` +
                    `<tr><th></th><th>${{snapshot.chart.highlighted.label}}</th></tr>${{mine}}</table>`;
            }} else {{
                result.innerHTML = '';
            }}
        }}

        const events = new EventSource('/events');
        events.addEventListener('state', (event) => render(JSON.parse(event.data)));
    </script>
</body>
</html>
"#
    );

    Html(html)
}
