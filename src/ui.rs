use crate::charts::ChartKind;
use crate::theme::Theme;

pub fn render_index(theme: Theme) -> String {
    let tabs: String = ChartKind::ALL
        .iter()
        .map(|kind| {
            let active = if *kind == ChartKind::Dashboard { " active" } else { "" };
            format!(
                r#"<button class="tab{active}" type="button" data-chart="{}" role="tab">{}</button>"#,
                kind.key(),
                kind.title()
            )
        })
        .collect::<Vec<_>>()
        .join("\n          ");

    INDEX_HTML
        .replace("{{THEME}}", theme.css_class())
        .replace("{{TABS}}", &tabs)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en" class="{{THEME}}">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>News Dashboard</title>
  <style>
    :root {
      --bg-1: #eff6ff;
      --bg-2: #e0e7ff;
      --ink: #111827;
      --muted: #6b7280;
      --accent: #2563eb;
      --accent-2: #16a34a;
      --card: #ffffff;
      --border: #e5e7eb;
      --grid: rgba(0, 0, 0, 0.1);
      --shadow: 0 20px 40px rgba(30, 41, 59, 0.12);
    }

    html.dark {
      --bg-1: #111827;
      --bg-2: #1f2937;
      --ink: #f9fafb;
      --muted: #9ca3af;
      --card: #1f2937;
      --border: #374151;
      --grid: rgba(255, 255, 255, 0.1);
      --shadow: 0 20px 40px rgba(0, 0, 0, 0.4);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), var(--bg-2));
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: 24px 16px 48px;
    }

    .app {
      width: min(1200px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.8rem, 4vw, 2.5rem);
    }

    .subtitle {
      margin: 4px 0 0;
      color: var(--muted);
    }

    .card {
      background: var(--card);
      border: 1px solid var(--border);
      border-radius: 16px;
      box-shadow: var(--shadow);
      padding: 20px;
    }

    .banner {
      display: none;
      background: #fee2e2;
      border: 1px solid #f87171;
      color: #b91c1c;
      border-radius: 12px;
      padding: 12px 16px;
    }

    .banner.visible {
      display: block;
    }

    .loading {
      text-align: center;
      color: var(--muted);
      padding: 48px 0;
    }

    .tabs {
      display: flex;
      flex-wrap: wrap;
      justify-content: center;
      gap: 8px;
      margin-top: 16px;
    }

    button,
    .button {
      appearance: none;
      border: 1px solid var(--border);
      border-radius: 10px;
      background: var(--card);
      color: var(--ink);
      padding: 8px 14px;
      font-size: 0.9rem;
      font-weight: 600;
      cursor: pointer;
      text-decoration: none;
    }

    .tab.active {
      background: var(--accent);
      border-color: var(--accent);
      color: white;
    }

    .button.primary {
      background: var(--accent);
      border-color: var(--accent);
      color: white;
    }

    .button.green {
      background: var(--accent-2);
      border-color: var(--accent-2);
      color: white;
    }

    #chart {
      width: 100%;
      height: 360px;
      display: block;
    }

    .chart-label {
      fill: var(--muted);
      font-size: 11px;
    }

    .chart-grid {
      stroke: var(--grid);
    }

    .filters {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 12px;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.85rem;
      color: var(--muted);
    }

    input,
    select {
      padding: 8px 10px;
      border-radius: 8px;
      border: 1px solid var(--border);
      background: var(--card);
      color: var(--ink);
    }

    .count {
      text-align: center;
      color: var(--muted);
    }

    .count strong {
      color: var(--accent);
    }

    .articles {
      display: grid;
      grid-template-columns: repeat(auto-fill, minmax(300px, 1fr));
      gap: 18px;
    }

    .article h3 {
      margin: 0 0 8px;
    }

    .meta {
      font-size: 0.85rem;
      color: var(--muted);
      margin: 2px 0;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th,
    td {
      padding: 10px 12px;
      border-bottom: 1px solid var(--border);
      text-align: left;
    }

    td input {
      width: 100px;
    }

    .actions {
      display: flex;
      flex-wrap: wrap;
      justify-content: center;
      gap: 12px;
      margin-top: 16px;
    }

    .status {
      min-height: 1.2em;
      font-size: 0.9rem;
      color: var(--muted);
    }

    .status[data-type="error"] {
      color: #dc2626;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>News Dashboard</h1>
        <p class="subtitle">Stay informed with the latest news and insights</p>
      </div>
      <label>
        Theme
        <select id="theme-mode">
          <option value="light">Light</option>
          <option value="dark">Dark</option>
          <option value="system">System</option>
        </select>
      </label>
    </header>

    <div class="banner" id="banner" role="alert"></div>
    <div class="loading" id="loading">Loading news dashboard...</div>

    <section class="card" id="charts">
      <h2 id="chart-title">Analytics Overview</h2>
      <svg id="chart" viewBox="0 0 800 360" role="img" aria-label="Article chart"></svg>
      <div class="tabs" role="tablist">
          {{TABS}}
      </div>
    </section>

    <section class="card">
      <h3>Search &amp; Filter</h3>
      <div class="filters">
        <label>Author<select id="f-author"><option value="">All Authors</option></select></label>
        <label>From Date<input type="date" id="f-dateFrom" /></label>
        <label>To Date<input type="date" id="f-dateTo" /></label>
        <label>Source<select id="f-type"><option value="">All Sources</option></select></label>
        <label>Keyword<input type="text" id="f-keyword" placeholder="Search articles..." /></label>
      </div>
    </section>

    <p class="count">Found <strong id="count">0</strong> articles</p>
    <section class="articles" id="articles"></section>

    <section class="card">
      <h3>Payout Calculator</h3>
      <table>
        <thead>
          <tr><th>Author</th><th>Articles</th><th>Payout Rate</th><th>Total Payout</th></tr>
        </thead>
        <tbody id="payouts"></tbody>
      </table>
      <div class="status" id="status"></div>
      <div class="actions">
        <a class="button green" data-export="/export/payouts/pdf">Export PDF</a>
        <a class="button primary" data-export="/export/payouts/csv">Export CSV</a>
      </div>
    </section>

    <section class="actions">
      <a class="button green" data-export="/export/articles/pdf">Export PDF</a>
      <a class="button primary" data-export="/export/articles/csv">Export CSV</a>
    </section>
  </main>

  <script>
    const FIELDS = ['author', 'dateFrom', 'dateTo', 'type', 'keyword'];
    const chartEl = document.getElementById('chart');
    const statusEl = document.getElementById('status');
    const bannerEl = document.getElementById('banner');
    const loadingEl = document.getElementById('loading');
    const tabs = Array.from(document.querySelectorAll('.tab'));
    const themeSelect = document.getElementById('theme-mode');

    let activeChart = 'main';
    let optionsFilled = false;

    const esc = (value) =>
      String(value ?? '').replace(/[&<>"']/g, (c) => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' }[c]));

    const query = () => {
      const params = new URLSearchParams();
      FIELDS.forEach((field) => {
        const value = document.getElementById(`f-${field}`).value;
        if (value) params.set(field, value);
      });
      return params;
    };

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const getJson = async (url) => {
      const res = await fetch(url);
      const body = await res.json();
      if (!res.ok) throw new Error(body.error || 'Request failed');
      return body;
    };

    const fillOptions = (id, values) => {
      const select = document.getElementById(id);
      values.forEach((value) => {
        const option = document.createElement('option');
        option.value = value;
        option.textContent = value;
        select.appendChild(option);
      });
    };

    const renderArticles = (data) => {
      document.getElementById('count').textContent = data.total;
      document.getElementById('articles').innerHTML = data.articles
        .map((a) => `
          <article class="card article">
            <h3>${esc(a.title)}</h3>
            <p class="meta">${esc(a.author)}</p>
            <p class="meta">${a.published_at ? esc(new Date(a.published_at).toLocaleDateString()) : ''}</p>
            <p class="meta">${esc(a.source)}</p>
            <p>${esc(a.description || 'No description available.')}</p>
            ${a.content ? `<p class="meta">${esc(a.content)}</p>` : ''}
            ${a.url ? `<a class="button primary" href="${esc(a.url)}" target="_blank" rel="noopener noreferrer">Read Full Article</a>` : ''}
          </article>`)
        .join('');
    };

    const renderPayouts = (data) => {
      const rows = data.rows
        .map((row) => `
          <tr>
            <td>${esc(row.author)}</td>
            <td>${row.count}</td>
            <td><input type="number" min="0" step="any" value="${row.rate}" data-author="${esc(row.author)}" /></td>
            <td>$${row.total}</td>
          </tr>`)
        .join('');
      document.getElementById('payouts').innerHTML =
        rows + `<tr><td colspan="3"><strong>Total</strong></td><td><strong>$${data.total_payout}</strong></td></tr>`;
    };

    const W = 800;
    const H = 360;
    const PAD = 44;

    const axes = (max) => {
      let out = '';
      const top = max <= 0 ? 1 : max;
      for (let i = 0; i <= 4; i += 1) {
        const value = (top * i) / 4;
        const y = H - PAD - ((H - PAD * 2) * i) / 4;
        out += `<line class="chart-grid" x1="${PAD}" y1="${y}" x2="${W - PAD}" y2="${y}" />`;
        out += `<text class="chart-label" x="${PAD - 8}" y="${y + 4}" text-anchor="end">${Math.round(value * 10) / 10}</text>`;
      }
      return { out, scale: (v) => ((H - PAD * 2) * v) / top };
    };

    const bars = (labels, fulls, series, x0 = 0, width = W) => {
      const totals = labels.map((_, i) => series.reduce((sum, s) => sum + s.values[i], 0));
      const { out, scale } = axes(Math.max(0, ...totals));
      const slot = (width - PAD * 2) / Math.max(labels.length, 1);
      let svg = out;
      labels.forEach((label, i) => {
        let base = H - PAD;
        series.forEach((s) => {
          const h = scale(s.values[i]);
          base -= h;
          svg += `<rect x="${x0 + PAD + i * slot + slot * 0.15}" y="${base}" width="${slot * 0.7}" height="${h}" rx="6" fill="${s.colors ? s.colors[i] : s.color}"><title>${esc(fulls[i])}: ${s.values[i]}</title></rect>`;
        });
        svg += `<text class="chart-label" x="${x0 + PAD + i * slot + slot / 2}" y="${H - PAD + 16}" text-anchor="middle">${esc(label)}</text>`;
      });
      return svg;
    };

    const itemBars = (items) =>
      bars(items.map((i) => i.label), items.map((i) => i.full_label), [
        { values: items.map((i) => i.value), colors: items.map((i) => i.color) }
      ]);

    const arc = (cx, cy, r, inner, start, end) => {
      const large = end - start > Math.PI ? 1 : 0;
      const p = (rad, a) => `${cx + rad * Math.cos(a)} ${cy + rad * Math.sin(a)}`;
      if (end - start >= Math.PI * 2 - 1e-9) end = start + Math.PI * 2 - 1e-4;
      return inner > 0
        ? `M ${p(r, start)} A ${r} ${r} 0 ${large} 1 ${p(r, end)} L ${p(inner, end)} A ${inner} ${inner} 0 ${large} 0 ${p(inner, start)} Z`
        : `M ${cx} ${cy} L ${p(r, start)} A ${r} ${r} 0 ${large} 1 ${p(r, end)} Z`;
    };

    const slices = (items, { inner = 0, polar = false, cx = W / 2, cy = H / 2, r = 150 } = {}) => {
      const total = items.reduce((sum, i) => sum + i.value, 0);
      const max = Math.max(1, ...items.map((i) => i.value));
      let angle = -Math.PI / 2;
      return items
        .map((item) => {
          const sweep = polar ? (Math.PI * 2) / items.length : (Math.PI * 2 * item.value) / Math.max(total, 1);
          const radius = polar ? (r * item.value) / max : r;
          const path = arc(cx, cy, radius, inner, angle, angle + sweep);
          angle += sweep;
          return `<path d="${path}" fill="${item.color}" fill-opacity="0.8" stroke="var(--card)" stroke-width="2"><title>${esc(item.full_label)}: ${item.value}</title></path>`;
        })
        .join('');
    };

    const bubbles = (points, maxX, x0 = 0, width = W) => {
      const { out, scale } = axes(Math.max(0, ...points.map((p) => p.y)));
      const step = (width - PAD * 2) / Math.max(maxX, 1);
      return out + points
        .map((p) => `
          <circle cx="${x0 + PAD + p.x * step}" cy="${H - PAD - scale(p.y)}" r="${p.r}" fill="${p.color}" fill-opacity="0.75"><title>${esc(p.full_label)}: ${p.y} articles</title></circle>
          <text class="chart-label" x="${x0 + PAD + p.x * step}" y="${H - PAD + 16}" text-anchor="middle">${esc(p.label)}</text>`)
        .join('');
    };

    const timeline = (t) => {
      const { out, scale } = axes(Math.max(0, ...t.series.flatMap((s) => s.values)));
      const step = (W - PAD * 2) / Math.max(t.dates.length - 1, 1);
      let svg = out;
      t.series.forEach((s) => {
        const d = s.values.map((v, i) => `${i === 0 ? 'M' : 'L'} ${PAD + i * step} ${H - PAD - scale(v)}`).join(' ');
        svg += `<path d="${d}" fill="none" stroke="${s.color}" stroke-width="3"><title>${esc(s.full_label)}</title></path>`;
      });
      t.dates.forEach((date, i) => {
        svg += `<text class="chart-label" x="${PAD + i * step}" y="${H - PAD + 16}" text-anchor="middle">${esc(date)}</text>`;
      });
      return svg;
    };

    const renderChart = (chart) => {
      let svg = '';
      switch (chart.kind) {
        case 'main':
          svg = chart.timeline.dates.length > 1 ? timeline(chart.timeline) : itemBars(chart.bar);
          svg += slices(chart.pie, { cx: W - 90, cy: 80, r: 60 });
          break;
        case 'bar':
          svg = itemBars(chart.items);
          break;
        case 'stackedBar':
          svg = bars(chart.stacked.labels, chart.stacked.full_labels, chart.stacked.series);
          break;
        case 'pie':
          svg = slices(chart.items);
          break;
        case 'doughnut':
          svg = slices(chart.items, { inner: 80 });
          break;
        case 'polar':
          svg = slices(chart.items, { polar: true });
          break;
        case 'bubble':
          svg = bubbles(chart.points, chart.max_x);
          break;
        default:
          svg = '';
      }
      chartEl.innerHTML = svg || '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data yet</text>';
    };

    const loadChart = async () => {
      const params = query();
      params.set('chart', activeChart);
      renderChart(await getJson(`/api/charts?${params}`));
    };

    const loadPayouts = async () => renderPayouts(await getJson(`/api/payouts?${query()}`));

    const refresh = async () => {
      const data = await getJson(`/api/articles?${query()}`);
      if (data.status === 'loading') {
        setTimeout(() => refresh().catch((err) => setStatus(err.message, 'error')), 500);
        return;
      }
      loadingEl.style.display = 'none';
      if (data.status === 'error') {
        bannerEl.textContent = data.error;
        bannerEl.classList.add('visible');
      }
      if (!optionsFilled) {
        fillOptions('f-author', data.authors);
        fillOptions('f-type', data.sources);
        optionsFilled = true;
      }
      renderArticles(data);
      await Promise.all([loadChart(), loadPayouts()]);
    };

    const updateExportLinks = () => {
      document.querySelectorAll('[data-export]').forEach((link) => {
        link.href = `${link.dataset.export}?${query()}`;
      });
    };

    FIELDS.forEach((field) => {
      const el = document.getElementById(`f-${field}`);
      el.addEventListener(field === 'keyword' ? 'input' : 'change', () => {
        updateExportLinks();
        refresh().catch((err) => setStatus(err.message, 'error'));
      });
    });

    tabs.forEach((button) => {
      button.addEventListener('click', () => {
        activeChart = button.dataset.chart;
        tabs.forEach((b) => b.classList.toggle('active', b === button));
        document.getElementById('chart-title').textContent = button.textContent;
        loadChart().catch((err) => setStatus(err.message, 'error'));
      });
    });

    document.getElementById('payouts').addEventListener('change', async (event) => {
      const input = event.target;
      if (!input.dataset.author) return;
      const res = await fetch('/api/payouts/rates', {
        method: 'PUT',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ author: input.dataset.author, rate: input.value })
      });
      if (!res.ok) {
        const body = await res.json().catch(() => ({}));
        setStatus(body.error || 'Rate rejected', 'error');
        return;
      }
      setStatus('Saved', 'ok');
      setTimeout(() => setStatus('', ''), 1200);
      loadPayouts().catch((err) => setStatus(err.message, 'error'));
    });

    themeSelect.addEventListener('change', async () => {
      const res = await fetch('/api/theme', {
        method: 'PUT',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({
          mode: themeSelect.value,
          prefers_dark: window.matchMedia('(prefers-color-scheme: dark)').matches
        })
      });
      if (!res.ok) return;
      const theme = await res.json();
      document.documentElement.classList.remove('light', 'dark');
      document.documentElement.classList.add(theme.applied);
    });

    getJson('/api/theme')
      .then((theme) => { themeSelect.value = theme.mode; })
      .catch(() => {});

    updateExportLinks();
    refresh().catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;
