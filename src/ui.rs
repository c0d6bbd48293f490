use crate::models::{GROUPS, StatusTally, StudentRecord};

const BAR_MAX_HEIGHT: f64 = 100.0;
const PIE_RADIUS: f64 = 60.0;
const PIE_STROKE: f64 = 40.0;

fn slices(counts: &StatusTally) -> [(&'static str, usize, &'static str); 3] {
    [
        ("Present", counts.present, "#4caf50"),
        ("Absent", counts.absent, "#f44336"),
        ("Late", counts.late, "#ff9800"),
    ]
}

pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn bar_chart_svg(counts: &StatusTally) -> String {
    let total = counts.total().max(1) as f64;
    let mut bars = String::new();
    for (index, (label, count, color)) in slices(counts).iter().enumerate() {
        let height = (*count as f64 / total) * BAR_MAX_HEIGHT;
        let x = 20.0 + index as f64 * 100.0;
        let y = 10.0 + BAR_MAX_HEIGHT - height;
        bars.push_str(&format!(
            r#"<rect x="{x:.1}" y="{y:.1}" width="60" height="{height:.1}" fill="{color}"><title>{label}</title></rect><text class="chart-label" x="{cx:.1}" y="132" text-anchor="middle">{count}</text>"#,
            cx = x + 30.0,
        ));
    }
    format!(
        r#"<svg class="chart" viewBox="0 0 300 140" role="img" aria-label="Attendance counts">{bars}</svg>"#
    )
}

pub fn pie_chart_svg(counts: &StatusTally) -> String {
    let total = counts.total().max(1) as f64;
    let circumference = 2.0 * std::f64::consts::PI * PIE_RADIUS;
    let mut offset = 0.0;
    let mut arcs = String::new();
    for (label, count, color) in slices(counts) {
        let arc = (count as f64 / total) * circumference;
        arcs.push_str(&format!(
            r#"<circle r="{PIE_RADIUS}" cx="0" cy="0" fill="transparent" stroke="{color}" stroke-width="{PIE_STROKE}" stroke-dasharray="{arc:.2} {rest:.2}" stroke-dashoffset="{dashoffset:.2}"><title>{label}</title></circle>"#,
            rest = circumference - arc,
            dashoffset = -offset,
        ));
        offset += arc;
    }
    format!(
        r#"<svg class="chart pie" viewBox="0 0 150 150" role="img" aria-label="Attendance share"><g transform="translate(75,75) rotate(-90)">{arcs}</g></svg>"#
    )
}

fn group_options(selected: &str) -> String {
    let mut options = String::new();
    for group in GROUPS {
        let marker = if *group == selected { " selected" } else { "" };
        options.push_str(&format!(r#"<option value="{group}"{marker}>{group}</option>"#));
    }
    options
}

fn roster_rows(date: &str, group: &str, roster: &[StudentRecord]) -> String {
    if roster.is_empty() {
        return r#"<p class="empty">No students yet.</p>"#.to_string();
    }

    let mut rows = String::from(r#"<ul class="list">"#);
    for record in roster {
        let name = html_escape(&record.name);
        let mut status_options = String::new();
        for status in ["Present", "Absent", "Late"] {
            let marker = if status == record.status.as_str() {
                " selected"
            } else {
                ""
            };
            status_options.push_str(&format!(r#"<option value="{status}"{marker}>{status}</option>"#));
        }
        rows.push_str(&format!(
            r#"<li>
        <span class="name">{name}</span>
        <form method="post" action="/students/status">
          <input type="hidden" name="id" value="{id}" />
          <input type="hidden" name="date" value="{date}" />
          <input type="hidden" name="group" value="{group}" />
          <select name="status" onchange="this.form.submit()">{status_options}</select>
        </form>
        <form method="post" action="/students/delete">
          <input type="hidden" name="id" value="{id}" />
          <input type="hidden" name="date" value="{date}" />
          <input type="hidden" name="group" value="{group}" />
          <button class="btn-delete" type="submit" aria-label="Delete {name}">&#10005;</button>
        </form>
      </li>"#,
            id = record.id,
        ));
    }
    rows.push_str("</ul>");
    rows
}

fn clear_control(date: &str, group: &str, roster: &[StudentRecord]) -> String {
    if roster.is_empty() {
        return String::new();
    }

    format!(
        r#"<form method="post" action="/roster/clear" onsubmit="return confirm('Delete every record for this day?')">
        <input type="hidden" name="confirm" value="true" />
        <input type="hidden" name="date" value="{date}" />
        <input type="hidden" name="group" value="{group}" />
        <button class="btn-clear" type="submit">Clear all</button>
      </form>"#
    )
}

pub fn render_index(
    date: &str,
    group: &str,
    roster: &[StudentRecord],
    counts: &StatusTally,
) -> String {
    INDEX_HTML
        .replace("{{STYLE}}", SHARED_STYLE)
        .replace("{{DATE}}", date)
        .replace("{{GROUP}}", group)
        .replace("{{GROUP_OPTIONS}}", &group_options(group))
        .replace("{{ROSTER}}", &roster_rows(date, group, roster))
        .replace("{{PRESENT}}", &counts.present.to_string())
        .replace("{{ABSENT}}", &counts.absent.to_string())
        .replace("{{LATE}}", &counts.late.to_string())
        .replace("{{BAR_CHART}}", &bar_chart_svg(counts))
        .replace("{{PIE_CHART}}", &pie_chart_svg(counts))
        .replace("{{CLEAR}}", &clear_control(date, group, roster))
}

pub fn render_login(notice: Option<&str>) -> String {
    let notice_html = match notice {
        Some(text) => format!(r#"<p class="notice">{}</p>"#, html_escape(text)),
        None => String::new(),
    };
    LOGIN_HTML
        .replace("{{STYLE}}", SHARED_STYLE)
        .replace("{{NOTICE}}", &notice_html)
}

const SHARED_STYLE: &str = r#"
    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #667eea;
      --accent-2: #2f4858;
      --present: #4caf50;
      --absent: #f44336;
      --late: #ff9800;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(640px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
      animation: rise 600ms ease;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
      margin: 0;
    }

    .subtitle {
      margin: 0;
      color: #5f5c57;
      font-size: 1rem;
    }

    input,
    select {
      font: inherit;
      padding: 8px 10px;
      border-radius: 8px;
      border: 1px solid #ccc;
      background: white;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      transition: transform 150ms ease;
    }

    button:active {
      transform: scale(0.98);
    }

    @keyframes rise {
      from {
        opacity: 0;
        transform: translateY(18px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }
"#;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Attendance</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');
{{STYLE}}
    .selector {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      align-items: end;
    }

    .selector label {
      display: grid;
      gap: 4px;
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .add-row {
      display: flex;
      gap: 8px;
    }

    .add-row input[name="name"] {
      flex: 1;
    }

    .btn-add {
      background: var(--accent);
      color: white;
      box-shadow: 0 10px 24px rgba(102, 126, 234, 0.3);
    }

    .list {
      list-style: none;
      margin: 0;
      padding: 0;
      max-height: 260px;
      overflow-y: auto;
    }

    .list li {
      display: flex;
      align-items: center;
      gap: 10px;
      padding: 8px 0;
      border-bottom: 1px solid #eee;
    }

    .list .name {
      flex: 1;
    }

    .btn-delete {
      background: var(--absent);
      color: white;
      padding: 6px 10px;
    }

    .empty {
      text-align: center;
      color: #777;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(3, 1fr);
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 14px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 6px;
      text-align: center;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.6rem;
      font-weight: 600;
    }

    .stat .value.present { color: var(--present); }
    .stat .value.absent { color: var(--absent); }
    .stat .value.late { color: var(--late); }

    .charts {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 16px;
    }

    .chart-card {
      background: white;
      border-radius: 20px;
      padding: 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
      justify-items: center;
    }

    .chart-card h2 {
      margin: 0;
      font-size: 1.1rem;
      justify-self: start;
    }

    .chart {
      width: 100%;
      max-width: 280px;
      display: block;
    }

    .chart.pie {
      max-width: 170px;
    }

    .chart-label {
      fill: #7a746d;
      font-size: 12px;
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
    }

    .legend {
      display: flex;
      gap: 12px;
      font-size: 0.9rem;
    }

    .legend span {
      display: flex;
      align-items: center;
      gap: 5px;
    }

    .legend i {
      width: 12px;
      height: 12px;
      display: inline-block;
      border-radius: 3px;
    }

    .actions {
      display: flex;
      gap: 12px;
      justify-content: space-between;
      flex-wrap: wrap;
    }

    .btn-export {
      background: var(--accent-2);
      color: white;
      border-radius: 999px;
      padding: 10px 18px;
      font-weight: 600;
      text-decoration: none;
    }

    .btn-clear {
      background: #444;
      color: white;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Attendance</h1>
      <p class="subtitle">Daily roster for group {{GROUP}} on {{DATE}}.</p>
    </header>

    <form class="selector" method="get" action="/">
      <label>Date
        <input type="date" name="date" value="{{DATE}}" onchange="this.form.submit()" />
      </label>
      <label>Group
        <select name="group" onchange="this.form.submit()">{{GROUP_OPTIONS}}</select>
      </label>
      <noscript><button type="submit">Load</button></noscript>
    </form>

    <form class="add-row" method="post" action="/students/add">
      <input type="hidden" name="date" value="{{DATE}}" />
      <input type="hidden" name="group" value="{{GROUP}}" />
      <input name="name" placeholder="Student name" autocomplete="off" />
      <button class="btn-add" type="submit">Add</button>
    </form>

    <section>{{ROSTER}}</section>

    <section class="panel">
      <div class="stat"><span class="label">Present</span><span class="value present">{{PRESENT}}</span></div>
      <div class="stat"><span class="label">Absent</span><span class="value absent">{{ABSENT}}</span></div>
      <div class="stat"><span class="label">Late</span><span class="value late">{{LATE}}</span></div>
    </section>

    <section class="charts">
      <div class="chart-card">
        <h2>Bar chart</h2>
        {{BAR_CHART}}
      </div>
      <div class="chart-card">
        <h2>Pie chart</h2>
        {{PIE_CHART}}
        <div class="legend">
          <span><i style="background:#4caf50"></i>Present</span>
          <span><i style="background:#f44336"></i>Absent</span>
          <span><i style="background:#ff9800"></i>Late</span>
        </div>
      </div>
    </section>

    <section class="actions">
      <a class="btn-export" href="/export?date={{DATE}}&group={{GROUP}}">Export CSV</a>
      {{CLEAR}}
    </section>
  </main>
</body>
</html>
"#;

const LOGIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Teacher Login</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');
{{STYLE}}
    .app {
      width: min(380px, 100%);
    }

    form {
      display: grid;
      gap: 12px;
    }

    .btn-login {
      background: var(--accent);
      color: white;
      box-shadow: 0 10px 24px rgba(102, 126, 234, 0.3);
    }

    .notice {
      margin: 0;
      padding: 10px 14px;
      border-radius: 10px;
      background: rgba(244, 67, 54, 0.12);
      color: #c63b2b;
      font-weight: 600;
    }

    .hint {
      margin: 0;
      color: #6f6a65;
      font-size: 0.9rem;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Teacher Login</h1>
      <p class="subtitle">Enter the shared passphrase to open the roster.</p>
    </header>
    {{NOTICE}}
    <form method="post" action="/login">
      <input type="password" name="password" placeholder="Passphrase" autofocus />
      <button class="btn-login" type="submit">Log in</button>
    </form>
    <p class="hint">Demo gate with a shared passphrase, not real authentication.</p>
  </main>
</body>
</html>
"#;
