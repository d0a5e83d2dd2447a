//! HTML dashboard generator with Chart.js

use crate::error::{Error, Result};
use chrono::Local;
use minijinja::{context, Environment};
use std::collections::BTreeMap;
use std::path::Path;
use turnaround_core::Dashboard;

/// HTML template for the turnaround dashboard
const DASHBOARD_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="ko">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js"></script>
    <style>
        :root {
            --bg-primary: #f4f6f8;
            --bg-secondary: #ffffff;
            --bg-tertiary: #eef2f5;
            --text-primary: #253036;
            --text-secondary: #63666a;
            --border-color: #dde3e8;
            --accent-blue: #0459A5;
            --accent-sky: #69C6DD;
            --accent-orange: #ECAB86;
            --accent-gray: #B2C6D3;
        }

        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: 'Pretendard', 'Noto Sans KR', -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.6;
            min-height: 100vh;
        }

        .container {
            max-width: 1400px;
            margin: 0 auto;
            padding: 2rem;
        }

        header {
            margin-bottom: 2rem;
            padding: 1.5rem 2rem;
            background: var(--bg-secondary);
            border-radius: 16px;
            border: 1px solid var(--border-color);
            display: flex;
            justify-content: space-between;
            align-items: center;
        }

        h1 {
            font-size: 1.75rem;
            font-weight: 700;
            color: var(--accent-blue);
        }

        h2 {
            font-size: 1.25rem;
            font-weight: 600;
            margin-bottom: 1rem;
        }

        .last-updated {
            color: var(--text-secondary);
            font-size: 0.9rem;
        }

        section {
            background: var(--bg-secondary);
            border: 1px solid var(--border-color);
            border-radius: 12px;
            margin-bottom: 2rem;
            padding: 1.5rem;
        }

        .grid {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(420px, 1fr));
            gap: 1rem;
        }

        .card {
            border: 1px solid var(--border-color);
            border-radius: 12px;
            padding: 1rem;
            background: var(--bg-secondary);
        }

        .cardTitle {
            font-weight: 600;
            margin-bottom: 0.5rem;
        }

        .chart-container {
            height: 320px;
            position: relative;
        }

        .speed-container {
            height: 420px;
            position: relative;
        }

        .tabs {
            display: flex;
            gap: 0.5rem;
            margin-bottom: 1rem;
        }

        .tabBtn {
            border: 1px solid var(--border-color);
            background: var(--bg-tertiary);
            color: var(--text-primary);
            border-radius: 20px;
            padding: 0.25rem 1rem;
            cursor: pointer;
        }

        .tabBtn.active {
            background: var(--accent-blue);
            border-color: var(--accent-blue);
            color: #ffffff;
        }

        .no-data {
            height: 160px;
            display: flex;
            align-items: center;
            justify-content: center;
            color: var(--text-secondary);
        }

        .worker-table {
            width: 100%;
            border-collapse: collapse;
        }

        .worker-table th,
        .worker-table td {
            padding: 0.5rem 1rem;
            text-align: left;
            border-top: 1px solid var(--border-color);
        }

        .worker-table th {
            background: var(--bg-tertiary);
        }

        .worker-table .num {
            text-align: right;
        }

        .badge {
            border-radius: 10px;
            padding: 0.1rem 0.6rem;
            font-size: 0.85rem;
        }

        .badge.sonic { background: var(--accent-sky); }
        .badge.lava { background: var(--accent-orange); }
        .badge.robo { background: var(--accent-gray); }

        .reload {
            border: 1px solid var(--border-color);
            background: var(--bg-tertiary);
            border-radius: 8px;
            padding: 0.25rem 0.75rem;
            cursor: not-allowed;
        }

        footer {
            text-align: center;
            color: var(--text-secondary);
            font-size: 0.85rem;
        }
    </style>
</head>
<body>
    {% macro chart_card(card) %}
    <div class="card">
        <div class="cardTitle">{{ card.title }}</div>
        {% if card.panel.status == "ready" %}
        <div class="chart-container"><canvas id="{{ card.id }}"></canvas></div>
        {% else %}
        <div class="no-data">{{ card.panel.data.message }}</div>
        {% endif %}
    </div>
    {% endmacro %}
    <div class="container">
        <header>
            <div>
                <h1>{{ title }}</h1>
                <p class="last-updated">생성: {{ generated_at }}</p>
            </div>
            <button class="reload" disabled>새로고침</button>
        </header>

        <section id="s1">
            <div class="grid">
                <div class="card">
                    <div class="cardTitle">{{ counts.title }}</div>
                    <div class="chart-container"><canvas id="s1_counts"></canvas></div>
                </div>
                <div class="card">
                    <div class="cardTitle">{{ saved_time.title }}</div>
                    <div class="chart-container"><canvas id="s1_saved"></canvas></div>
                </div>
            </div>
        </section>

        <section id="s2">
            <h2>작업타입 · 공정별 소요시간</h2>
            <div class="tabs">
                {% for tab in aircraft_tabs %}
                <button class="tabBtn{% if loop.first %} active{% endif %}" data-group="s2" data-tab="{{ tab.airline }}">{{ tab.airline }}</button>
                {% endfor %}
            </div>
            {% for tab in aircraft_tabs %}
            <div class="tabPane" data-group="s2" data-tab="{{ tab.airline }}"{% if not loop.first %} hidden{% endif %}>
                {% if tab.panel.status == "ready" %}
                <div class="grid">
                    {% for card in tab.panel.data.aircraft %}{{ chart_card(card) }}{% endfor %}
                    {% for card in tab.panel.data.processes %}{{ chart_card(card) }}{% endfor %}
                </div>
                {% else %}
                <div class="card"><div class="cardTitle">{{ tab.panel.data.message }}</div></div>
                {% endif %}
            </div>
            {% endfor %}
        </section>

        <section id="s3">
            <h2>작업자별 공정 수행 횟수</h2>
            <div class="tabs">
                {% for table in worker_tables %}
                <button class="tabBtn{% if loop.first %} active{% endif %}" data-group="s3w" data-tab="{{ table.filter }}">{{ table.label }}</button>
                {% endfor %}
            </div>
            {% for table in worker_tables %}
            <div class="tabPane" data-group="s3w" data-tab="{{ table.filter }}"{% if not loop.first %} hidden{% endif %}>
                {% if table.panel.status == "ready" %}
                <table class="worker-table">
                    <thead>
                        <tr>
                            <th>작업자</th>
                            {% for column in table.panel.data.columns %}
                            <th class="num"><span class="badge {{ badges[column] | default('robo') }}">{{ column }}</span></th>
                            {% endfor %}
                            <th class="num">합계</th>
                        </tr>
                    </thead>
                    <tbody>
                        {% for row in table.panel.data.rows %}
                        <tr>
                            <td>{{ row.label }}</td>
                            {% for count in row.counts %}
                            <td class="num">{{ count }}</td>
                            {% endfor %}
                            <td class="num">{{ row.total }}</td>
                        </tr>
                        {% endfor %}
                    </tbody>
                </table>
                {% else %}
                <table class="worker-table"><thead><tr><th>{{ table.panel.data.message }}</th></tr></thead><tbody></tbody></table>
                {% endif %}
            </div>
            {% endfor %}
        </section>

        <section id="s3_speed">
            <h2>작업자별 작업 속도</h2>
            <div class="tabs">
                {% for tab in speed_tabs %}
                <button class="tabBtn{% if loop.first %} active{% endif %}" data-group="s3s" data-tab="{{ tab.airline }}">{{ tab.airline }}</button>
                {% endfor %}
            </div>
            {% for tab in speed_tabs %}
            <div class="tabPane" data-group="s3s" data-tab="{{ tab.airline }}"{% if not loop.first %} hidden{% endif %}>
                {% if tab.panel.status == "ready" %}
                <div class="grid">
                    {% for card in tab.panel.data %}
                    <div class="card">
                        <div class="cardTitle">{{ card.title }}</div>
                        <div class="speed-container"><canvas id="{{ card.id }}"></canvas></div>
                    </div>
                    {% endfor %}
                </div>
                {% else %}
                <div class="card">
                    <div class="cardTitle">{{ tab.panel.data.message }}</div>
                    <div class="no-data">데이터 없음</div>
                </div>
                {% endif %}
            </div>
            {% endfor %}
        </section>

        <footer>
            <p>Generated by turnaround-dash</p>
        </footer>
    </div>

    <script>
        window.DASHBOARD_DATA = {{ dashboard_json | safe }};

        const axisColor = 'rgba(0,0,0,.06)';

        function hoverCallbacks(points) {
            return {
                title: () => '',
                label: (context) => {
                    const point = points[context.dataIndex];
                    return point && point.hover ? point.hover : '';
                }
            };
        }

        function drawCounts(view) {
            const canvas = document.getElementById('s1_counts');
            if (!canvas) return;
            new Chart(canvas, {
                type: 'doughnut',
                data: {
                    labels: view.slices.map(s => s.label),
                    datasets: [{
                        data: view.slices.map(s => s.value),
                        backgroundColor: view.slices.map(s => s.color)
                    }]
                },
                options: { responsive: true, maintainAspectRatio: false, cutout: '55%' }
            });
        }

        function drawSaved(view) {
            const canvas = document.getElementById('s1_saved');
            if (!canvas) return;
            const labels = view.boxes.map(b => b.airline);
            const datasets = view.boxes.map((box, index) => ({
                label: box.airline,
                data: box.minutes.map((m, i) => ({ x: index + ((i % 7) - 3) * 0.04, y: m })),
                backgroundColor: box.color,
                pointRadius: 3
            }));
            new Chart(canvas, {
                type: 'scatter',
                data: { datasets },
                options: {
                    responsive: true,
                    maintainAspectRatio: false,
                    plugins: {
                        tooltip: {
                            callbacks: {
                                label: (context) => context.dataset.label + ' 절감시간: ' + context.raw.y.toFixed(1) + '분'
                            }
                        }
                    },
                    scales: {
                        x: {
                            min: -0.5,
                            max: labels.length - 0.5,
                            ticks: { stepSize: 1, callback: (value) => labels[value] ?? '' },
                            title: { display: true, text: '항공사' },
                            grid: { color: axisColor }
                        },
                        y: { title: { display: true, text: '절감시간(분)' }, grid: { color: axisColor } }
                    }
                }
            });
        }

        function drawAircraft(card) {
            const canvas = document.getElementById(card.id);
            if (!canvas || card.panel.status !== 'ready') return;
            const chart = card.panel.data;
            const datasets = [{
                type: 'bar',
                label: '실제(평균)',
                data: chart.bars.map(b => b.minutes),
                backgroundColor: chart.bars.map(b => b.color)
            }];
            if (chart.standard_minutes !== null) {
                datasets.push({
                    type: 'line',
                    label: '표준(분)',
                    data: chart.bars.map(() => chart.standard_minutes),
                    borderColor: chart.standard_color,
                    borderWidth: 2,
                    pointRadius: 0
                });
            }
            new Chart(canvas, {
                data: { labels: chart.bars.map(b => b.day), datasets },
                options: {
                    responsive: true,
                    maintainAspectRatio: false,
                    plugins: {
                        tooltip: {
                            callbacks: {
                                title: () => '',
                                label: (context) => context.dataset.type === 'line'
                                    ? chart.standard_label
                                    : chart.bars[context.dataIndex].hover
                            }
                        }
                    },
                    scales: {
                        x: { title: { display: true, text: '날짜' }, grid: { color: axisColor } },
                        y: { title: { display: true, text: '시간(분)' }, grid: { color: axisColor } }
                    }
                }
            });
        }

        function drawProcess(card) {
            const canvas = document.getElementById(card.id);
            if (!canvas || card.panel.status !== 'ready') return;
            const chart = card.panel.data;
            const datasets = [{
                type: 'bar',
                label: '공정 평균(1인)',
                data: chart.bars.map(b => b.minutes),
                backgroundColor: chart.bars.map(b => b.color)
            }];
            if (chart.average_minutes !== null) {
                datasets.push({
                    type: 'line',
                    label: chart.average_label,
                    data: chart.bars.map(() => chart.average_minutes),
                    borderColor: '#253036',
                    borderDash: [2, 4],
                    borderWidth: 2,
                    pointRadius: 0
                });
            }
            new Chart(canvas, {
                data: { labels: chart.bars.map(b => b.day), datasets },
                options: {
                    responsive: true,
                    maintainAspectRatio: false,
                    plugins: {
                        tooltip: {
                            filter: (item) => item.dataset.type === 'bar',
                            callbacks: hoverCallbacks(chart.bars)
                        }
                    },
                    scales: {
                        x: { title: { display: true, text: '날짜' }, grid: { color: axisColor } },
                        y: { title: { display: true, text: '시간(분)' }, grid: { color: axisColor } }
                    }
                }
            });
        }

        function drawSpeed(card) {
            const canvas = document.getElementById(card.id);
            if (!canvas || card.panel.status !== 'ready') return;
            const chart = card.panel.data;
            new Chart(canvas, {
                type: 'bar',
                data: {
                    labels: chart.bars.map(b => b.name),
                    datasets: [{
                        label: chart.role,
                        data: chart.bars.map(b => b.minutes),
                        backgroundColor: chart.color
                    }]
                },
                options: {
                    indexAxis: 'y',
                    responsive: true,
                    maintainAspectRatio: false,
                    plugins: { legend: { display: false }, tooltip: { callbacks: hoverCallbacks(chart.bars) } },
                    scales: {
                        x: { title: { display: true, text: '평균 소요시간(분)' }, grid: { color: axisColor } }
                    }
                }
            });
        }

        document.addEventListener('DOMContentLoaded', function() {
            const data = window.DASHBOARD_DATA;

            document.querySelectorAll('.tabBtn').forEach(button => {
                button.addEventListener('click', () => {
                    const group = button.dataset.group;
                    document.querySelectorAll('.tabBtn[data-group="' + group + '"]').forEach(b => {
                        b.classList.toggle('active', b === button);
                    });
                    document.querySelectorAll('.tabPane[data-group="' + group + '"]').forEach(pane => {
                        pane.hidden = pane.dataset.tab !== button.dataset.tab;
                    });
                });
            });

            drawCounts(data.counts);
            drawSaved(data.saved_time);

            data.aircraft_tabs.forEach(tab => {
                if (tab.panel.status !== 'ready') return;
                tab.panel.data.aircraft.forEach(drawAircraft);
                tab.panel.data.processes.forEach(drawProcess);
            });

            data.speed_tabs.forEach(tab => {
                if (tab.panel.status !== 'ready') return;
                tab.panel.data.forEach(drawSpeed);
            });
        });
    </script>
</body>
</html>
"#;

/// Dashboard configuration
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Title for the dashboard
    pub title: String,
    /// Path to output directory
    pub output_dir: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "Turnaround Dashboard".to_string(),
            output_dir: "dist".to_string(),
        }
    }
}

/// Serialize for embedding inside a `<script>` element
fn script_json(dashboard: &Dashboard) -> Result<String> {
    Ok(serde_json::to_string(dashboard)?.replace("</", "<\\/"))
}

/// Generate the HTML dashboard
pub fn generate_dashboard(dashboard: &Dashboard, config: &DashboardConfig) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("dashboard.html", DASHBOARD_TEMPLATE)?;
    let template = env.get_template("dashboard.html")?;

    let badges: BTreeMap<&str, &str> =
        BTreeMap::from([("소닉", "sonic"), ("라바", "lava"), ("로보캅", "robo")]);

    let html = template.render(context! {
        title => &config.title,
        generated_at => Local::now().format("%Y-%m-%d %H:%M").to_string(),
        counts => &dashboard.counts,
        saved_time => &dashboard.saved_time,
        aircraft_tabs => &dashboard.aircraft_tabs,
        worker_tables => &dashboard.worker_tables,
        speed_tabs => &dashboard.speed_tabs,
        badges => badges,
        dashboard_json => script_json(dashboard)?,
    })?;

    Ok(html)
}

fn write_file(path: &Path, contents: String) -> Result<()> {
    std::fs::write(path, contents).map_err(|source| Error::FileWriteError {
        path: path.display().to_string(),
        source,
    })
}

/// Write `index.html` and `dashboard.json` to the output directory
pub fn write_dashboard(dashboard: &Dashboard, config: &DashboardConfig, base_path: &Path) -> Result<()> {
    let output_dir = base_path.join(&config.output_dir);
    std::fs::create_dir_all(&output_dir)?;

    let html = generate_dashboard(dashboard, config)?;
    write_file(&output_dir.join("index.html"), html)?;

    // Also write the view-models as JSON
    let json = serde_json::to_string_pretty(dashboard)?;
    write_file(&output_dir.join("dashboard.json"), json)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use turnaround_core::data::{
        AircraftDay, AircraftEntry, AircraftListDocument, AircraftSeriesDocument, CountsDocument,
        DashboardDocuments, DateRange, SpeedRow, SpeedRowsDocument, WorkerCountsDocument,
        WorkerProcessRow,
    };

    fn sample_documents() -> DashboardDocuments {
        DashboardDocuments {
            counts: CountsDocument {
                range: DateRange {
                    from: "2025-12-01".to_string(),
                    to: "2025-12-07".to_string(),
                },
                airlines: Vec::new(),
            },
            aircraft_list: AircraftListDocument {
                airlines: vec!["HH".to_string()],
                aircraft_by_airline: HashMap::from([(
                    "HH".to_string(),
                    vec![AircraftEntry {
                        aircraft: "A321".to_string(),
                        n: 1,
                        standard_sec: Some(1000.0),
                    }],
                )]),
            },
            aircraft_series: AircraftSeriesDocument {
                series: HashMap::from([(
                    "HH|A321".to_string(),
                    vec![AircraftDay {
                        yyyymmdd: Some("20251201".to_string()),
                        avg_actual_sec: 1100.0,
                        min_actual_sec: None,
                        max_actual_sec: None,
                        standard_sec: Some(1000.0),
                        n: 1,
                    }],
                )]),
            },
            worker_counts: WorkerCountsDocument {
                rows: vec![WorkerProcessRow {
                    airline: "HH".to_string(),
                    member_srl: Some(3),
                    member_name: Some("park".to_string()),
                    process: Some("라바".to_string()),
                    aircraft_cnt: 4,
                }],
            },
            speed_rows: SpeedRowsDocument {
                rows: vec![SpeedRow {
                    airline: Some("RF".to_string()),
                    role_label: Some("로보캅".to_string()),
                    member_name: Some("</script><b>x".to_string()),
                    time_sec: 120.0,
                    ..Default::default()
                }],
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_dashboard_empty() {
        let dashboard = Dashboard::assemble(&DashboardDocuments::default());
        let config = DashboardConfig::default();
        let html = generate_dashboard(&dashboard, &config).unwrap();

        assert!(html.contains("Turnaround Dashboard"));
        assert!(html.contains("HH — 데이터 없음"));
        assert!(html.contains("<th>데이터 없음</th>"));
    }

    #[test]
    fn test_generate_dashboard_with_data() {
        let dashboard = Dashboard::assemble(&sample_documents());
        let config = DashboardConfig {
            title: "Test Dashboard".to_string(),
            ..Default::default()
        };
        let html = generate_dashboard(&dashboard, &config).unwrap();

        assert!(html.contains("Test Dashboard"));
        assert!(html.contains("항공사별 청소건수 (기간: 2025-12-01 ~ 2025-12-07)"));
        assert!(html.contains(r#"<div class="cardTitle">표준 대비 절감시간 분포 (분) — </div>"#));
        assert!(html.contains(r#"<canvas id="s2_chart_HH_A321_0">"#));
        assert!(html.contains(r#"<canvas id="s3_speed_RF_____0">"#));
        assert!(html.contains(r#"<span class="badge lava">라바</span>"#));
        assert!(html.contains("<td>park</td>"));
    }

    #[test]
    fn test_embedded_json_cannot_close_script() {
        let dashboard = Dashboard::assemble(&sample_documents());
        let json = script_json(&dashboard).unwrap();

        assert!(!json.contains("</script>"));
        assert!(json.contains(r"<\/script>"));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["aircraft_tabs"][0]["airline"], "HH");
    }

    #[test]
    fn test_write_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let dashboard = Dashboard::assemble(&sample_documents());
        let config = DashboardConfig {
            output_dir: "out/site".to_string(),
            ..Default::default()
        };

        write_dashboard(&dashboard, &config, dir.path()).unwrap();

        assert!(dir.path().join("out/site/index.html").exists());
        let json = std::fs::read_to_string(dir.path().join("out/site/dashboard.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["worker_tables"][0]["label"], "전체");
    }
}
