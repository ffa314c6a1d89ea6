// Inline CSS and JavaScript embedded in every generated page.

pub const BASE_CSS: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        :root {
            --brand-green: #00B888;
            --brand-dark-green: #00976F;
            --brand-navy: #0A2540;
            --brand-gray: #6B7280;
            --brand-light-gray: #F3F4F6;
            --brand-border: #E5E7EB;
            --color-positive: #10B981;
            --color-negative: #EF4444;
            --color-neutral: #6B7280;
            --shadow-sm: 0 1px 2px 0 rgba(0, 0, 0, 0.05);
            --shadow-md: 0 4px 6px -1px rgba(0, 0, 0, 0.1);
            --shadow-lg: 0 10px 15px -3px rgba(0, 0, 0, 0.1);
        }
        body {
            font-family: 'Inter', -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
            background: linear-gradient(135deg, #f5f7fa 0%, #c3cfe2 100%);
            color: var(--brand-navy);
            line-height: 1.6;
            min-height: 100vh;
        }
        .container { max-width: 1400px; margin: 0 auto; padding: 2rem; }
        .header {
            background: white;
            padding: 2rem 2.5rem;
            border-radius: 16px;
            box-shadow: var(--shadow-lg);
            margin-bottom: 2rem;
            border-left: 6px solid var(--brand-green);
        }
        .header h1 { font-size: 2.5rem; font-weight: 700; margin-bottom: 0.5rem; }
        .header-meta { color: var(--brand-gray); font-size: 1rem; }
        .nav-button {
            display: inline-block;
            margin-top: 1rem;
            padding: 0.6rem 1.4rem;
            background: var(--brand-green);
            color: white;
            border-radius: 8px;
            text-decoration: none;
            font-weight: 600;
        }
        .nav-button:hover { background: var(--brand-dark-green); }
        .section {
            background: white;
            padding: 2rem;
            border-radius: 16px;
            box-shadow: var(--shadow-md);
            margin-bottom: 2rem;
        }
        .section-header { margin-bottom: 2rem; }
        .section-header h2 { font-size: 1.75rem; font-weight: 700; margin-bottom: 0.5rem; }
        .subtitle { color: var(--brand-gray); font-size: 0.95rem; }
        .kpi-grid {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(260px, 1fr));
            gap: 1.5rem;
            margin-bottom: 2rem;
        }
        .kpi-card {
            background: linear-gradient(135deg, #ffffff 0%, #f9fafb 100%);
            padding: 1.75rem;
            border-radius: 12px;
            border: 2px solid var(--brand-border);
            position: relative;
            overflow: hidden;
            transition: all 0.3s ease;
        }
        .kpi-card::before {
            content: '';
            position: absolute;
            top: 0; left: 0; right: 0;
            height: 4px;
            background: linear-gradient(90deg, var(--brand-green), var(--brand-dark-green));
        }
        .kpi-card:hover { transform: translateY(-4px); box-shadow: var(--shadow-lg); }
        .kpi-title {
            font-size: 0.875rem;
            font-weight: 600;
            color: var(--brand-gray);
            text-transform: uppercase;
            letter-spacing: 0.5px;
            margin-bottom: 0.75rem;
        }
        .kpi-value { font-size: 2rem; font-weight: 700; margin-bottom: 1rem; }
        .kpi-comparisons { display: flex; flex-direction: column; gap: 0.5rem; }
        .comparison-row { display: flex; align-items: center; gap: 0.5rem; font-size: 0.85rem; }
        .comparison-label { font-weight: 600; color: var(--brand-gray); min-width: 40px; }
        .comparison-value { color: var(--brand-gray); flex: 1; }
        .kpi-change-inline { font-weight: 600; padding: 0.15rem 0.5rem; border-radius: 6px; }
        .kpi-change-inline.positive { background: #D1FAE5; }
        .kpi-change-inline.negative { background: #FEE2E2; }
        .kpi-change-inline.neutral { background: var(--brand-light-gray); }
        .tables-grid {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(450px, 1fr));
            gap: 1.5rem;
        }
        .table-card {
            background: white;
            padding: 1.5rem;
            border-radius: 12px;
            border: 1px solid var(--brand-border);
        }
        .table-card h3 { font-size: 1.1rem; font-weight: 700; margin-bottom: 1rem; }
        table { width: 100%; border-collapse: collapse; font-size: 0.9rem; }
        thead { background: var(--brand-light-gray); }
        th, td { padding: 0.65rem 0.75rem; text-align: left; border-bottom: 1px solid var(--brand-border); }
        th { font-weight: 600; color: var(--brand-gray); font-size: 0.8rem; text-transform: uppercase; }
        tbody tr:hover { background: #F9FAFB; }
        .number { text-align: right; font-variant-numeric: tabular-nums; }
        .dimension-name { font-weight: 500; }
        .no-data { text-align: center; color: var(--brand-gray); padding: 2rem; }
        .positive { color: var(--color-positive); }
        .negative { color: var(--color-negative); }
        .neutral { color: var(--color-neutral); }
        .arrow-small { font-size: 0.9em; }
        .footer { text-align: center; color: var(--brand-gray); font-size: 0.85rem; padding: 2rem 0; }"#;

pub const FILTER_CSS: &str = r#"
        .filter-section {
            background: white;
            padding: 1.5rem;
            border-radius: 12px;
            box-shadow: var(--shadow-md);
            margin-bottom: 2rem;
            text-align: center;
        }
        .filter-label { font-weight: 600; font-size: 0.95rem; margin-bottom: 1rem; display: block; }
        .filter-buttons { display: flex; gap: 1rem; justify-content: center; flex-wrap: wrap; }
        .filter-button {
            padding: 0.75rem 2rem;
            border: 2px solid var(--brand-border);
            background: white;
            color: var(--brand-navy);
            border-radius: 8px;
            font-size: 0.95rem;
            font-weight: 600;
            cursor: pointer;
            transition: all 0.3s ease;
        }
        .filter-button:hover { border-color: var(--brand-green); }
        .filter-button.active { background: var(--brand-green); border-color: var(--brand-green); color: white; }"#;

pub const GATE_CSS: &str = r#"
        .login-overlay {
            position: fixed;
            inset: 0;
            background: linear-gradient(135deg, #0A2540 0%, #00976F 100%);
            display: flex;
            align-items: center;
            justify-content: center;
            z-index: 1000;
        }
        .login-box {
            background: white;
            padding: 3rem;
            border-radius: 16px;
            box-shadow: var(--shadow-lg);
            max-width: 420px;
            width: 90%;
            text-align: center;
        }
        .login-box h2 { margin-bottom: 0.75rem; }
        .login-box p { color: var(--brand-gray); margin-bottom: 1.5rem; }
        .login-input {
            width: 100%;
            padding: 0.85rem 1rem;
            border: 2px solid var(--brand-border);
            border-radius: 8px;
            font-size: 1rem;
            margin-bottom: 1rem;
        }
        .login-input:focus { outline: none; border-color: var(--brand-green); }
        .login-button {
            width: 100%;
            padding: 0.85rem;
            background: var(--brand-green);
            color: white;
            border: none;
            border-radius: 8px;
            font-size: 1rem;
            font-weight: 600;
            cursor: pointer;
        }
        .login-button:hover { background: var(--brand-dark-green); }
        .login-error { display: none; color: var(--color-negative); margin-top: 1rem; }
        .content-hidden { display: none; }"#;

/// Expects `GATE_SECRET` to be defined before it.
pub const GATE_JS: &str = r#"
        function unlock() {
            document.getElementById('loginOverlay').style.display = 'none';
            document.getElementById('mainContent').classList.remove('content-hidden');
        }

        function checkPassword() {
            const input = document.getElementById('passwordInput');
            if (input.value === GATE_SECRET) {
                sessionStorage.setItem('authenticated', 'true');
                unlock();
            } else {
                document.getElementById('loginError').style.display = 'block';
                input.value = '';
                input.focus();
            }
        }

        document.addEventListener('DOMContentLoaded', function () {
            if (sessionStorage.getItem('authenticated') === 'true') {
                unlock();
            }
            const input = document.getElementById('passwordInput');
            if (input) {
                input.addEventListener('keypress', function (e) {
                    if (e.key === 'Enter') {
                        checkPassword();
                    }
                });
            }
        });"#;

/// Month/view/channel switching for the customer-flow page. Expects
/// `currentMonth`, `currentView`, `currentChannel` and `REPORT_YEAR` to be
/// defined before it.
pub const FLOW_JS: &str = r#"
        function activate(handler, attribute, value) {
            document.querySelectorAll(`[data-${attribute}][onclick^="${handler}"]`).forEach(btn => {
                btn.classList.toggle('active', btn.dataset[attribute] === value);
            });
        }

        function updatePeriodText() {
            const btn = document.querySelector(`[data-month="${currentMonth}"][onclick^="switchMonth"]`);
            if (btn) {
                document.getElementById('current-period').textContent = btn.textContent + ' ' + REPORT_YEAR;
            }
        }

        function showContent() {
            document.querySelectorAll('.section[data-view]').forEach(section => {
                section.style.display = 'none';
            });
            let selector = `.section[data-view="${currentView}"][data-month="${currentMonth}"]`;
            if (currentView === 'nya') {
                selector += `[data-channel="${currentChannel}"]`;
            }
            document.querySelectorAll(selector).forEach(section => {
                section.style.display = 'block';
            });
        }

        function switchMonth(month) {
            currentMonth = String(month);
            activate('switchMonth', 'month', currentMonth);
            updatePeriodText();
            showContent();
        }

        function switchView(view) {
            currentView = view;
            activate('switchView', 'view', view);
            document.getElementById('channel-filter').style.display = view === 'nya' ? 'block' : 'none';
            showContent();
        }

        function switchChannel(channel) {
            currentChannel = channel;
            activate('switchChannel', 'channel', channel);
            showContent();
        }

        showContent();"#;
