//! HTML page rendering via `minijinja`.
//!
//! Templates live in the crate's `templates/` directory and are compiled
//! into the binary, so the server has no runtime file dependencies. HTML
//! auto-escaping is on for every template (they all end in `.html`).

use axum::http::StatusCode;
use chrono::NaiveDate;
use minijinja::Environment;
use serde::Serialize;
use tally_core::ActivityCatalog;
use tally_core::budget::BudgetReport;
use tally_types::{BoardView, EntryKind, HistoryView, Standing};

/// A form option for one activity.
#[derive(Debug, Serialize)]
struct ActivityOption<'a> {
    name: &'a str,
    category: &'a str,
    points: i64,
}

/// One category table on the leaderboard.
#[derive(Debug, Serialize)]
struct CategoryBlock<'a> {
    name: &'a str,
    standings: Vec<Standing>,
}

#[derive(Debug, Serialize)]
struct LeaderboardPage<'a> {
    title: &'a str,
    session_id: String,
    participants: &'a [String],
    categories: Vec<CategoryBlock<'a>>,
    overall: Vec<Standing>,
    activities: Vec<ActivityOption<'a>>,
    history: HistoryView,
}

#[derive(Debug, Serialize)]
struct EntryRow<'a> {
    date: String,
    kind: &'static str,
    income: bool,
    description: &'a str,
    amount: String,
}

#[derive(Debug, Serialize)]
struct BudgetPage<'a> {
    total_income: String,
    total_expense: String,
    balance: String,
    balance_negative: bool,
    entries: Vec<EntryRow<'a>>,
    today: String,
}

#[derive(Debug, Serialize)]
struct ErrorPage<'a> {
    code: u16,
    reason: &'a str,
    message: &'a str,
}

/// Compiled page templates.
#[derive(Debug)]
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    /// Compile the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns a [`minijinja::Error`] if a template has a syntax error.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("layout.html", include_str!("../templates/layout.html"))?;
        env.add_template("leaderboard.html", include_str!("../templates/leaderboard.html"))?;
        env.add_template("budget.html", include_str!("../templates/budget.html"))?;
        env.add_template("error.html", include_str!("../templates/error.html"))?;
        Ok(Self { env })
    }

    /// Render a session's leaderboard with its edit forms.
    ///
    /// # Errors
    ///
    /// Returns a [`minijinja::Error`] if rendering fails.
    pub fn leaderboard(
        &self,
        view: &BoardView,
        catalog: &ActivityCatalog,
    ) -> Result<String, minijinja::Error> {
        let categories = view
            .board
            .categories()
            .iter()
            .map(|c| CategoryBlock {
                name: c.name(),
                standings: view.board.ranking(c.name()).unwrap_or_default(),
            })
            .collect();

        let page = LeaderboardPage {
            title: &view.title,
            session_id: view.session_id.to_string(),
            participants: view.board.participants(),
            categories,
            overall: view.board.overall_ranking(),
            activities: catalog
                .iter()
                .map(|a| ActivityOption {
                    name: &a.name,
                    category: &a.category,
                    points: a.points,
                })
                .collect(),
            history: view.history,
        };

        self.env.get_template("leaderboard.html")?.render(&page)
    }

    /// Render the budget tracker page.
    ///
    /// # Errors
    ///
    /// Returns a [`minijinja::Error`] if rendering fails.
    pub fn budget(&self, report: &BudgetReport, today: NaiveDate) -> Result<String, minijinja::Error> {
        let summary = &report.summary;
        let page = BudgetPage {
            total_income: report.format(summary.total_income),
            total_expense: report.format(summary.total_expense),
            balance: report.format(summary.balance),
            balance_negative: summary.balance.is_sign_negative() && !summary.balance.is_zero(),
            entries: report
                .entries
                .iter()
                .map(|e| EntryRow {
                    date: e.date.to_string(),
                    kind: e.kind.as_str(),
                    income: e.kind == EntryKind::Income,
                    description: &e.description,
                    amount: report.format(e.amount),
                })
                .collect(),
            today: today.to_string(),
        };

        self.env.get_template("budget.html")?.render(&page)
    }

    /// Render the error page shown when a form or page request fails.
    ///
    /// # Errors
    ///
    /// Returns a [`minijinja::Error`] if rendering fails.
    pub fn error(&self, status: StatusCode, message: &str) -> Result<String, minijinja::Error> {
        let page = ErrorPage {
            code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Error"),
            message,
        };
        self.env.get_template("error.html")?.render(&page)
    }
}

#[cfg(test)]
mod tests {
    use tally_core::Activity;
    use tally_types::{Scoreboard, SessionId};

    use super::*;

    fn pages() -> Pages {
        match Pages::new() {
            Ok(pages) => pages,
            Err(e) => panic!("templates: {e}"),
        }
    }

    #[test]
    fn leaderboard_lists_participants_and_escapes_names() {
        let mut board = Scoreboard::new(["Ana", "<b>Ben</b>"], ["prospecting"]);
        assert!(board.add_points("prospecting", "Ana", 4).is_ok());
        let view = BoardView {
            session_id: SessionId::new(),
            title: "Champion Tracker".to_owned(),
            board,
            history: HistoryView::default(),
        };
        let catalog = ActivityCatalog::new([Activity {
            name: "Call".to_owned(),
            category: "prospecting".to_owned(),
            points: 1,
        }]);

        let html = pages().leaderboard(&view, &catalog);
        let Ok(html) = html else {
            panic!("render: {html:?}");
        };
        assert!(html.contains("Champion Tracker"));
        assert!(html.contains(&view.session_id.to_string()));
        assert!(html.contains("&lt;b&gt;Ben&lt;&#x2f;b&gt;") || html.contains("&lt;b&gt;Ben&lt;/b&gt;"));
        assert!(!html.contains("<b>Ben</b>"));
        assert!(html.contains("Call"));
    }

    #[test]
    fn empty_budget_page_renders_zero_totals() {
        let report = BudgetReport {
            currency_symbol: "₱".to_owned(),
            ..BudgetReport::default()
        };
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default();

        let html = pages().budget(&report, today);
        let Ok(html) = html else {
            panic!("render: {html:?}");
        };
        assert!(html.contains("₱0.00"));
        assert!(html.contains("2024-06-01"));
        assert!(html.contains("No entries yet"));
    }

    #[test]
    fn error_page_shows_status_and_escapes_message() {
        let html = pages().error(StatusCode::BAD_REQUEST, "unknown participant: <b>\"Zed\" & co</b>");
        let Ok(html) = html else {
            panic!("render: {html:?}");
        };
        assert!(html.contains("400 Bad Request"));
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("&amp; co"));
        assert!(!html.contains("<b>"));
    }
}
