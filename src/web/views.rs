//! Server-rendered HTML for the form and result pages

use crate::types::prediction::{Label, PredictionReport};
use crate::types::student::{bounds, StudentForm, Subject};
use std::fmt::Write;

/// Sidebar pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Prediction,
    HowItWorks,
    About,
}

impl Page {
    const ALL: [Page; 3] = [Page::Prediction, Page::HowItWorks, Page::About];

    fn title(self) -> &'static str {
        match self {
            Page::Prediction => "Prediction",
            Page::HowItWorks => "How It Works",
            Page::About => "About",
        }
    }

    fn href(self) -> &'static str {
        match self {
            Page::Prediction => "/",
            Page::HowItWorks => "/how-it-works",
            Page::About => "/about",
        }
    }
}

/// What the output column shows
pub enum Output<'a> {
    /// No submission yet
    Idle,
    /// Submission rejected before scoring
    Warning(String),
    /// Model call failed
    Failure(String),
    Report(&'a PredictionReport),
}

const STYLE: &str = r#"
body { font-family: "Source Sans Pro", Arial, sans-serif; margin: 0; display: flex; color: #262730; }
nav { width: 260px; min-height: 100vh; background: #f0f2f6; padding: 24px; box-sizing: border-box; }
nav a { display: block; padding: 6px 0; color: #262730; text-decoration: none; }
nav a.active { font-weight: bold; color: #ff4b4b; }
main { flex: 1; padding: 32px 48px; }
.columns { display: flex; gap: 48px; }
.left { flex: 1.05; } .right { flex: 0.95; }
form { border: 1px solid #e6e9ef; border-radius: 8px; padding: 16px; }
.grid { display: grid; gap: 12px; margin-bottom: 16px; }
.grid-2 { grid-template-columns: repeat(2, 1fr); }
.grid-3 { grid-template-columns: repeat(3, 1fr); }
.grid-4 { grid-template-columns: repeat(4, 1fr); }
label { display: block; font-size: 14px; margin-bottom: 4px; }
input, select { width: 100%; padding: 6px; box-sizing: border-box; }
button { width: 100%; padding: 10px; background: #ff4b4b; color: white; border: none; border-radius: 6px; font-size: 16px; }
.caption { color: #808495; font-size: 14px; }
.box { padding: 12px 16px; border-radius: 6px; margin-bottom: 16px; }
.info { background: #e8f1fb; } .warning { background: #fffbe6; }
.error { background: #fde8e8; } .success { background: #e6f6ec; }
.metric { font-size: 32px; }
progress { width: 100%; height: 12px; }
table { border-collapse: collapse; font-size: 13px; }
td, th { border: 1px solid #e6e9ef; padding: 4px 8px; text-align: left; }
"#;

/// Escape text for HTML element and attribute content
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(page: Page, body: &str) -> String {
    let mut nav = String::new();
    for p in Page::ALL {
        let class = if p == page { " class=\"active\"" } else { "" };
        let _ = write!(nav, "<a href=\"{}\"{}>{}</a>", p.href(), class, p.title());
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Early Student At-Risk Detection</title>
<style>{style}</style>
</head>
<body>
<nav>
<h2>Early Student At-Risk Detection</h2>
{nav}
<p><strong>Usage Steps</strong></p>
<ul>
<li>Enter student details</li>
<li>Submit for prediction</li>
<li>Review probability and recommendation</li>
</ul>
</nav>
<main>
{body}
</main>
</body>
</html>"#,
        style = STYLE,
        nav = nav,
        body = body
    )
}

fn number_input(
    name: &str,
    label: &str,
    (min, max): (i64, i64),
    placeholder: &str,
    value: Option<&str>,
) -> String {
    format!(
        r#"<div><label for="{name}">{label}</label><input type="number" id="{name}" name="{name}" min="{min}" max="{max}" placeholder="{placeholder}" value="{value}" required></div>"#,
        name = name,
        label = label,
        min = min,
        max = max,
        placeholder = placeholder,
        value = escape(value.unwrap_or("")),
    )
}

fn select(
    name: &str,
    label: &str,
    placeholder: &str,
    options: &[&str],
    value: Option<&str>,
) -> String {
    let selected_value = value.unwrap_or("");
    let mut html = format!(
        r#"<div><label for="{name}">{label}</label><select id="{name}" name="{name}" required><option value="">{placeholder}</option>"#,
        name = name,
        label = label,
        placeholder = placeholder,
    );
    for option in options {
        let selected = if *option == selected_value { " selected" } else { "" };
        let _ = write!(html, r#"<option value="{0}"{1}>{0}</option>"#, option, selected);
    }
    html.push_str("</select></div>");
    html
}

fn student_form(form: &StudentForm) -> String {
    const YES_NO: [&str; 2] = ["yes", "no"];
    let subjects: Vec<&str> = Subject::ALL.iter().map(|s| s.as_str()).collect();

    let mut html = String::from(r#"<form method="post" action="/predict">"#);

    html.push_str(r#"<div class="grid grid-3">"#);
    html.push_str("<div>");
    html.push_str(&number_input("age", "Age", bounds::AGE, "Enter age", form.age.as_deref()));
    html.push_str(&select(
        "subject",
        "Subject",
        "Select subject",
        &subjects,
        form.subject.as_deref(),
    ));
    html.push_str("</div><div>");
    html.push_str(&select(
        "failures",
        "Past Failures",
        "Select number of failures",
        &["0", "1", "2", "3"],
        form.failures.as_deref(),
    ));
    html.push_str(&number_input(
        "absences",
        "Absences",
        bounds::ABSENCES,
        "Enter absences",
        form.absences.as_deref(),
    ));
    html.push_str("</div><div>");
    html.push_str(&select(
        "studytime",
        "Weekly Study Time (1=Low, 4=High)",
        "Select study time",
        &["1", "2", "3", "4"],
        form.studytime.as_deref(),
    ));
    html.push_str("</div></div>");

    html.push_str("<p>Support and Environment</p>");
    html.push_str(r#"<div class="grid grid-4">"#);
    html.push_str(&select(
        "schoolsup",
        "Extra School Support",
        "Select",
        &YES_NO,
        form.schoolsup.as_deref(),
    ));
    html.push_str(&select(
        "famsup",
        "Family Educational Support",
        "Select",
        &YES_NO,
        form.famsup.as_deref(),
    ));
    html.push_str(&select(
        "internet",
        "Internet Access at Home",
        "Select",
        &YES_NO,
        form.internet.as_deref(),
    ));
    html.push_str(&select(
        "higher",
        "Plans for Higher Education",
        "Select",
        &YES_NO,
        form.higher.as_deref(),
    ));
    html.push_str("</div>");

    html.push_str("<p>Academic Performance (Earlier Terms)</p>");
    html.push_str(
        r#"<p class="caption">G1 and G2 are earlier-term grades used for early risk detection. Final grade G3 is not used as an input.</p>"#,
    );
    html.push_str(r#"<div class="grid grid-2">"#);
    html.push_str(&number_input(
        "grade1",
        "Grade 1 (G1)",
        bounds::GRADE,
        "Enter G1 (0–20)",
        form.grade1.as_deref(),
    ));
    html.push_str(&number_input(
        "grade2",
        "Grade 2 (G2)",
        bounds::GRADE,
        "Enter G2 (0–20)",
        form.grade2.as_deref(),
    ));
    html.push_str("</div>");

    html.push_str(r#"<button type="submit">Predict Risk</button></form>"#);
    html
}

fn report_view(report: &PredictionReport) -> String {
    let mut html = String::new();

    match report.label {
        Label::AtRisk => {
            html.push_str(r#"<div class="box error">Prediction Result: At Risk</div>"#)
        }
        Label::NotAtRisk => {
            html.push_str(r#"<div class="box success">Prediction Result: Not At Risk</div>"#)
        }
    }

    if let (Some(probability), Some(progress)) = (report.probability, report.progress()) {
        let _ = write!(
            html,
            r#"<p class="caption">Probability of Being At Risk</p><p class="metric">{:.2}%</p><progress value="{}" max="1"></progress><p>Risk Level: {}</p>"#,
            probability * 100.0,
            progress,
            report.risk_level
        );
    }

    html.push_str("<p><strong>Recommended Action</strong></p><ul>");
    for action in report.recommendation.actions {
        let _ = write!(html, "<li>{}</li>", action);
    }
    html.push_str("</ul>");

    html.push_str("<details><summary>View Full Model Input</summary><table><tr>");
    for column in report.model_input.columns() {
        let _ = write!(html, "<th>{}</th>", escape(column));
    }
    html.push_str("</tr><tr>");
    for value in report.model_input.values() {
        let _ = write!(html, "<td>{}</td>", escape(&value.to_string()));
    }
    html.push_str("</tr></table></details>");

    let _ = write!(
        html,
        r#"<p class="caption">Submission {}</p>"#,
        escape(&report.submission_id)
    );
    html
}

/// Prediction page: form on the left, output on the right
pub fn prediction_page(form: &StudentForm, output: Output<'_>) -> String {
    let output_html = match output {
        Output::Idle => {
            r#"<div class="box info">Submit the form to view the prediction.</div>"#.to_string()
        }
        Output::Warning(message) => format!(
            r#"<div class="box warning">{}</div>"#,
            escape(&message)
        ),
        Output::Failure(message) => format!(
            r#"<div class="box error">Prediction failed: {}</div>"#,
            escape(&message)
        ),
        Output::Report(report) => report_view(report),
    };

    let body = format!(
        r#"<h1>Early Student At-Risk Detection</h1>
<p class="caption">This application predicts whether a student is at risk of failing, allowing educators to provide early intervention.</p>
<hr>
<div class="columns">
<div class="left"><h3>Student Information</h3>{form}</div>
<div class="right"><h3>Prediction Output</h3>{output}</div>
</div>"#,
        form = student_form(form),
        output = output_html
    );

    layout(Page::Prediction, &body)
}

pub fn how_it_works_page() -> String {
    layout(
        Page::HowItWorks,
        r#"<h1>How It Works</h1>
<p>The application collects student information, formats it into the required feature set, and applies a trained machine learning model to estimate the likelihood of academic risk.</p>
<p>Final grade (G3) is excluded to avoid data leakage. Earlier-term grades (G1, G2) are used as they are available before final outcomes.</p>"#,
    )
}

pub fn about_page() -> String {
    layout(
        Page::About,
        r#"<h1>About This Application</h1>
<p>This application demonstrates an early student at-risk detection system designed for educational support staff. It serves as a decision-support tool and should be used alongside professional judgement.</p>"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_form_keeps_submitted_values() {
        let form = StudentForm {
            age: Some("19".into()),
            subject: Some("Portuguese".into()),
            ..StudentForm::default()
        };

        let html = prediction_page(&form, Output::Idle);

        assert!(html.contains(r#"name="age" min="10" max="25" placeholder="Enter age" value="19""#));
        assert!(html.contains(r#"<option value="Portuguese" selected>Portuguese</option>"#));
        assert!(html.contains("Submit the form to view the prediction."));
    }

    #[test]
    fn test_active_nav_link() {
        let html = about_page();
        assert!(html.contains(r#"<a href="/about" class="active">About</a>"#));
        assert!(html.contains(r#"<a href="/">Prediction</a>"#));
    }
}
