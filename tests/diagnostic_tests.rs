// tests/diagnostic_tests.rs
//
// Checks what a user actually sees: the rendered miette report.

use descent::errors::SourceContext;
use descent::eval::evaluate_source;
use descent::output::NullSink;
use descent::{emit, evaluate, DescentError};
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, Severity};

fn render(error: &DescentError) -> String {
    let mut out = String::new();
    GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
        .render_report(&mut out, error)
        .expect("rendering into a String cannot fail");
    out
}

#[test]
fn test_division_by_zero_report() {
    let err = evaluate("1 + 8 / 0").unwrap_err();
    let report = render(&err);
    assert!(report.contains("Arithmetic error: division by zero"), "{report}");
    assert!(report.contains("descent::eval::division_by_zero"), "{report}");
    assert!(report.contains("8 / 0"), "{report}");
    assert!(report.contains("the divisor evaluates to zero"), "{report}");
}

#[test]
fn test_unclosed_paren_report() {
    let err = evaluate("(3 + 4").unwrap_err();
    let report = render(&err);
    assert!(report.contains("expected ')', found end of input"), "{report}");
    assert!(report.contains("every '(' needs a matching ')'"), "{report}");
}

#[test]
fn test_report_names_the_source() {
    let err = evaluate_source(SourceContext::new("<repl:7>", "2 * ")).unwrap_err();
    let report = render(&err);
    assert!(report.contains("<repl:7>"), "{report}");
}

#[test]
fn test_trailing_input_is_warning_severity() {
    let warning = evaluate("3 + 4 x").unwrap().trailing.unwrap();
    assert_eq!(warning.severity(), Some(Severity::Warning));
    let report = render(&warning);
    assert!(report.contains("unexpected symbols at end of expression: 'x'"), "{report}");
}

#[test]
fn test_errors_have_error_severity_and_labels() {
    let err = emit("4 / 0", &mut NullSink).unwrap_err();
    assert_eq!(err.severity(), Some(Severity::Error));
    let labels: Vec<_> = err.labels().expect("labels").collect();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].offset(), 0);
    assert_eq!(labels[0].len(), 5);
}

#[test]
fn test_unexpected_character_report() {
    let err = evaluate("3 + )").unwrap_err();
    let report = render(&err);
    assert!(report.contains("unexpected ')', expected a number or '('"), "{report}");
    assert!(report.contains("descent::eval::unexpected_character"), "{report}");
}
