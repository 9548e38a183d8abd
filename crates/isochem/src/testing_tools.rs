use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};

pub(crate) fn render_diagnostic(diagnostic: &dyn Diagnostic) -> String {
    let mut out = String::new();
    GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
        .with_width(80)
        .render_report(&mut out, diagnostic)
        .unwrap();
    out
}

macro_rules! assert_miette_contains {
    ($diag:expr, $($fragment:expr),+ $(,)?) => {{
        let error = $diag.unwrap_err();
        let out = $crate::testing_tools::render_diagnostic(&*error);
        $(
            assert!(
                out.contains($fragment),
                "{} rendered without {:?}:\n{out}",
                stringify!($diag),
                $fragment
            );
        )+
    }};
}

pub(crate) use assert_miette_contains;
