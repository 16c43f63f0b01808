use console::Style;

use aqualens_core::quality::QualityReport;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    good: Style,
    bad: Style,
    hint: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            good: Style::new().green(),
            bad: Style::new().red(),
            hint: Style::new().yellow(),
        }
    }
}

pub fn print_quality_report(report: &QualityReport) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Quality Report"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(14)));
    println!();

    for check in &report.checks {
        let score_style = if check.score >= 7.0 { &s.good } else { &s.bad };
        println!(
            "  {:<24}{}",
            s.label.apply_to(check.name),
            score_style.apply_to(format!("{:>5.1} / 10", check.score))
        );
        for (key, value) in &check.details {
            println!("    {:<26}{:.4}", s.label.apply_to(*key), value);
        }
        for rec in &check.recommendations {
            println!("    {}", s.hint.apply_to(format!("\u{2192} {rec}")));
        }
    }

    println!();
    println!(
        "  {:<24}{}",
        s.header.apply_to("Overall"),
        s.value.apply_to(format!("{:.2} / 10", report.overall_score))
    );
    println!();
}
