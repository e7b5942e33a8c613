use crate::command::CommandAction;
use serde_json::Value;

/// Plain-text rendering of a successful command result.
pub fn render(action: CommandAction, data: &Value) -> String {
    match action {
        CommandAction::Calculate => render_evaluation(data),
        CommandAction::CalculateRange => render_range(data),
        CommandAction::CalculateCombinedRange => render_combined(data),
        CommandAction::CalculateAllStates => render_all_states(data),
        CommandAction::CalculateComparison => render_comparison(data),
        CommandAction::States => render_states(data),
        CommandAction::Counties => render_counties(data),
        CommandAction::Capabilities => {
            serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
        }
    }
}

fn num(value: &Value) -> f64 {
    value.as_f64().unwrap_or(0.0)
}

fn text(value: &Value) -> &str {
    value.as_str().unwrap_or("")
}

fn yes_no(value: &Value) -> &'static str {
    if value.as_bool().unwrap_or(false) {
        "yes"
    } else {
        "no"
    }
}

fn rows(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or_default()
}

fn render_evaluation(data: &Value) -> String {
    let mut out = format!(
        "{} ({}), {}: ${:.2}/month (${:.2}/year), eligible: {}\n",
        text(&data["state_name"]),
        text(&data["state"]),
        data["year"],
        num(&data["tanf_monthly"]),
        num(&data["tanf_annual"]),
        yes_no(&data["eligible"]),
    );
    if let Some(county) = data["county"].as_str() {
        out.push_str(&format!("County: {county}\n"));
    }

    if let Some(breakdown) = data["breakdown"].as_object() {
        out.push_str("\nBreakdown (monthly):\n");
        for (key, value) in breakdown {
            if let Some(name) = key.strip_suffix("_monthly") {
                out.push_str(&format!("  {name:<24} ${:>10.2}\n", num(value)));
            }
        }
    }

    if let Some(checks) = data["eligibility_checks"].as_object() {
        out.push_str("\nEligibility checks:\n");
        for (flag, value) in checks {
            out.push_str(&format!("  {flag:<36} {}\n", yes_no(value)));
        }
    }

    let poverty = &data["poverty_context"];
    if poverty.is_object() {
        out.push_str(&format!(
            "\nPoverty guideline: ${:.2}/month; income {:.1}% of FPG, with TANF {:.1}%\n",
            num(&poverty["fpg_monthly"]),
            num(&poverty["income_pct_fpg"]),
            num(&poverty["income_plus_tanf_pct_fpg"]),
        ));
    }
    out.trim_end().to_string()
}

fn render_range(data: &Value) -> String {
    let mut out = format!(
        "{} ({}), {}\n{:>14} {:>12} {:>9}\n",
        text(&data["state_name"]),
        text(&data["state"]),
        data["year"],
        "income/month",
        "tanf/month",
        "eligible"
    );
    for point in rows(&data["data"]) {
        out.push_str(&format!(
            "{:>14} {:>12.2} {:>9}\n",
            point["total_income_monthly"].as_i64().unwrap_or(0),
            num(&point["tanf_monthly"]),
            yes_no(&point["eligible"]),
        ));
    }
    out.trim_end().to_string()
}

fn render_combined(data: &Value) -> String {
    let programs: Vec<&str> = rows(&data["programs_available"]).iter().map(text).collect();
    let mut out = format!("{}\n{:>14}", text(&data["state"]), "income/month");
    for program in &programs {
        out.push_str(&format!(" {program:>10}"));
    }
    out.push_str(&format!(" {:>10}\n", "total"));

    for point in rows(&data["data"]) {
        out.push_str(&format!(
            "{:>14}",
            point["total_income_monthly"].as_i64().unwrap_or(0)
        ));
        for program in &programs {
            let amount = num(&point[format!("{program}_monthly")]);
            out.push_str(&format!(" {amount:>10.2}"));
        }
        out.push_str(&format!(" {:>10.2}\n", num(&point["total_benefits_monthly"])));
    }
    out.trim_end().to_string()
}

fn render_all_states(data: &Value) -> String {
    let mut out = format!(
        "{}: highest benefit ${:.2}/month\n",
        data["year"],
        num(&data["max_benefit"])
    );
    for (rank, record) in rows(&data["states"]).iter().enumerate() {
        let status = if record["error"].as_bool().unwrap_or(false) {
            "error"
        } else if record["eligible"].as_bool().unwrap_or(false) {
            "eligible"
        } else {
            "not eligible"
        };
        out.push_str(&format!(
            "{:>3}. {} {:<22} ${:>9.2}  {status}\n",
            rank + 1,
            text(&record["state"]),
            text(&record["state_name"]),
            num(&record["tanf_monthly"]),
        ));
    }
    out.trim_end().to_string()
}

fn render_comparison(data: &Value) -> String {
    let leg = |label: &str, result: &Value| {
        format!(
            "{label}: {} ${:.2}/month, eligible: {}\n",
            text(&result["state"]),
            num(&result["tanf_monthly"]),
            yes_no(&result["eligible"]),
        )
    };
    let mut out = leg("Scenario A", &data["scenario_a"]);
    out.push_str(&leg("Scenario B", &data["scenario_b"]));
    let difference = &data["difference"];
    out.push_str(&format!(
        "Difference (B - A): {:+.2}/month, {:+.2}/year, eligibility changed: {}",
        num(&difference["tanf_monthly"]),
        num(&difference["tanf_annual"]),
        yes_no(&difference["eligible_changed"]),
    ));
    out
}

fn render_states(data: &Value) -> String {
    rows(&data["states"])
        .iter()
        .map(|state| {
            let marker = if state["requires_county"].as_bool().unwrap_or(false) {
                "  (county required)"
            } else {
                ""
            };
            format!("{}  {}{marker}", text(&state["code"]), text(&state["name"]))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_counties(data: &Value) -> String {
    let counties = rows(&data["counties"]);
    if counties.is_empty() {
        return "No county table for this state.".to_string();
    }
    let mut lines: Vec<String> = counties
        .iter()
        .map(|county| {
            format!(
                "{:<28} {:<24} region {}",
                text(&county["code"]),
                text(&county["name"]),
                county["region"]
            )
        })
        .collect();
    if let Some(note) = data["note"].as_str() {
        lines.push(String::new());
        lines.push(note.to_string());
    }
    lines.join("\n")
}
