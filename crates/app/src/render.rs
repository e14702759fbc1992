use std::fmt::Write;

use textsense_core::{ChatTurn, GenerateResponse, GenerationParameters, HealthStatus, UsageStats};

pub fn turns(turns: &[ChatTurn]) -> String {
    if turns.is_empty() {
        return "No messages yet. Add 2-5 lines of who wrote what.\n".to_string();
    }

    let mut out = String::new();
    for (index, turn) in turns.iter().enumerate() {
        let _ = writeln!(out, "#{} {:>7}: {}", index + 1, turn.role.display_label(), turn.text);
    }
    out
}

pub fn response(response: &GenerateResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Detected language: {}",
        response.language.as_deref().unwrap_or("auto")
    );
    if response.options.is_empty() {
        out.push_str("The service returned no options.\n");
        return out;
    }

    for (index, option) in response.options.iter().enumerate() {
        let _ = writeln!(out, "\n[{}] {}", index + 1, option.label);
        let _ = writeln!(out, "    {}", option.text);
    }
    out
}

pub fn parameters(parameters: &GenerationParameters) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "relationship  {}", parameters.relationship);
    let _ = writeln!(out, "scenario      {}", parameters.scenario);
    let _ = writeln!(out, "tone          {}", parameters.tone);
    let _ = writeln!(
        out,
        "language      {}",
        parameters.language.as_deref().unwrap_or("auto")
    );
    let _ = writeln!(
        out,
        "target-gender {}",
        parameters
            .target_gender
            .map(|gender| gender.as_str())
            .unwrap_or("none")
    );
    let _ = writeln!(out, "personalness  {}", parameters.personalness);
    out
}

pub fn health(health: &HealthStatus) -> String {
    format!(
        "{} (server time {})\n",
        if health.ok { "ok" } else { "not ok" },
        health.ts
    )
}

pub fn stats(stats: &UsageStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "total generations  {}", stats.total_generations);
    let _ = writeln!(out, "conversion (guess) {:.3}", stats.conversion_rate_guess);
    out.push_str("by language:\n");
    for (language, count) in &stats.by_language {
        let _ = writeln!(out, "  {language:<10} {count}");
    }
    out.push_str("by scenario:\n");
    for (scenario, count) in &stats.by_scenario {
        let _ = writeln!(out, "  {scenario:<16} {count}");
    }
    out
}
