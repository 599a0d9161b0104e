//! Vertical card display for processed claim queries.

use claimwise_core::{QueryRecord, SENTINEL};

const SNIPPET_LEN: usize = 160;

pub fn print_query_card(record: &QueryRecord) {
    println!("=== Claim query ===");
    println!("{}", record.query);
    println!();

    println!("Parsed fields");
    print_row("age", record.parsed.age.as_deref());
    print_row("gender", record.parsed.gender.as_deref());
    print_row("procedure", record.parsed.procedure.as_deref());
    print_row("location", record.parsed.location.as_deref());
    print_row("policy duration", record.parsed.policy_duration.as_deref());
    println!();

    println!("Decision");
    print_row("outcome", Some(record.decision.as_str()));
    print_row("justification", Some(&record.justification));
    println!();

    if record.clauses.is_empty() {
        println!("Relevant clauses: none retrieved");
    } else {
        println!("Relevant clauses ({}):", record.clauses.len());
        for (i, clause) in record.clauses.iter().enumerate() {
            println!("  {}. {}", i + 1, snippet(clause));
        }
    }
}

fn print_row(name: &str, value: Option<&str>) {
    println!("  {:<18} {}", name, value.unwrap_or(SENTINEL));
}

fn snippet(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.len() <= SNIPPET_LEN {
        return flat;
    }
    let mut end = SNIPPET_LEN;
    while !flat.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &flat[..end])
}
