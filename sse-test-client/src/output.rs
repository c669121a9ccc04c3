use colored::*;
use std::time::Duration;

#[derive(Debug)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub message: Option<String>,
    pub duration: Duration,
}

pub fn print_test_summary(results: &[TestResult]) {
    for result in results {
        let marker = if result.passed {
            "✓ PASS".green()
        } else {
            "✗ FAIL".red()
        };

        println!("{} {} ({:?})", marker, result.name, result.duration);

        if let Some(message) = &result.message {
            println!("    {}", message.dimmed());
        }
    }

    let passed = results.iter().filter(|r| r.passed).count();
    println!(
        "\n{} of {} scenario(s) passed",
        passed.to_string().bright_white().bold(),
        results.len()
    );
}
