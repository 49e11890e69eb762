use colored::*;
use std::io::Write;

pub fn print_header(text: &str) {
    println!("\n{}", text.bright_cyan().bold());
    println!("{}", "=".repeat(text.chars().count()).bright_cyan());
}

pub fn print_success(text: &str) {
    println!("{}", text.green());
}

pub fn print_error(text: &str) {
    eprintln!("{}", text.red().bold());
}

pub fn print_info(text: &str) {
    println!("{}", text.blue());
}

pub fn print_prompt(text: &str) {
    print!("{}", text.yellow().bold());
    let _ = std::io::stdout().flush();
}

pub fn print_question(question: &str) {
    println!("\n{} {}", "Q:".green().bold(), question);
}

pub fn print_answer(answer: &str) {
    println!("{} {}", "A:".yellow().bold(), answer);
}

/// `[LOG] ...` line for routing events the user should see
pub fn print_log(event: &str) {
    println!("{} {}", "[LOG]".magenta(), event);
}

pub fn print_response(responder: &str, answer: &str) {
    println!("{} {}", format!("{} Response:", responder).bright_green().bold(), answer);
}
