//! CLI output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::auth::Identity;
use crate::store::{PaymentStatus, Student};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Print a table of students
pub fn print_student_table(students: &[Student]) {
    if students.is_empty() {
        info("No students registered yet");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").fg(Color::Cyan),
            Cell::new("Email").fg(Color::Cyan),
            Cell::new("Roll No.").fg(Color::Cyan),
            Cell::new("Events").fg(Color::Cyan),
            Cell::new("Payment").fg(Color::Cyan),
            Cell::new("Registered By").fg(Color::Cyan),
        ]);

    for student in students {
        let payment_color = match student.payment.status {
            PaymentStatus::Paid => Color::Green,
            PaymentStatus::Pending => Color::Yellow,
            PaymentStatus::Waived => Color::Blue,
        };

        table.add_row(vec![
            Cell::new(&student.name),
            Cell::new(&student.email),
            Cell::new(student.roll_number.as_deref().unwrap_or("-")),
            Cell::new(student.events.join(", ")),
            Cell::new(format!(
                "{} ({})",
                student.payment.status, student.payment.amount
            ))
            .fg(payment_color),
            Cell::new(&student.registered_by),
        ]);
    }

    println!("{table}");
}

/// Print the identity returned by the server
pub fn print_identity(identity: &Identity) {
    println!("{}", "Identity".bold());
    println!("  {:<8} {}", "id:", identity.id.as_deref().unwrap_or("-"));
    println!("  {:<8} {}", "email:", identity.email.as_deref().unwrap_or("-"));
    println!("  {:<8} {}", "name:", identity.name.as_deref().unwrap_or("-"));
    println!(
        "  {:<8} {}",
        "role:",
        identity.role.as_deref().unwrap_or("-").cyan()
    );
}
