//! Plain-text rendering for terminal output.
use std::collections::HashMap;

use workshop_core::api::{Customer, Employee, Task, Workorder, WorkorderProgress};

const BAR_WIDTH: usize = 20;

pub fn task_line(task: &Task, assignee: Option<&str>) -> String {
    let who = match assignee {
        Some(name) => name.to_string(),
        None => format!("#{}", task.assigned_id),
    };
    format!(
        "{:>5}  {:<10} {:<12} {:<32} {:<16} {}",
        task.id,
        task.workorder_id,
        task.status,
        task.name,
        who,
        task.time.as_deref().unwrap_or("-")
    )
}

pub fn task_table(tasks: &[Task], employees: &[Employee]) -> String {
    if tasks.is_empty() {
        return "No tasks.".to_string();
    }
    let names: HashMap<u64, &str> = employees.iter().map(|e| (e.id, e.name.as_str())).collect();
    tasks
        .iter()
        .map(|t| task_line(t, names.get(&t.assigned_id).copied()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn workorder_line(wo: &Workorder) -> String {
    format!(
        "{:<10} {:<15} {:<28} {:<20} due {}",
        wo.id,
        wo.status,
        wo.vehicle,
        wo.customer,
        wo.due.as_deref().unwrap_or("-")
    )
}

pub fn workorder_table(orders: &[Workorder]) -> String {
    if orders.is_empty() {
        return "No work orders.".to_string();
    }
    orders.iter().map(workorder_line).collect::<Vec<_>>().join("\n")
}

pub fn customer_table(customers: &[Customer]) -> String {
    if customers.is_empty() {
        return "No customers.".to_string();
    }
    customers
        .iter()
        .map(|c| {
            format!(
                "{:>5}  {:<24} {:<14} {}",
                c.id,
                c.name,
                c.phone.as_deref().unwrap_or("-"),
                c.email.as_deref().unwrap_or("-")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn employee_table(employees: &[Employee]) -> String {
    if employees.is_empty() {
        return "No employees.".to_string();
    }
    employees
        .iter()
        .map(|e| format!("{:>5}  {:<24} {}", e.id, e.name, e.role))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `[##########----------]  50% (1/2)`
pub fn progress_bar(progress: &WorkorderProgress) -> String {
    let filled = (progress.ratio() * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "[{}{}] {:>3}% ({}/{})",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        progress.percent(),
        progress.done,
        progress.total
    )
}

/// Customer-facing view: no assignees, no ids beyond the work order's.
pub fn portal_view(wo: &Workorder, progress: &WorkorderProgress, tasks: &[Task]) -> String {
    let mut out = vec![
        format!("Work order {}", wo.id),
        format!("Vehicle:   {}", wo.vehicle),
        format!("Customer:  {}", wo.customer),
        format!("Status:    {}", wo.status),
    ];
    if let Some(complaint) = wo.complaint.as_deref().filter(|c| !c.trim().is_empty()) {
        out.push(format!("Complaint: {}", complaint));
    }
    if let Some(due) = wo.due.as_deref() {
        out.push(format!("Expected:  {}", due));
    }
    out.push(format!("Progress:  {}", progress_bar(progress)));
    out.push(String::new());
    if tasks.is_empty() {
        out.push("No tasks planned yet.".to_string());
    } else {
        for t in tasks {
            let mark = if t.status.is_done() { "x" } else { " " };
            out.push(format!("[{}] {:<32} {}", mark, t.name, t.status));
        }
    }
    out.join("\n")
}
