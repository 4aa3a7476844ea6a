//! Plain-text rendering of a snapshot for terminal output.

use std::fmt::Write;

use crate::format::{format_bytes, format_percent, truncate_unicode};
use crate::system::process::ProcessRecord;
use crate::system::snapshot::Snapshot;

const NAME_WIDTH: usize = 32;

pub fn render(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "cycle {} | {} processes | cpu {} | mem {}",
        snapshot.cycle,
        snapshot.records.len(),
        format_percent(snapshot.total_cpu_percent()),
        format_bytes(snapshot.total_memory_bytes()),
    );

    render_ranking(&mut out, "Top CPU", &snapshot.top_cpu);
    render_ranking(&mut out, "Top memory", &snapshot.top_memory);

    let _ = writeln!(out, "\nCategories");
    for (category, members) in &snapshot.groups {
        let cpu: f64 = members.iter().map(|r| r.cpu_usage_percent).sum();
        let memory: u64 = members.iter().map(|r| r.memory_usage_bytes).sum();
        let _ = writeln!(
            out,
            "  {:<14}{:>5}  {:>7}  {:>9}",
            category.label(),
            members.len(),
            format_percent(cpu),
            format_bytes(memory),
        );
    }
    out
}

fn render_ranking(out: &mut String, title: &str, records: &[ProcessRecord]) {
    let _ = writeln!(out, "\n{title}");
    if records.is_empty() {
        let _ = writeln!(out, "  (none)");
        return;
    }
    let _ = writeln!(out, "  {:>7}  {:>7}  {:>9}  NAME", "PID", "CPU", "MEMORY");
    for record in records {
        let _ = writeln!(
            out,
            "  {:>7}  {:>7}  {:>9}  {}",
            record.pid,
            format_percent(record.cpu_usage_percent),
            format_bytes(record.memory_usage_bytes),
            truncate_unicode(&record.name, NAME_WIDTH),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};

    use insta::assert_snapshot;

    use super::*;
    use crate::system::category::Category;

    const MB: u64 = 1024 * 1024;

    fn record(pid: u32, name: &str, cpu: f64, memory: u64, category: Category) -> ProcessRecord {
        ProcessRecord {
            pid,
            name: name.to_string(),
            path: PathBuf::from(format!("/bin/{name}")),
            bundle_identifier: None,
            cpu_usage_percent: cpu,
            memory_usage_bytes: memory,
            category,
        }
    }

    #[test]
    fn renders_rankings_and_categories() {
        let snapshot = Snapshot::build(
            7,
            SystemTime::UNIX_EPOCH,
            Duration::from_millis(3),
            vec![
                record(1, "launchd", 0.5, 10 * MB, Category::System),
                record(200, "Safari", 35.2, 1536 * MB, Category::Browser),
                record(300, "cargo", 120.0, 512 * MB, Category::Development),
            ],
            2,
        );

        assert_snapshot!(render(&snapshot).trim_end(), @r"
        cycle 7 | 3 processes | cpu 155.7% | mem 2.0 GB

        Top CPU
              PID      CPU     MEMORY  NAME
              300   120.0%   512.0 MB  cargo
              200    35.2%     1.5 GB  Safari

        Top memory
              PID      CPU     MEMORY  NAME
              200    35.2%     1.5 GB  Safari
              300   120.0%   512.0 MB  cargo

        Categories
          System            1     0.5%    10.0 MB
          Browser           1    35.2%     1.5 GB
          Development       1   120.0%   512.0 MB
          Communication     0     0.0%        0 B
          Utility           0     0.0%        0 B
          Other             0     0.0%        0 B
        ");
    }

    #[test]
    fn empty_snapshot_renders_placeholders() {
        let rendered = render(&Snapshot::empty());
        assert!(rendered.starts_with("cycle 0 | 0 processes | cpu 0.0% | mem 0 B"));
        assert_eq!(rendered.matches("(none)").count(), 2);
        assert_eq!(rendered.matches("     0     0.0%").count(), 6);
    }
}
