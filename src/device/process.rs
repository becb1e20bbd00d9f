/// One row of `ps` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
}

/// Parse `ps` / `ps -A` output
///
/// Both toybox and the old toolbox print a header starting with `USER`,
/// PID in the second column and the process name in the last.
pub fn parse_ps(output: &str) -> Vec<ProcessInfo> {
    output
        .lines()
        .filter(|line| !line.trim_start().starts_with("USER"))
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            if columns.len() < 3 {
                return None;
            }
            let pid = columns[1].parse().ok()?;
            let name = columns[columns.len() - 1].to_string();
            Some(ProcessInfo { pid, name })
        })
        .collect()
}

/// Processes whose name contains `needle`, which also catches `pkg:sandboxed_process0`
pub fn matching<'a>(processes: &'a [ProcessInfo], needle: &'a str) -> impl Iterator<Item = &'a ProcessInfo> + 'a {
    processes.iter().filter(move |p| p.name.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOYBOX_PS: &str = "\
USER           PID  PPID     VSZ    RSS WCHAN            ADDR S NAME
root             1     0 10904472  8760 do_epoll_wait       0 S init
u0_a123      12345   789 15000000 120000 do_epoll_wait      0 S com.example.app
u0_i9000     12399   789 14000000  90000 do_epoll_wait      0 S com.example.app:sandboxed_process0
u0_a77       13000   789 14000000  90000 do_epoll_wait      0 S com.other.app
";

    #[test]
    fn test_parse_toybox_ps() {
        let processes = parse_ps(TOYBOX_PS);
        assert_eq!(processes.len(), 4);
        assert_eq!(processes[0], ProcessInfo { pid: 1, name: "init".to_string() });
        assert_eq!(processes[1].pid, 12345);
    }

    #[test]
    fn test_matching_includes_child_processes() {
        let processes = parse_ps(TOYBOX_PS);
        let pids: Vec<u32> = matching(&processes, "com.example.app").map(|p| p.pid).collect();
        assert_eq!(pids, vec![12345, 12399]);
    }

    #[test]
    fn test_header_only_output() {
        let processes = parse_ps("USER PID PPID VSZ RSS WCHAN PC NAME\n");
        assert!(processes.is_empty());
    }

    #[test]
    fn test_garbage_lines_are_skipped() {
        let processes = parse_ps("bad pid '-A'\n\nroot 1 0 init\n");
        assert_eq!(processes, vec![ProcessInfo { pid: 1, name: "init".to_string() }]);
    }
}
